//! `forge test` - builds and runs every project of kind test-suite, propagating
//! their exit codes (§6).

use std::process::Command;

use anyhow::Result;
use forge::core::ProjectKind;
use forge::scheduler::link;
use forge::{GlobalContext, Resolver, Scheduler};

use super::common::{build_context, configure_jobs, load_workspace};
use super::report::report_build;
use crate::cli::{GlobalFlags, TestArgs};

pub fn execute(args: TestArgs, global: &GlobalFlags) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let workspace = load_workspace(&gctx)?;

    let test_projects: Vec<String> = if args.targets.is_empty() {
        workspace
            .projects
            .iter()
            .filter(|p| p.kind == ProjectKind::TestSuite)
            .map(|p| p.name.clone())
            .collect()
    } else {
        args.targets.clone()
    };

    if test_projects.is_empty() {
        eprintln!("no test-suite projects found");
        return Ok(());
    }

    let ctx = build_context(
        &workspace,
        args.config.as_deref(),
        args.platform.as_deref(),
        &[],
        "build",
        global.verbose,
        args.no_cache,
    )?;

    configure_jobs(global.jobs.as_deref())?;
    let scheduler = Scheduler::new();
    let report = scheduler.build_subset(&workspace, &ctx, args.no_cache, &test_projects)?;
    report_build(&report, global.message_format, global.quiet)?;

    let resolver = Resolver::new();
    let mut passed = 0;
    let mut failed = Vec::new();

    for name in &test_projects {
        let effective = resolver.resolve(&workspace, name, &ctx)?;
        let exe_path = link::target_path(&effective);
        eprint!("test {name} ... ");
        match Command::new(&exe_path).status() {
            Ok(status) if status.success() => {
                eprintln!("ok");
                passed += 1;
            }
            Ok(_) => {
                eprintln!("FAILED");
                failed.push(name.clone());
            }
            Err(e) => {
                eprintln!("FAILED (could not execute: {e})");
                failed.push(name.clone());
            }
        }
    }

    eprintln!();
    if failed.is_empty() {
        eprintln!("test result: ok. {passed} passed; 0 failed");
        Ok(())
    } else {
        eprintln!("test result: FAILED. {passed} passed; {} failed", failed.len());
        eprintln!();
        eprintln!("failing tests:");
        for name in &failed {
            eprintln!("    {name}");
        }
        anyhow::bail!("some tests failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_test_args(args: &[&str]) -> TestArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            test: TestArgs,
        }
        TestCli::parse_from(args).test
    }

    #[test]
    fn defaults_to_no_explicit_targets() {
        let args = parse_test_args(&["test"]);
        assert!(args.targets.is_empty());
        assert!(!args.no_cache);
    }

    #[test]
    fn accepts_explicit_targets() {
        let args = parse_test_args(&["test", "unit_tests", "integration_tests"]);
        assert_eq!(args.targets, vec!["unit_tests", "integration_tests"]);
    }
}
