//! `forge run`

use std::process::Command;

use anyhow::{Context, Result};
use forge::scheduler::link;
use forge::{GlobalContext, Resolver, Scheduler};

use super::common::{build_context, configure_jobs, load_workspace};
use super::report::report_build;
use crate::cli::{GlobalFlags, RunArgs};

pub fn execute(args: RunArgs, global: &GlobalFlags) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let workspace = load_workspace(&gctx)?;

    let project_name = args
        .project
        .clone()
        .or_else(|| workspace.startup_project.clone())
        .context("no project given and the workspace declares no startup project")?;

    let ctx = build_context(
        &workspace,
        args.config.as_deref(),
        args.platform.as_deref(),
        &[],
        "build",
        global.verbose,
        false,
    )?;

    if !args.no_build {
        configure_jobs(global.jobs.as_deref())?;
        let scheduler = Scheduler::new();
        let report = scheduler.build_subset(&workspace, &ctx, false, std::slice::from_ref(&project_name))?;
        report_build(&report, global.message_format, global.quiet)?;
    }

    let resolver = Resolver::new();
    let effective = resolver
        .resolve(&workspace, &project_name, &ctx)
        .with_context(|| format!("failed to resolve project `{project_name}`"))?;

    let exe_path = link::target_path(&effective);
    let status = Command::new(&exe_path)
        .args(&args.args)
        .status()
        .with_context(|| format!("failed to execute {}", exe_path.display()))?;

    if !status.success() {
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}
