//! `forge rebuild` - clean the selected scope, then build it (§6).

use anyhow::Result;
use forge::{GlobalContext, Resolver, Scheduler};

use super::common::{build_context, configure_jobs, load_workspace};
use super::report::report_build;
use crate::cli::{BuildArgs, GlobalFlags};

pub fn execute(args: BuildArgs, global: &GlobalFlags) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let workspace = load_workspace(&gctx)?;

    configure_jobs(global.jobs.as_deref())?;

    let ctx = build_context(
        &workspace,
        args.config.as_deref(),
        args.platform.as_deref(),
        &args.options,
        &args.action,
        global.verbose,
        args.no_cache,
    )?;

    // Clean only the projects this build would actually touch, under this exact
    // context, rather than every configuration (§6 "equivalent to clean followed
    // by build for the selected scope").
    let resolver = Resolver::new();
    let project_names: Vec<String> = if args.targets.is_empty() {
        workspace.projects.iter().map(|p| p.name.clone()).collect()
    } else {
        args.targets.clone()
    };
    for name in &project_names {
        let effective = resolver.resolve(&workspace, name, &ctx)?;
        for dir in [&effective.objdir, &effective.targetdir] {
            if dir.exists() {
                std::fs::remove_dir_all(dir)?;
            }
        }
    }

    let scheduler = Scheduler::new();
    let report = scheduler.build_subset(&workspace, &ctx, args.no_cache, &args.targets)?;

    report_build(&report, global.message_format, global.quiet)
}
