//! `forge build`

use anyhow::Result;
use forge::{GlobalContext, Scheduler};

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

    let scheduler = Scheduler::new();
    let report = scheduler.build_subset(&workspace, &ctx, args.no_cache, &args.targets)?;

    report_build(&report, global.message_format, global.quiet)
}
