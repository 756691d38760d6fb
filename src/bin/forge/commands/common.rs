//! Shared plumbing every subcommand needs: locating and loading the workspace
//! manifest, and turning CLI flags into a `BuildContext`.

use anyhow::{Context, Result};
use forge::core::manifest;
use forge::{BuildContext, GlobalContext, PlatformTriple, Workspace};

/// Finds the nearest manifest from the current directory and loads it.
pub fn load_workspace(gctx: &GlobalContext) -> Result<Workspace> {
    let manifest_path = gctx
        .find_manifest()
        .with_context(|| format!("no {} or Forgefile.toml found in {} or any parent directory", forge::core::MANIFEST_NAME, gctx.cwd().display()))?;
    manifest::load(&manifest_path)
}

/// Builds the `(configuration, platform, options, action)` tuple a CLI invocation
/// resolves and evaluates filters against.
pub fn build_context(
    workspace: &Workspace,
    config: Option<&str>,
    platform: Option<&str>,
    options: &[String],
    action: &str,
    verbose: bool,
    no_cache: bool,
) -> Result<BuildContext> {
    let configuration = match config {
        Some(c) => c.to_string(),
        None => workspace
            .configurations
            .first()
            .cloned()
            .context("workspace declares no configurations")?,
    };

    let platform_triple = match platform {
        Some(p) => PlatformTriple::parse(p).map_err(|e| anyhow::anyhow!(e))?,
        None => PlatformTriple::host(),
    };

    let mut ctx = BuildContext::new(configuration, platform_triple)
        .with_action(action)
        .with_verbose(verbose)
        .with_no_cache(no_cache);

    for opt in options {
        match opt.split_once('=') {
            Some((k, v)) => ctx = ctx.with_option(k, v),
            None => ctx = ctx.with_option(opt, ""),
        }
    }

    Ok(ctx)
}

/// Applies `--jobs` to rayon's global pool. `"auto"` (or unset) leaves rayon's own
/// `cpu_count`-based default in place.
pub fn configure_jobs(jobs: Option<&str>) -> Result<()> {
    let Some(jobs) = jobs else { return Ok(()) };
    if jobs.eq_ignore_ascii_case("auto") {
        return Ok(());
    }
    let n: usize = jobs.parse().with_context(|| format!("invalid --jobs value `{jobs}`"))?;
    rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build_global()
        .context("failed to configure the compile worker pool")?;
    Ok(())
}
