//! `forge clean`

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use forge::{BuildContext, GlobalContext, PlatformTriple, Resolver};

use super::common::load_workspace;
use crate::cli::CleanArgs;

pub fn execute(args: CleanArgs) -> Result<()> {
    let gctx = GlobalContext::new()?;
    let workspace = load_workspace(&gctx)?;

    let configurations: Vec<String> = match &args.config {
        Some(c) => vec![c.clone()],
        None => workspace.configurations.clone(),
    };

    let resolver = Resolver::new();
    let platform = PlatformTriple::host();
    let mut removed: HashSet<PathBuf> = HashSet::new();

    for configuration in &configurations {
        let ctx = BuildContext::new(configuration.clone(), platform.clone());
        for project in &workspace.projects {
            let effective = resolver
                .resolve(&workspace, &project.name, &ctx)
                .with_context(|| format!("failed to resolve project `{}`", project.name))?;
            for dir in [&effective.objdir, &effective.targetdir] {
                if removed.insert(dir.clone()) {
                    remove_dir(dir)?;
                }
            }
        }
    }

    if args.all {
        remove_dir(&gctx.project_cache_dir())?;
    }

    Ok(())
}

fn remove_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).with_context(|| format!("failed to remove {}", dir.display()))?;
        eprintln!("     Removed {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse_clean_args(args: &[&str]) -> CleanArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            clean: CleanArgs,
        }
        TestCli::parse_from(args).clean
    }

    #[test]
    fn defaults_to_current_configurations_only() {
        let args = parse_clean_args(&["test"]);
        assert!(!args.all);
        assert!(args.config.is_none());
    }

    #[test]
    fn all_flag_parses() {
        let args = parse_clean_args(&["test", "--all"]);
        assert!(args.all);
    }

    #[test]
    fn config_flag_parses() {
        let args = parse_clean_args(&["test", "--config", "Release"]);
        assert_eq!(args.config.as_deref(), Some("Release"));
    }

    #[test]
    fn remove_dir_is_idempotent_on_missing_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let missing = tmp.path().join("does-not-exist");
        assert!(remove_dir(&missing).is_ok());
    }
}
