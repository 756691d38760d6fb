//! Global context: paths, environment, and the workspace manifest lookup shared by
//! every CLI command (§10 "Configuration").

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::{ProjectDirs, UserDirs};

use crate::core::workspace::find_manifest as ws_find_manifest;

static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("dev", "forge", "forge"));

/// Global context containing configuration and paths, built once per process.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    cwd: PathBuf,
    /// Home directory for global forge data (`~/.forge/` when `directories` has no
    /// platform-specific cache dir to offer).
    home: PathBuf,
    verbose: bool,
    color: bool,
}

impl GlobalContext {
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let home = if let Some(dirs) = PROJECT_DIRS.as_ref() {
            dirs.cache_dir().to_path_buf()
        } else {
            UserDirs::new()
                .map(|u| u.home_dir().join(".forge"))
                .unwrap_or_else(|| PathBuf::from(".forge"))
        };

        Ok(GlobalContext { cwd, home, verbose: false, color: true })
    }

    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn set_color(&mut self, color: bool) {
        self.color = color;
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// The `~/.forge/` home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn global_cache_dir(&self) -> PathBuf {
        self.home.join("cache")
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// The project-local `.forge/` directory, holding the project config override
    /// and (unless overridden in config) the cache sidecars.
    pub fn project_forge_dir(&self) -> PathBuf {
        self.cwd.join(".forge")
    }

    pub fn project_config_path(&self) -> PathBuf {
        self.project_forge_dir().join("config.toml")
    }

    pub fn project_cache_dir(&self) -> PathBuf {
        self.project_forge_dir().join("cache")
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Finds the workspace manifest (`forge.toml` or `Forgefile.toml`), searching
    /// upward from the current directory.
    pub fn find_manifest(&self) -> Option<PathBuf> {
        ws_find_manifest(&self.cwd)
    }

    /// Finds the workspace root (the directory containing the manifest).
    pub fn find_workspace_root(&self) -> Option<PathBuf> {
        self.find_manifest().and_then(|p| p.parent().map(Path::to_path_buf))
    }

    pub fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::create_dir_all(path)
                .with_context(|| format!("failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new().expect("failed to create default GlobalContext")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn context_paths_are_absolute_and_named() {
        let ctx = GlobalContext::new().unwrap();
        assert!(ctx.cwd().is_absolute());
        assert!(ctx.home().to_string_lossy().contains("forge"));
    }

    #[test]
    fn find_manifest_locates_alias() {
        let tmp = TempDir::new().unwrap();
        let manifest = tmp.path().join("Forgefile.toml");
        std::fs::write(&manifest, "").unwrap();

        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        assert_eq!(ctx.find_manifest(), Some(manifest));
    }

    #[test]
    fn find_manifest_none_when_absent() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_cwd(tmp.path().to_path_buf()).unwrap();
        assert_eq!(ctx.find_manifest(), None);
    }
}
