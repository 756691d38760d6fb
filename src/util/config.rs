//! Layered configuration (§10 "Configuration"): global `~/.forge/config.toml`,
//! project `.forge/config.toml`, and CLI flags, in increasing order of precedence.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub cache: CacheConfig,
}

/// Build-related defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Default number of parallel compile jobs (`None` = rayon's default, number of cores).
    pub jobs: Option<usize>,

    /// Default `--configuration` when the CLI flag is omitted.
    pub default_configuration: Option<String>,

    /// Default `--platform` when the CLI flag is omitted.
    pub default_platform: Option<String>,

    /// `human` or `json` (§6 `--message-format`).
    pub message_format: Option<String>,

    /// Whether to colorize diagnostic output; `None` means auto-detect from the terminal.
    pub color: Option<bool>,
}

/// Cache-related defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Equivalent to always passing `--no-cache`.
    pub disabled: bool,

    /// Override for where cache sidecars and objects are written; defaults to the
    /// workspace's own `objdir`/`targetdir` layout when unset.
    pub dir: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig { disabled: false, dir: None }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (`other` takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.jobs.is_some() {
            self.build.jobs = other.build.jobs;
        }
        if other.build.default_configuration.is_some() {
            self.build.default_configuration = other.build.default_configuration;
        }
        if other.build.default_platform.is_some() {
            self.build.default_platform = other.build.default_platform;
        }
        if other.build.message_format.is_some() {
            self.build.message_format = other.build.message_format;
        }
        if other.build.color.is_some() {
            self.build.color = other.build.color;
        }
        if other.cache.disabled {
            self.cache.disabled = true;
        }
        if other.cache.dir.is_some() {
            self.cache.dir = other.cache.dir;
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest): project config, global config, defaults.
/// CLI flags are applied by the caller on top of the returned value.
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }
    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_no_overrides() {
        let config = Config::default();
        assert!(config.build.jobs.is_none());
        assert!(!config.cache.disabled);
    }

    #[test]
    fn load_parses_toml() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[build]
jobs = 8
default_configuration = "release"
message_format = "json"

[cache]
disabled = true
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.build.jobs, Some(8));
        assert_eq!(config.build.default_configuration, Some("release".to_string()));
        assert_eq!(config.build.message_format, Some("json".to_string()));
        assert!(config.cache.disabled);
    }

    #[test]
    fn merge_prefers_override_but_keeps_unset_fields() {
        let mut base = Config::default();
        base.build.jobs = Some(4);

        let mut over = Config::default();
        over.build.message_format = Some("json".to_string());

        base.merge(over);

        assert_eq!(base.build.jobs, Some(4));
        assert_eq!(base.build.message_format, Some("json".to_string()));
    }

    #[test]
    fn load_config_layers_project_over_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");
        std::fs::write(&global, "[build]\njobs = 2\n").unwrap();
        std::fs::write(&project, "[build]\njobs = 16\n").unwrap();

        let config = load_config(&global, &project);
        assert_eq!(config.build.jobs, Some(16));
    }
}
