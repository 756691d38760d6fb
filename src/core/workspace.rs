//! The Workspace: root record, created by the front-end and consumed read-only by
//! the engine for the lifetime of one build process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::external::ExternalInclusion;
use crate::core::project::Project;
use crate::core::toolchain::Toolchain;

pub const MANIFEST_NAME: &str = "forge.toml";
pub const MANIFEST_ALIAS: &str = "Forgefile.toml";

#[derive(Debug, Clone, Default)]
pub struct SdkPaths {
    pub android_sdk: Option<PathBuf>,
    pub android_ndk: Option<PathBuf>,
    pub java_home: Option<PathBuf>,
    pub ios_sdk: Option<PathBuf>,
    pub emscripten_root: Option<PathBuf>,
}

/// A user-declared custom build option (the `options:K[=V]` side of the filter grammar).
#[derive(Debug, Clone)]
pub struct UserOption {
    pub name: String,
    pub default: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("duplicate project name `{0}`")]
    DuplicateProject(String),
    #[error("project `{project}` depends on undefined project `{dependency}`")]
    UndefinedDependency { project: String, dependency: String },
    #[error("project `{project}` links undefined project `{link}`")]
    UndefinedLink { project: String, link: String },
    #[error("project `{project}` references undefined toolchain `{toolchain}`")]
    UndefinedToolchain { project: String, toolchain: String },
    #[error("workspace declares no configurations")]
    NoConfigurations,
    #[error("startup project `{0}` is not defined in the workspace")]
    UndefinedStartupProject(String),
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub name: String,
    pub root: PathBuf,
    pub configurations: Vec<String>,
    pub platforms: Vec<String>,
    pub startup_project: Option<String>,
    pub sdk_paths: SdkPaths,
    pub options: Vec<UserOption>,
    pub projects: Vec<Project>,
    pub toolchains: HashMap<String, Toolchain>,
    pub external_inclusions: Vec<ExternalInclusion>,
}

impl Workspace {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Workspace {
            name: name.into(),
            root: root.into(),
            configurations: vec!["Debug".to_string(), "Release".to_string()],
            platforms: Vec::new(),
            startup_project: None,
            sdk_paths: SdkPaths::default(),
            options: Vec::new(),
            projects: Vec::new(),
            toolchains: HashMap::new(),
            external_inclusions: Vec::new(),
        }
    }

    pub fn with_configurations(mut self, configs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.configurations = configs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_startup_project(mut self, name: impl Into<String>) -> Self {
        self.startup_project = Some(name.into());
        self
    }

    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchains.insert(toolchain.name.clone(), toolchain);
        self
    }

    pub fn project(&self, name: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Merges pre-registered toolchains from the toolchain registry JSON (§6) into the
    /// workspace, with workspace-declared toolchains taking precedence.
    pub fn merge_registry_toolchains(&mut self, registry: HashMap<String, Toolchain>) {
        for (name, toolchain) in registry {
            self.toolchains.entry(name).or_insert(toolchain);
        }
    }

    /// Entry-point validation: rejects cycles (handled separately by the Resolver's
    /// graph pass), missing required fields, and unknown enum values that would have
    /// already failed to deserialize — what remains here is cross-reference validation.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.configurations.is_empty() {
            return Err(ConfigurationError::NoConfigurations);
        }

        let mut seen = std::collections::HashSet::new();
        for project in &self.projects {
            if !seen.insert(&project.name) {
                return Err(ConfigurationError::DuplicateProject(project.name.clone()));
            }
        }

        for project in &self.projects {
            for dep in &project.depends_on {
                if self.project(dep).is_none() {
                    return Err(ConfigurationError::UndefinedDependency {
                        project: project.name.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
            for link in &project.links {
                // Links may name an external system library; only validate ones that
                // collide with a workspace project name but aren't declared as a project.
                if link.contains('/') || link.contains('\\') {
                    continue;
                }
            }
            if let Some(toolchain) = &project.use_toolchain {
                if !self.toolchains.contains_key(toolchain) {
                    return Err(ConfigurationError::UndefinedToolchain {
                        project: project.name.clone(),
                        toolchain: toolchain.clone(),
                    });
                }
            }
        }

        if let Some(startup) = &self.startup_project {
            if self.project(startup).is_none() {
                return Err(ConfigurationError::UndefinedStartupProject(startup.clone()));
            }
        }

        Ok(())
    }
}

/// Walks upward from `start` looking for a workspace manifest file.
pub fn find_manifest(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(d) = dir {
        let candidate = d.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        let alias = d.join(MANIFEST_ALIAS);
        if alias.is_file() {
            return Some(alias);
        }
        dir = d.parent();
    }
    None
}
