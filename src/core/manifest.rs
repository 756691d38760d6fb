//! `forge.toml` / `Forgefile.toml` loading.
//!
//! This is the on-disk materialization of the workspace model (§10 "Configuration"),
//! not the scripting-dialect front-end that the core's design deliberately leaves
//! unscoped: it is ordinary structural `serde` deserialization of a fixed TOML shape,
//! the same way the teacher's own manifest loader turns a `Raw*` schema into the typed
//! model it actually runs on. Filter predicates are still strings in TOML; they go
//! through `core::filter::parse_filter_expr` exactly as the hand-authored `Project`
//! builder API would.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::filter::{parse_filter_expr, FilterBlock, ProjectDelta};
use crate::core::project::{
    BuildHooks, Dialect, Language, OptimizationLevel, PlatformMetadata, PrecompiledHeader, Project,
    ProjectKind, WarningLevel,
};
use crate::core::toolchain::Toolchain;
use crate::core::workspace::{SdkPaths, UserOption, Workspace};

#[derive(Debug, Deserialize)]
struct RawManifest {
    workspace: RawWorkspace,
    #[serde(default)]
    toolchains: HashMap<String, Toolchain>,
    #[serde(default)]
    project: Vec<RawProject>,
}

#[derive(Debug, Deserialize)]
struct RawWorkspace {
    name: String,
    #[serde(default)]
    configurations: Vec<String>,
    #[serde(default)]
    platforms: Vec<String>,
    startup_project: Option<String>,
    #[serde(default)]
    sdk: RawSdkPaths,
    #[serde(default)]
    options: Vec<RawUserOption>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSdkPaths {
    android_sdk: Option<PathBuf>,
    android_ndk: Option<PathBuf>,
    java_home: Option<PathBuf>,
    ios_sdk: Option<PathBuf>,
    emscripten_root: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawUserOption {
    name: String,
    default: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawProject {
    name: String,
    kind: ProjectKind,
    language: Language,
    dialect: String,
    #[serde(default = "default_location")]
    location: PathBuf,

    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    exclude_files: Vec<String>,
    #[serde(default)]
    exclude_main_files: Vec<String>,

    #[serde(default)]
    include_dirs: Vec<String>,
    #[serde(default)]
    lib_dirs: Vec<String>,
    objdir: Option<String>,
    targetdir: Option<String>,
    targetname: Option<String>,

    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    file_deps: Vec<String>,

    #[serde(default)]
    defines: Vec<String>,
    #[serde(default = "default_optimize")]
    optimize: OptimizationLevel,
    #[serde(default = "default_debug_symbols")]
    debug_symbols: bool,
    #[serde(default = "default_warnings")]
    warnings: WarningLevel,

    pch: Option<PrecompiledHeader>,
    #[serde(default)]
    hooks: BuildHooks,
    #[serde(default)]
    platform_metadata: PlatformMetadata,
    use_toolchain: Option<String>,

    #[serde(default)]
    filters: Vec<RawFilterBlock>,
}

fn default_location() -> PathBuf {
    PathBuf::from(".")
}

fn default_optimize() -> OptimizationLevel {
    OptimizationLevel::Off
}

fn default_warnings() -> WarningLevel {
    WarningLevel::Default
}

fn default_debug_symbols() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct RawFilterBlock {
    predicate: String,
    #[serde(default)]
    delta: RawProjectDelta,
}

#[derive(Debug, Default, Deserialize)]
struct RawProjectDelta {
    #[serde(default)]
    files: Vec<String>,
    #[serde(default)]
    exclude_files: Vec<String>,
    #[serde(default)]
    exclude_main_files: Vec<String>,
    #[serde(default)]
    include_dirs: Vec<String>,
    #[serde(default)]
    lib_dirs: Vec<String>,
    #[serde(default)]
    links: Vec<String>,
    #[serde(default)]
    defines: Vec<String>,
    #[serde(default)]
    depends_on: Vec<String>,
    #[serde(default)]
    file_deps: Vec<String>,
    optimize: Option<OptimizationLevel>,
    debug_symbols: Option<bool>,
    warnings: Option<WarningLevel>,
    toolchain: Option<String>,
    objdir: Option<String>,
    targetdir: Option<String>,
    targetname: Option<String>,
}

impl RawProjectDelta {
    fn into_delta(self) -> ProjectDelta {
        ProjectDelta {
            files: self.files,
            exclude_files: self.exclude_files,
            exclude_main_files: self.exclude_main_files,
            include_dirs: self.include_dirs,
            lib_dirs: self.lib_dirs,
            links: self.links,
            defines: self.defines,
            depends_on: self.depends_on,
            file_deps: self.file_deps,
            optimize: self.optimize,
            debug_symbols: self.debug_symbols,
            warnings: self.warnings,
            toolchain: self.toolchain,
            objdir: self.objdir,
            targetdir: self.targetdir,
            targetname: self.targetname,
        }
    }
}

fn convert_filter_block(raw: RawFilterBlock) -> Result<FilterBlock> {
    let predicate = parse_filter_expr(&raw.predicate)
        .with_context(|| format!("invalid filter predicate `{}`", raw.predicate))?;
    Ok(FilterBlock::new(predicate, raw.delta.into_delta()))
}

fn convert_project(raw: RawProject) -> Result<Project> {
    let mut project = Project::new(raw.name, raw.kind, raw.language, Dialect::new(raw.dialect))
        .with_location(raw.location);

    project.files = raw.files;
    project.exclude_files = raw.exclude_files;
    project.exclude_main_files = raw.exclude_main_files;
    project.include_dirs = raw.include_dirs;
    project.lib_dirs = raw.lib_dirs;
    if let Some(objdir) = raw.objdir {
        project.objdir = objdir;
    }
    if let Some(targetdir) = raw.targetdir {
        project.targetdir = targetdir;
    }
    project.targetname = raw.targetname;
    project.links = raw.links;
    project.depends_on = raw.depends_on;
    project.file_deps = raw.file_deps;
    project.defines = raw.defines;
    project.optimize = raw.optimize;
    project.debug_symbols = raw.debug_symbols;
    project.warnings = raw.warnings;
    project.pch = raw.pch;
    project.hooks = raw.hooks;
    project.platform_metadata = raw.platform_metadata;
    project.use_toolchain = raw.use_toolchain;

    for filter in raw.filters {
        project.filters.push(convert_filter_block(filter)?);
    }

    Ok(project)
}

/// Reads and parses a manifest file from disk into a typed `Workspace`.
pub fn load(path: &Path) -> Result<Workspace> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest `{}`", path.display()))?;
    parse(&content, path)
}

/// Parses manifest TOML content already read from `path` (used for error messages and
/// to anchor the workspace root at the manifest's containing directory).
pub fn parse(content: &str, path: &Path) -> Result<Workspace> {
    let raw: RawManifest =
        toml::from_str(content).with_context(|| format!("failed to parse manifest `{}`", path.display()))?;

    let root = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let mut workspace = Workspace::new(raw.workspace.name, root);

    if !raw.workspace.configurations.is_empty() {
        workspace = workspace.with_configurations(raw.workspace.configurations);
    }
    workspace.platforms = raw.workspace.platforms;
    if let Some(startup) = raw.workspace.startup_project {
        workspace = workspace.with_startup_project(startup);
    }

    workspace.sdk_paths = SdkPaths {
        android_sdk: raw.workspace.sdk.android_sdk,
        android_ndk: raw.workspace.sdk.android_ndk,
        java_home: raw.workspace.sdk.java_home,
        ios_sdk: raw.workspace.sdk.ios_sdk,
        emscripten_root: raw.workspace.sdk.emscripten_root,
    };

    workspace.options = raw
        .workspace
        .options
        .into_iter()
        .map(|o| UserOption { name: o.name, default: o.default, description: o.description })
        .collect();

    for (name, mut toolchain) in raw.toolchains {
        toolchain.name = name.clone();
        workspace.toolchains.insert(name, toolchain);
    }

    for raw_project in raw.project {
        workspace = workspace.with_project(convert_project(raw_project).with_context(|| "invalid project entry")?);
    }

    workspace.validate().context("workspace failed validation")?;

    Ok(workspace)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [workspace]
        name = "Demo"
        configurations = ["Debug", "Release"]

        [[project]]
        name = "App"
        kind = "console-app"
        language = "cpp"
        dialect = "C++20"
        files = ["src/main.cpp"]
    "#;

    #[test]
    fn parses_minimal_workspace() {
        let ws = parse(MINIMAL, Path::new("forge.toml")).unwrap();
        assert_eq!(ws.name, "Demo");
        assert_eq!(ws.configurations, vec!["Debug", "Release"]);
        assert_eq!(ws.projects.len(), 1);
        assert_eq!(ws.projects[0].language, Language::Cxx);
        assert!(ws.projects[0].dialect.supports_modules());
    }

    #[test]
    fn project_defaults_match_builder_defaults() {
        let ws = parse(MINIMAL, Path::new("forge.toml")).unwrap();
        let app = &ws.projects[0];
        assert_eq!(app.optimize, OptimizationLevel::Off);
        assert_eq!(app.warnings, WarningLevel::Default);
        assert!(app.debug_symbols);
    }

    #[test]
    fn filter_block_predicate_is_parsed_and_evaluable() {
        let toml = r#"
            [workspace]
            name = "Demo"

            [[project]]
            name = "App"
            kind = "console-app"
            language = "cpp"
            dialect = "C++17"
            files = ["src/main.cpp"]

            [[project.filters]]
            predicate = "system:windows"
            delta = { defines = ["FORGE_WINDOWS"] }
        "#;
        let ws = parse(toml, Path::new("forge.toml")).unwrap();
        let app = &ws.projects[0];
        assert_eq!(app.filters.len(), 1);
        assert_eq!(app.filters[0].delta.defines, vec!["FORGE_WINDOWS".to_string()]);
    }

    #[test]
    fn invalid_filter_predicate_is_rejected() {
        let toml = r#"
            [workspace]
            name = "Demo"

            [[project]]
            name = "App"
            kind = "console-app"
            language = "cpp"
            dialect = "C++17"
            files = ["src/main.cpp"]

            [[project.filters]]
            predicate = "nonsense:value:value"
        "#;
        assert!(parse(toml, Path::new("forge.toml")).is_err());
    }

    #[test]
    fn undefined_dependency_fails_validation() {
        let toml = r#"
            [workspace]
            name = "Demo"

            [[project]]
            name = "App"
            kind = "console-app"
            language = "cpp"
            dialect = "C++17"
            depends_on = ["Missing"]
        "#;
        assert!(parse(toml, Path::new("forge.toml")).is_err());
    }
}
