//! The Resolver (§4.2): expands globs and variables, evaluates filters, computes
//! per-project effective settings, and orders projects by dependency.

pub mod error;
pub mod expand;
pub mod glob;
pub mod graph;

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::filter::parse_filter_expr;
use crate::core::project::{BuildHooks, Dialect, Language, OptimizationLevel, PlatformMetadata, PrecompiledHeader, ProjectKind, WarningLevel};
use crate::core::{BuildContext, Project, Toolchain, Workspace};
use error::ResolveError;
use expand::TokenContext;

/// The fully resolved, frozen-for-this-build settings of one project under one
/// `(configuration, platform, options)` tuple. Everything a Scheduler needs to turn
/// into compile units without touching the Model again.
#[derive(Debug, Clone)]
pub struct EffectiveProject {
    pub name: String,
    pub configuration: String,
    pub platform: String,
    pub kind: ProjectKind,
    pub language: Language,
    pub dialect: Dialect,
    pub location: PathBuf,

    pub sources: Vec<PathBuf>,
    pub module_interfaces: Vec<PathBuf>,

    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
    pub links: Vec<String>,
    pub depends_on: Vec<String>,

    pub defines: Vec<String>,
    pub optimize: OptimizationLevel,
    pub debug_symbols: bool,
    pub warnings: WarningLevel,

    pub objdir: PathBuf,
    pub targetdir: PathBuf,
    pub targetname: String,

    pub pch: Option<PrecompiledHeader>,
    pub hooks: BuildHooks,
    pub platform_metadata: PlatformMetadata,

    pub toolchain: Arc<Toolchain>,
}

/// Per-`(project, context)` memoization, per §4.1's "evaluates filters once ... and
/// memoizes". Caching the whole resolved project rather than only filter outcomes is
/// simpler and externally equivalent: both give a pure function of `(project, context)`.
pub struct Resolver {
    cache: RefCell<HashMap<(String, BuildContext), Arc<EffectiveProject>>>,
}

impl Default for Resolver {
    fn default() -> Self {
        Resolver { cache: RefCell::new(HashMap::new()) }
    }
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(
        &self,
        workspace: &Workspace,
        project_name: &str,
        ctx: &BuildContext,
    ) -> Result<Arc<EffectiveProject>, ResolveError> {
        let key = (project_name.to_string(), ctx.clone());
        if let Some(cached) = self.cache.borrow().get(&key) {
            return Ok(Arc::clone(cached));
        }
        let project = workspace
            .project(project_name)
            .ok_or_else(|| ResolveError::UndefinedLink {
                project: "<root>".to_string(),
                target: project_name.to_string(),
            })?;
        let resolved = Arc::new(resolve_project(workspace, project, ctx)?);
        self.cache.borrow_mut().insert(key, Arc::clone(&resolved));
        Ok(resolved)
    }

    /// Resolves every project in the workspace plus the build order, for a full build.
    pub fn resolve_workspace(
        &self,
        workspace: &Workspace,
        ctx: &BuildContext,
    ) -> Result<(Vec<String>, Vec<Arc<EffectiveProject>>), ResolveError> {
        let order = graph::build_order(workspace)?;
        let mut resolved = Vec::with_capacity(order.len());
        for name in &order {
            resolved.push(self.resolve(workspace, name, ctx)?);
        }
        Ok((order, resolved))
    }
}

/// Applies each matching filter block's delta onto the base project fields, in
/// declaration order (§4.2 step 2, §9 Open Question: declaration order, not
/// predicate-specificity order).
struct MutableProjectState {
    files: Vec<String>,
    exclude_files: Vec<String>,
    include_dirs: Vec<String>,
    lib_dirs: Vec<String>,
    links: Vec<String>,
    defines: Vec<String>,
    depends_on: Vec<String>,
    optimize: OptimizationLevel,
    debug_symbols: bool,
    warnings: WarningLevel,
    toolchain: Option<String>,
    objdir: String,
    targetdir: String,
    targetname: Option<String>,
}

fn apply_filters(
    project: &Project,
    ctx: &BuildContext,
) -> Result<MutableProjectState, ResolveError> {
    let mut state = MutableProjectState {
        files: project.files.clone(),
        exclude_files: project.exclude_files.clone(),
        include_dirs: project.include_dirs.clone(),
        lib_dirs: project.lib_dirs.clone(),
        links: project.links.clone(),
        defines: project.defines.clone(),
        depends_on: project.depends_on.clone(),
        optimize: project.optimize,
        debug_symbols: project.debug_symbols,
        warnings: project.warnings,
        toolchain: project.use_toolchain.clone(),
        objdir: project.objdir.clone(),
        targetdir: project.targetdir.clone(),
        targetname: project.targetname.clone(),
    };

    for block in &project.filters {
        if !block.predicate.evaluate(ctx, ctx.verbose, ctx.no_cache) {
            continue;
        }
        let delta = &block.delta;
        state.files.extend(delta.files.iter().cloned());
        state.exclude_files.extend(delta.exclude_files.iter().cloned());
        state.include_dirs.extend(delta.include_dirs.iter().cloned());
        state.lib_dirs.extend(delta.lib_dirs.iter().cloned());
        state.links.extend(delta.links.iter().cloned());
        state.defines.extend(delta.defines.iter().cloned());
        state.depends_on.extend(delta.depends_on.iter().cloned());
        if let Some(v) = delta.optimize {
            state.optimize = v;
        }
        if let Some(v) = delta.debug_symbols {
            state.debug_symbols = v;
        }
        if let Some(v) = delta.warnings {
            state.warnings = v;
        }
        if let Some(v) = &delta.toolchain {
            state.toolchain = Some(v.clone());
        }
        if let Some(v) = &delta.objdir {
            state.objdir = v.clone();
        }
        if let Some(v) = &delta.targetdir {
            state.targetdir = v.clone();
        }
        if let Some(v) = &delta.targetname {
            state.targetname = Some(v.clone());
        }
    }

    let _ = parse_filter_expr; // re-exported for front-end callers building FilterBlocks.
    Ok(state)
}

fn select_toolchain<'a>(
    workspace: &'a Workspace,
    project: &Project,
    explicit: &Option<String>,
    ctx: &BuildContext,
) -> Result<&'a Toolchain, ResolveError> {
    if let Some(name) = explicit {
        return workspace.toolchains.get(name).ok_or_else(|| ResolveError::UnknownToolchain {
            project: project.name.clone(),
            name: name.clone(),
        });
    }
    // First toolchain whose (os, arch) matches the context, in registration order.
    // HashMap iteration order isn't declaration order, but ties here are a workspace
    // authoring bug (two toolchains for the same platform) rather than a determinism
    // requirement the spec makes for toolchain choice, unlike project build order.
    workspace
        .toolchains
        .values()
        .find(|tc| tc.matches(ctx.platform.os, ctx.platform.arch))
        .ok_or_else(|| ResolveError::NoMatchingToolchain {
            project: project.name.clone(),
            platform: ctx.platform.to_string(),
        })
}

fn language_compatible(toolchain: &Toolchain, language: Language) -> bool {
    use crate::core::ToolchainFamily::*;
    match (toolchain.family, language) {
        (Msvc, Language::ObjC) | (Msvc, Language::ObjCxx) => false,
        (Emscripten, Language::ObjC) | (Emscripten, Language::ObjCxx) => false,
        _ => true,
    }
}

/// Resolves one project under one build context: the 5-step algorithm of §4.2.
pub fn resolve_project(
    workspace: &Workspace,
    project: &Project,
    ctx: &BuildContext,
) -> Result<EffectiveProject, ResolveError> {
    // Steps 1-2: start from base fields, fold in matching filter deltas.
    let state = apply_filters(project, ctx)?;

    // Step 4 (resolved early so token expansion can use toolchain-derived fields if
    // ever needed, and so an unresolvable toolchain fails fast before globbing costs
    // are paid).
    let toolchain = select_toolchain(workspace, project, &state.toolchain, ctx)?;
    if !language_compatible(toolchain, project.language) {
        return Err(ResolveError::IncompatibleToolchain {
            project: project.name.clone(),
            family: toolchain.family.as_str().to_string(),
            language: project.language.as_str().to_string(),
        });
    }

    // Step 3: expand variables, then globs.
    let mut warnings = Vec::new();
    let mut token_ctx = TokenContext::default();
    token_ctx.workspace.insert("location".to_string(), workspace.root.display().to_string());
    token_ctx.config.insert("buildcfg".to_string(), ctx.configuration.clone());
    token_ctx.config.insert("system".to_string(), ctx.platform.os.as_str().to_string());
    token_ctx.config.insert("arch".to_string(), ctx.platform.arch.as_str().to_string());
    token_ctx.project.insert("name".to_string(), project.name.clone());
    token_ctx.project.insert("location".to_string(), project.location.display().to_string());

    for other in &workspace.projects {
        let mut fields = HashMap::new();
        fields.insert("location".to_string(), other.location.display().to_string());
        fields.insert("targetdir".to_string(), other.targetdir.clone());
        token_ctx.other_projects.insert(other.name.clone(), fields);
    }

    let objdir_expanded = expand::expand(&state.objdir, &token_ctx, &mut warnings);
    let targetdir_expanded = expand::expand(&state.targetdir, &token_ctx, &mut warnings);

    for w in &warnings {
        tracing::warn!(project = %project.name, "{w}");
    }

    let location = project.location.clone();
    let sources = glob::expand_sources(&location, &state.files, &state.exclude_files)
        .map_err(|_| ResolveError::EmptySources { project: project.name.clone() })?;
    if sources.is_empty() && !state.files.is_empty() {
        return Err(ResolveError::EmptySources { project: project.name.clone() });
    }

    let module_interfaces: Vec<PathBuf> =
        sources.iter().filter(|p| Project::is_module_interface_path(p)).cloned().collect();

    // Step 5: invariant validation. Missing include dirs are warnings, not fatal.
    for dir in &state.include_dirs {
        let path = location.join(dir);
        if !path.exists() {
            tracing::warn!(project = %project.name, include_dir = %dir, "include directory does not exist");
        }
    }
    for dep in &state.depends_on {
        if workspace.project(dep).is_none() {
            return Err(ResolveError::UndefinedLink { project: project.name.clone(), target: dep.clone() });
        }
    }

    let targetname = state.targetname.clone().unwrap_or_else(|| project.name.clone());

    let hooks = BuildHooks {
        prebuild: expand_hook_list(&project.hooks.prebuild, &token_ctx, &mut warnings),
        prelink: expand_hook_list(&project.hooks.prelink, &token_ctx, &mut warnings),
        postlink: expand_hook_list(&project.hooks.postlink, &token_ctx, &mut warnings),
        postbuild: expand_hook_list(&project.hooks.postbuild, &token_ctx, &mut warnings),
    };

    Ok(EffectiveProject {
        name: project.name.clone(),
        configuration: ctx.configuration.clone(),
        platform: ctx.platform.to_string(),
        kind: project.kind,
        language: project.language,
        dialect: project.dialect.clone(),
        location,
        sources,
        module_interfaces,
        include_dirs: state.include_dirs,
        lib_dirs: state.lib_dirs,
        links: state.links,
        depends_on: state.depends_on,
        defines: state.defines,
        optimize: state.optimize,
        debug_symbols: state.debug_symbols,
        warnings: state.warnings,
        objdir: PathBuf::from(objdir_expanded),
        targetdir: PathBuf::from(targetdir_expanded),
        targetname,
        pch: project.pch.clone(),
        hooks,
        platform_metadata: project.platform_metadata.clone(),
        toolchain: Arc::new(toolchain.clone()),
    })
}

fn expand_hook_list(hooks: &[String], ctx: &TokenContext, warnings: &mut Vec<String>) -> Vec<String> {
    hooks.iter().map(|h| expand::expand(h, ctx, warnings)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::{Dialect, Language, ProjectKind};
    use crate::core::toolchain::ToolchainFamily;
    use crate::core::{PlatformTriple, TargetArch, TargetOs};
    use std::fs;
    use tempfile::TempDir;

    fn gcc_toolchain() -> Toolchain {
        Toolchain {
            name: "host-gcc".to_string(),
            family: ToolchainFamily::Gcc,
            os: TargetOs::Linux,
            arch: TargetArch::X86_64,
            target_triple: None,
            sysroot: None,
            cc: "gcc".into(),
            cxx: "g++".into(),
            linker: None,
            archiver: "ar".into(),
            cflags: Vec::new(),
            cxxflags: Vec::new(),
            ldflags: Vec::new(),
            asflags: Vec::new(),
            arflags: Vec::new(),
            defines: Vec::new(),
            frameworks: Vec::new(),
            framework_dirs: Vec::new(),
        }
    }

    #[test]
    fn s6_platform_filter_scenario() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("X")).unwrap();
        fs::write(tmp.path().join("X/common.cpp"), "").unwrap();
        fs::write(tmp.path().join("X/win.cpp"), "").unwrap();
        fs::write(tmp.path().join("X/linux.cpp"), "").unwrap();

        let win_filter = crate::core::FilterBlock::new(
            parse_filter_expr("system:Windows").unwrap(),
            crate::core::ProjectDelta { files: vec!["win.cpp".to_string()], ..Default::default() },
        );
        let linux_filter = crate::core::FilterBlock::new(
            parse_filter_expr("system:Linux").unwrap(),
            crate::core::ProjectDelta { files: vec!["linux.cpp".to_string()], ..Default::default() },
        );

        let project = Project::new("X", ProjectKind::ConsoleApp, Language::Cxx, Dialect::new("C++17"))
            .with_location(tmp.path().join("X"))
            .with_files(["common.cpp"])
            .with_filter(win_filter)
            .with_filter(linux_filter);

        let ws = Workspace::new("W", tmp.path())
            .with_project(project)
            .with_toolchain(gcc_toolchain());

        let linux_ctx = BuildContext::new("Debug", PlatformTriple::new(TargetOs::Linux, TargetArch::X86_64));
        let resolved = resolve_project(&ws, ws.project("X").unwrap(), &linux_ctx).unwrap();
        let names: Vec<_> =
            resolved.sources.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["common.cpp", "linux.cpp"]);
    }

    #[test]
    fn missing_toolchain_for_platform_fails() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("App")).unwrap();
        fs::write(tmp.path().join("App/main.cpp"), "").unwrap();
        let project = Project::new("App", ProjectKind::ConsoleApp, Language::Cxx, Dialect::new("C++17"))
            .with_location(tmp.path().join("App"))
            .with_files(["main.cpp"]);
        let ws = Workspace::new("W", tmp.path()).with_project(project);
        let ctx = BuildContext::new("Debug", PlatformTriple::new(TargetOs::Windows, TargetArch::X86_64));
        let err = resolve_project(&ws, ws.project("App").unwrap(), &ctx).unwrap_err();
        assert!(matches!(err, ResolveError::NoMatchingToolchain { .. }));
    }
}
