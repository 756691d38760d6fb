//! The compile pass (§4.5 step 3): a bounded worker pool over non-module
//! translation units. Pool size defaults to `max(1, cpu_count - 1)`; `rayon`'s global
//! pool is configured once by the caller via `rayon::ThreadPoolBuilder`.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::cache::{self, fingerprint};
use crate::resolver::EffectiveProject;
use crate::toolchain::{self, CompileRequest};
use crate::util::process::ProcessBuilder;

/// One compile unit, derived from a single source in `sources` or `module_interfaces`.
#[derive(Debug, Clone)]
pub struct CompileUnit {
    pub source: PathBuf,
    pub object: PathBuf,
    pub depfile: PathBuf,
    pub is_module_interface: bool,
}

#[derive(Debug)]
pub enum CompileOutcome {
    Cached,
    Compiled,
    Failed { stderr: String },
    /// The Scheduler's own cancellation token fired (§4.5); distinct from `Skipped`,
    /// which means a sibling unit in the same batch failed first.
    Cancelled,
    /// Not dispatched because another unit in this batch already failed. This must
    /// still fail the project (§4.5 failure model), unlike true cancellation.
    Skipped,
}

/// Derives the object path for `source`, preserving its relative directory structure
/// under the project's `objdir` (§3 "object-file directory template").
pub fn plan_units(project: &EffectiveProject) -> Vec<CompileUnit> {
    let translator = toolchain::translator_for(project.toolchain.family);
    let module_set: std::collections::HashSet<&PathBuf> = project.module_interfaces.iter().collect();

    project
        .sources
        .iter()
        .map(|source| {
            let relative = source.strip_prefix(&project.location).unwrap_or(source);
            let object = project.objdir.join(relative).with_extension(translator.object_extension());
            let depfile = object.with_extension("d");
            CompileUnit {
                source: source.clone(),
                object,
                depfile,
                is_module_interface: module_set.contains(source),
            }
        })
        .collect()
}

fn compile_one(
    project: &EffectiveProject,
    unit: &CompileUnit,
    no_cache: bool,
    cancel_token: &AtomicBool,
    sibling_failed: &AtomicBool,
) -> CompileOutcome {
    if cancel_token.load(Ordering::SeqCst) {
        return CompileOutcome::Cancelled;
    }
    if sibling_failed.load(Ordering::SeqCst) {
        return CompileOutcome::Skipped;
    }

    let translator = toolchain::translator_for(project.toolchain.family);
    let compiler_path =
        if project.language == crate::core::Language::Cxx { &project.toolchain.cxx } else { &project.toolchain.cc };
    let version = toolchain::version::probe_version(&project.toolchain.name, compiler_path, translator)
        .unwrap_or_default();

    let pch_object = project.pch.as_ref().map(|pch| {
        project
            .objdir
            .join(pch.header.file_name().unwrap_or_default())
            .with_extension(translator.object_extension())
    });

    let req = CompileRequest {
        language: project.language,
        dialect: &project.dialect,
        source: &unit.source,
        object: &unit.object,
        depfile: &unit.depfile,
        include_dirs: &project.include_dirs,
        defines: &project.defines,
        optimize: project.optimize,
        debug_symbols: project.debug_symbols,
        warnings: project.warnings,
        is_module_interface: unit.is_module_interface,
        imported_module_interfaces: &[],
        pch_object: pch_object.as_ref(),
    };

    let mut cmd = match toolchain::compile_command(&project.toolchain, &req) {
        Ok(cmd) => cmd,
        Err(e) => return CompileOutcome::Failed { stderr: e.to_string() },
    };

    let signature = fingerprint::signature_for_request(
        &compiler_path.display().to_string(),
        &version,
        &cmd.args,
        &req,
        &project.configuration,
        &project.platform,
    );

    if cache::check(&unit.source, &unit.object, &signature, no_cache) == cache::CacheStatus::Hit {
        return CompileOutcome::Cached;
    }

    if cancel_token.load(Ordering::SeqCst) {
        return CompileOutcome::Cancelled;
    }
    if sibling_failed.load(Ordering::SeqCst) {
        return CompileOutcome::Skipped;
    }

    if let Some(parent) = unit.object.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return CompileOutcome::Failed { stderr: e.to_string() };
        }
    }

    // Compile to a sibling temp path, then rename into place: temp-file + rename is
    // the only write pattern allowed for object files (§5, §8 P6).
    let tmp_object = tmp_object_path(&unit.object);
    replace_object_in_argv(&mut cmd.args, &unit.object, &tmp_object);

    let output = match ProcessBuilder::new(&cmd.program).args(&cmd.args).exec() {
        Ok(output) => output,
        Err(e) => return CompileOutcome::Failed { stderr: e.to_string() },
    };

    if !output.status.success() {
        let _ = std::fs::remove_file(&tmp_object);
        return CompileOutcome::Failed { stderr: String::from_utf8_lossy(&output.stderr).into_owned() };
    }

    if let Err(e) = std::fs::rename(&tmp_object, &unit.object) {
        return CompileOutcome::Failed { stderr: format!("failed to rename compiled object into place: {e}") };
    }

    let depfile_contents = std::fs::read_to_string(&unit.depfile).unwrap_or_default();
    if let Err(e) = cache::record(&unit.source, &unit.object, &depfile_contents, &signature) {
        tracing::warn!(object = %unit.object.display(), "failed to record cache sidecar: {e}");
    }

    CompileOutcome::Compiled
}

/// `<object>.tmp`, never `object.with_extension("tmp")`: that would collide with
/// other sidecars derived from `object` the same way (e.g. the `.d` depfile).
fn tmp_object_path(object: &Path) -> PathBuf {
    let mut file_name = object.file_name().unwrap_or_default().to_os_string();
    file_name.push(".tmp");
    object.with_file_name(file_name)
}

/// Swaps the final object path for its staged temp path anywhere it appears in the
/// assembled argv, matching both `-o <path>` (GCC/Clang) and `/Fo<path>` (MSVC).
fn replace_object_in_argv(argv: &mut [String], object: &Path, tmp: &Path) {
    let object_str = object.display().to_string();
    let tmp_str = tmp.display().to_string();
    for arg in argv.iter_mut() {
        if *arg == object_str {
            *arg = tmp_str.clone();
        } else if let Some(rest) = arg.strip_prefix("/Fo") {
            if rest == object_str {
                *arg = format!("/Fo{tmp_str}");
            }
        }
    }
}

/// Runs every non-module unit through the worker pool, returning outcomes in
/// **source declaration order** regardless of completion order (§5 ordering
/// guarantee (i)). Stops dispatching new units on the first failure within this
/// batch (those units come back `Skipped`, not `Cancelled`); `cancel_token` is the
/// Scheduler's own cancellation flag and is the only source of `Cancelled`.
pub fn compile_all(
    project: &EffectiveProject,
    units: &[CompileUnit],
    no_cache: bool,
    cancel_token: &AtomicBool,
) -> Vec<CompileOutcome> {
    let sibling_failed = AtomicBool::new(false);

    units
        .par_iter()
        .map(|unit| {
            let outcome = compile_one(project, unit, no_cache, cancel_token, &sibling_failed);
            if matches!(outcome, CompileOutcome::Failed { .. }) {
                sibling_failed.store(true, Ordering::SeqCst);
            }
            outcome
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::project::{Dialect, Language, OptimizationLevel, PlatformMetadata, ProjectKind, WarningLevel};
    use crate::core::toolchain::ToolchainFamily;
    use crate::core::{TargetArch, TargetOs, Toolchain};
    use std::fs;
    use tempfile::TempDir;

    fn sample_toolchain() -> Toolchain {
        Toolchain {
            name: "test-gcc".into(),
            family: ToolchainFamily::Gcc,
            os: TargetOs::Linux,
            arch: TargetArch::X86_64,
            target_triple: None,
            sysroot: None,
            cc: "echo".into(),
            cxx: "echo".into(),
            linker: None,
            archiver: "echo".into(),
            cflags: vec![],
            cxxflags: vec![],
            ldflags: vec![],
            asflags: vec![],
            arflags: vec![],
            defines: vec![],
            frameworks: vec![],
            framework_dirs: vec![],
        }
    }

    #[test]
    fn plan_units_preserves_relative_directory_structure() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src/sub")).unwrap();
        let source = tmp.path().join("src/sub/a.cpp");
        fs::write(&source, "").unwrap();

        let project = EffectiveProject {
            name: "App".into(),
            configuration: "Debug".into(),
            platform: "linux-x86_64".into(),
            kind: ProjectKind::ConsoleApp,
            language: Language::Cxx,
            dialect: Dialect::new("C++17"),
            location: tmp.path().to_path_buf(),
            sources: vec![source.clone()],
            module_interfaces: vec![],
            include_dirs: vec![],
            lib_dirs: vec![],
            links: vec![],
            depends_on: vec![],
            defines: vec![],
            optimize: OptimizationLevel::Off,
            debug_symbols: true,
            warnings: WarningLevel::Default,
            objdir: tmp.path().join("obj"),
            targetdir: tmp.path().join("bin"),
            targetname: "App".into(),
            pch: None,
            hooks: Default::default(),
            platform_metadata: PlatformMetadata::default(),
            toolchain: Arc::new(sample_toolchain()),
        };

        let units = plan_units(&project);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].object, tmp.path().join("obj/src/sub/a.o"));
    }
}
