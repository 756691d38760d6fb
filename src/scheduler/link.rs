//! The link pass (§4.5 step 5): one process per project, sequential relative to its
//! own compile pass and to downstream projects that depend on it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::core::ProjectKind;
use crate::resolver::EffectiveProject;
use crate::toolchain::{self, LinkRequest};
use crate::util::process::ProcessBuilder;

/// Where a project's linkable output landed, keyed by project name — used to resolve
/// `dependson`/`links` targets into concrete archive/library paths for later links.
pub type OutputIndex = HashMap<String, PathBuf>;

fn target_file_name(project: &EffectiveProject) -> String {
    let translator = toolchain::translator_for(project.toolchain.family);
    let (prefix, ext) = match project.kind {
        ProjectKind::StaticLib => (translator.static_lib_prefix(), translator.static_lib_extension()),
        ProjectKind::SharedLib => (translator.shared_lib_prefix(), translator.shared_lib_extension()),
        _ => ("", translator.exe_extension()),
    };
    if ext.is_empty() {
        format!("{prefix}{}", project.targetname)
    } else {
        format!("{prefix}{}.{ext}", project.targetname)
    }
}

pub fn target_path(project: &EffectiveProject) -> PathBuf {
    project.targetdir.join(target_file_name(project))
}

/// Links `project` from its already-compiled `objects`, resolving `dependson`
/// archive paths from `outputs`. Stages into a temp directory, then renames the
/// whole staged artifact set into place atomically.
pub fn link_project(project: &EffectiveProject, objects: &[PathBuf], outputs: &OutputIndex) -> Result<PathBuf> {
    if project.kind == ProjectKind::StaticLib {
        return archive_project(project, objects);
    }

    let mut dependency_archives = Vec::new();
    for dep in &project.depends_on {
        if let Some(path) = outputs.get(dep) {
            dependency_archives.push(path.clone());
        }
    }

    let output = target_path(project);
    std::fs::create_dir_all(&project.targetdir)
        .with_context(|| format!("failed to create target directory {}", project.targetdir.display()))?;

    let link_names: Vec<String> = project.links.clone();
    let req = LinkRequest {
        kind: project.kind,
        objects,
        dependency_archives: &dependency_archives,
        link_names: &link_names,
        lib_dirs: &project.lib_dirs,
        output: &output,
        debug_symbols: project.debug_symbols,
        frameworks: &project.toolchain.frameworks,
        framework_dirs: &project.toolchain.framework_dirs,
    };
    let cmd = toolchain::link_command(&project.toolchain, &req)?;

    // Stage in a sibling temp directory, not a single temp file: some linkers
    // (Emscripten's emcc) emit a companion artifact set (`.wasm`, and under debug
    // symbols a `.wasm.map`) alongside the requested output, named by deriving from
    // the output's own file name. Staging in a directory lets the whole set land
    // with its real final names before the rename into place (§5 atomic writes).
    let stage = tempfile::Builder::new().prefix(".forge-link-").tempdir_in(&project.targetdir).with_context(
        || format!("failed to create link staging directory under {}", project.targetdir.display()),
    )?;
    let staged_output = stage.path().join(target_file_name(project));

    let mut argv: Vec<String> = cmd.args.clone();
    replace_output_in_argv(&mut argv, &output, &staged_output);

    let result = ProcessBuilder::new(&cmd.program).args(&argv).exec()?;
    if !result.status.success() {
        bail!(
            "link of `{}` failed with code {:?}\n{}",
            project.name,
            result.status.code(),
            String::from_utf8_lossy(&result.stderr)
        );
    }

    for entry in std::fs::read_dir(stage.path())
        .with_context(|| format!("failed to read link staging directory {}", stage.path().display()))?
    {
        let entry = entry?;
        let dest = project.targetdir.join(entry.file_name());
        std::fs::rename(entry.path(), &dest)
            .with_context(|| format!("failed to rename staged link artifact into {}", dest.display()))?;
    }

    Ok(output)
}

fn archive_project(project: &EffectiveProject, objects: &[PathBuf]) -> Result<PathBuf> {
    let output = target_path(project);
    std::fs::create_dir_all(&project.targetdir)?;
    let req = crate::toolchain::ArchiveRequest { objects, output: &output };
    let cmd = toolchain::archive_command(&project.toolchain, &req)?;

    let tmp_output = output.with_extension("tmp");
    let mut argv = cmd.args.clone();
    replace_output_in_argv(&mut argv, &output, &tmp_output);

    let result = ProcessBuilder::new(&cmd.program).args(&argv).exec()?;
    if !result.status.success() {
        bail!(
            "archive of `{}` failed with code {:?}\n{}",
            project.name,
            result.status.code(),
            String::from_utf8_lossy(&result.stderr)
        );
    }
    std::fs::rename(&tmp_output, &output)?;
    Ok(output)
}

/// Swaps the final output path for a temp path anywhere it appears verbatim in the
/// assembled argv, so the same `CommandSpec` assembly logic can target a temp file
/// without the Toolchain Abstraction knowing about atomic-write staging.
fn replace_output_in_argv(argv: &mut [String], output: &Path, tmp: &Path) {
    let output_str = output.display().to_string();
    let tmp_str = tmp.display().to_string();
    for arg in argv.iter_mut() {
        if *arg == output_str {
            *arg = tmp_str.clone();
        } else if let Some(rest) = arg.strip_prefix("/OUT:") {
            if rest == output_str {
                *arg = format!("/OUT:{tmp_str}");
            }
        }
    }
}
