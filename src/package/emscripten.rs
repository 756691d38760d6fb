//! WebAssembly packaging (§6 "WebAssembly packaging output"): the link step already
//! produces `<target>.js` and `<target>.wasm` directly via emcc; this packager copies
//! them (and an optional `.html` shell) into the staging directory and writes the two
//! launcher scripts, since the compiled page cannot load its `.wasm` from `file://`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::core::project::EmscriptenMetadata;
use crate::resolver::EffectiveProject;

const POSIX_LAUNCHER: &str = "#!/bin/sh\nexec python3 -m http.server \"${1:-PORT}\" --directory \"$(dirname \"$0\")\"\n";
const WINDOWS_LAUNCHER: &str = "@echo off\r\npython -m http.server PORT --directory \"%~dp0\"\r\n";

fn default_shell(target: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>{target}</title></head>
<body>
<canvas id="canvas" oncontextmenu="event.preventDefault()"></canvas>
<script src="{target}.js"></script>
</body>
</html>
"#
    )
}

/// Stages the `.wasm`/`.js`/`.html` triple and the launcher scripts next to the
/// project's link output. `linked_output` is the `.js` file the link step produced.
pub fn package(project: &EffectiveProject, meta: &EmscriptenMetadata, linked_output: &Path) -> Result<()> {
    let target = &project.targetname;
    let stage = &project.targetdir;
    fs::create_dir_all(stage).context("creating Emscripten staging directory")?;

    let wasm_sibling = linked_output.with_extension("wasm");
    if linked_output != stage.join(format!("{target}.js")) {
        fs::copy(linked_output, stage.join(format!("{target}.js")))
            .with_context(|| format!("copying {} into staging directory", linked_output.display()))?;
        if wasm_sibling.exists() {
            fs::copy(&wasm_sibling, stage.join(format!("{target}.wasm")))
                .with_context(|| format!("copying {} into staging directory", wasm_sibling.display()))?;
        }
    }

    let html = match &meta.shell_file {
        Some(shell) => fs::read_to_string(shell)
            .with_context(|| format!("reading custom shell file {}", shell.display()))?,
        None => default_shell(target),
    };
    fs::write(stage.join(format!("{target}.html")), html).context("writing HTML shell")?;

    for preload in &meta.preload_files {
        if preload.exists() {
            let dest = stage.join(preload.file_name().unwrap_or_default());
            fs::copy(preload, dest).with_context(|| format!("copying preload file {}", preload.display()))?;
        }
    }

    let port = meta.serve_port.unwrap_or(8080);
    fs::write(stage.join("serve.sh"), POSIX_LAUNCHER.replace("PORT", &port.to_string()))
        .context("writing serve.sh")?;
    fs::write(stage.join("serve.bat"), WINDOWS_LAUNCHER.replace("PORT", &port.to_string()))
        .context("writing serve.bat")?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let path = stage.join("serve.sh");
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms)?;
    }

    tracing::info!(target = %target, dir = %stage.display(), "packaged WebAssembly bundle");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shell_references_js_and_target_name() {
        let html = default_shell("Game");
        assert!(html.contains("Game.js"));
        assert!(html.contains("<canvas"));
    }

    #[test]
    fn launcher_scripts_substitute_port() {
        assert!(POSIX_LAUNCHER.replace("PORT", "9000").contains("9000"));
        assert!(WINDOWS_LAUNCHER.replace("PORT", "9000").contains("9000"));
    }
}
