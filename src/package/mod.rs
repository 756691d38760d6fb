//! Platform packaging (§4.5 step 6, §6 "Android packaging output" / "WebAssembly
//! packaging output"): post-link steps invoked only when a project's platform
//! metadata names a packager.

pub mod android;
pub mod emscripten;

use std::path::Path;

use anyhow::Result;

use crate::resolver::EffectiveProject;

/// Dispatches to the packager matching `project.platform_metadata`, if any. A
/// project with no Android/Emscripten metadata is a no-op: most projects link and
/// stop there.
pub fn package_if_applicable(project: &EffectiveProject, linked_output: &Path) -> Result<()> {
    if let Some(android) = &project.platform_metadata.android {
        android::package(project, android, linked_output)?;
    }
    if let Some(emscripten) = &project.platform_metadata.emscripten {
        emscripten::package(project, emscripten, linked_output)?;
    }
    Ok(())
}
