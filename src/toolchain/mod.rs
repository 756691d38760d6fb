//! Toolchain Abstraction (§4.3): family-dispatched translation from an abstract
//! compile/link/archive request to concrete argv.

pub mod android_ndk;
pub mod apple_clang;
pub mod command;
pub mod emscripten;
pub mod error;
pub mod gcc_clang;
pub mod modules;
pub mod msvc;
pub mod request;
pub mod version;
pub mod zig;

pub use command::CommandSpec;
pub use error::ToolchainError;
pub use request::{ArchiveRequest, CompileRequest, LinkRequest};

use crate::core::toolchain::ToolchainFamily;
use crate::core::Toolchain;

/// The policy a compiler family implements. Each family's methods are fixed and
/// documented (§4.3) — a translator must emit a diagnostic and skip a flag rather
/// than silently mistranslate when no equivalent exists, rather than fabricate one.
pub trait FlagTranslator: Send + Sync {
    fn compile_command(&self, tc: &Toolchain, req: &CompileRequest) -> Result<CommandSpec, ToolchainError>;
    fn archive_command(&self, tc: &Toolchain, req: &ArchiveRequest) -> Result<CommandSpec, ToolchainError>;
    fn link_command(&self, tc: &Toolchain, req: &LinkRequest) -> Result<CommandSpec, ToolchainError>;

    fn object_extension(&self) -> &'static str {
        "o"
    }
    fn static_lib_extension(&self) -> &'static str;
    fn static_lib_prefix(&self) -> &'static str;
    fn shared_lib_extension(&self) -> &'static str;
    fn shared_lib_prefix(&self) -> &'static str;
    fn exe_extension(&self) -> &'static str;

    /// The flag that asks the compiler to emit a Make-style header-dependency file
    /// (Tier 2 of the cache), or `None` if this family has no equivalent.
    fn depfile_flags(&self, _depfile: &std::path::Path) -> Vec<String> {
        Vec::new()
    }

    /// Command to run the compiler with its version flag, for Tier-3 identity
    /// signature memoization (§4.4, §5 "compiler-version memo").
    fn version_probe_args(&self) -> Vec<String> {
        vec!["--version".to_string()]
    }
}

/// Returns the translator for a compiler family. One static instance per family —
/// translators hold no per-project state.
pub fn translator_for(family: ToolchainFamily) -> &'static dyn FlagTranslator {
    use ToolchainFamily::*;
    match family {
        Gcc | Clang => &gcc_clang::GccClangTranslator,
        AppleClang => &apple_clang::AppleClangTranslator,
        Msvc => &msvc::MsvcTranslator,
        AndroidNdk => &android_ndk::AndroidNdkTranslator,
        Emscripten => &emscripten::EmscriptenTranslator,
        Zig => &zig::ZigTranslator,
    }
}

pub fn compile_command(tc: &Toolchain, req: &CompileRequest) -> Result<CommandSpec, ToolchainError> {
    translator_for(tc.family).compile_command(tc, req)
}

pub fn archive_command(tc: &Toolchain, req: &ArchiveRequest) -> Result<CommandSpec, ToolchainError> {
    translator_for(tc.family).archive_command(tc, req)
}

pub fn link_command(tc: &Toolchain, req: &LinkRequest) -> Result<CommandSpec, ToolchainError> {
    translator_for(tc.family).link_command(tc, req)
}

/// Detects a pre-registered toolchain from the JSON registry (§6 "Toolchain registry").
pub fn load_registry(path: &std::path::Path) -> anyhow::Result<std::collections::HashMap<String, Toolchain>> {
    if !path.exists() {
        return Ok(std::collections::HashMap::new());
    }
    let contents = std::fs::read_to_string(path)?;
    let registry: std::collections::HashMap<String, Toolchain> = serde_json::from_str(&contents)?;
    Ok(registry)
}
