//! Compiler-version memo (§5 "shared-resource policy"): probing a compiler's version
//! is only needed once per toolchain per process, and the result never changes
//! mid-run, so it's cached behind a read-mostly lock rather than re-invoked by every
//! compile job that wants it for the Tier-3 identity signature.

use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use crate::toolchain::command::CommandSpec;
use crate::toolchain::FlagTranslator;
use crate::util::process::ProcessBuilder;

static VERSION_CACHE: LazyLock<RwLock<HashMap<String, String>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Returns the compiler's self-reported version string for `toolchain_name`, running
/// the probe at most once per toolchain for the life of the process.
pub fn probe_version(
    toolchain_name: &str,
    program: &std::path::Path,
    translator: &dyn FlagTranslator,
) -> anyhow::Result<String> {
    if let Some(cached) = VERSION_CACHE.read().unwrap().get(toolchain_name) {
        return Ok(cached.clone());
    }

    let mut cache = VERSION_CACHE.write().unwrap();
    if let Some(cached) = cache.get(toolchain_name) {
        return Ok(cached.clone());
    }

    let spec = CommandSpec::new(program).args(translator.version_probe_args());
    let output = ProcessBuilder::new(&spec.program).args(&spec.args).exec()?;
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    cache.insert(toolchain_name.to_string(), version.clone());
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTranslator;
    impl FlagTranslator for FakeTranslator {
        fn compile_command(
            &self,
            _tc: &crate::core::Toolchain,
            _req: &crate::toolchain::CompileRequest,
        ) -> Result<CommandSpec, crate::toolchain::ToolchainError> {
            unimplemented!()
        }
        fn archive_command(
            &self,
            _tc: &crate::core::Toolchain,
            _req: &crate::toolchain::ArchiveRequest,
        ) -> Result<CommandSpec, crate::toolchain::ToolchainError> {
            unimplemented!()
        }
        fn link_command(
            &self,
            _tc: &crate::core::Toolchain,
            _req: &crate::toolchain::LinkRequest,
        ) -> Result<CommandSpec, crate::toolchain::ToolchainError> {
            unimplemented!()
        }
        fn static_lib_extension(&self) -> &'static str {
            "a"
        }
        fn static_lib_prefix(&self) -> &'static str {
            "lib"
        }
        fn shared_lib_extension(&self) -> &'static str {
            "so"
        }
        fn shared_lib_prefix(&self) -> &'static str {
            "lib"
        }
        fn exe_extension(&self) -> &'static str {
            ""
        }
    }

    #[test]
    fn probes_once_and_caches() {
        let version = probe_version("test-echo-toolchain", std::path::Path::new("echo"), &FakeTranslator);
        assert!(version.is_ok());
        let cached = VERSION_CACHE.read().unwrap().get("test-echo-toolchain").cloned();
        assert!(cached.is_some());
    }
}
