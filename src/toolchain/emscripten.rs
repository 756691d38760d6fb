//! Emscripten (`emcc`/`em++`/`emar`): GCC/Clang-compatible grammar. The link step
//! produces `<target>.js` with emcc emitting the companion `.wasm` automatically;
//! the `.html` + launcher scripts are produced by the Emscripten platform packager
//! as a post-link step (§6), not here.

use crate::core::Toolchain;
use crate::toolchain::command::CommandSpec;
use crate::toolchain::error::ToolchainError;
use crate::toolchain::gcc_clang::{base_archive_args, base_compile_args, base_link_args};
use crate::toolchain::request::{ArchiveRequest, CompileRequest, LinkRequest};
use crate::toolchain::FlagTranslator;

pub struct EmscriptenTranslator;

impl FlagTranslator for EmscriptenTranslator {
    fn compile_command(&self, tc: &Toolchain, req: &CompileRequest) -> Result<CommandSpec, ToolchainError> {
        let program = if req.language == crate::core::Language::Cxx { &tc.cxx } else { &tc.cc };
        let mut cmd = CommandSpec::new(program.clone());
        cmd = cmd.args(self.depfile_flags(req.depfile));
        if req.debug_symbols {
            cmd = cmd.arg("-gsource-map");
        }
        cmd = cmd.args(base_compile_args(tc, req));
        Ok(cmd)
    }

    fn archive_command(&self, tc: &Toolchain, req: &ArchiveRequest) -> Result<CommandSpec, ToolchainError> {
        Ok(CommandSpec::new(tc.archiver.clone()).args(base_archive_args(req)))
    }

    fn link_command(&self, tc: &Toolchain, req: &LinkRequest) -> Result<CommandSpec, ToolchainError> {
        let program = tc.linker.clone().unwrap_or_else(|| tc.cxx.clone());
        Ok(CommandSpec::new(program).args(base_link_args(tc, req)))
    }

    fn static_lib_extension(&self) -> &'static str {
        "a"
    }

    fn static_lib_prefix(&self) -> &'static str {
        "lib"
    }

    fn shared_lib_extension(&self) -> &'static str {
        "wasm"
    }

    fn shared_lib_prefix(&self) -> &'static str {
        ""
    }

    fn exe_extension(&self) -> &'static str {
        "js"
    }

    fn depfile_flags(&self, depfile: &std::path::Path) -> Vec<String> {
        vec!["-MD".to_string(), "-MF".to_string(), depfile.display().to_string()]
    }
}
