//! Android NDK's prebuilt clang: GCC/Clang-compatible grammar plus `--target=` and
//! `--sysroot=` derived from the per-ABI toolchain record (one `Toolchain` per ABI,
//! its `target_triple` e.g. `aarch64-linux-android24`).

use crate::core::Toolchain;
use crate::toolchain::command::CommandSpec;
use crate::toolchain::error::ToolchainError;
use crate::toolchain::gcc_clang::{base_archive_args, base_compile_args, base_link_args};
use crate::toolchain::request::{ArchiveRequest, CompileRequest, LinkRequest};
use crate::toolchain::FlagTranslator;

pub struct AndroidNdkTranslator;

fn target_and_sysroot_args(tc: &Toolchain) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(triple) = &tc.target_triple {
        args.push(format!("--target={triple}"));
    }
    if let Some(sysroot) = &tc.sysroot {
        args.push(format!("--sysroot={}", sysroot.display()));
    }
    args
}

impl FlagTranslator for AndroidNdkTranslator {
    fn compile_command(&self, tc: &Toolchain, req: &CompileRequest) -> Result<CommandSpec, ToolchainError> {
        let program = if req.language == crate::core::Language::Cxx { &tc.cxx } else { &tc.cc };
        let mut cmd = CommandSpec::new(program.clone());
        cmd = cmd.args(self.depfile_flags(req.depfile));
        cmd = cmd.args(target_and_sysroot_args(tc));
        cmd = cmd.args(base_compile_args(tc, req));
        Ok(cmd)
    }

    fn archive_command(&self, tc: &Toolchain, req: &ArchiveRequest) -> Result<CommandSpec, ToolchainError> {
        Ok(CommandSpec::new(tc.archiver.clone()).args(base_archive_args(req)))
    }

    fn link_command(&self, tc: &Toolchain, req: &LinkRequest) -> Result<CommandSpec, ToolchainError> {
        let program = tc.linker.clone().unwrap_or_else(|| tc.cxx.clone());
        let mut cmd = CommandSpec::new(program);
        cmd = cmd.args(target_and_sysroot_args(tc));
        cmd = cmd.args(base_link_args(tc, req));
        // The NDK toolchain is PIE-only for executables and requires -llog/-landroid
        // for most apps; those belong in the toolchain's own `ldflags`, not hardcoded
        // here, so a workspace can override them per NDK version.
        Ok(cmd)
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

    fn depfile_flags(&self, depfile: &std::path::Path) -> Vec<String> {
        vec!["-MD".to_string(), "-MF".to_string(), depfile.display().to_string()]
    }
}
