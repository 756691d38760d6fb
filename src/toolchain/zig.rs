//! `zig cc` / `zig c++` / `zig ar`: Clang-compatible grammar behind a subcommand, so
//! the translated flags are identical to `gcc_clang` but the program is always `zig`
//! with a leading subcommand argument.

use crate::core::Toolchain;
use crate::toolchain::command::CommandSpec;
use crate::toolchain::error::ToolchainError;
use crate::toolchain::gcc_clang::{base_archive_args, base_compile_args, base_link_args};
use crate::toolchain::request::{ArchiveRequest, CompileRequest, LinkRequest};
use crate::toolchain::FlagTranslator;

pub struct ZigTranslator;

impl FlagTranslator for ZigTranslator {
    fn compile_command(&self, tc: &Toolchain, req: &CompileRequest) -> Result<CommandSpec, ToolchainError> {
        let subcommand = if req.language == crate::core::Language::Cxx { "c++" } else { "cc" };
        let mut cmd = CommandSpec::new("zig").arg(subcommand);
        cmd = cmd.args(self.depfile_flags(req.depfile));
        cmd = cmd.args(base_compile_args(tc, req));
        Ok(cmd)
    }

    fn archive_command(&self, _tc: &Toolchain, req: &ArchiveRequest) -> Result<CommandSpec, ToolchainError> {
        Ok(CommandSpec::new("zig").arg("ar").args(base_archive_args(req)))
    }

    fn link_command(&self, tc: &Toolchain, req: &LinkRequest) -> Result<CommandSpec, ToolchainError> {
        Ok(CommandSpec::new("zig").arg("c++").args(base_link_args(tc, req)))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_command_uses_zig_ar_subcommand() {
        let req = ArchiveRequest { objects: &[], output: &std::path::PathBuf::from("libfoo.a") };
        let cmd = ZigTranslator.archive_command(&dummy_toolchain(), &req).unwrap();
        assert_eq!(cmd.program.to_str().unwrap(), "zig");
        assert_eq!(cmd.args[0], "ar");
    }

    fn dummy_toolchain() -> Toolchain {
        use crate::core::toolchain::ToolchainFamily;
        use crate::core::{TargetArch, TargetOs};
        Toolchain {
            name: "zig".into(),
            family: ToolchainFamily::Zig,
            os: TargetOs::Linux,
            arch: TargetArch::X86_64,
            target_triple: None,
            sysroot: None,
            cc: "zig".into(),
            cxx: "zig".into(),
            linker: None,
            archiver: "zig".into(),
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
}
