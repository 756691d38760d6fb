//! Apple Clang: GCC/Clang-compatible flag grammar, `xcrun`-wrapped invocation, plus
//! framework search paths and linking.

use crate::core::Toolchain;
use crate::toolchain::command::CommandSpec;
use crate::toolchain::error::ToolchainError;
use crate::toolchain::gcc_clang::{base_archive_args, base_compile_args, base_link_args};
use crate::toolchain::request::{ArchiveRequest, CompileRequest, LinkRequest};
use crate::toolchain::FlagTranslator;

pub struct AppleClangTranslator;

fn xcrun_wrap(tool: &str) -> CommandSpec {
    CommandSpec::new("xcrun").arg("--sdk").arg("macosx").arg(tool)
}

impl FlagTranslator for AppleClangTranslator {
    fn compile_command(&self, tc: &Toolchain, req: &CompileRequest) -> Result<CommandSpec, ToolchainError> {
        let tool = if req.language == crate::core::Language::Cxx { "clang++" } else { "clang" };
        let mut cmd = xcrun_wrap(tool);
        cmd = cmd.args(self.depfile_flags(req.depfile));
        if let Some(sysroot) = &tc.sysroot {
            cmd = cmd.arg("-isysroot").arg(sysroot.display().to_string());
        }
        cmd = cmd.args(base_compile_args(tc, req));
        Ok(cmd)
    }

    fn archive_command(&self, _tc: &Toolchain, req: &ArchiveRequest) -> Result<CommandSpec, ToolchainError> {
        Ok(xcrun_wrap("ar").args(base_archive_args(req)))
    }

    fn link_command(&self, tc: &Toolchain, req: &LinkRequest) -> Result<CommandSpec, ToolchainError> {
        let mut cmd = xcrun_wrap("clang++");
        if let Some(sysroot) = &tc.sysroot {
            cmd = cmd.arg("-isysroot").arg(sysroot.display().to_string());
        }
        cmd = cmd.args(base_link_args(tc, req));
        for dir in req.framework_dirs {
            cmd = cmd.arg("-F").arg(dir.display().to_string());
        }
        for framework in req.frameworks {
            cmd = cmd.arg("-framework").arg(framework.clone());
        }
        Ok(cmd)
    }

    fn static_lib_extension(&self) -> &'static str {
        "a"
    }

    fn static_lib_prefix(&self) -> &'static str {
        "lib"
    }

    fn shared_lib_extension(&self) -> &'static str {
        "dylib"
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
