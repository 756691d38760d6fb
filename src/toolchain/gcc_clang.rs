//! GCC / Clang flag translation — the baseline "POSIX-flavored" family most of the
//! other families (Apple Clang, Android NDK, Emscripten, Zig) build on top of.

use std::path::Path;

use crate::core::project::{Language, OptimizationLevel, WarningLevel};
use crate::core::Toolchain;
use crate::toolchain::command::CommandSpec;
use crate::toolchain::error::ToolchainError;
use crate::toolchain::request::{ArchiveRequest, CompileRequest, LinkRequest};
use crate::toolchain::FlagTranslator;

pub fn optimize_flag(level: OptimizationLevel) -> &'static str {
    match level {
        OptimizationLevel::Off => "-O0",
        OptimizationLevel::Size => "-Os",
        OptimizationLevel::Speed => "-O2",
        OptimizationLevel::Full => "-O3",
    }
}

pub fn warning_flags(level: WarningLevel) -> Vec<&'static str> {
    match level {
        WarningLevel::Off => vec!["-w"],
        WarningLevel::Default => vec!["-Wall"],
        WarningLevel::Extra => vec!["-Wall", "-Wextra"],
        WarningLevel::Strict => vec!["-Wall", "-Wextra", "-Werror"],
    }
}

/// Picks the compiler binary (C vs C++) and returns the argv assembled up to, but not
/// including, the family-specific program-name prefix some wrappers (Zig) add.
pub fn base_compile_args(tc: &Toolchain, req: &CompileRequest) -> Vec<String> {
    let mut args = vec!["-c".to_string()];

    if req.language == Language::Cxx {
        args.push(format!("-std={}", dialect_flag_value(req.dialect.as_str())));
    } else if req.language == Language::C {
        args.push(format!("-std={}", dialect_flag_value(req.dialect.as_str())));
    }

    args.push(optimize_flag(req.optimize).to_string());
    if req.debug_symbols {
        args.push("-g".to_string());
    }
    for w in warning_flags(req.warnings) {
        args.push(w.to_string());
    }
    for dir in req.include_dirs {
        args.push(format!("-I{dir}"));
    }
    for define in req.defines {
        args.push(format!("-D{define}"));
    }
    for pcm in req.imported_module_interfaces {
        args.push("-fmodule-file".to_string());
        args.push(pcm.display().to_string());
    }
    if req.is_module_interface {
        args.push("--precompile".to_string());
    }
    for flag in &tc.cflags {
        args.push(flag.clone());
    }
    if req.language == Language::Cxx {
        for flag in &tc.cxxflags {
            args.push(flag.clone());
        }
    }
    args.push(req.source.display().to_string());
    args.push("-o".to_string());
    args.push(req.object.display().to_string());
    args
}

fn dialect_flag_value(dialect: &str) -> String {
    // `C++17` -> `c++17`; `gnu++20`/`c11` already lowercase pass through unchanged.
    dialect.to_ascii_lowercase()
}

pub fn base_archive_args(req: &ArchiveRequest) -> Vec<String> {
    let mut args = vec!["rcs".to_string(), req.output.display().to_string()];
    args.extend(req.objects.iter().map(|o| o.display().to_string()));
    args
}

pub fn base_link_args(tc: &Toolchain, req: &LinkRequest) -> Vec<String> {
    use crate::core::ProjectKind;
    let mut args = Vec::new();
    if req.kind == ProjectKind::SharedLib {
        args.push("-shared".to_string());
    }
    if req.debug_symbols {
        args.push("-g".to_string());
    }
    args.push("-o".to_string());
    args.push(req.output.display().to_string());
    for obj in req.objects {
        args.push(obj.display().to_string());
    }
    for archive in req.dependency_archives {
        args.push(archive.display().to_string());
    }
    for dir in req.lib_dirs {
        args.push(format!("-L{dir}"));
    }
    for name in req.link_names {
        args.push(format!("-l{name}"));
    }
    for flag in &tc.ldflags {
        args.push(flag.clone());
    }
    args
}

pub struct GccClangTranslator;

impl FlagTranslator for GccClangTranslator {
    fn compile_command(&self, tc: &Toolchain, req: &CompileRequest) -> Result<CommandSpec, ToolchainError> {
        let program = if req.language == Language::Cxx { &tc.cxx } else { &tc.cc };
        let mut cmd = CommandSpec::new(program.clone());
        cmd = cmd.args(self.depfile_flags(req.depfile));
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
        "so"
    }

    fn shared_lib_prefix(&self) -> &'static str {
        "lib"
    }

    fn exe_extension(&self) -> &'static str {
        ""
    }

    fn depfile_flags(&self, depfile: &Path) -> Vec<String> {
        vec!["-MD".to_string(), "-MF".to_string(), depfile.display().to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_levels_map_correctly() {
        assert_eq!(optimize_flag(OptimizationLevel::Off), "-O0");
        assert_eq!(optimize_flag(OptimizationLevel::Speed), "-O2");
        assert_eq!(optimize_flag(OptimizationLevel::Full), "-O3");
    }

    #[test]
    fn strict_warnings_add_werror() {
        assert!(warning_flags(WarningLevel::Strict).contains(&"-Werror"));
        assert!(!warning_flags(WarningLevel::Default).contains(&"-Werror"));
    }
}
