//! MSVC (`cl.exe` / `lib.exe` / `link.exe`): a grammar distinct enough from GCC/Clang
//! that it does not share the `gcc_clang` helpers.

use crate::core::project::{Language, OptimizationLevel, WarningLevel};
use crate::core::{ProjectKind, Toolchain};
use crate::toolchain::command::CommandSpec;
use crate::toolchain::error::ToolchainError;
use crate::toolchain::request::{ArchiveRequest, CompileRequest, LinkRequest};
use crate::toolchain::FlagTranslator;

fn optimize_flag(level: OptimizationLevel) -> &'static str {
    match level {
        OptimizationLevel::Off => "/Od",
        OptimizationLevel::Size => "/O1",
        OptimizationLevel::Speed => "/O2",
        OptimizationLevel::Full => "/Ox",
    }
}

fn warning_flags(level: WarningLevel) -> Vec<&'static str> {
    match level {
        WarningLevel::Off => vec!["/w"],
        WarningLevel::Default => vec!["/W3"],
        WarningLevel::Extra => vec!["/W4"],
        WarningLevel::Strict => vec!["/W4", "/WX"],
    }
}

pub struct MsvcTranslator;

impl FlagTranslator for MsvcTranslator {
    fn compile_command(&self, tc: &Toolchain, req: &CompileRequest) -> Result<CommandSpec, ToolchainError> {
        let mut cmd = CommandSpec::new(tc.cc.clone()).arg("/nologo").arg("/c");
        cmd = cmd.arg(if req.language == Language::Cxx { "/TP" } else { "/TC" });
        if req.language == Language::Cxx {
            cmd = cmd.arg(format!("/std:{}", std_flag_value(req.dialect.as_str())));
            cmd = cmd.arg("/EHsc");
        } else {
            cmd = cmd.arg("/GR-");
        }
        cmd = cmd.arg(optimize_flag(req.optimize));
        if req.debug_symbols {
            cmd = cmd.arg("/Zi").arg("/FS");
        }
        cmd = cmd.args(warning_flags(req.warnings));
        for dir in req.include_dirs {
            cmd = cmd.arg(format!("/I{dir}"));
        }
        for define in req.defines {
            cmd = cmd.arg(format!("/D{define}"));
        }
        for flag in &tc.cflags {
            cmd = cmd.arg(flag.clone());
        }
        if req.language == Language::Cxx {
            for flag in &tc.cxxflags {
                cmd = cmd.arg(flag.clone());
            }
        }
        cmd = cmd.arg(req.source.display().to_string());
        cmd = cmd.arg(format!("/Fo{}", req.object.display()));
        Ok(cmd)
    }

    fn archive_command(&self, tc: &Toolchain, req: &ArchiveRequest) -> Result<CommandSpec, ToolchainError> {
        let mut cmd = CommandSpec::new(tc.archiver.clone()).arg("/nologo");
        cmd = cmd.arg(format!("/OUT:{}", req.output.display()));
        for obj in req.objects {
            cmd = cmd.arg(obj.display().to_string());
        }
        Ok(cmd)
    }

    fn link_command(&self, tc: &Toolchain, req: &LinkRequest) -> Result<CommandSpec, ToolchainError> {
        let program = tc.linker.clone().unwrap_or_else(|| "link.exe".into());
        let mut cmd = CommandSpec::new(program).arg("/nologo");
        if req.kind == ProjectKind::SharedLib {
            cmd = cmd.arg("/DLL");
        }
        if req.debug_symbols {
            cmd = cmd.arg("/DEBUG");
        }
        cmd = cmd.arg(format!("/OUT:{}", req.output.display()));
        for dir in req.lib_dirs {
            cmd = cmd.arg(format!("/LIBPATH:{dir}"));
        }
        for obj in req.objects {
            cmd = cmd.arg(obj.display().to_string());
        }
        for archive in req.dependency_archives {
            cmd = cmd.arg(archive.display().to_string());
        }
        for name in req.link_names {
            cmd = cmd.arg(format!("{name}.lib"));
        }
        for flag in &tc.ldflags {
            cmd = cmd.arg(flag.clone());
        }
        Ok(cmd)
    }

    fn static_lib_extension(&self) -> &'static str {
        "lib"
    }

    fn static_lib_prefix(&self) -> &'static str {
        ""
    }

    fn shared_lib_extension(&self) -> &'static str {
        "dll"
    }

    fn shared_lib_prefix(&self) -> &'static str {
        ""
    }

    fn exe_extension(&self) -> &'static str {
        "exe"
    }

    fn depfile_flags(&self, _depfile: &std::path::Path) -> Vec<String> {
        // MSVC has no Make-style depfile; header dependencies fall back to Tier-3
        // identity-signature invalidation only (§4.4).
        Vec::new()
    }

    fn version_probe_args(&self) -> Vec<String> {
        Vec::new()
    }
}

fn std_flag_value(dialect: &str) -> String {
    // `C++17` -> `c++17`; MSVC has no `gnu++NN` equivalent so callers should not
    // request one for this family.
    dialect.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::toolchain::ToolchainFamily;
    use crate::core::{Dialect, TargetArch, TargetOs};
    use std::path::PathBuf;

    fn dummy_toolchain() -> Toolchain {
        Toolchain {
            name: "msvc".into(),
            family: ToolchainFamily::Msvc,
            os: TargetOs::Windows,
            arch: TargetArch::X86_64,
            target_triple: None,
            sysroot: None,
            cc: "cl.exe".into(),
            cxx: "cl.exe".into(),
            linker: Some("link.exe".into()),
            archiver: "lib.exe".into(),
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

    #[test]
    fn compile_command_uses_slash_flags() {
        let dialect = Dialect::new("c++20");
        let source = PathBuf::from("main.cpp");
        let object = PathBuf::from("main.obj");
        let depfile = PathBuf::from("main.d");
        let req = CompileRequest {
            language: Language::Cxx,
            dialect: &dialect,
            source: &source,
            object: &object,
            depfile: &depfile,
            include_dirs: &[],
            defines: &[],
            optimize: OptimizationLevel::Speed,
            debug_symbols: true,
            warnings: WarningLevel::Strict,
            is_module_interface: false,
            imported_module_interfaces: &[],
            pch_object: None,
        };
        let cmd = MsvcTranslator.compile_command(&dummy_toolchain(), &req).unwrap();
        assert!(cmd.args.contains(&"/EHsc".to_string()));
        assert!(cmd.args.contains(&"/std:c++20".to_string()));
        assert!(cmd.args.contains(&"/WX".to_string()));
    }

    #[test]
    fn archive_command_has_no_depfile_support() {
        assert!(MsvcTranslator.depfile_flags(&PathBuf::from("x.d")).is_empty());
    }
}
