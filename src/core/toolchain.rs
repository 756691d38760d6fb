//! The abstract Toolchain record (§3 Data Model). This module holds only the
//! descriptor; flag-translation dispatch lives in `crate::toolchain`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::context::{TargetArch, TargetOs};

/// Compiler family, which determines flag-translation strategy (§4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolchainFamily {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
    AndroidNdk,
    Emscripten,
    Zig,
}

impl ToolchainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainFamily::Gcc => "gcc",
            ToolchainFamily::Clang => "clang",
            ToolchainFamily::AppleClang => "apple-clang",
            ToolchainFamily::Msvc => "msvc",
            ToolchainFamily::AndroidNdk => "android-ndk",
            ToolchainFamily::Emscripten => "emscripten",
            ToolchainFamily::Zig => "zig-as-clang",
        }
    }

    /// Families whose underlying flag grammar is GCC/Clang-compatible (`-I`, `-D`, `-c`, ...).
    pub fn is_gcc_like(&self) -> bool {
        !matches!(self, ToolchainFamily::Msvc)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toolchain {
    pub name: String,
    pub family: ToolchainFamily,
    pub os: TargetOs,
    pub arch: TargetArch,
    pub target_triple: Option<String>,
    pub sysroot: Option<PathBuf>,

    pub cc: PathBuf,
    pub cxx: PathBuf,
    pub linker: Option<PathBuf>,
    pub archiver: PathBuf,

    #[serde(default)]
    pub cflags: Vec<String>,
    #[serde(default)]
    pub cxxflags: Vec<String>,
    #[serde(default)]
    pub ldflags: Vec<String>,
    #[serde(default)]
    pub asflags: Vec<String>,
    #[serde(default)]
    pub arflags: Vec<String>,
    #[serde(default)]
    pub defines: Vec<String>,

    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub framework_dirs: Vec<PathBuf>,
}

impl Toolchain {
    /// Whether this toolchain is a candidate for a given (os, arch) build context,
    /// used by the Resolver's implicit toolchain-selection rule (§4.2 step 4).
    pub fn matches(&self, os: TargetOs, arch: TargetArch) -> bool {
        self.os == os && self.arch == arch
    }
}
