//! The Project entity: a single compilation unit's declarative description, frozen
//! before the engine runs.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::filter::FilterBlock;

/// What a project produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    ConsoleApp,
    WindowedApp,
    StaticLib,
    SharedLib,
    TestSuite,
}

impl ProjectKind {
    pub fn is_library(&self) -> bool {
        matches!(self, ProjectKind::StaticLib | ProjectKind::SharedLib)
    }

    pub fn is_linkable_output(&self) -> bool {
        !matches!(self, ProjectKind::StaticLib)
    }
}

/// Source language. Distinct from the C++ dialect token, which further narrows `Cxx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    #[serde(alias = "cpp", alias = "cxx", alias = "c++")]
    Cxx,
    #[serde(rename = "objc", alias = "objective-c")]
    ObjC,
    #[serde(rename = "objcxx", alias = "objective-c++", alias = "objcpp")]
    ObjCxx,
    #[serde(alias = "asm")]
    Assembly,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cxx => "c++",
            Language::ObjC => "objective-c",
            Language::ObjCxx => "objective-c++",
            Language::Assembly => "assembly",
        }
    }
}

/// A dialect token such as `C++17`, `C11`, `gnu++20`. Kept as a validated opaque
/// string rather than an exhaustive enum: toolchain families accept dialect spellings
/// the core has no reason to enumerate exhaustively (e.g. `gnu++2b`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dialect(String);

impl Dialect {
    pub fn new(token: impl Into<String>) -> Self {
        Dialect(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this dialect names a C++20-or-later standard, which is what gates
    /// module-interface precompile handling in the toolchain abstraction.
    pub fn supports_modules(&self) -> bool {
        let digits: String = self.0.chars().filter(|c| c.is_ascii_digit()).collect();
        matches!(digits.as_str(), "20" | "23" | "2a" | "2b")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    Off,
    Size,
    Speed,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarningLevel {
    Off,
    Default,
    Extra,
    Strict,
}

/// Build hooks run synchronously by the Scheduler at the named phase boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildHooks {
    #[serde(default)]
    pub prebuild: Vec<String>,
    #[serde(default)]
    pub prelink: Vec<String>,
    #[serde(default)]
    pub postlink: Vec<String>,
    #[serde(default)]
    pub postbuild: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecompiledHeader {
    pub header: PathBuf,
    pub source: PathBuf,
}

/// Android-specific packaging metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AndroidMetadata {
    pub package: String,
    pub min_sdk: u32,
    pub target_sdk: u32,
    pub abis: Vec<String>,
    pub permissions: Vec<String>,
    pub features: Vec<String>,
    pub keystore_path: Option<PathBuf>,
    pub keystore_alias: Option<String>,
}

/// Emscripten-specific packaging metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmscriptenMetadata {
    pub shell_file: Option<PathBuf>,
    pub initial_memory_mb: Option<u32>,
    pub preload_files: Vec<PathBuf>,
    pub serve_port: Option<u16>,
}

/// Per-platform metadata bags. Android and Emscripten are modeled fully because the
/// core performs platform packaging for them (§6); iOS/Xbox/HarmonyOS are carried as
/// opaque key/value bags since the core has no packager for them yet, but the front-end
/// schema still needs somewhere to put their fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformMetadata {
    pub android: Option<AndroidMetadata>,
    pub emscripten: Option<EmscriptenMetadata>,
    #[serde(default)]
    pub ios: HashMap<String, String>,
    #[serde(default)]
    pub xbox: HashMap<String, String>,
    #[serde(default)]
    pub harmonyos: HashMap<String, String>,
}

/// A single compilation target, frozen by the front-end before the engine runs.
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub kind: ProjectKind,
    pub language: Language,
    pub dialect: Dialect,
    pub location: PathBuf,

    pub files: Vec<String>,
    pub exclude_files: Vec<String>,
    pub exclude_main_files: Vec<String>,

    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
    pub objdir: String,
    pub targetdir: String,
    pub targetname: Option<String>,

    pub links: Vec<String>,
    pub depends_on: Vec<String>,
    pub file_deps: Vec<String>,

    pub defines: Vec<String>,
    pub optimize: OptimizationLevel,
    pub debug_symbols: bool,
    pub warnings: WarningLevel,

    pub pch: Option<PrecompiledHeader>,
    pub hooks: BuildHooks,
    pub platform_metadata: PlatformMetadata,
    pub use_toolchain: Option<String>,

    pub filters: Vec<FilterBlock>,
}

impl Project {
    pub fn new(name: impl Into<String>, kind: ProjectKind, language: Language, dialect: Dialect) -> Self {
        Project {
            name: name.into(),
            kind,
            language,
            dialect,
            location: PathBuf::from("."),
            files: Vec::new(),
            exclude_files: Vec::new(),
            exclude_main_files: Vec::new(),
            include_dirs: Vec::new(),
            lib_dirs: Vec::new(),
            objdir: "obj/%{cfg.buildcfg}/%{prj.name}".to_string(),
            targetdir: "bin/%{cfg.buildcfg}".to_string(),
            targetname: None,
            links: Vec::new(),
            depends_on: Vec::new(),
            file_deps: Vec::new(),
            defines: Vec::new(),
            optimize: OptimizationLevel::Off,
            debug_symbols: true,
            warnings: WarningLevel::Default,
            pch: None,
            hooks: BuildHooks::default(),
            platform_metadata: PlatformMetadata::default(),
            use_toolchain: None,
            filters: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_files(mut self, files: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.include_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_links(mut self, links: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.links = links.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_depends_on(mut self, deps: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_defines(mut self, defines: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.defines = defines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_optimize(mut self, level: OptimizationLevel) -> Self {
        self.optimize = level;
        self
    }

    pub fn with_filter(mut self, block: FilterBlock) -> Self {
        self.filters.push(block);
        self
    }

    pub fn with_use_toolchain(mut self, name: impl Into<String>) -> Self {
        self.use_toolchain = Some(name.into());
        self
    }

    pub fn with_pch(mut self, header: impl Into<PathBuf>, source: impl Into<PathBuf>) -> Self {
        self.pch = Some(PrecompiledHeader { header: header.into(), source: source.into() });
        self
    }

    pub fn is_module_interface_path(path: &std::path::Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("cppm") | Some("ixx") | Some("mpp") | Some("c++m")
        )
    }
}
