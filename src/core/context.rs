//! Build-context types: platform triples and the (configuration, platform, options, action)
//! tuple the Resolver and filter engine evaluate against.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetOs {
    Windows,
    Linux,
    #[serde(alias = "macos", alias = "darwin")]
    MacOs,
    Android,
    Ios,
    Emscripten,
    #[serde(alias = "harmony")]
    HarmonyOs,
}

impl TargetOs {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetOs::Windows => "windows",
            TargetOs::Linux => "linux",
            TargetOs::MacOs => "macos",
            TargetOs::Android => "android",
            TargetOs::Ios => "ios",
            TargetOs::Emscripten => "emscripten",
            TargetOs::HarmonyOs => "harmonyos",
        }
    }
}

impl FromStr for TargetOs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" | "win" => Ok(TargetOs::Windows),
            "linux" => Ok(TargetOs::Linux),
            "macos" | "darwin" | "osx" => Ok(TargetOs::MacOs),
            "android" => Ok(TargetOs::Android),
            "ios" => Ok(TargetOs::Ios),
            "emscripten" | "wasm" => Ok(TargetOs::Emscripten),
            "harmonyos" | "harmony" => Ok(TargetOs::HarmonyOs),
            other => Err(format!("unknown system `{other}`")),
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Target CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetArch {
    #[serde(alias = "x86", alias = "i386")]
    X86,
    #[serde(alias = "x64", alias = "amd64")]
    X86_64,
    #[serde(alias = "armv7")]
    Arm,
    #[serde(alias = "aarch64")]
    Arm64,
    Wasm32,
}

impl TargetArch {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::X86 => "x86",
            TargetArch::X86_64 => "x86_64",
            TargetArch::Arm => "arm",
            TargetArch::Arm64 => "arm64",
            TargetArch::Wasm32 => "wasm32",
        }
    }
}

impl FromStr for TargetArch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i386" | "i686" => Ok(TargetArch::X86),
            "x86_64" | "x64" | "amd64" => Ok(TargetArch::X86_64),
            "arm" | "armv7" | "armv7a" => Ok(TargetArch::Arm),
            "arm64" | "aarch64" => Ok(TargetArch::Arm64),
            "wasm32" => Ok(TargetArch::Wasm32),
            other => Err(format!("unknown architecture `{other}`")),
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An (os, arch, optional environment) triple, e.g. `windows-x86_64-msvc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformTriple {
    pub os: TargetOs,
    pub arch: TargetArch,
    pub env: Option<String>,
}

impl PlatformTriple {
    pub fn new(os: TargetOs, arch: TargetArch) -> Self {
        PlatformTriple { os, arch, env: None }
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Detects the host platform from `std::env::consts`, for CLI invocations that
    /// omit `--platform`.
    pub fn host() -> Self {
        let os = match std::env::consts::OS {
            "windows" => TargetOs::Windows,
            "linux" => TargetOs::Linux,
            "macos" => TargetOs::MacOs,
            "android" => TargetOs::Android,
            "ios" => TargetOs::Ios,
            other => other.parse().unwrap_or(TargetOs::Linux),
        };
        let arch = match std::env::consts::ARCH {
            "x86" => TargetArch::X86,
            "x86_64" => TargetArch::X86_64,
            "arm" => TargetArch::Arm,
            "aarch64" => TargetArch::Arm64,
            "wasm32" => TargetArch::Wasm32,
            other => other.parse().unwrap_or(TargetArch::X86_64),
        };
        PlatformTriple { os, arch, env: None }
    }

    /// Parses `OS-ARCH[-ENV]` as accepted by `--platform`.
    pub fn parse(s: &str) -> Result<Self, String> {
        let mut parts = s.split('-');
        let os = parts
            .next()
            .ok_or_else(|| "empty platform triple".to_string())?
            .parse::<TargetOs>()?;
        let arch = parts
            .next()
            .ok_or_else(|| format!("platform triple `{s}` missing architecture"))?
            .parse::<TargetArch>()?;
        let env = parts.next().map(String::from);
        Ok(PlatformTriple { os, arch, env })
    }
}

impl fmt::Display for PlatformTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.env {
            Some(env) => write!(f, "{}-{}-{}", self.os, self.arch, env),
            None => write!(f, "{}-{}", self.os, self.arch),
        }
    }
}

/// The tuple a project is resolved and a filter is evaluated against.
///
/// Equal tuples must always evaluate filters identically (property #8); this type
/// derives `Hash`/`Eq` so it can key the Resolver's memoization table directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildContext {
    pub configuration: String,
    pub platform: PlatformTriple,
    /// Custom user-declared options, sorted by key for deterministic hashing/display.
    pub options: BTreeMap<String, String>,
    pub action: String,
    /// Whether `--verbose` / `--no-cache` were passed; these gate the bare `verbose`
    /// and `no-cache` filter clauses and must be part of the context tuple so that
    /// evaluating the same predicate against the same tuple is always pure (§8 P8).
    pub verbose: bool,
    pub no_cache: bool,
}

impl BuildContext {
    pub fn new(configuration: impl Into<String>, platform: PlatformTriple) -> Self {
        BuildContext {
            configuration: configuration.into(),
            platform,
            options: BTreeMap::new(),
            action: "build".to_string(),
            verbose: false,
            no_cache: false,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_no_cache(mut self, no_cache: bool) -> Self {
        self.no_cache = no_cache;
        self
    }
}
