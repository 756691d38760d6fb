//! The abstract `CompileRequest` / `ArchiveRequest` / `LinkRequest` the Toolchain
//! Abstraction translates into concrete argv (§4.3).

use std::path::PathBuf;

use crate::core::project::{Language, OptimizationLevel, WarningLevel};
use crate::core::{Dialect, ProjectKind};

#[derive(Debug, Clone)]
pub struct CompileRequest<'a> {
    pub language: Language,
    pub dialect: &'a Dialect,
    pub source: &'a PathBuf,
    pub object: &'a PathBuf,
    pub depfile: &'a PathBuf,
    pub include_dirs: &'a [String],
    pub defines: &'a [String],
    pub optimize: OptimizationLevel,
    pub debug_symbols: bool,
    pub warnings: WarningLevel,
    pub is_module_interface: bool,
    /// Paths to already-precompiled module interfaces this unit imports.
    pub imported_module_interfaces: &'a [PathBuf],
    pub pch_object: Option<&'a PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ArchiveRequest<'a> {
    pub objects: &'a [PathBuf],
    pub output: &'a PathBuf,
}

#[derive(Debug, Clone)]
pub struct LinkRequest<'a> {
    pub kind: ProjectKind,
    pub objects: &'a [PathBuf],
    /// Static/shared archives from dependency projects, already resolved to paths.
    pub dependency_archives: &'a [PathBuf],
    pub link_names: &'a [String],
    pub lib_dirs: &'a [String],
    pub output: &'a PathBuf,
    pub debug_symbols: bool,
    pub frameworks: &'a [String],
    pub framework_dirs: &'a [PathBuf],
}
