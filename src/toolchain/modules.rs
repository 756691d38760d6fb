//! C++20 module-interface sequencing (§4.3): interfaces must be precompiled to a
//! `.pcm`/`.ifc`-equivalent object before any unit that imports them is compiled, and
//! an interface that imports another interface must follow it in the same order.

use std::collections::{HashMap, HashSet};

use crate::toolchain::error::ToolchainError;

/// One module interface unit known to a project: its logical module name, the
/// compiled source path that provides it, and the names of modules it imports.
#[derive(Debug, Clone)]
pub struct ModuleUnit {
    pub module_name: String,
    pub source: std::path::PathBuf,
    pub imports: Vec<String>,
}

/// Orders module interface units so each is compiled only after every interface it
/// imports. Returns `ModuleOrderViolation` if the import graph has a cycle, since a
/// `.pcm` cannot be built before an interface it itself imports.
pub fn order_module_units(units: &[ModuleUnit]) -> Result<Vec<ModuleUnit>, ToolchainError> {
    let by_name: HashMap<&str, &ModuleUnit> =
        units.iter().map(|u| (u.module_name.as_str(), u)).collect();

    let mut ordered = Vec::with_capacity(units.len());
    let mut visited = HashSet::new();
    let mut in_progress = HashSet::new();

    for unit in units {
        visit(unit, &by_name, &mut visited, &mut in_progress, &mut ordered)?;
    }

    Ok(ordered)
}

/// Scans a module interface's top-level `export module`/`import` directives for the
/// Scheduler's ordering pass. Deliberately line-oriented rather than a full
/// preprocessor/parser: only recognizes directives written on their own line (after
/// trimming whitespace), which is how module interfaces are written in practice, and
/// errs toward under- rather than over-recognition.
pub fn scan_module_declarations(source: &str) -> (Option<String>, Vec<String>) {
    let mut module_name = None;
    let mut imports = Vec::new();

    for raw_line in source.lines() {
        let line = raw_line.trim();
        if let Some(rest) = line.strip_prefix("export module ").or_else(|| line.strip_prefix("module ")) {
            if let Some(name) = first_token(rest) {
                module_name = Some(name.to_string());
            }
        } else if let Some(rest) = line.strip_prefix("import ") {
            if let Some(name) = first_token(rest) {
                // Header-unit and system imports (`import <vector>;`, `import "foo.h";`)
                // have no interface of their own in this project to order against.
                if !name.starts_with('<') && !name.starts_with('"') {
                    imports.push(name.to_string());
                }
            }
        }
    }

    (module_name, imports)
}

fn first_token(rest: &str) -> Option<&str> {
    let token = rest.split([';', ' ', '\t', ':']).next()?;
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

fn visit<'a>(
    unit: &'a ModuleUnit,
    by_name: &HashMap<&str, &'a ModuleUnit>,
    visited: &mut HashSet<String>,
    in_progress: &mut HashSet<String>,
    ordered: &mut Vec<ModuleUnit>,
) -> Result<(), ToolchainError> {
    if visited.contains(&unit.module_name) {
        return Ok(());
    }
    if in_progress.contains(&unit.module_name) {
        return Err(ToolchainError::ModuleOrderViolation(unit.module_name.clone()));
    }
    in_progress.insert(unit.module_name.clone());

    for imported in &unit.imports {
        if let Some(dep) = by_name.get(imported.as_str()) {
            visit(dep, by_name, visited, in_progress, ordered)?;
        }
        // An import of a module this project doesn't provide an interface for (e.g. a
        // system or dependency module) is resolved by the toolchain at compile time,
        // not here.
    }

    in_progress.remove(&unit.module_name);
    visited.insert(unit.module_name.clone());
    ordered.push(unit.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str, imports: &[&str]) -> ModuleUnit {
        ModuleUnit {
            module_name: name.to_string(),
            source: std::path::PathBuf::from(format!("{name}.cppm")),
            imports: imports.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn orders_dependency_before_dependent() {
        let units = vec![unit("app", &["core"]), unit("core", &[])];
        let ordered = order_module_units(&units).unwrap();
        let names: Vec<_> = ordered.iter().map(|u| u.module_name.as_str()).collect();
        assert_eq!(names, vec!["core", "app"]);
    }

    #[test]
    fn detects_cycle() {
        let units = vec![unit("a", &["b"]), unit("b", &["a"])];
        let err = order_module_units(&units).unwrap_err();
        assert!(matches!(err, ToolchainError::ModuleOrderViolation(_)));
    }

    #[test]
    fn independent_units_keep_stable_relative_order() {
        let units = vec![unit("a", &[]), unit("b", &[])];
        let ordered = order_module_units(&units).unwrap();
        let names: Vec<_> = ordered.iter().map(|u| u.module_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
