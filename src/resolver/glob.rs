//! Glob expansion service (§4.1): `**`, `*`, `?`, leading `!` exclusion, deterministic
//! alphabetical ordering. Builds on `util::fs::glob_files`'s sort+dedup idiom but adds
//! the exclusion-after-inclusion pass and hidden-file suppression the resolver needs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;

/// Expands `include` patterns against `base`, then removes anything matched by a
/// `!`-prefixed pattern inside `include` or by `explicit_excludes`. Hidden files
/// (leading dot) are dropped unless a pattern explicitly names them verbatim.
pub fn expand_sources(
    base: &Path,
    include: &[String],
    explicit_excludes: &[String],
) -> Result<Vec<PathBuf>> {
    let mut include_patterns = Vec::new();
    let mut negated = Vec::new();

    for pattern in include {
        if let Some(stripped) = pattern.strip_prefix('!') {
            negated.push(stripped.to_string());
        } else {
            include_patterns.push(pattern.clone());
        }
    }

    let mut results = crate::util::fs::glob_files(base, &include_patterns)?;
    results.retain(|path| !is_hidden(base, path, &include_patterns));

    let mut exclude_patterns: Vec<Pattern> = Vec::new();
    for pattern in negated.iter().chain(explicit_excludes.iter()) {
        let compiled = Pattern::new(pattern)
            .with_context(|| format!("invalid exclusion glob pattern: {pattern}"))?;
        exclude_patterns.push(compiled);
    }

    if !exclude_patterns.is_empty() {
        results.retain(|path| {
            let rel = crate::util::fs::relative_path(base, path);
            let rel_str = rel.to_string_lossy().replace('\\', "/");
            !exclude_patterns.iter().any(|p| p.matches(&rel_str))
        });
    }

    results.sort();
    results.dedup();
    Ok(results)
}

fn is_hidden(base: &Path, path: &Path, explicit_patterns: &[String]) -> bool {
    let rel = crate::util::fs::relative_path(base, path);
    let hidden = rel.components().any(|c| {
        c.as_os_str().to_str().map(|s| s.starts_with('.') && s != "." && s != "..").unwrap_or(false)
    });
    if !hidden {
        return false;
    }
    // A pattern that names the hidden file/dir verbatim (no wildcard) still matches it.
    let rel_str = rel.to_string_lossy().replace('\\', "/");
    !explicit_patterns.iter().any(|p| p == &rel_str || p.contains(&rel_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn recursive_double_star() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src/nested")).unwrap();
        fs::write(tmp.path().join("src/a.cpp"), "").unwrap();
        fs::write(tmp.path().join("src/nested/b.cpp"), "").unwrap();
        fs::write(tmp.path().join("src/nested/readme.md"), "").unwrap();

        let found = expand_sources(tmp.path(), &["src/**/*.cpp".to_string()], &[]).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn negated_pattern_excludes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.cpp"), "").unwrap();
        fs::write(tmp.path().join("src/a_test.cpp"), "").unwrap();

        let found =
            expand_sources(tmp.path(), &["src/*.cpp".to_string(), "!src/*_test.cpp".to_string()], &[])
                .unwrap();
        assert_eq!(found, vec![tmp.path().join("src/a.cpp")]);
    }

    #[test]
    fn explicit_and_negated_excludes_never_overlap_includes() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/a.cpp"), "").unwrap();
        fs::write(tmp.path().join("src/b.cpp"), "").unwrap();

        let found = expand_sources(
            tmp.path(),
            &["src/*.cpp".to_string()],
            &["src/b.cpp".to_string()],
        )
        .unwrap();
        assert_eq!(found, vec![tmp.path().join("src/a.cpp")]);
    }

    #[test]
    fn deterministic_alphabetical_order() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("src")).unwrap();
        fs::write(tmp.path().join("src/z.cpp"), "").unwrap();
        fs::write(tmp.path().join("src/a.cpp"), "").unwrap();
        let found = expand_sources(tmp.path(), &["src/*.cpp".to_string()], &[]).unwrap();
        assert_eq!(found, vec![tmp.path().join("src/a.cpp"), tmp.path().join("src/z.cpp")]);
    }
}
