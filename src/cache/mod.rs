//! The Cache (§4.4): three tiers consulted in order for every compile unit, all
//! three must agree for a hit. Sidecars live next to the object: `F.d` (Tier 2
//! header list) and `F.sig` (Tier 3 digest, which also embeds the Tier-1 mtime
//! watermark so a single file read settles Tiers 1 and 3 — §9 design note).

pub mod depfile;
pub mod fingerprint;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The `.sig` sidecar's on-disk shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SignatureSidecar {
    /// Tier-1 watermark: the source's mtime (as seconds since epoch) at the time of
    /// the compile that produced this object.
    source_mtime: u64,
    /// Tier-3 identity signature.
    signature: String,
}

/// Outcome of a cache check for one compile unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

fn depfile_path(object: &Path) -> PathBuf {
    object.with_extension("d")
}

fn sigfile_path(object: &Path) -> PathBuf {
    object.with_extension("sig")
}

fn mtime_secs(path: &Path) -> Result<u64> {
    let meta = fs::metadata(path).with_context(|| format!("failed to stat {}", path.display()))?;
    let modified = meta.modified().with_context(|| format!("no mtime for {}", path.display()))?;
    Ok(modified
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0))
}

/// Checks whether `object` is up to date for `source` against the expected Tier-3
/// `signature`. Returns `Miss` (never an error) on any cache corruption — malformed
/// sidecars are treated as a miss and are overwritten by the next successful compile
/// (§7 "Cache corruption").
pub fn check(source: &Path, object: &Path, expected_signature: &str, no_cache: bool) -> CacheStatus {
    if no_cache {
        return CacheStatus::Miss;
    }
    if !object.is_file() {
        return CacheStatus::Miss;
    }

    let Ok(object_mtime) = mtime_secs(object) else {
        return CacheStatus::Miss;
    };

    let sig_path = sigfile_path(object);
    let Ok(sig_contents) = fs::read_to_string(&sig_path) else {
        return CacheStatus::Miss;
    };
    let Ok(sidecar) = serde_json::from_str::<SignatureSidecar>(&sig_contents) else {
        return CacheStatus::Miss;
    };

    // Tier 1: source mtime vs. the watermark recorded at the last successful compile.
    let Ok(source_mtime) = mtime_secs(source) else {
        return CacheStatus::Miss;
    };
    if source_mtime > sidecar.source_mtime {
        return CacheStatus::Miss;
    }

    // Tier 3: identity signature.
    if sidecar.signature != expected_signature {
        return CacheStatus::Miss;
    }

    // Tier 2: every header the last compile recorded must not be newer than the object.
    let dep_path = depfile_path(object);
    if let Ok(dep_contents) = fs::read_to_string(&dep_path) {
        for header in depfile::parse_depfile(&dep_contents, source) {
            match mtime_secs(&header) {
                Ok(header_mtime) if header_mtime <= object_mtime => continue,
                _ => return CacheStatus::Miss,
            }
        }
    }

    CacheStatus::Hit
}

/// Writes the `.d` and `.sig` sidecars for a successful compile, atomically
/// (temp-file-then-rename per object, so concurrent workers never observe a
/// half-written sidecar — §5 "shared-resource policy").
pub fn record(source: &Path, object: &Path, depfile_contents: &str, signature: &str) -> Result<()> {
    let source_mtime = mtime_secs(source).unwrap_or(0);
    let sidecar = SignatureSidecar { source_mtime, signature: signature.to_string() };
    let sig_json = serde_json::to_string(&sidecar)?;

    write_atomic(&sigfile_path(object), sig_json.as_bytes())?;
    write_atomic(&depfile_path(object), depfile_contents.as_bytes())?;
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().context("cache sidecar path has no parent directory")?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file next to {}", path.display()))?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|e| e.error).with_context(|| format!("failed to rename into {}", path.display()))?;
    Ok(())
}

/// Removes every cache sidecar under `dir` (used by `clean --all`, §6).
pub fn clean_dir(dir: &Path) -> Result<()> {
    crate::util::fs::remove_dir_all_if_exists(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn miss_when_object_absent() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("main.cpp");
        fs::write(&source, "int main(){}").unwrap();
        let object = tmp.path().join("main.o");
        assert_eq!(check(&source, &object, "abc", false), CacheStatus::Miss);
    }

    #[test]
    fn hit_after_record_with_matching_signature() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("main.cpp");
        fs::write(&source, "int main(){}").unwrap();
        let object = tmp.path().join("main.o");
        fs::write(&object, "object bytes").unwrap();

        record(&source, &object, "main.o: main.cpp\n", "sig-1").unwrap();
        assert_eq!(check(&source, &object, "sig-1", false), CacheStatus::Hit);
    }

    #[test]
    fn miss_when_signature_changes() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("main.cpp");
        fs::write(&source, "int main(){}").unwrap();
        let object = tmp.path().join("main.o");
        fs::write(&object, "object bytes").unwrap();

        record(&source, &object, "main.o: main.cpp\n", "sig-1").unwrap();
        assert_eq!(check(&source, &object, "sig-2", false), CacheStatus::Miss);
    }

    #[test]
    fn no_cache_flag_always_misses() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("main.cpp");
        fs::write(&source, "int main(){}").unwrap();
        let object = tmp.path().join("main.o");
        fs::write(&object, "object bytes").unwrap();

        record(&source, &object, "main.o: main.cpp\n", "sig-1").unwrap();
        assert_eq!(check(&source, &object, "sig-1", true), CacheStatus::Miss);
    }

    #[test]
    fn miss_when_header_newer_than_object() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("main.cpp");
        fs::write(&source, "int main(){}").unwrap();
        let header = tmp.path().join("header.h");
        fs::write(&header, "// v1").unwrap();
        let object = tmp.path().join("main.o");
        fs::write(&object, "object bytes").unwrap();

        record(&source, &object, "main.o: main.cpp header.h\n", "sig-1").unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        fs::write(&header, "// v2").unwrap();

        assert_eq!(check(&source, &object, "sig-1", false), CacheStatus::Miss);
    }
}
