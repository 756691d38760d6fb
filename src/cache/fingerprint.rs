//! Tier-3 identity signature (§4.4): a digest over everything that affects a compile
//! unit's argv but that Tiers 1/2 (mtime, header set) can't see — a flag or
//! optimization-level change must force recompilation even if no file's mtime moved.

use crate::toolchain::CompileRequest;
use crate::util::hash::Fingerprint;

/// Inputs to the Tier-3 signature, gathered by the Scheduler before dispatch.
pub struct SignatureInputs<'a> {
    pub compiler_path: &'a str,
    pub compiler_version: &'a str,
    pub argv: &'a [String],
    pub include_dirs: &'a [String],
    pub defines: &'a [String],
    pub configuration: &'a str,
    pub platform: &'a str,
}

/// Computes the Tier-3 identity signature as a hex SHA-256 digest.
pub fn compute_signature(inputs: &SignatureInputs) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(inputs.compiler_path);
    fp.update_str(inputs.compiler_version);
    fp.update_strs(inputs.argv.iter().map(String::as_str));
    fp.update_strs(inputs.include_dirs.iter().map(String::as_str));
    fp.update_strs(inputs.defines.iter().map(String::as_str));
    fp.update_str(inputs.configuration);
    fp.update_str(inputs.platform);
    fp.finish()
}

/// Convenience constructor for the signature inputs straight from a resolved
/// `CompileRequest`, given the already-memoized compiler version string.
pub fn signature_for_request(
    compiler_path: &str,
    compiler_version: &str,
    argv: &[String],
    req: &CompileRequest,
    configuration: &str,
    platform: &str,
) -> String {
    compute_signature(&SignatureInputs {
        compiler_path,
        compiler_version,
        argv,
        include_dirs: req.include_dirs,
        defines: req.defines,
        configuration,
        platform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs<'a>(argv: &'a [String]) -> SignatureInputs<'a> {
        SignatureInputs {
            compiler_path: "/usr/bin/clang++",
            compiler_version: "17.0.0",
            argv,
            include_dirs: &["include".to_string()],
            defines: &["NDEBUG".to_string()],
            configuration: "Release",
            platform: "linux-x86_64",
        }
    }

    #[test]
    fn identical_inputs_produce_identical_signature() {
        let argv = vec!["-O2".to_string()];
        assert_eq!(compute_signature(&inputs(&argv)), compute_signature(&inputs(&argv)));
    }

    #[test]
    fn flag_change_invalidates_signature() {
        let a = vec!["-O0".to_string()];
        let b = vec!["-O2".to_string()];
        assert_ne!(compute_signature(&inputs(&a)), compute_signature(&inputs(&b)));
    }
}
