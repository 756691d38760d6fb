//! External-workspace-inclusion records (§3). The inclusion apparatus itself — locating
//! and parsing the external script — is a front-end concern; the core only sees the
//! resulting tag alongside the merged project list.

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ExternalInclusion {
    pub source_file: PathBuf,
    pub whitelist: Option<Vec<String>>,
    pub blacklist: Option<Vec<String>>,
}

impl ExternalInclusion {
    pub fn new(source_file: impl Into<PathBuf>) -> Self {
        ExternalInclusion { source_file: source_file.into(), whitelist: None, blacklist: None }
    }

    pub fn allows(&self, project_name: &str) -> bool {
        if let Some(blacklist) = &self.blacklist {
            if blacklist.iter().any(|n| n == project_name) {
                return false;
            }
        }
        match &self.whitelist {
            Some(whitelist) => whitelist.iter().any(|n| n == project_name),
            None => true,
        }
    }
}
