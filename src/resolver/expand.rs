//! Variable expansion service: `%{group.field}` tokens, single-pass (§4.1).

use std::collections::HashMap;

/// The token groups available during expansion for one `(project, context)` resolution.
#[derive(Debug, Default)]
pub struct TokenContext {
    /// `wks.*` — workspace-level fields.
    pub workspace: HashMap<String, String>,
    /// `prj.*` — the project currently being resolved.
    pub project: HashMap<String, String>,
    /// `cfg.*` — the active build context.
    pub config: HashMap<String, String>,
    /// Cross-project tokens: `%{OtherProject.field}`, keyed by project name then field.
    pub other_projects: HashMap<String, HashMap<String, String>>,
}

impl TokenContext {
    fn lookup(&self, group: &str, field: &str) -> Option<&str> {
        let map = match group {
            "wks" => &self.workspace,
            "prj" => &self.project,
            "cfg" => &self.config,
            other => self.other_projects.get(other)?,
        };
        map.get(field).map(String::as_str)
    }
}

/// Expands every `%{group.field}` token in `template` exactly once. Unknown tokens
/// (unknown group, unknown field, or `%{env.NAME}` for an unset env var) are left
/// untouched in the output and reported via `warnings`; this never fails the build.
/// `%{env.NAME}` is resolved directly from the process environment.
pub fn expand(template: &str, ctx: &TokenContext, warnings: &mut Vec<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && bytes.get(i + 1) == Some(&b'{') {
            if let Some(end) = template[i + 2..].find('}') {
                let token = &template[i + 2..i + 2 + end];
                match expand_token(token, ctx) {
                    Some(value) => {
                        out.push_str(&normalize_path_separators(&value));
                        i += 2 + end + 1;
                        continue;
                    }
                    None => {
                        warnings.push(format!("unknown token `%{{{token}}}`"));
                        out.push_str(&template[i..i + 2 + end + 1]);
                        i += 2 + end + 1;
                        continue;
                    }
                }
            }
        }
        // Copy one char (not necessarily one byte) verbatim.
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn expand_token(token: &str, ctx: &TokenContext) -> Option<String> {
    let (group, field) = token.split_once('.')?;
    if group == "env" {
        return std::env::var(field).ok();
    }
    ctx.lookup(group, field).map(str::to_string)
}

fn normalize_path_separators(s: &str) -> String {
    s.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_known_token() {
        let mut ctx = TokenContext::default();
        ctx.project.insert("name".to_string(), "App".to_string());
        let mut warnings = Vec::new();
        let result = expand("obj/%{prj.name}", &ctx, &mut warnings);
        assert_eq!(result, "obj/App");
        assert!(warnings.is_empty());
    }

    #[test]
    fn unknown_token_preserved_literally() {
        let ctx = TokenContext::default();
        let mut warnings = Vec::new();
        let result = expand("%{Jenga.Unitest.Source}", &ctx, &mut warnings);
        assert_eq!(result, "%{Jenga.Unitest.Source}");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn single_pass_no_rescan() {
        // If expansion were re-scanned, this would recurse into wks.location's own
        // value; single-pass must leave the inner token as emitted literal text.
        let mut ctx = TokenContext::default();
        ctx.workspace.insert("location".to_string(), "%{prj.name}".to_string());
        let mut warnings = Vec::new();
        let result = expand("%{wks.location}", &ctx, &mut warnings);
        assert_eq!(result, "%{prj.name}");
    }

    #[test]
    fn cross_project_token() {
        let mut ctx = TokenContext::default();
        let mut other = HashMap::new();
        other.insert("targetdir".to_string(), "bin/Debug".to_string());
        ctx.other_projects.insert("MathLib".to_string(), other);
        let mut warnings = Vec::new();
        let result = expand("%{MathLib.targetdir}/lib.a", &ctx, &mut warnings);
        assert_eq!(result, "bin/Debug/lib.a");
    }

    #[test]
    fn paths_normalized_forward_slash() {
        let mut ctx = TokenContext::default();
        ctx.project.insert("location".to_string(), "C:\\src\\app".to_string());
        let mut warnings = Vec::new();
        let result = expand("%{prj.location}", &ctx, &mut warnings);
        assert_eq!(result, "C:/src/app");
    }
}
