//! Parses Make-style dependency files (`-MD -MF`, §4.4 Tier 2).

use std::path::{Path, PathBuf};

/// Parses a `.d` file's header list, dropping the `target:` prefix and the source
/// file itself (the caller already has Tier-1 mtime coverage for the source).
///
/// Make dependency files use backslash-newline continuations and escape spaces with
/// `\ `; both are unescaped here. Malformed input yields an empty list rather than an
/// error — a missing depfile degrades gracefully to Tier-1-only checking rather than
/// blocking the build (§7 "Cache corruption").
pub fn parse_depfile(contents: &str, source: &Path) -> Vec<PathBuf> {
    let joined = contents.replace("\\\n", " ");

    let Some(colon) = joined.find(':') else {
        return Vec::new();
    };
    let deps_part = &joined[colon + 1..];

    let mut headers = Vec::new();
    let mut current = String::new();
    let mut chars = deps_part.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&' ') => {
                current.push(' ');
                chars.next();
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    headers.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        headers.push(current);
    }

    headers
        .into_iter()
        .map(PathBuf::from)
        .filter(|p| p != source)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_depfile() {
        let contents = "main.o: main.cpp header.h other/header.h\n";
        let headers = parse_depfile(contents, Path::new("main.cpp"));
        assert_eq!(headers, vec![PathBuf::from("header.h"), PathBuf::from("other/header.h")]);
    }

    #[test]
    fn handles_line_continuations() {
        let contents = "main.o: main.cpp \\\n  a.h \\\n  b.h\n";
        let headers = parse_depfile(contents, Path::new("main.cpp"));
        assert_eq!(headers, vec![PathBuf::from("a.h"), PathBuf::from("b.h")]);
    }

    #[test]
    fn handles_escaped_spaces_in_paths() {
        let contents = "main.o: main.cpp My\\ Headers/a.h\n";
        let headers = parse_depfile(contents, Path::new("main.cpp"));
        assert_eq!(headers, vec![PathBuf::from("My Headers/a.h")]);
    }

    #[test]
    fn malformed_input_yields_empty() {
        assert!(parse_depfile("garbage with no colon", Path::new("main.cpp")).is_empty());
    }
}
