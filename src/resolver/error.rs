//! Resolution error taxonomy (§7: configuration errors and resolution errors).

use thiserror::Error;

#[derive(Debug, Error, miette::Diagnostic)]
pub enum ResolveError {
    #[error("glob patterns for project `{project}` matched zero sources")]
    #[diagnostic(
        code(forge::resolve::empty_sources),
        help("check the `files` patterns against the project's `location`")
    )]
    EmptySources { project: String },

    #[error("project `{project}` links undefined project `{target}`")]
    #[diagnostic(code(forge::resolve::undefined_link))]
    UndefinedLink { project: String, target: String },

    #[error("no toolchain matches platform `{platform}` for project `{project}`")]
    #[diagnostic(
        code(forge::resolve::no_toolchain),
        help("register a toolchain for this platform, or set `usetoolchain` explicitly")
    )]
    NoMatchingToolchain { project: String, platform: String },

    #[error("project `{project}` requests unknown toolchain `{name}`")]
    #[diagnostic(code(forge::resolve::unknown_toolchain))]
    UnknownToolchain { project: String, name: String },

    #[error("toolchain family `{family}` cannot compile language `{language}` for project `{project}`")]
    #[diagnostic(code(forge::resolve::incompatible_toolchain))]
    IncompatibleToolchain { project: String, family: String, language: String },

    #[error("dependency cycle detected among projects: {}", .projects.join(", "))]
    #[diagnostic(
        code(forge::resolve::cycle),
        help("break the cycle by removing one `dependson` edge")
    )]
    Cycle { projects: Vec<String> },

    #[error("filter expression error in project `{project}`: {source}")]
    #[diagnostic(code(forge::resolve::filter_syntax))]
    FilterSyntax {
        project: String,
        #[source]
        source: crate::core::filter::FilterParseError,
    },

    #[error("unknown cross-project token reference to `{0}`")]
    #[diagnostic(code(forge::resolve::unknown_token_project))]
    UnknownTokenProject(String),
}
