//! Toolchain Abstraction error taxonomy.

use thiserror::Error;

#[derive(Debug, Error, miette::Diagnostic)]
pub enum ToolchainError {
    #[error("{family} has no equivalent for `{feature}`; skipping rather than mistranslating")]
    #[diagnostic(code(forge::toolchain::unsupported_feature))]
    UnsupportedFeature { family: &'static str, feature: String },

    #[error("toolchain `{name}` executable not found: {path}")]
    #[diagnostic(
        code(forge::toolchain::not_found),
        help("check the toolchain's `cc`/`cxx` paths, or set the CC/CXX environment variables")
    )]
    ToolNotFound { name: String, path: String },

    #[error("module interface `{0}` must be compiled before the units that import it")]
    #[diagnostic(code(forge::toolchain::module_order))]
    ModuleOrderViolation(String),
}
