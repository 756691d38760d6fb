//! Command implementations

pub mod build;
pub mod clean;
pub mod common;
pub mod completions;
pub mod info;
pub mod rebuild;
pub mod report;
pub mod run;
pub mod test;
