//! CLI surface (§10): the six verbs from §6, plus shell-completion generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Message output format for build commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MessageFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// Machine-readable JSON output, one event per line
    Json,
}

/// Forge - a declarative, multi-platform build orchestrator for native code.
#[derive(Parser)]
#[command(name = "forge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug/info)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Color output: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: String,

    /// Number of parallel compile jobs ("auto" uses cpu_count - 1)
    #[arg(short, long, global = true)]
    pub jobs: Option<String>,

    /// Output format for build/info results
    #[arg(long, global = true, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// The global flags, detached from `Cli::command` so each subcommand module can take
/// them without also taking ownership of the `Commands` enum.
pub struct GlobalFlags {
    pub quiet: bool,
    pub verbose: bool,
    pub color: String,
    pub jobs: Option<String>,
    pub message_format: MessageFormat,
}

impl From<&Cli> for GlobalFlags {
    fn from(cli: &Cli) -> Self {
        GlobalFlags {
            quiet: cli.quiet,
            verbose: cli.verbose,
            color: cli.color.clone(),
            jobs: cli.jobs.clone(),
            message_format: cli.message_format,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the workspace (or a subset of it)
    Build(BuildArgs),

    /// Equivalent to `clean` followed by `build` for the selected scope
    Rebuild(BuildArgs),

    /// Remove build artifacts
    Clean(CleanArgs),

    /// Build (unless `--no-build`) and run the startup project's executable
    Run(RunArgs),

    /// Build and run every project of kind test-suite
    Test(TestArgs),

    /// Emit the resolved workspace model
    Info(InfoArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// A user-declared option override, `KEY` or `KEY=VALUE` (§3 "ordered list of
/// custom user-declared options"). Repeatable: `--option sdl3-root=/opt/sdl3`.
#[derive(Args)]
pub struct BuildArgs {
    /// Configuration name (defaults to the workspace's first declared configuration)
    #[arg(long, value_name = "NAME")]
    pub config: Option<String>,

    /// Target platform, `OS-ARCH` or `OS-ARCH-ENV` (defaults to the host platform)
    #[arg(long, value_name = "OS-ARCH[-ENV]")]
    pub platform: Option<String>,

    /// Project(s) to build (defaults to every project in the workspace)
    #[arg(long = "target", value_name = "PROJECT")]
    pub targets: Vec<String>,

    /// Disable the three-tier cache for this run
    #[arg(long)]
    pub no_cache: bool,

    /// Filter action verb (`build`, `gen-*`, …) evaluated by filter blocks
    #[arg(long, default_value = "build")]
    pub action: String,

    /// A user-declared option override, `KEY` or `KEY=VALUE`
    #[arg(long = "option", value_name = "KEY[=VALUE]")]
    pub options: Vec<String>,
}

#[derive(Args)]
pub struct CleanArgs {
    /// Also remove the per-workspace cache directory
    #[arg(long)]
    pub all: bool,

    /// Configuration to clean (defaults to every configuration)
    #[arg(long, value_name = "NAME")]
    pub config: Option<String>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Project to run (defaults to the workspace's startup project)
    pub project: Option<String>,

    /// Skip the build step and run the existing artifact
    #[arg(long)]
    pub no_build: bool,

    /// Configuration name
    #[arg(long, value_name = "NAME")]
    pub config: Option<String>,

    /// Target platform, `OS-ARCH` or `OS-ARCH-ENV`
    #[arg(long, value_name = "OS-ARCH[-ENV]")]
    pub platform: Option<String>,

    /// Arguments passed through to the executable
    #[arg(last = true)]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct TestArgs {
    /// Specific test-suite projects to run (defaults to every test-suite project)
    pub targets: Vec<String>,

    /// Configuration name
    #[arg(long, value_name = "NAME")]
    pub config: Option<String>,

    /// Target platform, `OS-ARCH` or `OS-ARCH-ENV`
    #[arg(long, value_name = "OS-ARCH[-ENV]")]
    pub platform: Option<String>,

    /// Disable the three-tier cache for this run
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Args)]
pub struct InfoArgs {
    /// Include filter-resolved per-project detail, not just the workspace summary
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration to resolve against
    #[arg(long, value_name = "NAME")]
    pub config: Option<String>,

    /// Platform to resolve against, `OS-ARCH` or `OS-ARCH-ENV`
    #[arg(long, value_name = "OS-ARCH[-ENV]")]
    pub platform: Option<String>,
}
