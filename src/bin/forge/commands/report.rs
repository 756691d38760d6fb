//! Renders a `BuildReport` as either human-readable lines or `--message-format json`
//! events (§10).

use anyhow::Result;
use forge::builder::events::BuildEvent;
use forge::{BuildReport, ProjectStatus};

use crate::cli::MessageFormat;

pub fn report_build(report: &BuildReport, format: MessageFormat, quiet: bool) -> Result<()> {
    match format {
        MessageFormat::Json => {
            for (name, status) in &report.statuses {
                let event = match status {
                    ProjectStatus::Built => BuildEvent::artifact(name.clone(), name.clone(), Vec::new()),
                    ProjectStatus::Failed => BuildEvent::error(name.clone(), "build failed"),
                    ProjectStatus::Skipped => BuildEvent::warning(name.clone(), "skipped: a dependency failed"),
                    ProjectStatus::Cancelled => BuildEvent::warning(name.clone(), "cancelled"),
                };
                println!("{}", event.to_json());
            }
            println!("{}", BuildEvent::finished(report.success(), 0).to_json());
        }
        MessageFormat::Human => {
            if !quiet {
                for (name, status) in &report.statuses {
                    match status {
                        ProjectStatus::Built => eprintln!("   Compiling {name}"),
                        ProjectStatus::Skipped => eprintln!("    Skipping {name} (dependency failed)"),
                        ProjectStatus::Cancelled => eprintln!("  Cancelled {name}"),
                        ProjectStatus::Failed => eprintln!("     Failed {name}"),
                    }
                }
            }
            if report.success() {
                if !quiet {
                    eprintln!("    Finished build");
                }
            } else if report.cancelled() {
                eprintln!("   Cancelled build");
            } else {
                eprintln!("     Failed build");
            }
        }
    }

    if !report.success() {
        anyhow::bail!("build failed");
    }
    Ok(())
}
