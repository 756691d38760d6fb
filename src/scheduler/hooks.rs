//! Build hooks (§4.5 steps 1, 4, 7): prebuild/prelink/postlink/postbuild command
//! lists, run synchronously in declaration order with the project's location as cwd.

use anyhow::{bail, Result};

use crate::util::process::ProcessBuilder;

/// Runs each hook command in order. A non-zero exit aborts the remaining hooks in
/// this phase and returns an error — the caller treats that as aborting the project.
pub fn run_hooks(hooks: &[String], cwd: &std::path::Path) -> Result<()> {
    for hook in hooks {
        let output = shell_command(hook).cwd(cwd).exec()?;
        if !output.status.success() {
            bail!(
                "hook `{hook}` exited with code {:?}\n{}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
    }
    Ok(())
}

#[cfg(windows)]
fn shell_command(command: &str) -> ProcessBuilder {
    ProcessBuilder::new("cmd").arg("/C").arg(command)
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> ProcessBuilder {
    ProcessBuilder::new("sh").arg("-c").arg(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_hooks_in_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        let marker = tmp.path().join("order.txt");
        let hooks = vec![
            format!("echo one >> {}", marker.display()),
            format!("echo two >> {}", marker.display()),
        ];
        run_hooks(&hooks, tmp.path()).unwrap();
        let contents = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(contents.lines().collect::<Vec<_>>(), vec!["one", "two"]);
    }

    #[test]
    fn nonzero_exit_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let hooks = vec!["exit 1".to_string()];
        assert!(run_hooks(&hooks, tmp.path()).is_err());
    }
}
