//! External command execution

use std::path::Path;
use std::process::Command;
use std::time::Instant;

use tracing::{debug, info};

use crate::repository::Result;
use herald_core::error::GitError;

/// Run a program to completion and return its trimmed stdout.
///
/// Non-zero exit codes become [`GitError::CommandFailed`] carrying stderr.
pub fn run_command(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let start = Instant::now();
    let mut command = Command::new(program);
    command.args(args);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    debug!(program, ?args, "running command");
    let output = command.output()?;

    info!(
        program,
        subcommand = args.first().copied().unwrap_or_default(),
        duration_ms = start.elapsed().as_millis(),
        success = output.status.success(),
        "command finished"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(GitError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            reason: if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            },
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_captures_stdout() {
        let out = run_command("git", &["--version"], None).unwrap();
        assert!(out.starts_with("git version"));
    }

    #[test]
    fn test_run_command_failure() {
        let err = run_command("git", &["definitely-not-a-subcommand"], None).unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { .. }));
    }

    #[test]
    fn test_run_command_missing_program() {
        let err = run_command("herald-no-such-binary", &[], None).unwrap_err();
        assert!(matches!(err, GitError::Io(_)));
    }
}
