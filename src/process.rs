//! External command execution.
//!
//! Runs a program to completion inside a working directory and reports only
//! its stderr on failure. Output files are the caller's business.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The process never started (missing binary, permissions, bad cwd)
    #[error("failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Started, but collecting its exit status or stderr failed
    #[error("lost track of {}: {source}", .program.display())]
    Wait {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit; `stderr` is the trimmed error output
    #[error("{stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("{} did not finish within {}s and was killed", .program.display(), .after.as_secs())]
    TimedOut { program: PathBuf, after: Duration },
}

/// Run `program` with `args` in `dir` and wait for it to exit.
///
/// With a `timeout`, the child is killed once the deadline passes.
pub async fn run_command_in_path<I, S>(
    dir: &Path,
    program: &Path,
    args: I,
    timeout: Option<Duration>,
) -> Result<(), ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let child = Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ToolError::Launch {
            program: program.to_path_buf(),
            source,
        })?;

    let output = match timeout {
        Some(after) => match tokio::time::timeout(after, child.wait_with_output()).await {
            Ok(result) => result,
            // Dropping the future drops the child, which kills it
            Err(_) => {
                return Err(ToolError::TimedOut {
                    program: program.to_path_buf(),
                    after,
                })
            }
        },
        None => child.wait_with_output().await,
    }
    .map_err(|source| ToolError::Wait {
        program: program.to_path_buf(),
        source,
    })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(ToolError::Failed {
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
