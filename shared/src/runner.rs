//! Subprocess invocation with a per-call timeout
//!
//! Every tool call in the crate goes through [`CommandRunner`]. The real
//! implementation spawns the binary with tokio; tests substitute a scripted
//! runner so parsing and control flow can be exercised without a device.

use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Captured result of a finished tool invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit status was zero
    pub success: bool,

    /// Exit code, if the process was not killed by a signal
    pub code: Option<i32>,

    /// Captured stdout (lossy UTF-8)
    pub stdout: String,

    /// Captured stderr (lossy UTF-8)
    pub stderr: String,
}

impl CommandOutput {
    /// stdout followed by stderr, unmodified
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }

    /// Trimmed stderr if non-empty, else trimmed stdout
    pub fn error_text(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Runs a program to completion, bounded by a timeout
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`.
    ///
    /// A missing binary maps to [`Error::ToolNotFound`] and an expired
    /// timeout to [`Error::Timeout`]. A non-zero exit is *not* an error; it
    /// is reported through [`CommandOutput::success`].
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by real OS processes
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[String], timeout: Duration) -> Result<CommandOutput> {
        debug!("exec: {} {}", program, args.join(" "));

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| spawn_error(program, e))?;

        // Dropping the wait future on timeout drops the child, which kills it
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                debug!("{} timed out after {:?}", program, timeout);
                return Err(Error::timeout(tool_name(program), timeout));
            }
        };

        Ok(CommandOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Map a spawn failure to the crate error, singling out a missing binary
pub(crate) fn spawn_error(program: &str, err: std::io::Error) -> Error {
    if err.kind() == ErrorKind::NotFound {
        Error::tool_not_found(tool_name(program))
    } else {
        Error::Io(err)
    }
}

/// Short tool name for messages: the file stem of `program`
pub(crate) fn tool_name(program: &str) -> String {
    std::path::Path::new(program)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

/// Build an owned argument vector from string slices
pub(crate) fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_is_verbatim() {
        let output = CommandOutput {
            success: false,
            code: Some(1),
            stdout: "Performing Streamed Install\n".to_string(),
            stderr: "adb: failed to install\n".to_string(),
        };
        assert_eq!(
            output.combined(),
            "Performing Streamed Install\nadb: failed to install\n"
        );
        assert_eq!(output.error_text(), "adb: failed to install");
    }

    #[test]
    fn test_tool_name() {
        assert_eq!(tool_name("adb"), "adb");
        assert_eq!(tool_name("/opt/platform-tools/adb"), "adb");
        assert_eq!(tool_name("scrcpy.exe"), "scrcpy");
    }

    #[tokio::test]
    async fn test_missing_binary_is_tool_not_found() {
        let err = ProcessRunner
            .run(
                "droiddeck-definitely-missing-tool",
                &[],
                Duration::from_secs(1),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_reported() {
        let err = ProcessRunner
            .run("sleep", &args(["5"]), Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_captures_stdout_and_status() {
        let output = ProcessRunner
            .run("sh", &args(["-c", "echo hi; exit 3"]), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, "hi\n");
    }
}
