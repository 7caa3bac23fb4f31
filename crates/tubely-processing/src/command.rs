//! External tool invocation
//!
//! Every subprocess goes through [`CommandRunner`] so probing and remuxing can be driven by a
//! test double. The tokio implementation bounds each run with a deadline and kills the child
//! when the deadline passes or the caller is cancelled.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{ProcessingError, ProcessingResult};

/// Diagnostics kept from a failing tool's stderr
const MAX_DIAGNOSTIC_BYTES: usize = 4096;

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub status_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Turn a nonzero exit into `ToolFailed` carrying the tool's stderr.
    pub fn into_result(self, tool: &str) -> ProcessingResult<Self> {
        if self.success {
            return Ok(self);
        }
        let mut diagnostic = String::from_utf8_lossy(&self.stderr).trim().to_string();
        if diagnostic.len() > MAX_DIAGNOSTIC_BYTES {
            let mut cut = MAX_DIAGNOSTIC_BYTES;
            while !diagnostic.is_char_boundary(cut) {
                cut -= 1;
            }
            diagnostic.truncate(cut);
        }
        if diagnostic.is_empty() {
            diagnostic = match self.status_code {
                Some(code) => format!("exited with status {}", code),
                None => "terminated by signal".to_string(),
            };
        }
        Err(ProcessingError::ToolFailed {
            tool: tool.to_string(),
            diagnostic,
        })
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` to completion, or fail with `TimedOut` after `timeout`.
    async fn run(
        &self,
        program: &str,
        args: &[OsString],
        timeout: Duration,
    ) -> ProcessingResult<CommandOutput>;
}

/// Short tool name for logs and errors (`/usr/bin/ffprobe` -> `ffprobe`)
pub fn tool_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(program)
        .to_string()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    #[tracing::instrument(skip(self, args), fields(process.executable.path = %program))]
    async fn run(
        &self,
        program: &str,
        args: &[OsString],
        timeout: Duration,
    ) -> ProcessingResult<CommandOutput> {
        let tool = tool_name(program);
        let start = std::time::Instant::now();

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessingError::Spawn {
                tool: tool.clone(),
                source,
            })?;

        // On timeout the wait future is dropped with the child, which kills it.
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    tool = %tool,
                    timeout_secs = timeout.as_secs_f64(),
                    "External tool timed out, process killed"
                );
                return Err(ProcessingError::TimedOut { tool, timeout });
            }
        };

        tracing::debug!(
            tool = %tool,
            status = ?output.status.code(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "External tool finished"
        );

        Ok(CommandOutput {
            success: output.status.success(),
            status_code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

/// Validate that a configured tool path doesn't contain shell metacharacters
pub fn validate_tool_path(path: &str) -> ProcessingResult<()> {
    if path.trim().is_empty() {
        return Err(ProcessingError::InvalidToolPath("empty path".to_string()));
    }

    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProcessingError::InvalidToolPath(format!(
            "contains dangerous characters: {}",
            path
        )));
    }

    Ok(())
}
