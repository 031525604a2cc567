//! External tool stages: build and run the cleanup and OCR command lines.
//!
//! Each stage is one child process. Tools always receive absolute paths, so
//! an input whose name starts with `-` can never be mistaken for a flag.
//! stdin is closed and stdout/stderr are captured; the tail of stderr ends
//! up in the failure detail.

use crate::config::BatchConfig;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// How many trailing stderr lines are kept in a [`StageFailure`].
const STDERR_TAIL_LINES: usize = 5;

/// A program plus its arguments, ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    pub program: String,
    pub args: Vec<OsString>,
}

impl fmt::Display for StageCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {:?}", arg)?;
        }
        Ok(())
    }
}

/// Why a stage did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub detail: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

/// `<cleanup_tool> <input> <temp>`
pub fn cleanup_command(config: &BatchConfig, input: &Path, temp: &Path) -> StageCommand {
    StageCommand {
        program: config.cleanup_tool.clone(),
        args: vec![input.as_os_str().to_owned(), temp.as_os_str().to_owned()],
    }
}

/// `<ocr_tool> -l <lang> [--skip-text] --output-type pdf --image-dpi <dpi> <temp> <output>`
pub fn ocr_command(config: &BatchConfig, temp: &Path, output: &Path) -> StageCommand {
    let mut args: Vec<OsString> = vec!["-l".into(), config.language.clone().into()];
    if config.skip_text {
        args.push("--skip-text".into());
    }
    args.push(OsString::from("--output-type"));
    args.push(OsString::from("pdf"));
    args.push(OsString::from("--image-dpi"));
    args.push(OsString::from(config.fallback_dpi.to_string()));
    args.push(temp.as_os_str().to_owned());
    args.push(output.as_os_str().to_owned());
    StageCommand {
        program: config.ocr_tool.clone(),
        args,
    }
}

/// Run a stage to completion, optionally bounded by `timeout`.
pub async fn run_stage(command: &StageCommand, timeout: Option<Duration>) -> Result<(), StageFailure> {
    debug!("Running: {}", command);

    let child = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| StageFailure {
            detail: format!("could not run '{}': {}", command.program, e),
        })?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| StageFailure {
                detail: format!("'{}' timed out after {:?}", command.program, limit),
            })?,
        None => child.wait_with_output().await,
    }
    .map_err(|e| StageFailure {
        detail: format!("waiting for '{}' failed: {}", command.program, e),
    })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let tail = stderr_tail(&stderr, STDERR_TAIL_LINES);
    let detail = if tail.is_empty() {
        format!("'{}' exited with {}", command.program, output.status)
    } else {
        format!("'{}' exited with {}: {}", command.program, output.status, tail)
    };
    Err(StageFailure { detail })
}

/// Last `n` non-empty lines of `stderr`, joined with ` | `.
fn stderr_tail(stderr: &str, n: usize) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join(" | ")
}
