//! Running gsc-tool and collecting its diagnostics

use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};

use t6inject_config::ToolchainConfig;
use t6inject_core::{DiagnosticRule, InjectError, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::args::display_args;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// What one gsc-tool run left behind
#[derive(Debug)]
pub(crate) struct ToolRun {
    /// Matching stderr lines, in the order received
    pub diagnostics: Vec<String>,
    /// Logged only; success is decided from `diagnostics`
    pub status: ExitStatus,
}

impl ToolRun {
    pub fn failed(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Launch gsc-tool in the toolchain directory and wait for it to finish
///
/// stdout and stderr are read concurrently with the wait so a chatty tool
/// cannot block on a full pipe. The call returns once the process has exited
/// and both streams are at EOF.
pub(crate) async fn run_tool(config: &ToolchainConfig, args: &[OsString]) -> Result<ToolRun> {
    let mut command = Command::new(config.tool_path());
    command
        .args(args)
        .current_dir(config.tool_dir())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    debug!("Running {:?} {}", config.tool_path(), display_args(args));

    let mut child = command.spawn().map_err(|source| InjectError::ProcessLaunch {
        program: config.tool_path().to_path_buf(),
        source,
    })?;

    let rule = config.diagnostic_rule();
    let outcome = match config.timeout() {
        None => drain_and_wait(&mut child, rule).await,
        Some(limit) => {
            let waited = tokio::time::timeout(limit, drain_and_wait(&mut child, rule)).await;
            match waited {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("gsc-tool exceeded {:?}, killing it", limit);
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill gsc-tool: {}", e);
                    }
                    return Err(InjectError::Timeout(limit));
                }
            }
        }
    };

    let (diagnostics, status) =
        outcome.map_err(|e| InjectError::io_context("Failed to read gsc-tool output", e))?;

    debug!("gsc-tool exited with {} ({} diagnostics)", status, diagnostics.len());

    Ok(ToolRun { diagnostics, status })
}

async fn drain_and_wait(
    child: &mut Child,
    rule: &DiagnosticRule,
) -> std::io::Result<(Vec<String>, ExitStatus)> {
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (stdout, stderr, status) = tokio::join!(
        read_lines(stdout),
        read_lines(stderr),
        child.wait()
    );

    for line in stdout? {
        debug!("gsc-tool: {}", line);
    }

    let mut diagnostics = Vec::new();
    for line in stderr? {
        if rule.matches(&line) {
            warn!("{}", line);
            diagnostics.push(line);
        } else if !line.is_empty() {
            debug!("gsc-tool (stderr): {}", line);
        }
    }

    Ok((diagnostics, status?))
}

/// Read a pipe to EOF as lossy UTF-8 lines without trailing `\r`
async fn read_lines<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<String>> {
    let Some(pipe) = pipe else {
        return Ok(Vec::new());
    };

    let mut segments = BufReader::new(pipe).split(b'\n');
    let mut lines = Vec::new();
    while let Some(segment) = segments.next_segment().await? {
        let line = String::from_utf8_lossy(&segment);
        lines.push(line.trim_end_matches('\r').to_string());
    }
    Ok(lines)
}
