//! Core error types for T6Inject

use std::path::PathBuf;
use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum InjectError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Toolchain not configured: {0}")]
    ToolchainNotConfigured(String),

    #[error("Failed to start {}: {source}", .program.display())]
    ProcessLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compile failed: {}", .diagnostics.first().map(String::as_str).unwrap_or("no diagnostics"))]
    CompileFailure { diagnostics: Vec<String> },

    #[error("Compiler reported success but {} does not exist", .0.display())]
    OutputMissing(PathBuf),

    #[error("gsc-tool did not exit within {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl InjectError {
    /// Build an `Io` error that keeps the original kind but names what failed.
    pub fn io_context(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        InjectError::Io(std::io::Error::new(err.kind(), format!("{}: {}", context, err)))
    }
}

pub type Result<T> = std::result::Result<T, InjectError>;
