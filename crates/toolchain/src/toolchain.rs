//! Syntax checking and compiling through gsc-tool

use std::io::ErrorKind;
use std::path::Path;

use t6inject_config::ToolchainConfig;
use t6inject_core::{InjectError, Result, SyntaxCheckResult};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::args::{build_args, Mode};
use crate::process::run_tool;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A validated gsc-tool installation
///
/// Holds the configuration for the lifetime of a session; every operation
/// re-verifies that the installation is still present before launching
/// anything.
///
/// # Example
///
/// ```rust,no_run
/// use t6inject_config::ToolchainConfig;
/// use t6inject_core::passing_files;
/// use t6inject_toolchain::Toolchain;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let toolchain = Toolchain::new(ToolchainConfig::new("tools/gsc-tool")?);
/// let files = t6inject_project::list_project_files("mods/zm_custom")?;
///
/// let results = toolchain.check_syntax(&files).await?;
/// let compiled = toolchain.compile(&passing_files(&results)).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Toolchain {
    config: ToolchainConfig,
}

impl Toolchain {
    pub fn new(config: ToolchainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ToolchainConfig {
        &self.config
    }

    /// Syntax-check every file, one gsc-tool run at a time
    ///
    /// # Returns
    /// One result per input, in input order. A file gsc-tool complains about
    /// is a failed result, not an error.
    ///
    /// # Errors
    /// - `InvalidArgument` if `files` is empty
    /// - `ToolchainNotConfigured` if the installation has disappeared
    /// - `ProcessLaunch` / `Timeout` abort the remaining checks
    pub async fn check_syntax<P: AsRef<Path>>(&self, files: &[P]) -> Result<Vec<SyntaxCheckResult>> {
        self.config.verify()?;

        if files.is_empty() {
            return Err(InjectError::InvalidArgument(
                "Project files cannot be empty".into(),
            ));
        }

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            results.push(self.check_file(file.as_ref()).await?);
        }

        let failed = results.iter().filter(|r| r.has_error).count();
        info!("Checked {} scripts, {} with errors", results.len(), failed);

        Ok(results)
    }

    /// Syntax-check a single file
    pub async fn check_file(&self, file: &Path) -> Result<SyntaxCheckResult> {
        if file.as_os_str().is_empty() {
            return Err(InjectError::InvalidArgument(
                "File path cannot be empty".into(),
            ));
        }

        let args = build_args(Mode::Parse, &self.config, file);
        let run = run_tool(&self.config, &args).await?;
        debug!("Parse of {:?} finished with {}", file, run.status);

        Ok(match run.diagnostics.into_iter().next() {
            Some(message) => SyntaxCheckResult::failed(file, message),
            None => SyntaxCheckResult::passed(file),
        })
    }

    /// Compile the files as one script and return gsc-tool's output
    ///
    /// # Behavior
    /// 1. Concatenates every file's text in input order, each followed by
    ///    `\n` (a leading UTF-8 byte order mark is dropped)
    /// 2. Removes any previous staging file and compiled output
    /// 3. Writes the staging file and runs `-m comp` on it
    /// 4. Reads back `compiled/t6/precompile.gsc`
    ///
    /// # Errors
    /// - `InvalidArgument` if `files` is empty
    /// - `CompileFailure` if gsc-tool reported any diagnostic
    /// - `OutputMissing` if it reported nothing but wrote no output
    pub async fn compile<P: AsRef<Path>>(&self, files: &[P]) -> Result<Vec<u8>> {
        self.config.verify()?;

        if files.is_empty() {
            return Err(InjectError::InvalidArgument(
                "Project files cannot be empty".into(),
            ));
        }

        let mut source = Vec::new();
        for file in files {
            let file = file.as_ref();
            let text = fs::read(file)
                .await
                .map_err(|e| InjectError::io_context(format!("Failed to read {}", file.display()), e))?;
            source.extend_from_slice(strip_bom(&text));
            source.push(b'\n');
        }

        let staging_path = self.config.staging_path();
        let output_path = self.config.output_path();

        remove_stale(&staging_path).await?;
        remove_stale(&output_path).await?;

        fs::write(&staging_path, &source).await.map_err(|e| {
            InjectError::io_context(format!("Failed to write {}", staging_path.display()), e)
        })?;
        debug!(
            "Staged {} scripts ({} bytes) at {:?}",
            files.len(),
            source.len(),
            staging_path
        );

        let args = build_args(Mode::Compile, &self.config, &staging_path);
        let run = run_tool(&self.config, &args).await?;
        debug!("Compile finished with {}", run.status);

        if run.failed() {
            warn!("Compile failed with {} diagnostics", run.diagnostics.len());
            return Err(InjectError::CompileFailure {
                diagnostics: run.diagnostics,
            });
        }

        if !output_path.is_file() {
            return Err(InjectError::OutputMissing(output_path));
        }

        let compiled = fs::read(&output_path).await.map_err(|e| {
            InjectError::io_context(format!("Failed to read {}", output_path.display()), e)
        })?;

        info!("Compiled {} scripts into {} bytes", files.len(), compiled.len());
        Ok(compiled)
    }
}

/// Drop a leading UTF-8 byte order mark so it never lands mid-file
fn strip_bom(text: &[u8]) -> &[u8] {
    text.strip_prefix(UTF8_BOM).unwrap_or(text)
}

/// Delete a staging/output file left by an earlier compile
async fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed stale {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InjectError::io_context(
            format!("Failed to remove {}", path.display()),
            e,
        )),
    }
}
