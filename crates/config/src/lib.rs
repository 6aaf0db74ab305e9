//! T6Inject Configuration Management
//!
//! Two layers:
//! - [`ToolchainConfig`]: the validated, immutable description of a gsc-tool
//!   installation that every toolchain operation runs against.
//! - [`ToolchainOptions`]: raw settings loaded from a `key = value` options
//!   file (and overridden by the CLI) before validation.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use t6inject_core::{
    DiagnosticRule, InjectError, Platform, Result, COMPILED_DIR, GAME_ID, STAGING_FILE,
    TOOL_EXECUTABLE,
};

/// Validated gsc-tool installation
///
/// Construct with [`ToolchainConfig::new`] for the common case (a directory
/// containing `gsc-tool.exe`) or [`ToolchainConfig::builder`] to set an
/// explicit executable, platform, diagnostic rule or timeout.
///
/// # Example
///
/// ```rust,no_run
/// use t6inject_config::ToolchainConfig;
/// use t6inject_core::Platform;
///
/// let config = ToolchainConfig::builder()
///     .tool_dir("C:/tools/gsc-tool")
///     .platform(Platform::Pc)
///     .build()?;
/// # Ok::<(), t6inject_core::InjectError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Working directory for every gsc-tool invocation
    tool_dir: PathBuf,
    /// Compiler executable
    tool_path: PathBuf,
    /// Value for `-s`
    platform: Platform,
    /// How stderr lines are screened for errors
    diagnostic_rule: DiagnosticRule,
    /// Pass `-y` in parse mode
    dry_run: bool,
    /// Upper bound on a single gsc-tool run (None = wait forever)
    timeout: Option<Duration>,
}

impl ToolchainConfig {
    /// Validate a toolchain directory containing `gsc-tool.exe`
    pub fn new<P: Into<PathBuf>>(tool_dir: P) -> Result<Self> {
        Self::builder().tool_dir(tool_dir).build()
    }

    pub fn builder() -> ToolchainConfigBuilder {
        ToolchainConfigBuilder::default()
    }

    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }

    pub fn tool_path(&self) -> &Path {
        &self.tool_path
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn diagnostic_rule(&self) -> &DiagnosticRule {
        &self.diagnostic_rule
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Concatenated source written before `-m comp`
    pub fn staging_path(&self) -> PathBuf {
        self.tool_dir.join(STAGING_FILE)
    }

    /// Where gsc-tool writes the compiled staging file
    pub fn output_path(&self) -> PathBuf {
        self.tool_dir.join(COMPILED_DIR).join(GAME_ID).join(STAGING_FILE)
    }

    /// Re-check that the installation is still on disk
    ///
    /// Called before every check/compile so a toolchain removed after
    /// construction fails fast instead of producing launch errors per file.
    pub fn verify(&self) -> Result<()> {
        if !self.tool_dir.is_dir() {
            return Err(InjectError::ToolchainNotConfigured(format!(
                "gsc-tool directory {} no longer exists",
                self.tool_dir.display()
            )));
        }
        if !self.tool_path.is_file() {
            return Err(InjectError::ToolchainNotConfigured(format!(
                "gsc-tool executable {} no longer exists",
                self.tool_path.display()
            )));
        }
        Ok(())
    }
}

/// Builder for [`ToolchainConfig`]
///
/// At least one of `tool_dir` or `tool_path` is required. With only a tool
/// path, its parent directory becomes the toolchain directory.
#[derive(Debug, Clone, Default)]
pub struct ToolchainConfigBuilder {
    tool_dir: Option<PathBuf>,
    tool_path: Option<PathBuf>,
    platform: Platform,
    diagnostic_rule: DiagnosticRule,
    dry_run: bool,
    timeout: Option<Duration>,
}

impl ToolchainConfigBuilder {
    pub fn tool_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.tool_dir = Some(dir.into());
        self
    }

    pub fn tool_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.tool_path = Some(path.into());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn diagnostic_rule(mut self, rule: DiagnosticRule) -> Self {
        self.diagnostic_rule = rule;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Bound each gsc-tool run; `None` or a zero duration waits forever
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout.filter(|limit| !limit.is_zero());
        self
    }

    pub fn build(self) -> Result<ToolchainConfig> {
        let tool_dir = match (self.tool_dir, &self.tool_path) {
            (Some(dir), _) => dir,
            (None, Some(path)) => path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            (None, None) => {
                return Err(InjectError::InvalidArgument(
                    "gsc-tool directory cannot be empty".into(),
                ))
            }
        };

        if tool_dir.as_os_str().is_empty() {
            return Err(InjectError::InvalidArgument(
                "gsc-tool directory cannot be empty".into(),
            ));
        }

        if !tool_dir.is_dir() {
            return Err(InjectError::NotFound(format!(
                "gsc-tool directory {} does not exist",
                tool_dir.display()
            )));
        }

        let tool_path = self
            .tool_path
            .unwrap_or_else(|| tool_dir.join(TOOL_EXECUTABLE));

        if tool_path.as_os_str().is_empty() {
            return Err(InjectError::InvalidArgument(
                "gsc-tool path cannot be empty".into(),
            ));
        }

        if !tool_path.is_file() {
            return Err(InjectError::NotFound(format!(
                "gsc-tool executable does not exist at {}",
                tool_path.display()
            )));
        }

        if let DiagnosticRule::Prefix(marker) = &self.diagnostic_rule {
            if marker.trim().is_empty() {
                return Err(InjectError::InvalidArgument(
                    "diagnostic marker cannot be empty".into(),
                ));
            }
        }

        tracing::debug!(
            "Toolchain configured: {} ({}), platform {}",
            tool_dir.display(),
            tool_path.display(),
            self.platform
        );

        Ok(ToolchainConfig {
            tool_dir,
            tool_path,
            platform: self.platform,
            diagnostic_rule: self.diagnostic_rule,
            dry_run: self.dry_run,
            timeout: self.timeout,
        })
    }
}

/// Unvalidated settings from an options file
///
/// # File Format
/// ```text
/// # gsc-tool installation
/// tooldir = C:/tools/gsc-tool
/// toolpath = C:/tools/gsc-tool/gsc-tool.exe
/// system = ps3
/// marker = [ERROR]
/// dryrun = false
/// timeout = 30
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolchainOptions {
    /// Toolchain directory (from "tooldir" option)
    pub tool_dir: Option<PathBuf>,
    /// Explicit executable (from "toolpath" option)
    pub tool_path: Option<PathBuf>,
    /// Target platform (from "system" option, default: ps3)
    pub platform: Platform,
    /// Diagnostic marker (from "marker" option; unset = any stderr line)
    pub marker: Option<String>,
    /// Pass `-y` when parsing (from "dryrun" option)
    pub dry_run: bool,
    /// Seconds before a gsc-tool run is killed (from "timeout" option)
    pub timeout_secs: Option<u64>,
}

impl ToolchainOptions {
    /// Load options from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| InjectError::io_context(format!("reading {}", path.display()), e))?;
        Self::parse(&content)
    }

    /// Parse options file content
    pub fn parse(content: &str) -> Result<Self> {
        let mut options = Self::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip comments and empty lines
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(eq_pos) = line.find('=') {
                let key = line[..eq_pos].trim();
                let value = line[eq_pos + 1..].trim();

                options.parse_option(key, value)?;
            }
        }

        Ok(options)
    }

    fn parse_option(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "tooldir" => self.tool_dir = non_empty(value).map(PathBuf::from),
            "toolpath" => self.tool_path = non_empty(value).map(PathBuf::from),
            "system" => {
                self.platform = value.parse().map_err(InjectError::Config)?;
            }
            "marker" => self.marker = non_empty(value).map(String::from),
            "dryrun" => {
                self.dry_run = value.parse().unwrap_or_else(|_| {
                    tracing::warn!("Invalid dryrun value '{}', using false", value);
                    false
                });
            }
            "timeout" => {
                self.timeout_secs = match value.parse::<u64>() {
                    Ok(0) => None,
                    Ok(secs) => Some(secs),
                    Err(_) => {
                        tracing::warn!("Invalid timeout value '{}', waiting indefinitely", value);
                        None
                    }
                };
            }
            _ => {
                tracing::debug!("Unknown toolchain option: {} = {}", key, value);
            }
        }
        Ok(())
    }

    /// Validate into a [`ToolchainConfig`]
    pub fn into_config(self) -> Result<ToolchainConfig> {
        let mut builder = ToolchainConfig::builder()
            .platform(self.platform)
            .dry_run(self.dry_run)
            .timeout(self.timeout_secs.map(Duration::from_secs));

        if let Some(dir) = self.tool_dir {
            builder = builder.tool_dir(dir);
        }
        if let Some(path) = self.tool_path {
            builder = builder.tool_path(path);
        }
        if let Some(marker) = self.marker {
            builder = builder.diagnostic_rule(DiagnosticRule::Prefix(marker));
        }

        builder.build()
    }

    /// Display options summary
    pub fn display(&self) {
        let unset = "(unset)".to_string();
        tracing::info!("Toolchain options:");
        tracing::info!(
            "  Tool dir: {}",
            self.tool_dir.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| unset.clone())
        );
        tracing::info!(
            "  Tool path: {}",
            self.tool_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| unset.clone())
        );
        tracing::info!("  System: {}", self.platform);
        tracing::info!("  Marker: {}", self.marker.as_deref().unwrap_or("(any stderr line)"));
        tracing::info!("  Dry run: {}", self.dry_run);
        match self.timeout_secs {
            Some(secs) => tracing::info!("  Timeout: {}s", secs),
            None => tracing::info!("  Timeout: none"),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
