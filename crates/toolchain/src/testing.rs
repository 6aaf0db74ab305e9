//! Fake gsc-tool installations for tests

use std::fs;
use std::path::{Path, PathBuf};

use t6inject_config::ToolchainConfig;
use t6inject_core::DiagnosticRule;

/// Serializes writing and executing fake tools within this test binary.
/// Exec'ing a script while another thread's fork still holds a write handle
/// to it fails with ETXTBSY.
static TOOL_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

pub(crate) async fn lock_tools() -> tokio::sync::MutexGuard<'static, ()> {
    TOOL_LOCK.lock().await
}

/// Behaves like gsc-tool for files containing `syntax_error`: reports on
/// stderr, and in comp mode writes `compiled/t6/<name>` prefixed with `T6BIN`.
/// Every invocation is appended to `invocations.log` in the working directory.
pub(crate) const GSC_TOOL: &str = r#"#!/bin/sh
mode="$2"
for last in "$@"; do :; done
printf '%s\n' "$*" >> invocations.log
if [ ! -f "$last" ]; then
  echo "couldn't open $last" >&2
  exit 1
fi
if grep -q "syntax_error" "$last"; then
  echo "" >&2
  echo "[ERROR] $last: bad token near 'syntax_error'" >&2
  echo "[ERROR] second diagnostic" >&2
  exit 1
fi
echo "processed $last"
if [ "$mode" = "comp" ]; then
  mkdir -p compiled/t6
  { printf 'T6BIN\n'; cat "$last"; } > "compiled/t6/$(basename "$last")"
fi
exit 0
"#;

/// Logs progress on stderr for every run and marks errors with `[ERROR]`
pub(crate) const CHATTY_TOOL: &str = r#"#!/bin/sh
for last in "$@"; do :; done
echo "gsc-tool: loading $last" >&2
if grep -q "syntax_error" "$last"; then
  echo "[ERROR] unexpected token" >&2
fi
exit 0
"#;

/// Writes a whitespace-only line to stderr for every run
pub(crate) const BLANK_LINE_TOOL: &str = "#!/bin/sh\nprintf '   \\n' >&2\nexit 0\n";

/// Succeeds silently without producing output
pub(crate) const SILENT_TOOL: &str = "#!/bin/sh\nexit 0\n";

/// Never finishes on its own
pub(crate) const HANGING_TOOL: &str = "#!/bin/sh\nexec sleep 30\n";

pub(crate) struct FakeToolchain {
    pub dir: tempfile::TempDir,
    pub config: ToolchainConfig,
}

impl FakeToolchain {
    pub fn tool_path(&self) -> PathBuf {
        self.config.tool_path().to_path_buf()
    }

    /// Command lines recorded by [`GSC_TOOL`]
    pub fn invocations(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("invocations.log"))
            .unwrap_or_default()
            .lines()
            .map(String::from)
            .collect()
    }
}

pub(crate) fn fake_toolchain(script: &str) -> FakeToolchain {
    fake_toolchain_with(script, |builder| builder)
}

pub(crate) fn fake_toolchain_with(
    script: &str,
    configure: impl FnOnce(t6inject_config::ToolchainConfigBuilder) -> t6inject_config::ToolchainConfigBuilder,
) -> FakeToolchain {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let tool = dir.path().join("gsc-tool");
    fs::write(&tool, script).unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let builder = ToolchainConfig::builder()
        .tool_dir(dir.path())
        .tool_path(&tool)
        .diagnostic_rule(DiagnosticRule::AnyLine);
    let config = configure(builder).build().unwrap();

    FakeToolchain { dir, config }
}

pub(crate) fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}
