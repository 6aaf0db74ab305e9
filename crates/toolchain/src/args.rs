//! gsc-tool command lines

use std::ffi::OsString;
use std::path::Path;
use t6inject_config::ToolchainConfig;
use t6inject_core::GAME_ID;

/// gsc-tool mode selected with `-m`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Syntax check only
    Parse,
    /// Compile to `compiled/<game>/`
    Compile,
}

impl Mode {
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Parse => "parse",
            Self::Compile => "comp",
        }
    }
}

/// Build `-m <mode> -g t6 -s <system> [-y] <path>`
///
/// `-y` is only added in parse mode when the toolchain asks for dry runs.
pub fn build_args(mode: Mode, config: &ToolchainConfig, path: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-m".into(),
        mode.as_flag().into(),
        "-g".into(),
        GAME_ID.into(),
        "-s".into(),
        config.platform().as_flag().into(),
    ];

    if mode == Mode::Parse && config.dry_run() {
        args.push("-y".into());
    }

    args.push(path.as_os_str().to_os_string());
    args
}

/// Space-joined form for logs
pub(crate) fn display_args(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| arg.to_string_lossy())
        .collect::<Vec<_>>()
        .join(" ")
}
