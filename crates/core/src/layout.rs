//! Fixed names used by gsc-tool and by T6 projects

/// Extension of T6 script sources
pub const SOURCE_EXTENSION: &str = "gsc";

/// Entry script expected at a project's root
pub const ENTRY_FILE: &str = "main.gsc";

/// Game identifier passed with `-g`
pub const GAME_ID: &str = "t6";

/// Default compiler executable inside the toolchain directory
pub const TOOL_EXECUTABLE: &str = "gsc-tool.exe";

/// Concatenated source written into the toolchain directory before compiling
pub const STAGING_FILE: &str = "precompile.gsc";

/// Directory (relative to the toolchain directory) where gsc-tool writes output
pub const COMPILED_DIR: &str = "compiled";
