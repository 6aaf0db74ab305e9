//! Core type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Target platform selected with `-s`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Pc,
    #[default]
    Ps3,
    Xbox,
}

impl Platform {
    /// Value gsc-tool expects after `-s`
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Pc => "pc",
            Self::Ps3 => "ps3",
            Self::Xbox => "xb2",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pc" => Ok(Self::Pc),
            "ps3" => Ok(Self::Ps3),
            "xb2" | "xbox" | "xbox360" => Ok(Self::Xbox),
            other => Err(format!("unknown platform '{}' (expected pc, ps3 or xb2)", other)),
        }
    }
}

/// Which stderr lines count as a compiler diagnostic
///
/// gsc-tool builds differ: some print only errors on stderr, others prefix
/// error lines with a marker such as `[ERROR]` and also log progress there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DiagnosticRule {
    /// Any non-empty line is a diagnostic, whitespace-only lines included
    #[default]
    AnyLine,
    /// Only non-empty lines starting with the marker are diagnostics
    Prefix(String),
}

impl DiagnosticRule {
    pub fn matches(&self, line: &str) -> bool {
        if line.is_empty() {
            return false;
        }
        match self {
            Self::AnyLine => true,
            Self::Prefix(marker) => line.trim_start().starts_with(marker.as_str()),
        }
    }
}

/// Outcome of running gsc-tool in parse mode against one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxCheckResult {
    pub path: PathBuf,
    pub has_error: bool,
    pub message: Option<String>,
}

impl SyntaxCheckResult {
    pub fn passed(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            has_error: false,
            message: None,
        }
    }

    pub fn failed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            has_error: true,
            message: Some(message.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Paths of every result without a syntax error, in input order
pub fn passing_files(results: &[SyntaxCheckResult]) -> Vec<PathBuf> {
    results
        .iter()
        .filter(|result| !result.has_error)
        .map(|result| result.path.clone())
        .collect()
}
