//! CLI support for cloudlens
//!
//! Provides programmatic access to the cloudlens CLI functionality for
//! embedding in other tools.

mod scan;

pub use scan::{execute_scan, ScanOptions};

use std::io;

/// Errors that can occur during CLI operations
#[derive(Debug)]
pub enum CliError {
    /// Pattern compilation error
    Pattern(crate::PatternError),
    /// Source construction error
    Source(crate::SourceError),
    /// JSON parsing error (stdin input)
    Json(serde_json::Error),
    /// IO error
    Io(io::Error),
    /// No input provided
    NoInput,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Pattern(e) => write!(f, "Pattern error: {}", e),
            CliError::Source(e) => write!(f, "Source error: {}", e),
            CliError::Json(e) => write!(f, "Invalid JSON: {}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::NoInput => {
                write!(f, "No input provided. Pass a file or pipe log lines to stdin.")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pattern(e) => Some(e),
            CliError::Source(e) => Some(e),
            CliError::Json(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::NoInput => None,
        }
    }
}

impl From<crate::PatternError> for CliError {
    fn from(e: crate::PatternError) -> Self {
        CliError::Pattern(e)
    }
}

impl From<crate::SourceError> for CliError {
    fn from(e: crate::SourceError) -> Self {
        CliError::Source(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}
