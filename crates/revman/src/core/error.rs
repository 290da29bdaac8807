//! Core error types for review processing
//!
//! Every failure the pipeline can hit maps onto one of four terminal
//! categories. None of them are retried.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the library
pub type Result<T> = std::result::Result<T, RevManError>;

/// Core error types for review processing
#[derive(Error, Debug)]
pub enum RevManError {
    #[error("{message}")]
    InvalidInvocation { message: String },

    #[error("Cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {message}{}", position(.line, .column))]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("Generation error: {message}")]
    Generation { message: String },
}

/// " at line L, column C" for positioned errors, empty for structural ones
fn position(line: &usize, column: &usize) -> String {
    if *line == 0 {
        String::new()
    } else {
        format!(" at line {}, column {}", line, column)
    }
}

impl RevManError {
    /// Create a new invalid invocation error
    pub fn invalid_invocation(message: impl Into<String>) -> Self {
        Self::InvalidInvocation {
            message: message.into(),
        }
    }

    /// Create a new I/O error bound to the path that failed
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a new parse error at a known position
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a parse error for a structural problem found after the XML was read.
    ///
    /// Structural errors have no meaningful source position, so they report line 0.
    pub fn structure_error(message: impl Into<String>) -> Self {
        Self::parse_error(message, 0, 0)
    }

    /// Create a new generation error
    pub fn generation_error(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Short category name, used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInvocation { .. } => "invalid_invocation",
            Self::Io { .. } => "io",
            Self::Parse { .. } => "parse",
            Self::Generation { .. } => "generation",
        }
    }
}
