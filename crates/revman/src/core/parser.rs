//! Core parser trait for review documents
//!
//! The orchestrator only ever talks to a [`DocumentParser`]; the bundled
//! RevMan implementation lives in [`crate::document::RevManParser`].

use super::error::Result;
use crate::document::Review;

/// Behavioural knobs passed to a parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Scan outcomes for structural anomalies and report them as warnings.
    ///
    /// Slower, but produces the detailed diagnostics shown by `--verify`.
    pub debug_outcomes: bool,
    /// Drop outcomes that carry no study data at all
    pub remove_empty_outcomes: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug_outcomes(mut self, enabled: bool) -> Self {
        self.debug_outcomes = enabled;
        self
    }

    pub fn with_remove_empty_outcomes(mut self, enabled: bool) -> Self {
        self.remove_empty_outcomes = enabled;
        self
    }
}

/// A parsed document together with the non-fatal warnings found on the way
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReview {
    pub review: Review,
    pub warnings: Vec<String>,
}

/// Core trait for document parsers
///
/// Implementations turn raw document text into a [`Review`]. Malformed input
/// is an error; recoverable anomalies are returned as warnings in the order
/// they were found.
pub trait DocumentParser {
    fn parse(&self, input: &str, options: ParseOptions) -> Result<ParsedReview>;

    /// Get the name of this parser
    fn name(&self) -> &'static str;
}
