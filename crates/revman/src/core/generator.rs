//! Core trait for abstract generation engines

use std::fmt;
use std::path::PathBuf;

use super::error::Result;
use crate::document::Review;

/// Where the grammar for abstract generation comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GrammarSource {
    /// The grammar bundled with the library
    #[default]
    Builtin,
    /// A grammar file supplied by the user
    File(PathBuf),
}

impl GrammarSource {
    /// Use the given file when present, the bundled grammar otherwise
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map(Self::File).unwrap_or_default()
    }
}

impl fmt::Display for GrammarSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarSource::Builtin => write!(f, "<builtin>"),
            GrammarSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Core trait for abstract generators
///
/// Generators produce the complete text or fail; callers never see partial output.
pub trait AbstractGenerator {
    fn generate(&self, review: &Review, grammar: &GrammarSource) -> Result<String>;

    /// Get the name of this generator
    fn name(&self) -> &'static str;
}
