//! revman - Inspect RevMan systematic review files
//!
//! A library for parsing RevMan 5 (`.rm5`) review exports and rendering them
//! as a numbered tree, as JSON, or as a generated prose abstract.
//!
//! # Quick Start
//!
//! ```rust
//! use revman::{parse, PlainStyler, TreeRenderer};
//!
//! let input = r#"<COCHRANE_REVIEW>
//!   <COVER_SHEET><TITLE>Tea for colds</TITLE></COVER_SHEET>
//!   <ANALYSES_AND_DATA>
//!     <COMPARISON ID="CMP-001" NO="1">
//!       <NAME>Tea versus placebo</NAME>
//!       <DICH_OUTCOME ID="CMP-001.01" NO="1">
//!         <NAME>Cold duration</NAME>
//!         <DICH_DATA STUDY_ID="STD-A"/>
//!       </DICH_OUTCOME>
//!     </COMPARISON>
//!   </ANALYSES_AND_DATA>
//! </COCHRANE_REVIEW>"#;
//!
//! let parsed = parse(input).unwrap();
//! let tree = TreeRenderer::new().render(&parsed.review, &PlainStyler);
//! assert!(tree.contains("1.01 Cold duration (1 studies)"));
//! ```
//!
//! # Advanced Usage
//!
//! The command pipeline is written against two traits so that either side
//! can be swapped out:
//!
//! - [`DocumentParser`], implemented by [`RevManParser`]
//! - [`AbstractGenerator`], implemented by [`ReplicantGenerator`]

pub mod core;
pub mod document;
pub mod render;
pub mod replicant;

pub use crate::core::*;
pub use document::{RevManParser, Review};
pub use render::{to_highlighted_json, to_json, TreeRenderer};
pub use replicant::ReplicantGenerator;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        AbstractGenerator, DocumentParser, GrammarSource, ParseOptions, ParsedReview,
        PlainStyler, RevManError, Role, Styler,
    };
    pub use crate::document::{
        Comparison, Outcome, OutcomeType, RevManParser, Review, StudyData, Subgroup,
    };
    pub use crate::render::TreeRenderer;
    pub use crate::replicant::ReplicantGenerator;
}

/// Parse RevMan text with default options
///
/// # Example
/// ```rust
/// let err = revman::parse("<NOT_A_REVIEW/>").unwrap_err();
/// assert!(err.to_string().contains("COCHRANE_REVIEW"));
/// ```
pub fn parse(input: &str) -> Result<ParsedReview> {
    parse_with_options(input, ParseOptions::default())
}

/// Parse RevMan text with explicit options
pub fn parse_with_options(input: &str, options: ParseOptions) -> Result<ParsedReview> {
    RevManParser::new().parse(input, options)
}

/// Generate an abstract using the bundled grammar
pub fn generate_abstract(review: &Review) -> Result<String> {
    ReplicantGenerator::new().generate(review, &GrammarSource::Builtin)
}
