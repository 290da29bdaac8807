//! RevMan document model and parser
//!
//! - [`xml`]: chumsky-based reader for the XML subset RevMan writes
//! - [`parser`]: maps the XML tree onto the typed [`Review`]
//! - [`model`]: the serde-serialisable review hierarchy

pub mod attributes;
mod model;
mod parser;
pub mod xml;

pub use model::*;
pub use parser::RevManParser;
