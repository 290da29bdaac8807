//! Console renderers for parsed reviews

pub mod json;
pub mod tree;

pub use json::{to_highlighted_json, to_json};
pub use tree::TreeRenderer;
