//! Output styling roles
//!
//! Renderers never emit escape codes themselves. They tag each fragment with a
//! semantic [`Role`] and let a [`Styler`] decide how it looks; the CLI plugs in
//! an ANSI implementation, everything else uses [`PlainStyler`].

/// Semantic role of a rendered fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Top-level headings (comparison names)
    Heading,
    /// Secondary information (numbering labels, counts)
    Muted,
    /// Positive status markers
    Success,
    /// Attention markers such as warning counts
    Alert,
    /// Error markers
    Error,
    /// JSON object keys
    Key,
    /// JSON strings
    String,
    /// JSON numbers
    Number,
    /// JSON `true`, `false` and `null`
    Literal,
}

/// Turns a text fragment into its styled representation
pub trait Styler {
    fn paint(&self, role: Role, text: &str) -> String;
}

/// Styler that leaves text untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainStyler;

impl Styler for PlainStyler {
    fn paint(&self, _role: Role, text: &str) -> String {
        text.to_string()
    }
}
