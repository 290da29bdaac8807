//! JSON output of a parsed review
//!
//! Two layouts are offered: canonical tab-indented JSON, and a highlighted dump
//! that uses two-space indentation and wraps every token in a styling role.
//! With [`PlainStyler`](crate::core::PlainStyler) the highlighted dump is
//! itself valid JSON.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use tracing::{debug, span, Level};

use crate::core::{Role, Styler};
use crate::document::Review;

const INDENT: &str = "  ";

/// Canonical JSON with tab indentation, without a trailing newline
pub fn to_json(review: &Review) -> serde_json::Result<String> {
    let render_span = span!(Level::INFO, "render_json");
    let _enter = render_span.enter();

    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"\t");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    review.serialize(&mut serializer)?;

    debug!(bytes = buffer.len(), "Serialized review");
    // serde_json only ever emits valid UTF-8
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Highlighted, fully expanded dump of the review
pub fn to_highlighted_json(review: &Review, styler: &dyn Styler) -> serde_json::Result<String> {
    let render_span = span!(Level::INFO, "render_highlighted_json");
    let _enter = render_span.enter();

    let value = serde_json::to_value(review)?;
    let mut out = String::new();
    write_value(&mut out, &value, 0, styler)?;
    Ok(out)
}

fn write_value(
    out: &mut String,
    value: &Value,
    depth: usize,
    styler: &dyn Styler,
) -> serde_json::Result<()> {
    match value {
        Value::Null => out.push_str(&styler.paint(Role::Literal, "null")),
        Value::Bool(b) => out.push_str(&styler.paint(Role::Literal, &b.to_string())),
        Value::Number(n) => out.push_str(&styler.paint(Role::Number, &n.to_string())),
        Value::String(s) => {
            out.push_str(&styler.paint(Role::String, &serde_json::to_string(s)?));
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
                return Ok(());
            }
            out.push_str("[\n");
            for (index, item) in items.iter().enumerate() {
                push_indent(out, depth + 1);
                write_value(out, item, depth + 1, styler)?;
                if index + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
                return Ok(());
            }
            out.push_str("{\n");
            for (index, (key, item)) in map.iter().enumerate() {
                push_indent(out, depth + 1);
                out.push_str(&styler.paint(Role::Key, &serde_json::to_string(key)?));
                out.push_str(": ");
                write_value(out, item, depth + 1, styler)?;
                if index + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
    Ok(())
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
