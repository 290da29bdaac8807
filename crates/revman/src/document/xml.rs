//! Minimal XML reader using chumsky
//!
//! Reads the subset of XML that RevMan writes: a prolog, comments, an
//! optional DOCTYPE without internal subset, elements with quoted attributes,
//! character data with entity references, and CDATA sections. Namespaces are
//! not interpreted; prefixed names are kept verbatim.

use chumsky::prelude::*;
use tracing::{debug, span, trace, Level};

use crate::core::chumsky_utils::{
    first_error, optional_whitespace, until, whitespace_required, Extra,
};
use crate::core::Result;

/// A node of element content
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Value of the named attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// Follow a path of child element names
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter()
            .try_fold(self, |element, name| element.child(name))
    }

    /// True when the element holds no child elements
    pub fn is_leaf(&self) -> bool {
        self.elements().next().is_none()
    }

    /// All descendant text, with runs of whitespace collapsed to one space.
    ///
    /// Block-level markup (`P`, `LI`, `BR`) is separated by a space so that
    /// paragraphs do not run together.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => out.push_str(text),
                XmlNode::Element(element) => {
                    let block = matches!(element.name.as_str(), "P" | "LI" | "BR" | "TR");
                    if block {
                        out.push(' ');
                    }
                    element.collect_text(out);
                    if block {
                        out.push(' ');
                    }
                }
            }
        }
    }
}

/// Parse a complete XML document and return its root element
pub fn parse_document(input: &str) -> Result<XmlElement> {
    let parse_span = span!(Level::DEBUG, "parse_xml", input_len = input.len());
    let _enter = parse_span.enter();

    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    trace!("Starting XML parsing");

    let root = document_parser()
        .parse(input)
        .into_result()
        .map_err(|errors| first_error(input, errors))?;

    debug!(root = %root.name, "XML document parsed");
    Ok(root)
}

/// Decode a named or numeric entity reference (without `&` and `;`)
pub fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Escape text so that [`parse_document`] reads it back unchanged
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn name_parser<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_alphabetic() || *c == '_' || *c == ':')
        .then(
            any()
                .filter(|c: &char| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
                .repeated(),
        )
        .to_slice()
}

fn entity_parser<'src>() -> impl Parser<'src, &'src str, char, Extra<'src>> + Clone {
    just('&')
        .ignore_then(none_of(";<&").repeated().at_least(1).to_slice())
        .then_ignore(just(';'))
        .try_map(|name: &str, span| {
            decode_entity(name)
                .ok_or_else(|| Rich::custom(span, format!("Unknown entity '&{};'", name)))
        })
}

fn attribute_value_parser<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let double = none_of("\"&<")
        .or(entity_parser())
        .repeated()
        .collect::<String>()
        .delimited_by(just('"'), just('"'));
    let single = none_of("'&<")
        .or(entity_parser())
        .repeated()
        .collect::<String>()
        .delimited_by(just('\''), just('\''));
    double.or(single)
}

fn comment_parser<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just("<!--").ignore_then(until("-->")).ignored()
}

fn misc_parser<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    let processing_instruction = just("<?").ignore_then(until("?>")).ignored();
    let doctype = just("<!DOCTYPE")
        .ignore_then(none_of('>').repeated())
        .then_ignore(just('>'))
        .ignored();

    choice((
        whitespace_required(),
        comment_parser(),
        processing_instruction,
        doctype,
    ))
    .repeated()
}

fn element_parser<'src>() -> impl Parser<'src, &'src str, XmlElement, Extra<'src>> + Clone {
    recursive(|element| {
        let attribute = name_parser()
            .then_ignore(optional_whitespace())
            .then_ignore(just('='))
            .then_ignore(optional_whitespace())
            .then(attribute_value_parser())
            .map(|(name, value): (&str, String)| (name.to_string(), value));

        let attributes = whitespace_required()
            .ignore_then(attribute)
            .repeated()
            .collect::<Vec<_>>();

        let open_tag = just('<')
            .ignore_then(name_parser())
            .then(attributes)
            .then_ignore(optional_whitespace());

        let close_tag = just("</")
            .ignore_then(name_parser())
            .then_ignore(optional_whitespace())
            .then_ignore(just('>'));

        let cdata = just("<![CDATA[")
            .ignore_then(until("]]>"))
            .map(|text: &str| Some(XmlNode::Text(text.to_string())));

        let text = none_of("<&")
            .or(entity_parser())
            .repeated()
            .at_least(1)
            .collect::<String>()
            .map(|text| Some(XmlNode::Text(text)));

        let content = choice((
            comment_parser().to(None),
            cdata,
            element.map(|e| Some(XmlNode::Element(e))),
            text,
        ))
        .repeated()
        .collect::<Vec<Option<XmlNode>>>()
        .map(|nodes| nodes.into_iter().flatten().collect::<Vec<_>>());

        let body = just('>')
            .ignore_then(content)
            .then(close_tag)
            .map(Some);
        let empty = just("/>").to(None::<(Vec<XmlNode>, &str)>);

        open_tag
            .then(empty.or(body))
            .validate(|((name, attributes), body), e, emitter| {
                let children = match body {
                    None => Vec::new(),
                    Some((children, close)) => {
                        if close != name {
                            emitter.emit(Rich::custom(
                                e.span(),
                                format!("Closing tag </{}> does not match <{}>", close, name),
                            ));
                        }
                        children
                    }
                };
                XmlElement {
                    name: name.to_string(),
                    attributes,
                    children,
                }
            })
    })
}

fn document_parser<'src>() -> impl Parser<'src, &'src str, XmlElement, Extra<'src>> {
    misc_parser()
        .ignore_then(element_parser())
        .then_ignore(misc_parser())
        .then_ignore(end())
}
