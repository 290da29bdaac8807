//! Shared chumsky parser utilities
//!
//! Common combinators and error plumbing for the XML reader.

use chumsky::prelude::*;

use super::error::RevManError;

/// Parser extra carrying rich, positioned errors
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Parse optional whitespace including newlines.
///
/// Uses explicit character matching to avoid the "repeated combinator making no progress"
/// issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn optional_whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\n\r").repeated().ignored()
}

/// Parse required whitespace (at least one whitespace/newline character).
pub fn whitespace_required<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t\n\r").repeated().at_least(1).ignored()
}

/// Everything up to (and including) `terminator`, returned without the terminator.
pub fn until<'src>(
    terminator: &'static str,
) -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    any()
        .and_is(just(terminator).not())
        .repeated()
        .to_slice()
        .then_ignore(just(terminator))
}

/// Translate a byte offset into a 1-based (line, column) pair.
pub fn line_column(input: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (index, c) in input.char_indices() {
        if index >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Convert the first chumsky error into a positioned [`RevManError`].
///
/// Only the first error is reported: later ones are usually knock-on effects.
pub fn first_error(input: &str, errors: Vec<Rich<'_, char>>) -> RevManError {
    match errors.into_iter().next() {
        Some(error) => {
            let (line, column) = line_column(input, error.span().start);
            RevManError::parse_error(error.to_string(), line, column)
        }
        None => RevManError::parse_error("Unknown XML syntax error", 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_whitespace() {
        let parser = optional_whitespace().then(just("test")).then_ignore(end());
        assert!(parser.parse("test").into_result().is_ok());
        assert!(parser.parse(" test").into_result().is_ok());
        assert!(parser.parse("\t\n test").into_result().is_ok());
    }

    #[test]
    fn test_whitespace_required() {
        let parser = just("a")
            .then(whitespace_required())
            .then(just("b"))
            .then_ignore(end());
        assert!(parser.parse("a b").into_result().is_ok());
        assert!(parser.parse("a\nb").into_result().is_ok());
        assert!(parser.parse("ab").into_result().is_err());
    }

    #[test]
    fn test_until_stops_at_terminator() {
        let parser = just("<!--").ignore_then(until("-->")).then_ignore(end());
        assert_eq!(
            parser.parse("<!-- a - b -->").into_result().unwrap(),
            " a - b "
        );
        assert!(parser.parse("<!-- unterminated").into_result().is_err());
    }

    #[test]
    fn test_line_column() {
        let input = "ab\ncd\nef";
        assert_eq!(line_column(input, 0), (1, 1));
        assert_eq!(line_column(input, 1), (1, 2));
        assert_eq!(line_column(input, 3), (2, 1));
        assert_eq!(line_column(input, 7), (3, 2));
    }
}
