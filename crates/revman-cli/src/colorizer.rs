//! Terminal colorization of rendered output
//!
//! Maps the library's styling roles onto ANSI escape codes using crossterm.

use crossterm::style::{Color, Stylize};
use revman::{Role, Styler};

/// Styler emitting ANSI colors
///
/// - Headings: bold blue
/// - Labels and counts: dark grey
/// - Success markers: green
/// - Warnings and errors: red
/// - JSON: cyan keys, green strings, yellow numbers and literals
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiStyler;

impl Styler for AnsiStyler {
    fn paint(&self, role: Role, text: &str) -> String {
        let styled = match role {
            Role::Heading => text.bold().with(Color::Blue),
            Role::Muted => text.with(Color::DarkGrey),
            Role::Success => text.with(Color::Green),
            Role::Alert | Role::Error => text.with(Color::Red),
            Role::Key => text.with(Color::Cyan),
            Role::String => text.with(Color::Green),
            Role::Number | Role::Literal => text.with(Color::Yellow),
        };
        styled.to_string()
    }
}

/// Decide whether output should carry colors
///
/// Colors are used only when `--no-color` is absent, `NO_COLOR` is unset and
/// stdout is a terminal.
pub fn should_colorize(no_color: bool) -> bool {
    if no_color {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Pick the styler matching the color decision
pub fn styler_for(color: bool) -> Box<dyn Styler> {
    if color {
        Box::new(AnsiStyler)
    } else {
        Box::new(revman::PlainStyler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ansi_styler_wraps_text() {
        let output = AnsiStyler.paint(Role::Heading, "* Green tea versus placebo");
        assert!(output.contains("\x1b["));
        assert!(output.contains("* Green tea versus placebo"));
    }

    #[test]
    fn test_no_color_flag_disables_colors() {
        assert!(!should_colorize(true));
    }

    #[test]
    fn test_plain_styler_for_no_color() {
        let styler = styler_for(false);
        assert_eq!(styler.paint(Role::Error, "Error"), "Error");
    }
}
