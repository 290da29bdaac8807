//! Command-line interface for the revman utility
//!
//! Validates the invocation, reads one RevMan file and renders it as a tree,
//! as JSON or as a generated abstract.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, span, Level};

use revman::{
    to_highlighted_json, to_json, AbstractGenerator, DocumentParser, GrammarSource, ParseOptions,
    ParsedReview, ReplicantGenerator, RevManError, RevManParser, Review, Role, Styler,
    TreeRenderer,
};

/// revman - Inspect RevMan systematic review files
#[derive(Parser, Debug)]
#[command(name = "revman")]
#[command(about = "Inspect RevMan systematic review files as a tree, as JSON or as an abstract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(override_usage = "revman [OPTIONS] <--tree|--replicant|--json|--verify> <FILE>")]
pub struct Cli {
    /// RevMan (.rm5) file to read
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Print the review as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Pretty-print and highlight JSON output
    #[arg(short, long)]
    pub pretty: bool,

    /// Generate a prose abstract
    #[arg(short, long)]
    pub replicant: bool,

    /// Grammar file used for the abstract
    #[arg(long, value_name = "FILE", env = "REVMAN_GRAMMAR")]
    pub grammar: Option<PathBuf>,

    /// Print comparisons and outcomes as a numbered tree
    #[arg(short, long)]
    pub tree: bool,

    /// List study identifiers in the tree
    #[arg(long, alias = "ss")]
    pub show_studies: bool,

    /// Only check the file and report warnings
    #[arg(long)]
    pub verify: bool,

    /// Scan outcomes for problems and print the validity report
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Set log level (trace|debug|info|warn|error|off)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Log filter to install, or `None` to let the environment decide
    ///
    /// `--verbose` raises the default to `info` unless a level is already
    /// configured through the environment.
    pub fn log_directive(&self) -> Option<&'static str> {
        if let Some(level) = self.log_level {
            return Some(level.as_str());
        }
        let configured = std::env::var_os("REVMAN_LOG_LEVEL").is_some()
            || std::env::var_os("RUST_LOG").is_some();
        if self.verbose && !configured {
            Some(LogLevel::Info.as_str())
        } else {
            None
        }
    }
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// The single render branch an invocation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tree { show_studies: bool },
    Replicant,
    Json { pretty: bool },
    /// Parse and report, render nothing
    VerifyOnly,
}

/// A validated invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub path: PathBuf,
    pub mode: Mode,
    pub verbose: bool,
    pub verify: bool,
    pub grammar: GrammarSource,
}

impl Invocation {
    /// Check the argument constraints before any file is touched
    pub fn from_cli(cli: &Cli) -> revman::Result<Self> {
        let path = match cli.files.as_slice() {
            [path] => path.clone(),
            [] => return Err(RevManError::invalid_invocation("Missing input file")),
            files => {
                return Err(RevManError::invalid_invocation(format!(
                    "Expected exactly one input file, got {}",
                    files.len()
                )))
            }
        };

        let selected = [cli.tree, cli.replicant, cli.json]
            .iter()
            .filter(|flag| **flag)
            .count();
        if selected > 1 {
            return Err(RevManError::invalid_invocation(
                "Choose only one of --tree, --replicant or --json",
            ));
        }

        let mode = if cli.verify {
            Mode::VerifyOnly
        } else if cli.tree {
            Mode::Tree {
                show_studies: cli.show_studies,
            }
        } else if cli.replicant {
            Mode::Replicant
        } else if cli.json {
            Mode::Json { pretty: cli.pretty }
        } else {
            return Err(RevManError::invalid_invocation(
                "Specify at least --tree, --replicant or --json",
            ));
        };

        Ok(Self {
            path,
            mode,
            verbose: cli.verbose,
            verify: cli.verify,
            grammar: GrammarSource::from_option(cli.grammar.clone()),
        })
    }

    /// Whether the validity report is printed
    pub fn reports_validity(&self) -> bool {
        self.verbose || self.verify
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_debug_outcomes(self.reports_validity())
            .with_remove_empty_outcomes(false)
    }
}

/// Turn a clap usage error into an invocation error
pub fn usage_error(error: &clap::Error) -> RevManError {
    let rendered = error.render().to_string();
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string();
    RevManError::invalid_invocation(message)
}

/// Main CLI application
///
/// Runs the pipeline `validate -> acquire -> parse -> [report] -> render`,
/// stopping at the first failure.
pub struct RevManApp<P = RevManParser, G = ReplicantGenerator> {
    parser: P,
    generator: G,
    styler: Box<dyn Styler>,
}

impl RevManApp {
    /// Create an application with the bundled parser and generator
    pub fn new(styler: Box<dyn Styler>) -> Self {
        Self::with_parts(RevManParser::new(), ReplicantGenerator::new(), styler)
    }
}

impl<P: DocumentParser, G: AbstractGenerator> RevManApp<P, G> {
    pub fn with_parts(parser: P, generator: G, styler: Box<dyn Styler>) -> Self {
        Self {
            parser,
            generator,
            styler,
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: &Cli, out: &mut dyn Write) -> Result<()> {
        let invocation = Invocation::from_cli(cli)?;

        let run_span = span!(
            Level::INFO,
            "run",
            path = %invocation.path.display(),
            mode = ?invocation.mode
        );
        let _enter = run_span.enter();

        let input = self.acquire(&invocation.path)?;
        let parsed = self.parse(&input, &invocation)?;

        if invocation.reports_validity() {
            self.report_validity(&invocation.path, &parsed.warnings, out)?;
        }

        self.render(&invocation, &parsed.review, out)
    }

    fn acquire(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path).map_err(|e| RevManError::io(path, e))?;
        debug!(bytes = content.len(), "Read input file");
        Ok(content)
    }

    fn parse(&self, input: &str, invocation: &Invocation) -> Result<ParsedReview> {
        let parsed = self.parser.parse(input, invocation.parse_options())?;
        info!(
            parser = self.parser.name(),
            comparisons = parsed.review.comparisons().len(),
            warnings = parsed.warnings.len(),
            "Parsed review"
        );
        Ok(parsed)
    }

    /// Print the validity line and any warnings beneath it
    fn report_validity(
        &self,
        path: &Path,
        warnings: &[String],
        out: &mut dyn Write,
    ) -> Result<()> {
        let marker = self.styler.paint(Role::Success, "RevMan file is valid");
        if warnings.is_empty() {
            writeln!(out, "{} - {}", path.display(), marker)?;
            return Ok(());
        }

        let count = format!("{} warnings", warnings.len());
        writeln!(
            out,
            "{} - {} ({}):",
            path.display(),
            marker,
            self.styler.paint(Role::Alert, &count)
        )?;
        for warning in warnings {
            writeln!(out, "\t- {}", warning)?;
        }
        Ok(())
    }

    fn render(&self, invocation: &Invocation, review: &Review, out: &mut dyn Write) -> Result<()> {
        match invocation.mode {
            Mode::Tree { show_studies } => {
                let tree =
                    TreeRenderer::with_studies(show_studies).render(review, self.styler.as_ref());
                if !tree.is_empty() {
                    writeln!(out, "{}", tree)?;
                }
            }
            Mode::Replicant => {
                let text = self.generator.generate(review, &invocation.grammar)?;
                debug!(generator = self.generator.name(), "Abstract ready");
                writeln!(out, "{}", text)?;
            }
            Mode::Json { pretty } => {
                let json = if pretty {
                    to_highlighted_json(review, self.styler.as_ref())?
                } else {
                    to_json(review)?
                };
                write!(out, "{}", json)?;
            }
            Mode::VerifyOnly => debug!("Verify only, nothing to render"),
        }
        Ok(())
    }

    /// Print `Error <message>` for a failed run
    pub fn report_failure(
        &self,
        error: &anyhow::Error,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(out, "{} {}", self.styler.paint(Role::Error, "Error"), error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use revman::PlainStyler;
    use std::fs;
    use tempfile::tempdir;

    const FIXTURE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../revman/tests/fixtures/sample.rm5"
    );

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["revman"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn app() -> RevManApp {
        RevManApp::new(Box::new(PlainStyler))
    }

    fn run(args: &[&str]) -> (Result<()>, String) {
        let mut out = Vec::new();
        let result = app().run(&cli(args), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    fn error_kind(result: Result<()>) -> &'static str {
        result
            .unwrap_err()
            .downcast_ref::<RevManError>()
            .map(RevManError::kind)
            .unwrap_or("other")
    }

    #[test]
    fn test_cli_parsing_short_flags() {
        let cli = cli(&["-t", "--ss", "-v", "review.rm5"]);
        assert!(cli.tree);
        assert!(cli.show_studies);
        assert!(cli.verbose);
        assert_eq!(cli.files, vec![PathBuf::from("review.rm5")]);
    }

    #[test]
    fn test_cli_parsing_json_options() {
        let cli = cli(&["-j", "-p", "--no-color", "--log-level", "debug", "review.rm5"]);
        assert!(cli.json && cli.pretty && cli.no_color);
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert_eq!(cli.log_directive(), Some("debug"));
    }

    #[test]
    fn test_missing_file_argument() {
        let (result, out) = run(&["--tree"]);
        assert_eq!(error_kind(result), "invalid_invocation");
        assert!(out.is_empty());
    }

    #[test]
    fn test_too_many_file_arguments() {
        let (result, _) = run(&["--tree", "/nonexistent/a.rm5", "/nonexistent/b.rm5"]);
        assert_eq!(error_kind(result), "invalid_invocation");
    }

    #[test]
    fn test_no_mode_selected() {
        let (result, _) = run(&[FIXTURE]);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Specify at least"));
    }

    #[test]
    fn test_conflicting_modes() {
        let (result, _) = run(&["--tree", "--json", FIXTURE]);
        assert_eq!(error_kind(result), "invalid_invocation");
    }

    #[test]
    fn test_verify_suppresses_render() {
        let invocation = Invocation::from_cli(&cli(&["--verify", "--tree", FIXTURE])).unwrap();
        assert_eq!(invocation.mode, Mode::VerifyOnly);
        assert!(invocation.parse_options().debug_outcomes);
        assert!(!invocation.parse_options().remove_empty_outcomes);
    }

    #[test]
    fn test_tree_output() {
        let (result, out) = run(&["--tree", FIXTURE]);
        result.unwrap();
        let headers = out.lines().filter(|l| l.starts_with("* ")).count();
        assert_eq!(headers, 2);
        assert!(out.contains("  - 1.01 Duration of cold (2 studies)\n"));
        assert!(out.contains("    - 1.02.02 Children (subgroup; 1 studies)\n"));
        assert!(out.contains("  - 2.01 Adverse events\n"));
        assert!(!out.contains("valid"));
    }

    #[test]
    fn test_tree_with_studies() {
        let (result, out) = run(&["-t", "--ss", FIXTURE]);
        result.unwrap();
        assert!(out.contains("    - 1.01.01 STD-Alpha-2001\n"));
        assert!(out.contains("      - 1.02.01.02 STD-Gamma-2010\n"));
    }

    #[test]
    fn test_json_round_trip() {
        let (result, out) = run(&["--json", FIXTURE]);
        result.unwrap();
        let decoded: Review = serde_json::from_str(&out).unwrap();
        let expected = revman::parse(&fs::read_to_string(FIXTURE).unwrap())
            .unwrap()
            .review;
        assert_eq!(decoded, expected);
    }

    #[test]
    fn test_pretty_json_has_same_data() {
        let (_, compact) = run(&["--json", FIXTURE]);
        let (_, pretty) = run(&["--json", "--pretty", FIXTURE]);
        assert_ne!(compact, pretty);
        let compact: serde_json::Value = serde_json::from_str(&compact).unwrap();
        let pretty: serde_json::Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(compact, pretty);
    }

    #[test]
    fn test_verify_reports_warnings_in_order() {
        let (result, out) = run(&["--verify", FIXTURE]);
        result.unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines[0],
            format!("{} - RevMan file is valid (3 warnings):", FIXTURE)
        );
        assert_eq!(
            lines[1],
            "\t- Outcome \"Adverse events\" (CMP-002.01) has no study data"
        );
        assert_eq!(
            lines[2],
            "\t- Outcome \"Adverse events\" (CMP-002.01) declares 1 studies but contains 0"
        );
        assert_eq!(
            lines[3],
            "\t- Outcome \"Days off work\" (CMP-002.02) references unknown study STD-Epsilon-2019"
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_verbose_report_precedes_render() {
        let (result, out) = run(&["--verbose", "--tree", FIXTURE]);
        result.unwrap();
        assert!(out.starts_with(&format!("{} - RevMan file is valid (3 warnings):\n", FIXTURE)));
        assert!(out.contains("* Green tea versus placebo"));
    }

    #[test]
    fn test_valid_file_without_warnings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.rm5");
        fs::write(
            &path,
            r#"<COCHRANE_REVIEW><COVER_SHEET><TITLE>Clean</TITLE></COVER_SHEET>
<ANALYSES_AND_DATA/></COCHRANE_REVIEW>"#,
        )
        .unwrap();
        let (result, out) = run(&["--verify", path.to_str().unwrap()]);
        result.unwrap();
        assert_eq!(out, format!("{} - RevMan file is valid\n", path.display()));
    }

    #[test]
    fn test_unreadable_file() {
        let (result, out) = run(&["--tree", "/nonexistent/review.rm5"]);
        assert_eq!(error_kind(result), "io");
        assert!(out.is_empty());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.rm5");
        fs::write(&path, "<COCHRANE_REVIEW><TITLE></COCHRANE_REVIEW>").unwrap();
        let (result, _) = run(&["--json", path.to_str().unwrap()]);
        assert_eq!(error_kind(result), "parse");
    }

    #[test]
    fn test_replicant_with_builtin_grammar() {
        let (result, out) = run(&["--replicant", FIXTURE]);
        result.unwrap();
        assert!(out.starts_with("Green tea & honey for the common cold\n"));
        assert!(out.contains("1.01 Duration of cold: 2 studies, RR 0.72"));
    }

    #[test]
    fn test_replicant_with_missing_grammar() {
        let (result, out) = run(&["-r", "--grammar", "/nonexistent/grammar.j2", FIXTURE]);
        assert_eq!(error_kind(result), "generation");
        assert!(out.is_empty());
    }

    #[test]
    fn test_replicant_with_custom_grammar() {
        let dir = tempdir().unwrap();
        let grammar = dir.path().join("short.j2");
        fs::write(&grammar, "{{ title }} ({{ comparison_count }} comparisons)").unwrap();
        let (result, out) = run(&["-r", "--grammar", grammar.to_str().unwrap(), FIXTURE]);
        result.unwrap();
        assert_eq!(out, "Green tea & honey for the common cold (2 comparisons)\n");
    }

    struct TaggingStyler;

    impl Styler for TaggingStyler {
        fn paint(&self, role: Role, text: &str) -> String {
            format!("[{:?}:{}]", role, text)
        }
    }

    #[test]
    fn test_validity_report_highlights_warning_count() {
        let app = RevManApp::new(Box::new(TaggingStyler));
        let mut out = Vec::new();
        app.run(&cli(&["--verify", FIXTURE]), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(
            lines[0],
            format!(
                "{} - [Success:RevMan file is valid] ([Alert:3 warnings]):",
                FIXTURE
            )
        );
        assert_eq!(
            lines[1],
            "\t- Outcome \"Adverse events\" (CMP-002.01) has no study data"
        );
    }

    #[test]
    fn test_replicant_text_is_printed_verbatim() {
        let dir = tempdir().unwrap();
        let grammar = dir.path().join("spaced.j2");
        fs::write(&grammar, "{{ title }}\n\n\n").unwrap();
        let (result, out) = run(&["-r", "--grammar", grammar.to_str().unwrap(), FIXTURE]);
        result.unwrap();
        assert_eq!(out, "Green tea & honey for the common cold\n\n\n");
    }

    #[test]
    fn test_report_failure_format() {
        let mut out = Vec::new();
        let error = anyhow::Error::new(RevManError::invalid_invocation("Missing input file"));
        app().report_failure(&error, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Error Missing input file\n");
    }

    #[test]
    fn test_usage_error_message() {
        let err = Cli::try_parse_from(["revman", "--bogus", "x.rm5"]).unwrap_err();
        let message = usage_error(&err).to_string();
        assert!(message.contains("--bogus"));
        assert!(!message.starts_with("error:"));
    }
}
