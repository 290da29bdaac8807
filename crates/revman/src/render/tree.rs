//! Tree rendering of comparisons, outcomes, subgroups and studies
//!
//! ```text
//! * Tea versus placebo
//!   - 1.01 Cold duration (2 studies)
//!   - 1.02 Symptom score
//!     - 1.02.01 Adults (subgroup; 3 studies)
//!
//! * Tea versus coffee
//!   - 2.01 Cold duration (1 studies)
//! ```
//!
//! Outcome and study labels come from positions; subgroup labels use the
//! subgroup's declared number.

use tracing::{debug, span, Level};

use crate::core::{Role, Styler};
use crate::document::{Outcome, Review, StudyData};

/// Renders the review hierarchy as an indented, numbered list
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeRenderer {
    show_studies: bool,
}

impl TreeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also list study identifiers at the deepest level
    pub fn with_studies(show_studies: bool) -> Self {
        Self { show_studies }
    }

    pub fn render(&self, review: &Review, styler: &dyn Styler) -> String {
        let render_span = span!(
            Level::INFO,
            "render_tree",
            comparisons = review.comparisons().len()
        );
        let _enter = render_span.enter();

        let mut out = String::new();
        let comparisons = review.comparisons();
        for (comparison_index, comparison) in comparisons.iter().enumerate() {
            out.push_str(&styler.paint(Role::Heading, &format!("* {}", comparison.name)));
            out.push('\n');

            for (outcome_index, outcome) in comparison.outcomes.iter().enumerate() {
                let prefix = outcome_label(comparison_index, outcome_index);
                self.render_outcome(&mut out, &prefix, outcome, styler);
            }

            if comparison_index + 1 < comparisons.len() {
                out.push('\n');
            }
        }

        debug!(bytes = out.len(), "Tree rendered");
        out
    }

    fn render_outcome(&self, out: &mut String, prefix: &str, outcome: &Outcome, styler: &dyn Styler) {
        let mut line = format!("  - {} {}", styler.paint(Role::Muted, prefix), outcome.name);
        if outcome.subgroups.is_empty() && !outcome.studies.is_empty() {
            let count = format!("({} studies)", outcome.studies.len());
            line.push(' ');
            line.push_str(&styler.paint(Role::Muted, &count));
        }
        out.push_str(&line);
        out.push('\n');

        if !outcome.subgroups.is_empty() {
            for subgroup in &outcome.subgroups {
                let subgroup_prefix = format!("{}.{}", prefix, pad(subgroup.no as usize));
                let count = format!("(subgroup; {} studies)", subgroup.studies.len());
                out.push_str(&format!(
                    "    - {} {} {}\n",
                    styler.paint(Role::Muted, &subgroup_prefix),
                    subgroup.name,
                    styler.paint(Role::Muted, &count)
                ));
                if self.show_studies {
                    render_studies(out, "      ", &subgroup_prefix, &subgroup.studies, styler);
                }
            }
        } else if self.show_studies {
            render_studies(out, "    ", prefix, &outcome.studies, styler);
        }
    }
}

fn render_studies(
    out: &mut String,
    indent: &str,
    prefix: &str,
    studies: &[StudyData],
    styler: &dyn Styler,
) {
    for (study_index, study) in studies.iter().enumerate() {
        let label = format!("{}.{}", prefix, pad(study_index + 1));
        out.push_str(&format!(
            "{}- {} {}\n",
            indent,
            styler.paint(Role::Muted, &label),
            study.study_id
        ));
    }
}

/// `<comparison>.<outcome>` label from zero-based positions
pub fn outcome_label(comparison_index: usize, outcome_index: usize) -> String {
    format!("{}.{}", comparison_index + 1, pad(outcome_index + 1))
}

/// Two-digit zero padding; wider numbers are printed in full
fn pad(n: usize) -> String {
    format!("{:02}", n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlainStyler;
    use crate::document::{AnalysesAndData, Comparison, Subgroup};

    fn study(id: &str) -> StudyData {
        StudyData {
            study_id: id.to_string(),
            ..StudyData::default()
        }
    }

    fn sample() -> Review {
        let plain = Outcome {
            id: "CMP-001.01".to_string(),
            name: "Cold duration".to_string(),
            studies: vec![study("STD-A"), study("STD-B")],
            ..Outcome::default()
        };
        let split = Outcome {
            id: "CMP-001.02".to_string(),
            name: "Symptom score".to_string(),
            subgroups: vec![Subgroup {
                id: "CMP-001.02.03".to_string(),
                no: 3,
                name: "Adults".to_string(),
                studies: vec![study("STD-C")],
                ..Subgroup::default()
            }],
            ..Outcome::default()
        };
        let empty = Outcome {
            id: "CMP-002.01".to_string(),
            name: "Relapse".to_string(),
            ..Outcome::default()
        };
        Review {
            analyses_and_data: AnalysesAndData {
                comparisons: vec![
                    Comparison {
                        id: "CMP-001".to_string(),
                        name: "Tea versus placebo".to_string(),
                        outcomes: vec![plain, split],
                        ..Comparison::default()
                    },
                    Comparison {
                        id: "CMP-002".to_string(),
                        name: "Tea versus coffee".to_string(),
                        outcomes: vec![empty],
                        ..Comparison::default()
                    },
                ],
            },
            ..Review::default()
        }
    }

    #[test]
    fn test_render_tree() {
        let output = TreeRenderer::new().render(&sample(), &PlainStyler);
        let expected = "\
* Tea versus placebo
  - 1.01 Cold duration (2 studies)
  - 1.02 Symptom score
    - 1.02.03 Adults (subgroup; 1 studies)

* Tea versus coffee
  - 2.01 Relapse
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_render_tree_with_studies() {
        let output = TreeRenderer::with_studies(true).render(&sample(), &PlainStyler);
        assert!(output.contains("    - 1.01.01 STD-A\n"));
        assert!(output.contains("    - 1.01.02 STD-B\n"));
        assert!(output.contains("      - 1.02.03.01 STD-C\n"));
    }

    #[test]
    fn test_no_blank_line_after_last_comparison() {
        let output = TreeRenderer::new().render(&sample(), &PlainStyler);
        assert!(!output.ends_with("\n\n"));
        assert_eq!(output.matches("\n\n").count(), 1);
    }

    #[test]
    fn test_empty_review_renders_nothing() {
        let output = TreeRenderer::new().render(&Review::default(), &PlainStyler);
        assert!(output.is_empty());
    }

    #[test]
    fn test_outcome_label_padding() {
        assert_eq!(outcome_label(0, 0), "1.01");
        assert_eq!(outcome_label(11, 8), "12.09");
        assert_eq!(outcome_label(0, 122), "1.123");
    }
}
