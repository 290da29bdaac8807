//! Integration tests for the public API

use revman::prelude::*;
use revman::{generate_abstract, parse, parse_with_options, to_json};

const SAMPLE: &str = include_str!("fixtures/sample.rm5");

#[test]
fn test_parse_sample_review() {
    let parsed = parse(SAMPLE).unwrap();
    let review = &parsed.review;

    assert_eq!(
        review.title.as_deref(),
        Some("Green tea & honey for the common cold")
    );
    assert_eq!(review.authors.len(), 2);
    assert_eq!(review.authors[0].display_name(), "Ada Lovelace");
    assert_eq!(review.included_studies.len(), 4);
    assert_eq!(review.comparisons().len(), 2);
    assert_eq!(review.outcome_count(), 4);
    assert!(parsed.warnings.is_empty());
}

#[test]
fn test_outcome_types_follow_element_prefix() {
    let review = parse(SAMPLE).unwrap().review;
    let types: Vec<OutcomeType> = review
        .comparisons()
        .iter()
        .flat_map(|c| c.outcomes.iter().map(|o| o.outcome_type))
        .collect();
    assert_eq!(
        types,
        vec![
            OutcomeType::Dichotomous,
            OutcomeType::Continuous,
            OutcomeType::Dichotomous,
            OutcomeType::GenericInverseVariance,
        ]
    );
}

#[test]
fn test_empty_outcomes_are_kept_by_default() {
    let review = parse(SAMPLE).unwrap().review;
    let adverse = &review.comparisons()[1].outcomes[0];
    assert_eq!(adverse.name, "Adverse events");
    assert!(adverse.is_empty());
}

#[test]
fn test_remove_empty_outcomes() {
    let options = ParseOptions::new().with_remove_empty_outcomes(true);
    let review = parse_with_options(SAMPLE, options).unwrap().review;
    assert_eq!(review.outcome_count(), 3);
    assert_eq!(review.comparisons()[1].outcomes[0].name, "Days off work");
}

#[test]
fn test_parser_through_trait_object() {
    let parser: Box<dyn DocumentParser> = Box::new(RevManParser::new());
    let parsed = parser.parse(SAMPLE, ParseOptions::default()).unwrap();
    assert_eq!(parser.name(), "revman");
    assert_eq!(parsed.review.comparisons()[0].name, "Green tea versus placebo");
}

#[test]
fn test_generate_abstract_for_sample() {
    let review = parse(SAMPLE).unwrap().review;
    let text = generate_abstract(&review).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Green tea & honey for the common cold"));
    assert_eq!(lines.next(), Some("Ada Lovelace, Archie Cochrane"));
    assert!(text.contains("Objectives: To assess whether green tea shortens the common cold."));
    assert!(text.contains("this review includes 4 studies, analysed across 2 comparisons and 4 outcomes"));
    assert!(text.contains("1. Green tea versus placebo"));
    assert!(text.contains("1.02 Symptom score: 3 studies in 2 subgroups"));
    assert!(text.contains("no statistically significant difference"));
    assert!(text.ends_with("More trials are needed."));
}

#[test]
fn test_json_round_trip() {
    let review = parse(SAMPLE).unwrap().review;
    let json = to_json(&review).unwrap();
    let decoded: Review = serde_json::from_str(&json).unwrap();
    assert_eq!(decoded, review);
}
