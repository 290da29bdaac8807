//! Values exposed to grammar templates
//!
//! Templates run with strict undefined handling, so every field here is
//! always present (absent data is `none` or an empty list, never missing).

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::document::{Attributes, Outcome, Review};
use crate::render::tree::outcome_label;

/// Effect measures reported as ratios; their line of no effect is 1
const RATIO_MEASURES: &[&str] = &["RR", "OR", "PETO_OR", "HR"];

#[derive(Debug, Clone, Serialize)]
pub struct AbstractContext<'a> {
    pub title: Option<&'a str>,
    pub authors: Vec<String>,
    pub meta: &'a Attributes,
    #[serde(rename = "abstract")]
    pub abstract_sections: &'a BTreeMap<String, String>,
    pub study_count: usize,
    pub comparison_count: usize,
    pub outcome_count: usize,
    pub comparisons: Vec<ComparisonContext<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonContext<'a> {
    pub number: usize,
    pub name: &'a str,
    pub outcomes: Vec<OutcomeContext<'a>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeContext<'a> {
    pub label: String,
    pub name: &'a str,
    pub outcome_type: &'static str,
    pub study_count: usize,
    pub subgroups: Vec<SubgroupContext<'a>>,
    pub effect: Option<EffectContext>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubgroupContext<'a> {
    pub label: String,
    pub name: &'a str,
    pub study_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectContext {
    pub measure: String,
    pub estimate: String,
    pub ci_low: String,
    pub ci_high: String,
    /// The confidence interval excludes the line of no effect
    pub significant: bool,
}

impl<'a> AbstractContext<'a> {
    pub fn new(review: &'a Review) -> Self {
        let comparisons = review
            .comparisons()
            .iter()
            .enumerate()
            .map(|(comparison_index, comparison)| ComparisonContext {
                number: comparison_index + 1,
                name: &comparison.name,
                outcomes: comparison
                    .outcomes
                    .iter()
                    .enumerate()
                    .map(|(outcome_index, outcome)| {
                        outcome_context(outcome_label(comparison_index, outcome_index), outcome)
                    })
                    .collect(),
            })
            .collect();

        Self {
            title: review.title.as_deref(),
            authors: review.authors.iter().map(|p| p.display_name()).collect(),
            meta: &review.meta,
            abstract_sections: &review.abstract_sections,
            study_count: study_count(review),
            comparison_count: review.comparisons().len(),
            outcome_count: review.outcome_count(),
            comparisons,
        }
    }
}

fn outcome_context(label: String, outcome: &Outcome) -> OutcomeContext<'_> {
    let subgroups = outcome
        .subgroups
        .iter()
        .map(|subgroup| SubgroupContext {
            label: format!("{}.{:02}", label, subgroup.no),
            name: &subgroup.name,
            study_count: subgroup.studies.len(),
        })
        .collect();

    OutcomeContext {
        label,
        name: &outcome.name,
        outcome_type: outcome.outcome_type.as_str(),
        study_count: outcome.study_data_count(),
        subgroups,
        effect: effect(outcome),
    }
}

/// Included studies when the review lists them, distinct data-row studies otherwise
fn study_count(review: &Review) -> usize {
    if !review.included_studies.is_empty() {
        return review.included_studies.len();
    }
    review
        .comparisons()
        .iter()
        .flat_map(|c| &c.outcomes)
        .flat_map(|o| o.studies.iter().chain(o.subgroups.iter().flat_map(|s| &s.studies)))
        .map(|s| s.study_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

fn effect(outcome: &Outcome) -> Option<EffectContext> {
    let number = |key: &str| outcome.extra.get(key).and_then(|v| v.as_f64());
    let measure = outcome.extra.get("effectMeasure")?.as_str()?.to_string();
    let estimate = number("effectSize")?;
    let ci_low = number("ciStart")?;
    let ci_high = number("ciEnd")?;

    let null_value = if RATIO_MEASURES.contains(&measure.as_str()) {
        1.0
    } else {
        0.0
    };
    let significant = ci_low > null_value || ci_high < null_value;

    Some(EffectContext {
        measure,
        estimate: format!("{:.2}", estimate),
        ci_low: format!("{:.2}", ci_low),
        ci_high: format!("{:.2}", ci_high),
        significant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{AnalysesAndData, Comparison, StudyData};
    use serde_json::json;

    fn outcome_with_effect(measure: &str, size: f64, low: f64, high: f64) -> Outcome {
        let mut outcome = Outcome {
            id: "CMP-001.01".to_string(),
            name: "Mortality".to_string(),
            ..Outcome::default()
        };
        outcome.extra.insert("effectMeasure".to_string(), json!(measure));
        outcome.extra.insert("effectSize".to_string(), json!(size));
        outcome.extra.insert("ciStart".to_string(), json!(low));
        outcome.extra.insert("ciEnd".to_string(), json!(high));
        outcome
    }

    #[test]
    fn test_ratio_effect_significance() {
        let hit = effect(&outcome_with_effect("RR", 0.5, 0.3, 0.8)).unwrap();
        assert!(hit.significant);
        assert_eq!(hit.estimate, "0.50");

        let miss = effect(&outcome_with_effect("OR", 0.9, 0.7, 1.2)).unwrap();
        assert!(!miss.significant);
    }

    #[test]
    fn test_difference_effect_significance() {
        let hit = effect(&outcome_with_effect("MD", -2.0, -3.1, -0.4)).unwrap();
        assert!(hit.significant);
        let miss = effect(&outcome_with_effect("SMD", 0.1, -0.2, 0.4)).unwrap();
        assert!(!miss.significant);
    }

    #[test]
    fn test_effect_requires_all_fields() {
        let mut outcome = outcome_with_effect("RR", 0.5, 0.3, 0.8);
        outcome.extra.remove("ciEnd");
        assert!(effect(&outcome).is_none());
    }

    #[test]
    fn test_study_count_falls_back_to_distinct_rows() {
        let row = |id: &str| StudyData {
            study_id: id.to_string(),
            ..StudyData::default()
        };
        let review = Review {
            analyses_and_data: AnalysesAndData {
                comparisons: vec![Comparison {
                    outcomes: vec![
                        Outcome {
                            studies: vec![row("A"), row("B")],
                            ..Outcome::default()
                        },
                        Outcome {
                            studies: vec![row("B"), row("C")],
                            ..Outcome::default()
                        },
                    ],
                    ..Comparison::default()
                }],
            },
            ..Review::default()
        };
        let context = AbstractContext::new(&review);
        assert_eq!(context.study_count, 3);
        assert_eq!(context.outcome_count, 2);
        assert_eq!(context.comparisons[0].outcomes[1].label, "1.02");
    }
}
