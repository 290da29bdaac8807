//! RevMan parser implementation
//!
//! Maps the XML tree of a RevMan 5 `.rm5` export onto the typed [`Review`]
//! model and collects warnings for recoverable anomalies.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, span, trace, Level};

use super::attributes::{attribute_key, camel_case, coerce_value};
use super::model::{
    AnalysesAndData, Attributes, Comparison, Outcome, OutcomeType, Person, Review, StudyData,
    StudyReference, Subgroup,
};
use super::xml::{parse_document, XmlElement};
use crate::core::{DocumentParser, ParseOptions, ParsedReview, Result, RevManError};

const ROOT_ELEMENT: &str = "COCHRANE_REVIEW";

/// Keys that name typed fields on a node and must not appear in its `extra` map
const NODE_FIELDS: &[&str] = &[
    "id",
    "no",
    "name",
    "outcomes",
    "outcomeType",
    "subgroups",
    "studies",
    "studyId",
];

/// RevMan `.rm5` parser
#[derive(Debug, Clone, Copy, Default)]
pub struct RevManParser;

impl RevManParser {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for RevManParser {
    fn parse(&self, input: &str, options: ParseOptions) -> Result<ParsedReview> {
        let parse_span = span!(Level::INFO, "parse_revman", input_len = input.len());
        let _enter = parse_span.enter();

        trace!(?options, "Starting RevMan parsing");

        let root = parse_document(input)?;
        if root.name != ROOT_ELEMENT {
            return Err(RevManError::structure_error(format!(
                "Root element is <{}>, expected <{}>",
                root.name, ROOT_ELEMENT
            )));
        }

        let mut mapper = Mapper::default();
        let mut review = mapper.review(&root)?;

        if options.remove_empty_outcomes {
            let before = review.outcome_count();
            for comparison in &mut review.analyses_and_data.comparisons {
                comparison.outcomes.retain(|outcome| !outcome.is_empty());
            }
            debug!(
                removed = before - review.outcome_count(),
                "Removed empty outcomes"
            );
        }

        if options.debug_outcomes {
            mapper.scan_outcomes(&review);
        }

        for warning in &mapper.warnings {
            debug!(warning = %warning, "RevMan warning");
        }

        info!(
            comparisons = review.comparisons().len(),
            outcomes = review.outcome_count(),
            warnings = mapper.warnings.len(),
            "RevMan parsing completed successfully"
        );

        Ok(ParsedReview {
            review,
            warnings: mapper.warnings,
        })
    }

    fn name(&self) -> &'static str {
        "revman"
    }
}

/// Walks the XML tree and accumulates warnings
#[derive(Debug, Default)]
struct Mapper {
    warnings: Vec<String>,
}

impl Mapper {
    fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    fn review(&mut self, root: &XmlElement) -> Result<Review> {
        let meta = root
            .attributes
            .iter()
            .map(|(key, value)| (camel_case(key), coerce_value(value)))
            .collect();

        let title = root
            .descend(&["COVER_SHEET", "TITLE"])
            .map(XmlElement::text)
            .filter(|t| !t.is_empty());
        if title.is_none() {
            self.warn("Review has no title".to_string());
        }

        let authors = root
            .descend(&["COVER_SHEET", "CREATORS"])
            .map(|creators| {
                creators
                    .elements()
                    .filter(|e| e.name == "PERSON")
                    .map(person)
                    .collect()
            })
            .unwrap_or_default();

        let abstract_sections = root
            .descend(&["MAIN_TEXT", "ABSTRACT"])
            .map(abstract_sections)
            .unwrap_or_default();

        let included_studies = root
            .descend(&["STUDIES_AND_REFERENCES", "STUDIES", "INCLUDED_STUDIES"])
            .map(|studies| {
                studies
                    .elements()
                    .filter(|e| e.name == "STUDY")
                    .filter_map(study_reference)
                    .collect()
            })
            .unwrap_or_default();

        let analyses_and_data = match root.child("ANALYSES_AND_DATA") {
            Some(analyses) => self.analyses(analyses)?,
            None => {
                self.warn("Review has no ANALYSES_AND_DATA section".to_string());
                AnalysesAndData::default()
            }
        };

        Ok(Review {
            meta,
            title,
            authors,
            abstract_sections,
            included_studies,
            analyses_and_data,
        })
    }

    fn analyses(&mut self, element: &XmlElement) -> Result<AnalysesAndData> {
        let comparisons = element
            .elements()
            .filter(|e| e.name == "COMPARISON")
            .map(|e| self.comparison(e))
            .collect::<Result<Vec<_>>>()?;
        debug!(count = comparisons.len(), "Mapped comparisons");
        Ok(AnalysesAndData { comparisons })
    }

    fn comparison(&mut self, element: &XmlElement) -> Result<Comparison> {
        let id = element.attribute("ID").unwrap_or_default().to_string();
        let name = required_name(element, &id)?;

        let mut outcomes = Vec::new();
        for child in element.elements() {
            if let Some(outcome_type) = outcome_type(&child.name) {
                outcomes.push(self.outcome(child, outcome_type)?);
            }
        }
        trace!(comparison = %id, outcomes = outcomes.len(), "Mapped comparison");

        Ok(Comparison {
            no: declared_number(element),
            extra: extra_fields(element, |name| {
                outcome_type(name).is_some() || name == "NAME"
            }),
            id,
            name,
            outcomes,
        })
    }

    fn outcome(&mut self, element: &XmlElement, outcome_type: OutcomeType) -> Result<Outcome> {
        let id = element.attribute("ID").unwrap_or_default().to_string();
        let name = required_name(element, &id)?;

        let mut subgroups = Vec::new();
        let mut studies = Vec::new();
        for child in element.elements() {
            if child.name.ends_with("_SUBGROUP") {
                let position = subgroups.len() + 1;
                subgroups.push(self.subgroup(child, &name, position)?);
            } else if child.name.ends_with("_DATA") {
                studies.push(study_data(child, &id)?);
            }
        }

        Ok(Outcome {
            no: declared_number(element),
            outcome_type,
            extra: extra_fields(element, |name| {
                name == "NAME" || name.ends_with("_SUBGROUP") || name.ends_with("_DATA")
            }),
            id,
            name,
            subgroups,
            studies,
        })
    }

    fn subgroup(
        &mut self,
        element: &XmlElement,
        outcome_name: &str,
        position: usize,
    ) -> Result<Subgroup> {
        let id = element.attribute("ID").unwrap_or_default().to_string();
        let name = required_name(element, &id)?;

        let no = match declared_number(element) {
            Some(no) => no,
            None => {
                self.warn(format!(
                    "Subgroup \"{}\" of outcome \"{}\" has no number, using position {}",
                    name, outcome_name, position
                ));
                position as u32
            }
        };

        let studies = element
            .elements()
            .filter(|e| e.name.ends_with("_DATA"))
            .map(|e| study_data(e, &id))
            .collect::<Result<Vec<_>>>()?;

        Ok(Subgroup {
            extra: extra_fields(element, |name| name == "NAME" || name.ends_with("_DATA")),
            id,
            no,
            name,
            studies,
        })
    }

    /// Detailed structural scan, enabled by `debug_outcomes`
    fn scan_outcomes(&mut self, review: &Review) {
        let scan_span = span!(Level::DEBUG, "scan_outcomes");
        let _enter = scan_span.enter();

        let known: HashSet<&str> = review
            .included_studies
            .iter()
            .map(|s| s.id.as_str())
            .collect();

        for comparison in review.comparisons() {
            for outcome in &comparison.outcomes {
                let label = format!("Outcome \"{}\" ({})", outcome.name, outcome.id);

                if outcome.is_empty() {
                    self.warn(format!("{} has no study data", label));
                }

                for subgroup in &outcome.subgroups {
                    if subgroup.studies.is_empty() {
                        self.warn(format!(
                            "Subgroup \"{}\" of {} has no study data",
                            subgroup.name, label
                        ));
                    }
                }

                let rows = outcome
                    .studies
                    .iter()
                    .chain(outcome.subgroups.iter().flat_map(|s| s.studies.iter()));
                if !known.is_empty() {
                    for row in rows {
                        if !known.contains(row.study_id.as_str()) {
                            self.warn(format!(
                                "{} references unknown study {}",
                                label, row.study_id
                            ));
                        }
                    }
                }

                if let Some(declared) = outcome
                    .extra
                    .get("declaredStudies")
                    .and_then(|v| v.as_u64())
                {
                    let found = outcome.study_data_count() as u64;
                    if declared != found {
                        self.warn(format!(
                            "{} declares {} studies but contains {}",
                            label, declared, found
                        ));
                    }
                }
            }
        }
        debug!(warnings = self.warnings.len(), "Outcome scan finished");
    }
}

fn outcome_type(element_name: &str) -> Option<OutcomeType> {
    element_name
        .strip_suffix("_OUTCOME")
        .and_then(OutcomeType::from_prefix)
}

fn declared_number(element: &XmlElement) -> Option<u32> {
    element.attribute("NO").and_then(|no| no.trim().parse().ok())
}

fn required_name(element: &XmlElement, id: &str) -> Result<String> {
    element
        .child("NAME")
        .map(XmlElement::text)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            RevManError::structure_error(format!(
                "<{}> {} has no NAME",
                element.name,
                if id.is_empty() { "(no ID)" } else { id }
            ))
        })
}

/// Remaining attributes plus the text of simple child elements
fn extra_fields(element: &XmlElement, skip_child: impl Fn(&str) -> bool) -> Attributes {
    let mut extra = Attributes::new();
    for (key, value) in &element.attributes {
        if matches!(key.as_str(), "ID" | "NO") {
            continue;
        }
        extra.insert(attribute_key(key, NODE_FIELDS), coerce_value(value));
    }
    for child in element.elements() {
        if skip_child(&child.name) || !child.is_leaf() {
            continue;
        }
        let text = child.text();
        if !text.is_empty() {
            extra.insert(
                attribute_key(&child.name, NODE_FIELDS),
                serde_json::Value::String(text),
            );
        }
    }
    extra
}

fn study_data(element: &XmlElement, parent_id: &str) -> Result<StudyData> {
    let study_id = element.attribute("STUDY_ID").ok_or_else(|| {
        RevManError::structure_error(format!(
            "<{}> in {} is missing STUDY_ID",
            element.name, parent_id
        ))
    })?;
    let extra = element
        .attributes
        .iter()
        .filter(|(key, _)| key != "STUDY_ID")
        .map(|(key, value)| (attribute_key(key, NODE_FIELDS), coerce_value(value)))
        .collect();
    Ok(StudyData {
        study_id: study_id.to_string(),
        extra,
    })
}

fn study_reference(element: &XmlElement) -> Option<StudyReference> {
    let id = element.attribute("ID")?.to_string();
    let extra = element
        .attributes
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "ID" | "NAME" | "YEAR"))
        .map(|(key, value)| (camel_case(key), coerce_value(value)))
        .collect();
    Some(StudyReference {
        id,
        name: element.attribute("NAME").map(str::to_string),
        year: element.attribute("YEAR").map(str::to_string),
        extra,
    })
}

fn person(element: &XmlElement) -> Person {
    let field = |name: &str| {
        element
            .child(name)
            .map(XmlElement::text)
            .filter(|t| !t.is_empty())
    };
    Person {
        first_name: field("FIRST_NAME"),
        last_name: field("LAST_NAME"),
    }
}

fn abstract_sections(element: &XmlElement) -> BTreeMap<String, String> {
    element
        .elements()
        .filter_map(|section| {
            let key = camel_case(section.name.strip_prefix("ABS_")?);
            let text = section.text();
            (!text.is_empty()).then_some((key, text))
        })
        .collect()
}
