//! Typed review document
//!
//! The model mirrors the RevMan hierarchy: comparisons hold outcomes, outcomes
//! optionally hold subgroups, and study data rows sit at the deepest level.
//! Attributes the model does not name are kept in flattened `extra` maps so
//! that the JSON dump stays faithful to the source file.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form attributes keyed by camelCased RevMan names
pub type Attributes = BTreeMap<String, Value>;

/// A parsed RevMan review
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Attributes of the root `COCHRANE_REVIEW` element
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub meta: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Person>,
    /// Abstract sections keyed by name (`background`, `objectives`, ...)
    #[serde(
        rename = "abstract",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub abstract_sections: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_studies: Vec<StudyReference>,
    #[serde(default)]
    pub analyses_and_data: AnalysesAndData,
}

impl Review {
    pub fn comparisons(&self) -> &[Comparison] {
        &self.analyses_and_data.comparisons
    }

    /// Total number of outcomes across all comparisons
    pub fn outcome_count(&self) -> usize {
        self.comparisons().iter().map(|c| c.outcomes.len()).sum()
    }

    /// Look up an included study by its identifier
    pub fn study(&self, id: &str) -> Option<&StudyReference> {
        self.included_studies.iter().find(|s| s.id == id)
    }
}

/// A review author
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl Person {
    /// "First Last", or whichever half is present
    pub fn display_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// An entry of the review's included studies list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyReference {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(flatten)]
    pub extra: Attributes,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysesAndData {
    #[serde(default)]
    pub comparisons: Vec<Comparison>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<u32>,
    pub name: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    #[serde(flatten)]
    pub extra: Attributes,
}

/// Kind of data an outcome carries, taken from its element prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeType {
    #[default]
    Dichotomous,
    Continuous,
    GenericInverseVariance,
    IndividualPatientData,
    Other,
}

impl OutcomeType {
    /// Map an element prefix (`DICH`, `CONT`, `IV`, `IPD`, `OTHER`) to its type
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "DICH" => Some(Self::Dichotomous),
            "CONT" => Some(Self::Continuous),
            "IV" => Some(Self::GenericInverseVariance),
            "IPD" => Some(Self::IndividualPatientData),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dichotomous => "dichotomous",
            Self::Continuous => "continuous",
            Self::GenericInverseVariance => "generic inverse variance",
            Self::IndividualPatientData => "individual patient data",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<u32>,
    pub name: String,
    pub outcome_type: OutcomeType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subgroups: Vec<Subgroup>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub studies: Vec<StudyData>,
    #[serde(flatten)]
    pub extra: Attributes,
}

impl Outcome {
    /// Number of data rows, counting subgroup rows when subgroups exist
    pub fn study_data_count(&self) -> usize {
        if self.subgroups.is_empty() {
            self.studies.len()
        } else {
            self.subgroups.iter().map(|s| s.studies.len()).sum()
        }
    }

    /// True when neither the outcome nor any of its subgroups has data
    pub fn is_empty(&self) -> bool {
        self.studies.is_empty() && self.subgroups.iter().all(|s| s.studies.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subgroup {
    pub id: String,
    /// Declared subgroup number, used for tree labels
    pub no: u32,
    pub name: String,
    #[serde(default)]
    pub studies: Vec<StudyData>,
    #[serde(flatten)]
    pub extra: Attributes,
}

/// One study's data row within an outcome or subgroup
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyData {
    pub study_id: String,
    #[serde(flatten)]
    pub extra: Attributes,
}
