//! Scholarship listings and the in-memory query pipeline that runs over them.
//!
//! Handlers load the candidate set with a single store read and hand it to
//! [`filter_and_sort`] (browse page) or [`matches`] (eligibility form and API).
//! Both are pure functions, so every access channel sees identical answers.

mod dates;
mod eligibility;
mod filter;

pub use eligibility::{EligibilityCriteria, matches, parse_gpa};
pub use filter::{BrowseCriteria, SortKey, filter_and_sort};

use serde::Serialize;

/// A scholarship listing with its checklist already decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scholarship {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub university: Option<String>,
    pub level: Option<String>,
    pub field: Option<String>,
    pub tags: Option<String>,
    pub deadline: Option<String>,
    pub link: String,
    pub checklist: Vec<String>,
    pub min_gpa: Option<f64>,
    pub is_international_only: bool,
    pub image_filename: Option<String>,
    pub brochure_filename: Option<String>,
}

/// Joins checklist items into the newline-delimited storage form.
pub fn encode_checklist(items: &[String]) -> String {
    items.join("\n")
}

/// Splits stored checklist text back into ordered items.
///
/// Absent or empty storage yields an empty list.
pub fn decode_checklist(stored: Option<&str>) -> Vec<String> {
    match stored {
        Some(text) if !text.is_empty() => text.lines().map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
pub(crate) fn sample(id: i64, name: &str, country: &str) -> Scholarship {
    Scholarship {
        id,
        name: name.to_string(),
        country: country.to_string(),
        university: None,
        level: None,
        field: None,
        tags: None,
        deadline: None,
        link: format!("https://example.org/{id}"),
        checklist: Vec::new(),
        min_gpa: None,
        is_international_only: false,
        image_filename: None,
        brochure_filename: None,
    }
}
