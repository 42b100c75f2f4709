use sqlx::FromRow;

use crate::listings::{Scholarship, decode_checklist};

#[derive(Clone, FromRow)]
pub struct ScholarshipRow {
    pub id: i64,
    pub name: String,
    pub country: String,
    pub university: Option<String>,
    pub level: Option<String>,
    pub field: Option<String>,
    pub tags: Option<String>,
    pub deadline: Option<String>,
    pub link: String,
    pub checklist: Option<String>,
    pub min_gpa: Option<f64>,
    pub is_international_only: bool,
    pub image_filename: Option<String>,
    pub brochure_filename: Option<String>,
}

impl From<ScholarshipRow> for Scholarship {
    fn from(row: ScholarshipRow) -> Self {
        let checklist = decode_checklist(row.checklist.as_deref());
        Self {
            id: row.id,
            name: row.name,
            country: row.country,
            university: row.university,
            level: row.level,
            field: row.field,
            tags: row.tags,
            deadline: row.deadline,
            link: row.link,
            checklist,
            min_gpa: row.min_gpa,
            is_international_only: row.is_international_only,
            image_filename: row.image_filename,
            brochure_filename: row.brochure_filename,
        }
    }
}

/// Column values written by the admin create and edit actions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScholarshipDraft {
    pub name: String,
    pub country: String,
    pub university: String,
    pub level: String,
    pub field: String,
    pub tags: String,
    pub deadline: Option<String>,
    pub link: String,
    pub checklist: String,
    pub min_gpa: Option<f64>,
    pub is_international_only: bool,
    pub image_filename: Option<String>,
    pub brochure_filename: Option<String>,
}

#[derive(Clone, FromRow)]
pub struct UserCredentialsRow {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Distinct values offered by the eligibility form dropdowns.
#[derive(Clone, Default)]
pub struct EligibilityOptions {
    pub countries: Vec<String>,
    pub levels: Vec<String>,
    pub fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_conversion_decodes_checklist() {
        let row = ScholarshipRow {
            id: 7,
            name: "Erasmus Mundus".to_string(),
            country: "Belgium".to_string(),
            university: None,
            level: Some("Masters".to_string()),
            field: None,
            tags: None,
            deadline: Some("2025-01-10".to_string()),
            link: "https://example.org".to_string(),
            checklist: Some("Transcript\nEssay".to_string()),
            min_gpa: Some(3.0),
            is_international_only: true,
            image_filename: None,
            brochure_filename: Some("doc_Erasmus_Mundus_guide.pdf".to_string()),
        };

        let scholarship = Scholarship::from(row);
        assert_eq!(scholarship.id, 7);
        assert_eq!(
            scholarship.checklist,
            vec!["Transcript".to_string(), "Essay".to_string()]
        );
        assert!(scholarship.is_international_only);
    }
}
