use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::{
    listings::{EligibilityCriteria, Scholarship, matches},
    web::{ApiMessage, AppState, data::fetch_scholarships, json_error},
};

#[derive(Debug, Serialize, PartialEq)]
pub struct ApiScholarship {
    id: i64,
    name: String,
    country: String,
    deadline: Option<String>,
    link: String,
    checklist: Vec<String>,
}

impl From<Scholarship> for ApiScholarship {
    fn from(item: Scholarship) -> Self {
        Self {
            id: item.id,
            name: item.name,
            country: item.country,
            deadline: item.deadline,
            link: item.link,
            checklist: item.checklist,
        }
    }
}

/// Eligibility result: the full record minus checklist and file fields.
#[derive(Debug, Serialize, PartialEq)]
pub struct ApiEligibilityMatch {
    id: i64,
    name: String,
    country: String,
    university: Option<String>,
    level: Option<String>,
    field: Option<String>,
    tags: Option<String>,
    deadline: Option<String>,
    min_gpa: Option<f64>,
    is_international_only: bool,
    link: String,
}

impl From<Scholarship> for ApiEligibilityMatch {
    fn from(item: Scholarship) -> Self {
        Self {
            id: item.id,
            name: item.name,
            country: item.country,
            university: item.university,
            level: item.level,
            field: item.field,
            tags: item.tags,
            deadline: item.deadline,
            min_gpa: item.min_gpa,
            is_international_only: item.is_international_only,
            link: item.link,
        }
    }
}

/// `GET /api/scholarships`
pub async fn list_scholarships(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApiScholarship>>, (StatusCode, Json<ApiMessage>)> {
    let rows = fetch_scholarships(state.pool_ref()).await.map_err(|err| {
        error!(?err, "failed to load scholarships for api");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load scholarships.")
    })?;

    Ok(Json(
        rows.into_iter()
            .map(Scholarship::from)
            .map(ApiScholarship::from)
            .collect(),
    ))
}

/// `POST /api/eligibility`
///
/// The body is parsed leniently: a missing or malformed body behaves like `{}`.
pub async fn check_eligibility(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<ApiEligibilityMatch>>, (StatusCode, Json<ApiMessage>)> {
    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let criteria = criteria_from_json(&payload);

    let rows = fetch_scholarships(state.pool_ref()).await.map_err(|err| {
        error!(?err, "failed to load scholarships for eligibility api");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load scholarships.")
    })?;

    let listings = rows.into_iter().map(Scholarship::from).collect();
    Ok(Json(
        matches(listings, &criteria)
            .into_iter()
            .map(ApiEligibilityMatch::from)
            .collect(),
    ))
}

pub(crate) fn criteria_from_json(payload: &Value) -> EligibilityCriteria {
    let text = |key: &str| payload.get(key).and_then(Value::as_str);
    let international_only = payload
        .get("is_international")
        .map(is_truthy)
        .unwrap_or(false);

    EligibilityCriteria::from_json(
        text("country"),
        text("level"),
        text("field"),
        payload.get("gpa"),
        international_only,
    )
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Null => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::listings::sample;

    #[test]
    fn empty_or_invalid_payload_has_no_criteria() {
        assert_eq!(criteria_from_json(&Value::Null), EligibilityCriteria::default());
        assert_eq!(criteria_from_json(&json!([1, 2])), EligibilityCriteria::default());
        assert_eq!(criteria_from_json(&json!({})), EligibilityCriteria::default());
    }

    #[test]
    fn payload_fields_map_onto_criteria() {
        let criteria = criteria_from_json(&json!({
            "country": "Japan",
            "level": " Masters ",
            "field": "",
            "gpa": 3.1,
            "is_international": true
        }));

        assert_eq!(criteria.country.as_deref(), Some("Japan"));
        assert_eq!(criteria.level.as_deref(), Some("Masters"));
        assert_eq!(criteria.field, None);
        assert_eq!(criteria.gpa, Some(3.1));
        assert!(criteria.international_only);
    }

    #[test]
    fn non_string_fields_are_ignored() {
        let criteria = criteria_from_json(&json!({ "country": 5, "gpa": "n/a", "is_international": 0 }));
        assert_eq!(criteria, EligibilityCriteria::default());
    }

    #[test]
    fn list_payload_expands_checklist() {
        let mut item = sample(3, "Fulbright", "United States");
        item.checklist = vec!["Transcript".to_string(), "Essay".to_string()];

        let value = serde_json::to_value(ApiScholarship::from(item)).expect("serialize");
        assert_eq!(value["checklist"], json!(["Transcript", "Essay"]));
        assert_eq!(value["id"], json!(3));
    }

    #[test]
    fn eligibility_payload_omits_files_and_checklist() {
        let mut item = sample(4, "DAAD", "Germany");
        item.image_filename = Some("img_DAAD_cover.png".to_string());
        item.min_gpa = Some(3.0);

        let value = serde_json::to_value(ApiEligibilityMatch::from(item)).expect("serialize");
        let object = value.as_object().expect("object");
        assert!(!object.contains_key("checklist"));
        assert!(!object.contains_key("image_filename"));
        assert_eq!(object["min_gpa"], json!(3.0));
        assert_eq!(object["is_international_only"], json!(false));
    }
}
