use serde_json::Value;

use super::Scholarship;

/// Applicant-supplied eligibility criteria. Absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EligibilityCriteria {
    pub country: Option<String>,
    pub level: Option<String>,
    pub field: Option<String>,
    pub gpa: Option<f64>,
    pub international_only: bool,
}

impl EligibilityCriteria {
    /// Builds criteria from raw form text. Blank values count as absent and an
    /// unparsable GPA disables the GPA gate.
    pub fn from_raw(
        country: Option<&str>,
        level: Option<&str>,
        field: Option<&str>,
        gpa: Option<&str>,
        international_only: bool,
    ) -> Self {
        Self {
            country: non_blank(country),
            level: non_blank(level),
            field: non_blank(field),
            gpa: gpa.and_then(parse_gpa),
            international_only,
        }
    }

    /// Same as [`EligibilityCriteria::from_raw`] but takes the GPA as loosely
    /// typed JSON: numbers and numeric strings are accepted, everything else is
    /// ignored.
    pub fn from_json(
        country: Option<&str>,
        level: Option<&str>,
        field: Option<&str>,
        gpa: Option<&Value>,
        international_only: bool,
    ) -> Self {
        let gpa = match gpa {
            Some(Value::Number(number)) => number.as_f64().filter(|value| value.is_finite()),
            Some(Value::String(text)) => parse_gpa(text),
            _ => None,
        };

        Self {
            gpa,
            ..Self::from_raw(country, level, field, None, international_only)
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Permissive numeric parse used for GPA input and the admin `min_gpa` field.
pub fn parse_gpa(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

type Predicate<'a> = Box<dyn Fn(&Scholarship) -> bool + 'a>;

fn predicates(criteria: &EligibilityCriteria) -> Vec<Predicate<'_>> {
    let mut checks: Vec<Predicate<'_>> = Vec::new();

    if let Some(country) = criteria.country.as_deref() {
        checks.push(Box::new(move |item: &Scholarship| item.country == country));
    }
    if let Some(level) = criteria.level.as_deref() {
        checks.push(Box::new(move |item: &Scholarship| item.level.as_deref() == Some(level)));
    }
    if let Some(field) = criteria.field.as_deref() {
        checks.push(Box::new(move |item: &Scholarship| item.field.as_deref() == Some(field)));
    }
    if criteria.international_only {
        checks.push(Box::new(|item: &Scholarship| item.is_international_only));
    }
    if let Some(gpa) = criteria.gpa {
        checks.push(Box::new(move |item: &Scholarship| passes_gpa_gate(gpa, item.min_gpa)));
    }

    checks
}

/// Only rejects when both sides are real numbers and the applicant falls short.
fn passes_gpa_gate(gpa: f64, min_gpa: Option<f64>) -> bool {
    match min_gpa {
        Some(min) if gpa.is_finite() && min.is_finite() => gpa >= min,
        _ => true,
    }
}

/// Returns the listings satisfying every supplied criterion, in input order.
pub fn matches(listings: Vec<Scholarship>, criteria: &EligibilityCriteria) -> Vec<Scholarship> {
    let checks = predicates(criteria);
    listings
        .into_iter()
        .filter(|item| checks.iter().all(|check| check(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::listings::sample;

    fn listing(id: i64, country: &str, level: &str, field: &str) -> Scholarship {
        let mut item = sample(id, &format!("Listing {id}"), country);
        item.level = Some(level.to_string());
        item.field = Some(field.to_string());
        item
    }

    fn with_min_gpa(mut item: Scholarship, min_gpa: Option<f64>) -> Scholarship {
        item.min_gpa = min_gpa;
        item
    }

    fn ids(items: &[Scholarship]) -> Vec<i64> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn no_criteria_returns_everything() {
        let listings = vec![
            listing(1, "Japan", "Masters", "Engineering"),
            listing(2, "Canada", "PhD", "Physics"),
        ];
        let result = matches(listings, &EligibilityCriteria::default());
        assert_eq!(ids(&result), vec![1, 2]);
    }

    #[test]
    fn unknown_country_returns_nothing() {
        let listings = vec![listing(1, "Japan", "Masters", "Engineering")];
        let criteria = EligibilityCriteria::from_raw(Some("Atlantis"), None, None, None, false);
        assert!(matches(listings, &criteria).is_empty());
    }

    #[test]
    fn exact_fields_are_case_sensitive() {
        let listings = vec![
            listing(1, "Japan", "Masters", "Engineering"),
            listing(2, "japan", "Masters", "Engineering"),
            listing(3, "Japan", "PhD", "Engineering"),
        ];
        let criteria =
            EligibilityCriteria::from_raw(Some("Japan"), Some("Masters"), None, None, false);
        assert_eq!(ids(&matches(listings, &criteria)), vec![1]);
    }

    #[test]
    fn missing_level_never_matches_a_requested_level() {
        let listings = vec![sample(1, "Open", "Japan")];
        let criteria = EligibilityCriteria::from_raw(None, Some("PhD"), None, None, false);
        assert!(matches(listings, &criteria).is_empty());
    }

    #[test]
    fn gpa_gate_excludes_only_when_both_sides_present() {
        let base = listing(0, "Japan", "Masters", "Engineering");
        let strict = with_min_gpa(Scholarship { id: 1, ..base.clone() }, Some(3.5));
        let open = with_min_gpa(Scholarship { id: 2, ..base }, None);

        let criteria = EligibilityCriteria::from_raw(None, None, None, Some("3.0"), false);
        assert_eq!(ids(&matches(vec![strict.clone(), open.clone()], &criteria)), vec![2]);

        let no_gpa = EligibilityCriteria::from_raw(None, None, None, None, false);
        assert_eq!(ids(&matches(vec![strict, open], &no_gpa)), vec![1, 2]);
    }

    #[test]
    fn gpa_equal_to_minimum_passes() {
        let item = with_min_gpa(listing(1, "Japan", "Masters", "Engineering"), Some(3.5));
        let criteria = EligibilityCriteria::from_raw(None, None, None, Some("3.5"), false);
        assert_eq!(ids(&matches(vec![item], &criteria)), vec![1]);
    }

    #[test]
    fn unparsable_gpa_disables_the_gate() {
        let item = with_min_gpa(listing(1, "Japan", "Masters", "Engineering"), Some(3.9));
        let criteria = EligibilityCriteria::from_raw(None, None, None, Some("three"), false);
        assert_eq!(criteria.gpa, None);
        assert_eq!(ids(&matches(vec![item], &criteria)), vec![1]);
    }

    #[test]
    fn non_finite_min_gpa_is_treated_as_absent() {
        let item = with_min_gpa(listing(1, "Japan", "Masters", "Engineering"), Some(f64::NAN));
        let criteria = EligibilityCriteria::from_raw(None, None, None, Some("2.0"), false);
        assert_eq!(ids(&matches(vec![item], &criteria)), vec![1]);
    }

    #[test]
    fn international_only_restricts_to_flagged_listings() {
        let mut flagged = listing(1, "Japan", "Masters", "Engineering");
        flagged.is_international_only = true;
        let plain = listing(2, "Japan", "Masters", "Engineering");

        let restricted =
            EligibilityCriteria::from_raw(Some("Japan"), Some("Masters"), None, None, true);
        assert_eq!(
            ids(&matches(vec![flagged.clone(), plain.clone()], &restricted)),
            vec![1]
        );

        let general = EligibilityCriteria::from_raw(Some("Japan"), None, None, None, false);
        assert_eq!(ids(&matches(vec![flagged, plain], &general)), vec![1, 2]);
    }

    #[test]
    fn json_gpa_accepts_numbers_and_numeric_strings() {
        let from_number = EligibilityCriteria::from_json(None, None, None, Some(&json!(3.2)), false);
        assert_eq!(from_number.gpa, Some(3.2));

        let from_string =
            EligibilityCriteria::from_json(None, None, None, Some(&json!(" 3.7 ")), false);
        assert_eq!(from_string.gpa, Some(3.7));

        let from_bool = EligibilityCriteria::from_json(None, None, None, Some(&json!(true)), false);
        assert_eq!(from_bool.gpa, None);

        let from_null = EligibilityCriteria::from_json(None, None, None, Some(&Value::Null), false);
        assert_eq!(from_null.gpa, None);
    }

    #[test]
    fn form_and_json_entry_points_agree() {
        let form = EligibilityCriteria::from_raw(
            Some(" Japan "),
            Some("Masters"),
            Some(""),
            Some("3.4"),
            true,
        );
        let api = EligibilityCriteria::from_json(
            Some("Japan"),
            Some("Masters"),
            None,
            Some(&json!(3.4)),
            true,
        );
        assert_eq!(form, api);
    }

    #[test]
    fn parse_gpa_rejects_non_finite() {
        assert_eq!(parse_gpa("inf"), None);
        assert_eq!(parse_gpa("NaN"), None);
        assert_eq!(parse_gpa(""), None);
        assert_eq!(parse_gpa("4"), Some(4.0));
    }
}
