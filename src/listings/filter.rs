use chrono::NaiveDate;

use super::{Scholarship, dates::parse_deadline};

/// Ordering requested by the browse page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    DeadlineAscending,
    DeadlineDescending,
}

impl SortKey {
    /// Unknown values fall back to [`SortKey::None`].
    pub fn from_param(raw: &str) -> Self {
        match raw.trim() {
            "deadline_asc" => SortKey::DeadlineAscending,
            "deadline_desc" => SortKey::DeadlineDescending,
            _ => SortKey::None,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            SortKey::None => "",
            SortKey::DeadlineAscending => "deadline_asc",
            SortKey::DeadlineDescending => "deadline_desc",
        }
    }
}

/// Normalized browse criteria. Queries are stored lowercased; `None` means no filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowseCriteria {
    pub text_query: Option<String>,
    pub country_query: Option<String>,
    pub sort: SortKey,
}

impl BrowseCriteria {
    pub fn from_params(q: Option<&str>, country: Option<&str>, sort: Option<&str>) -> Self {
        Self {
            text_query: normalize_query(q),
            country_query: normalize_query(country),
            sort: sort.map(SortKey::from_param).unwrap_or_default(),
        }
    }
}

fn normalize_query(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_lowercase)
}

/// Applies the substring filters and then the requested deadline ordering.
///
/// Listings whose deadline is absent or unparsable always end up after every
/// dated listing, in both directions. Sorting is stable, so listings sharing a
/// date keep the caller's order.
pub fn filter_and_sort(listings: Vec<Scholarship>, criteria: &BrowseCriteria) -> Vec<Scholarship> {
    let mut items: Vec<Scholarship> = listings
        .into_iter()
        .filter(|item| contains_lowercase(&item.name, criteria.text_query.as_deref()))
        .filter(|item| contains_lowercase(&item.country, criteria.country_query.as_deref()))
        .collect();

    match criteria.sort {
        SortKey::None => {}
        SortKey::DeadlineAscending => {
            items.sort_by_key(|item| deadline_or(item, NaiveDate::MAX));
        }
        SortKey::DeadlineDescending => {
            items.sort_by(|a, b| {
                deadline_or(b, NaiveDate::MIN).cmp(&deadline_or(a, NaiveDate::MIN))
            });
        }
    }

    items
}

fn contains_lowercase(haystack: &str, needle: Option<&str>) -> bool {
    match needle {
        Some(needle) => haystack.to_lowercase().contains(needle),
        None => true,
    }
}

fn deadline_or(item: &Scholarship, fallback: NaiveDate) -> NaiveDate {
    item.deadline
        .as_deref()
        .and_then(parse_deadline)
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::sample;

    fn dated(id: i64, name: &str, deadline: Option<&str>) -> Scholarship {
        let mut item = sample(id, name, "Canada");
        item.deadline = deadline.map(str::to_string);
        item
    }

    fn ids(items: &[Scholarship]) -> Vec<i64> {
        items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn exact_name_in_any_case_matches() {
        let listings = vec![
            sample(1, "Vanier Graduate Scholarship", "Canada"),
            sample(2, "Chevening", "United Kingdom"),
        ];
        let criteria = BrowseCriteria::from_params(Some("VANIER graduate SCHOLARSHIP"), None, None);
        assert_eq!(ids(&filter_and_sort(listings, &criteria)), vec![1]);
    }

    #[test]
    fn absent_query_excludes_everything() {
        let listings = vec![sample(1, "Vanier", "Canada"), sample(2, "Chevening", "UK")];
        let criteria = BrowseCriteria::from_params(Some("erasmus"), None, None);
        assert!(filter_and_sort(listings, &criteria).is_empty());
    }

    #[test]
    fn country_filter_is_case_insensitive_substring() {
        let listings = vec![
            sample(1, "A", "United Kingdom"),
            sample(2, "B", "United States"),
            sample(3, "C", "Germany"),
        ];
        let criteria = BrowseCriteria::from_params(None, Some("  united "), None);
        assert_eq!(ids(&filter_and_sort(listings, &criteria)), vec![1, 2]);
    }

    #[test]
    fn blank_params_do_not_filter() {
        let listings = vec![sample(3, "A", "X"), sample(1, "B", "Y")];
        let criteria = BrowseCriteria::from_params(Some("   "), Some(""), Some("bogus"));
        assert_eq!(criteria, BrowseCriteria::default());
        assert_eq!(ids(&filter_and_sort(listings, &criteria)), vec![3, 1]);
    }

    #[test]
    fn ascending_pushes_undated_to_the_back() {
        let listings = vec![
            dated(1, "a", None),
            dated(2, "b", Some("2025-06-01")),
            dated(3, "c", Some("not a date")),
            dated(4, "d", Some("2025-01-15")),
        ];
        let criteria = BrowseCriteria::from_params(None, None, Some("deadline_asc"));
        assert_eq!(ids(&filter_and_sort(listings, &criteria)), vec![4, 2, 1, 3]);
    }

    #[test]
    fn descending_also_pushes_undated_to_the_back() {
        let listings = vec![
            dated(1, "a", None),
            dated(2, "b", Some("2025-06-01")),
            dated(3, "c", Some("2025/07/01")),
            dated(4, "d", Some("2025-01-15")),
        ];
        let criteria = BrowseCriteria::from_params(None, None, Some("deadline_desc"));
        assert_eq!(ids(&filter_and_sort(listings, &criteria)), vec![2, 4, 1, 3]);
    }

    #[test]
    fn padded_or_signed_deadlines_sort_as_undated() {
        let listings = vec![
            dated(1, "a", Some(" 2025-01-01")),
            dated(2, "b", Some("2025-06-01")),
            dated(3, "c", Some("+2025-01-01")),
        ];
        let criteria = BrowseCriteria::from_params(None, None, Some("deadline_asc"));
        assert_eq!(ids(&filter_and_sort(listings, &criteria)), vec![2, 1, 3]);
    }

    #[test]
    fn equal_dates_keep_input_order_in_both_directions() {
        let listings = vec![
            dated(5, "a", Some("2025-03-01")),
            dated(2, "b", Some("2025-03-01")),
            dated(9, "c", Some("2024-12-31")),
        ];
        let asc = BrowseCriteria::from_params(None, None, Some("deadline_asc"));
        assert_eq!(ids(&filter_and_sort(listings.clone(), &asc)), vec![9, 5, 2]);

        let desc = BrowseCriteria::from_params(None, None, Some("deadline_desc"));
        assert_eq!(ids(&filter_and_sort(listings, &desc)), vec![5, 2, 9]);
    }

    #[test]
    fn sort_key_round_trips_through_params() {
        for key in [SortKey::None, SortKey::DeadlineAscending, SortKey::DeadlineDescending] {
            assert_eq!(SortKey::from_param(key.as_param()), key);
        }
    }
}
