use chrono::NaiveDate;

const DEADLINE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` deadline. Anything else is treated as no deadline.
pub fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    if !has_date_shape(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, DEADLINE_FORMAT).ok()
}

/// Four-digit year, then one- or two-digit month and day. No signs or padding.
fn has_date_shape(raw: &str) -> bool {
    let mut parts = raw.split('-');
    let widths = [4..=4, 1..=2, 1..=2];
    let shaped = widths.into_iter().all(|width| {
        parts.next().is_some_and(|part| {
            width.contains(&part.len()) && part.bytes().all(|byte| byte.is_ascii_digit())
        })
    });
    shaped && parts.next().is_none()
}
