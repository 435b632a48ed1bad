//! Plain data-model structs for the two catalog entities and their wire
//! conventions (IRI references, date-time normalization).

pub mod manufacturer;
pub mod product;

pub use manufacturer::{Manufacturer, ManufacturerInput, ManufacturerPatch};
pub use product::{parse_manufacturer_ref, Product, ProductInput, ProductPatch};

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use crate::error::AppError;

pub fn manufacturer_iri(id: i32) -> String {
    format!("/api/manufacturers/{id}")
}

pub fn product_iri(id: i32) -> String {
    format!("/api/products/{id}")
}

/// Accepts RFC 3339, a bare `YYYY-MM-DDTHH:MM:SS`, or a bare `YYYY-MM-DD`
/// (midnight). Values without an offset are taken as UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// RFC 3339 with an explicit `+00:00` offset, e.g. `1985-07-31T00:00:00+00:00`.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// A patch field that is present in the body: its value, or None for JSON null.
pub(crate) fn string_field(value: &Value, field: &str) -> Result<Option<String>, AppError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(AppError::BadRequest(format!("{field} must be a string"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_date_parses_to_utc_midnight() {
        let dt = parse_datetime("1985-07-31").unwrap();
        assert_eq!(format_datetime(&dt), "1985-07-31T00:00:00+00:00");
    }

    #[test]
    fn rfc3339_offset_is_normalized_to_utc() {
        let dt = parse_datetime("2020-01-01T12:00:00+02:00").unwrap();
        assert_eq!(format_datetime(&dt), "2020-01-01T10:00:00+00:00");
    }

    #[test]
    fn naive_datetime_is_taken_as_utc() {
        let dt = parse_datetime("2020-06-15T08:30:00").unwrap();
        assert_eq!(format_datetime(&dt), "2020-06-15T08:30:00+00:00");
    }

    #[test]
    fn garbage_dates_are_rejected() {
        assert!(parse_datetime("31/07/1985").is_none());
        assert!(parse_datetime("not a date").is_none());
        assert!(parse_datetime("").is_none());
    }
}
