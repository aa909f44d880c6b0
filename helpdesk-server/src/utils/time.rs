//! Time helpers
//!
//! Deadlines are converted to `i64` Unix millis here, at the request
//! boundary; repositories only ever see millis.

use shared::util::parse_deadline;

use super::{AppError, AppResult};

/// Parse an SLA deadline (RFC 3339 or `YYYY-MM-DD`) into Unix millis
pub fn parse_resolution_date(value: &str) -> AppResult<i64> {
    parse_deadline(value).ok_or_else(|| {
        AppError::validation(format!("Invalid resolutionDate: {}", value))
            .with_detail("field", "resolutionDate")
    })
}

/// Optional deadline from a form field: blank means none
pub fn parse_optional_resolution_date(value: Option<&str>) -> AppResult<Option<i64>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_resolution_date(v).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution_date() {
        assert!(parse_resolution_date("2026-05-01").is_ok());
        assert!(parse_resolution_date("2026-05-01T12:00:00Z").is_ok());

        let err = parse_resolution_date("next week").unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_optional_resolution_date() {
        assert_eq!(parse_optional_resolution_date(None).unwrap(), None);
        assert_eq!(parse_optional_resolution_date(Some("  ")).unwrap(), None);
        assert!(parse_optional_resolution_date(Some("2026-05-01")).unwrap().is_some());
    }
}
