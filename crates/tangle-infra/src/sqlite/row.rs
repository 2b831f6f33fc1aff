//! Shared SQLite-to-domain conversion helpers.

use chrono::{DateTime, Utc};
use tangle_types::error::RepositoryError;
use uuid::Uuid;

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

pub(crate) fn parse_uuid(s: &str, field: &str) -> Result<Uuid, RepositoryError> {
    Uuid::parse_str(s).map_err(|e| RepositoryError::Query(format!("invalid {field}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datetime_roundtrip() {
        let now = Utc::now();
        let parsed = parse_datetime(&format_datetime(&now)).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_invalid_datetime_is_query_error() {
        assert!(matches!(
            parse_datetime("not a date"),
            Err(RepositoryError::Query(_))
        ));
    }

    #[test]
    fn test_parse_uuid_names_field() {
        let err = parse_uuid("nope", "chat_id").unwrap_err();
        assert!(err.to_string().contains("chat_id"));
    }
}
