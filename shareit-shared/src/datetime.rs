//! Wire format for booking and comment timestamps: ISO-8601 local date-time at
//! second precision with no offset (`2025-01-10T10:00:00`).
//!
//! Use with `#[serde(with = "shareit_shared::datetime")]`.

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serializer};

pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, FORMAT)
}

pub fn format(value: &NaiveDateTime) -> String {
    value.format(FORMAT).to_string()
}

pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format(value))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| {
        serde::de::Error::custom(format!("expected yyyy-MM-ddTHH:mm:ss, got '{}': {}", raw, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Window {
        #[serde(with = "crate::datetime")]
        start: NaiveDateTime,
    }

    #[test]
    fn test_second_precision_format() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let json = serde_json::to_string(&Window { start }).unwrap();
        assert_eq!(json, r#"{"start":"2025-01-10T10:00:00"}"#);
    }

    #[test]
    fn test_rejects_offset_and_date_only() {
        assert!(serde_json::from_str::<Window>(r#"{"start":"2025-01-10T10:00:00Z"}"#).is_err());
        assert!(serde_json::from_str::<Window>(r#"{"start":"2025-01-10"}"#).is_err());
        assert!(serde_json::from_str::<Window>(r#"{"start":"2025-01-10T10:00:00"}"#).is_ok());
    }
}
