//! UTC timestamp formatting at millisecond precision.
//!
//! All wire timestamps are ISO-8601 with a `Z` suffix and exactly three
//! fractional digits (e.g. `2026-02-09T12:00:00.000Z`). Internally the
//! crate works with `chrono::DateTime<Utc>`.

use chrono::{DateTime, SecondsFormat, Utc};

/// Renders a timestamp as ISO-8601 UTC with millisecond precision.
pub fn format_utc_millis(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 timestamp into UTC.
pub fn parse_utc(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}

/// Serde adapter for `DateTime<Utc>` fields using the wire format above.
pub mod utc_millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(t: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::format_utc_millis(t))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_utc(&s).map_err(serde::de::Error::custom)
    }
}
