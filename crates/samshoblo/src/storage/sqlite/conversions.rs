//! Row/value conversions between SQLite and the domain types.

use chrono::{DateTime, SecondsFormat, Utc};

use samshoblo_core::registration::Registration;

/// Fixed-width UTC timestamp format so lexicographic comparison in SQL
/// matches chronological order.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

pub fn row_to_registration(row: &rusqlite::Row<'_>) -> rusqlite::Result<Registration> {
    let raw_timestamp: String = row.get(7)?;

    Ok(Registration {
        id: row.get(0)?,
        child_name: row.get(1)?,
        child_surname: row.get(2)?,
        child_age: row.get(3)?,
        parent_name: row.get(4)?,
        parent_surname: row.get(5)?,
        parent_phone: row.get(6)?,
        timestamp: parse_timestamp(&raw_timestamp)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let formatted = format_timestamp(&ts);
        assert_eq!(parse_timestamp(&formatted).unwrap(), ts);
    }

    #[test]
    fn test_formatted_timestamps_compare_lexicographically() {
        let earlier = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap();
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }
}
