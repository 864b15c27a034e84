//! Conversions between chrono timestamps and the string forms Neo4j accepts and emits.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a temporal value rendered by Cypher `toString()` into UTC.
///
/// Accepted shapes:
/// 1. RFC 3339 with offset or `Z`, any sub-second precision
/// 2. Named-zone suffix as Neo4j prints it: `2024-01-15T10:30:00Z[UTC]`
/// 3. Minute precision (Neo4j drops zero seconds): `2024-01-15T10:30Z`
/// 4. Local datetime without zone (assumed UTC)
/// 5. Date only (midnight UTC)
///
/// Returns `None` for empty input or unrecognised formats.
pub fn parse_neo4j_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    // 2. Strip a trailing `[Region/City]` zone id; the offset before it is authoritative.
    let s = match s.find('[') {
        Some(idx) if s.ends_with(']') => &s[..idx],
        _ => s,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // 3. Minute precision with `Z` or numeric offset.
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%#z") {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(nd) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return nd
            .and_hms_opt(0, 0, 0)
            .map(|ndt| Utc.from_utc_datetime(&ndt));
    }

    None
}

/// Format a [`DateTime<Utc>`] for a Cypher `datetime($param)` call.
///
/// Output format: `"2024-01-15T10:30:00.000000000Z"` (ISO 8601, nanosecond precision, UTC).
pub fn format_neo4j_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_parse_rfc3339_utc() {
        let dt = parse_neo4j_datetime("2024-01-15T10:30:00Z").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        // +05:00 offset → 10:30 local = 05:30 UTC
        let dt = parse_neo4j_datetime("2024-01-15T10:30:00+05:00").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_named_zone_suffix() {
        let dt = parse_neo4j_datetime("2024-01-15T10:30:00Z[UTC]").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_nanosecond_precision() {
        let dt = parse_neo4j_datetime("2024-06-01T12:00:00.123456789Z").expect("should parse");
        assert_eq!(dt.nanosecond(), 123_456_789);
    }

    #[test]
    fn test_parse_local_datetime() {
        let dt = parse_neo4j_datetime("2024-01-15T10:30:00").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_neo4j_datetime("2019-01-07").expect("should parse");
        assert_eq!(dt, Utc.with_ymd_and_hms(2019, 1, 7, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_neo4j_datetime("").is_none());
        assert!(parse_neo4j_datetime("not a date").is_none());
        assert!(parse_neo4j_datetime("2024-13-01").is_none());
    }

    #[test]
    fn test_format_neo4j() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_neo4j_datetime(&dt), "2024-01-15T10:30:00.000000000Z");
    }

    #[test]
    fn test_format_then_parse_is_lossless() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 8, 45, 30).unwrap()
            + chrono::Duration::nanoseconds(500_000_000);
        let parsed = parse_neo4j_datetime(&format_neo4j_datetime(&dt)).expect("should parse");
        assert_eq!(dt, parsed);
    }
}
