//! Fixed civil-timezone helpers. Every timestamp handled by the backend is
//! normalized to IST (+05:30) before being persisted or rendered, so that the
//! RFC3339 strings stored in MongoDB compare chronologically.

use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::well_known::{Iso8601, Rfc3339},
};

/// IST offset applied to all stored and rendered timestamps.
pub const IST: UtcOffset = match UtcOffset::from_hms(5, 30, 0) {
    Ok(offset) => offset,
    Err(_) => panic!("+05:30 is a valid offset"),
};

/// Current instant expressed in IST.
pub fn now_ist() -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(IST)
}

/// Re-anchor any timestamp to the IST offset.
pub fn to_ist(timestamp: OffsetDateTime) -> OffsetDateTime {
    timestamp.to_offset(IST)
}

/// Parse a client-supplied timestamp.
///
/// Zoned RFC3339 inputs are converted to IST; naive ISO-8601 inputs are
/// interpreted as IST wall-clock time. Returns `None` when neither form
/// parses.
pub fn parse_ist(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed.to_offset(IST));
    }

    PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
        .ok()
        .map(|naive| naive.assume_offset(IST))
}

/// Render a timestamp as an RFC3339 string in IST.
pub fn format_ist(timestamp: OffsetDateTime) -> String {
    to_ist(timestamp)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn zoned_input_is_converted_to_ist() {
        let parsed = parse_ist("2024-01-01T00:00:00Z").expect("parses");
        assert_eq!(parsed.offset(), IST);
        assert_eq!(parsed, datetime!(2024-01-01 05:30 +5:30));
    }

    #[test]
    fn naive_input_is_assumed_ist() {
        let parsed = parse_ist("2024-01-01T00:00:00").expect("parses");
        assert_eq!(parsed, datetime!(2024-01-01 00:00 +5:30));
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(parse_ist("yesterday").is_none());
        assert!(parse_ist("").is_none());
    }

    #[test]
    fn formatting_round_trips_through_parsing() {
        let original = datetime!(2024-06-15 18:45:30 +5:30);
        let rendered = format_ist(original);
        assert_eq!(parse_ist(&rendered), Some(original));
    }
}
