use chrono::{DateTime, Duration, NaiveDateTime, Utc};

const RFC1123_NUMERIC_ZONE: &str = "%d %b %Y %H:%M:%S %z";
const RFC1123_NO_ZONE: &str = "%d %b %Y %H:%M:%S";

/// Timestamp layouts accepted for `<pubDate>`, tried in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PubDateFormat {
    /// `Mon, 02 Jan 2006 15:04:05 -0700`
    Rfc1123NumericZone,
    /// `Mon, 02 Jan 2006 15:04:05 MST`
    Rfc1123NamedZone,
    /// `2006-01-02T15:04:05Z07:00`, seen in feeds that mix in Atom habits
    Rfc3339,
}

pub const ACCEPTED_FORMATS: &[PubDateFormat] = &[
    PubDateFormat::Rfc1123NumericZone,
    PubDateFormat::Rfc1123NamedZone,
    PubDateFormat::Rfc3339,
];

impl PubDateFormat {
    pub fn parse(self, raw: &str) -> Option<DateTime<Utc>> {
        match self {
            PubDateFormat::Rfc1123NumericZone => {
                DateTime::parse_from_str(strip_weekday(raw), RFC1123_NUMERIC_ZONE)
                    .ok()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            PubDateFormat::Rfc1123NamedZone => {
                let (stamp, zone) = strip_weekday(raw).rsplit_once(' ')?;
                if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
                    return None;
                }
                let naive = NaiveDateTime::parse_from_str(stamp.trim_end(), RFC1123_NO_ZONE).ok()?;
                // Shifting near chrono's range limits can overflow; treat that as no date
                let utc = naive.checked_sub_signed(Duration::hours(zone_offset_hours(zone)))?;
                Some(utc.and_utc())
            }
            PubDateFormat::Rfc3339 => DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

/// Parse a free-form `<pubDate>` value
///
/// Returns `None` for empty or unrecognised input; a bad date never rejects
/// the item it belongs to.
pub fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    ACCEPTED_FORMATS.iter().find_map(|format| format.parse(raw))
}

/// Drop a leading day name ("Mon, "); it is redundant and often wrong
fn strip_weekday(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((day, rest)) if day.chars().all(|c| c.is_ascii_alphabetic()) => rest.trim_start(),
        _ => raw,
    }
}

/// Offsets for the zone names RFC 822 defines
///
/// Other abbreviations are ambiguous across regions and are read as UTC.
fn zone_offset_hours(zone: &str) -> i64 {
    match zone.to_ascii_uppercase().as_str() {
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_numeric_zone() {
        assert_eq!(
            parse_pub_date("Mon, 02 Jan 2006 15:04:05 -0700"),
            Some(utc(2006, 1, 2, 22, 4, 5))
        );
        assert_eq!(
            parse_pub_date("Mon, 02 Jan 2006 15:04:05 +0000"),
            Some(utc(2006, 1, 2, 15, 4, 5))
        );
    }

    #[test]
    fn test_named_zone() {
        assert_eq!(
            parse_pub_date("Mon, 02 Jan 2006 15:04:05 GMT"),
            Some(utc(2006, 1, 2, 15, 4, 5))
        );
        assert_eq!(
            parse_pub_date("Mon, 02 Jan 2006 15:04:05 PST"),
            Some(utc(2006, 1, 2, 23, 4, 5))
        );
        // Unknown abbreviations are read as UTC
        assert_eq!(
            parse_pub_date("Mon, 02 Jan 2006 15:04:05 CEST"),
            Some(utc(2006, 1, 2, 15, 4, 5))
        );
    }

    #[test]
    fn test_wrong_weekday_and_padding() {
        assert_eq!(
            parse_pub_date("  Fri, 02 Jan 2006 15:04:05 +0000\n"),
            Some(utc(2006, 1, 2, 15, 4, 5))
        );
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            parse_pub_date("2006-01-02T15:04:05+01:00"),
            Some(utc(2006, 1, 2, 14, 4, 5))
        );
    }

    #[test]
    fn test_unparseable_is_absent() {
        assert_eq!(parse_pub_date(""), None);
        assert_eq!(parse_pub_date("   "), None);
        assert_eq!(parse_pub_date("yesterday"), None);
        assert_eq!(parse_pub_date("Mon, 32 Jan 2006 15:04:05 GMT"), None);
        assert_eq!(parse_pub_date("Mon, 02 Jan 2006 GMT"), None);
        assert_eq!(parse_pub_date("Fri, 31 Dec +262142 23:00:00 PST"), None);
    }
}
