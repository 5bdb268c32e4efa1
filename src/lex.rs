//! Byte-level helpers shared by the scanner.
//!
//! Everything here works on raw bytes or on a single already-extracted token:
//! character classes, comment markers, `\uXXXX` escape bodies, UTF-8 sequence
//! validation and datetime literals.

use crate::{Datetime, Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

/// Spaces and tabs. Line terminators are not spaces.
#[inline]
pub fn is_space(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

#[inline]
pub fn is_line_end(c: u8) -> bool {
    c == b'\r' || c == b'\n'
}

/// Both `#` and `//` start a comment that runs to the end of the line.
#[inline]
pub fn is_comment(a: u8, b: Option<u8>) -> bool {
    a == b'#' || (a == b'/' && b == Some(b'/'))
}

/// Decodes the four hex digits of a `\uXXXX` escape.
///
/// Anything other than exactly four hex digits is [`Error::InvalidUtf8StringValue`].
/// Surrogate code points cannot stand alone in UTF-8 and decode to U+FFFD.
///
/// # Examples
///
/// ```rust
/// use serde_rj::lex::unescape_u4;
///
/// assert_eq!(unescape_u4(b"6C49").unwrap(), '汉');
/// assert!(unescape_u4(b"6c49x").is_err());
/// ```
pub fn unescape_u4(hex: &[u8]) -> Result<char> {
    if hex.len() != 4 {
        return Err(Error::InvalidUtf8StringValue);
    }

    let mut code = 0u32;
    for &c in hex {
        let digit = match c {
            b'0'..=b'9' => c - b'0',
            b'a'..=b'f' => c - b'a' + 10,
            b'A'..=b'F' => c - b'A' + 10,
            _ => return Err(Error::InvalidUtf8StringValue),
        };
        code = code * 16 + u32::from(digit);
    }

    Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
}

/// Width of the UTF-8 sequence introduced by a non-ASCII leading byte.
#[inline]
fn utf8_width(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF4 => Some(4),
        _ => None,
    }
}

/// Decodes one multi-byte UTF-8 character at the start of `bytes`.
///
/// Returns the character and the number of bytes it occupies, or `None` for a
/// truncated, overlong or otherwise malformed sequence.
pub fn decode_utf8_char(bytes: &[u8]) -> Option<(char, usize)> {
    let width = utf8_width(*bytes.first()?)?;
    let chunk = bytes.get(..width)?;
    let ch = std::str::from_utf8(chunk).ok()?.chars().next()?;
    Some((ch, width))
}

/// The datetime layouts a numeric-looking token is tried against, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatetimeLayout {
    /// `2006-01-02`
    Date,
    /// `2006-01-02 15:04:05`
    DateTime,
    /// `15:04:05`, optionally with fractional seconds
    Time,
    /// `2006-01-02T15:04:05.999Z07:00`
    Rfc3339,
}

impl DatetimeLayout {
    /// Finds the first layout whose shape `raw` matches.
    #[must_use]
    pub fn classify(raw: &str) -> Option<Self> {
        let b = raw.as_bytes();
        if matches_shape(b, b"dddd-dd-dd") {
            Some(DatetimeLayout::Date)
        } else if matches_shape(b, b"dddd-dd-dd dd:dd:dd") {
            Some(DatetimeLayout::DateTime)
        } else if b.len() >= 8
            && matches_shape(&b[..8], b"dd:dd:dd")
            && fraction_len(&b[8..]) == b.len() - 8
        {
            Some(DatetimeLayout::Time)
        } else if b.len() >= 19 && matches_shape(&b[..19], b"dddd-dd-ddTdd:dd:dd") {
            let rest = &b[19..];
            let rest = &rest[fraction_len(rest)..];
            if rest.is_empty()
                || rest == b"Z"
                || (rest.len() == 6
                    && (rest[0] == b'+' || rest[0] == b'-')
                    && matches_shape(&rest[1..], b"dd:dd"))
            {
                Some(DatetimeLayout::Rfc3339)
            } else {
                None
            }
        } else {
            None
        }
    }
}

/// `d` in `shape` matches any ASCII digit, every other byte matches itself.
fn matches_shape(bytes: &[u8], shape: &[u8]) -> bool {
    bytes.len() == shape.len()
        && bytes
            .iter()
            .zip(shape)
            .all(|(&b, &s)| if s == b'd' { b.is_ascii_digit() } else { b == s })
}

/// Length of an optional `.ddd` fractional-seconds prefix of `bytes`.
fn fraction_len(bytes: &[u8]) -> usize {
    if bytes.first() != Some(&b'.') {
        return 0;
    }
    let digits = bytes[1..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        0
    } else {
        digits + 1
    }
}

/// Parses a datetime literal.
///
/// The first layout whose shape matches decides the format; a token that matches
/// no layout, or fails to parse under the layout it matched, is
/// [`Error::InvalidTimeValue`]. Layouts without an offset are read as UTC, and a
/// bare time of day lands on 0000-01-01.
///
/// # Examples
///
/// ```rust
/// use serde_rj::lex::parse_datetime;
///
/// let dt = parse_datetime("2019-09-09T13:54:46.123+08:00").unwrap();
/// assert_eq!(dt.to_rfc3339(), "2019-09-09T13:54:46.123+08:00");
///
/// assert!(parse_datetime("2019-09-09T13:54:46.123+a").is_err());
/// ```
pub fn parse_datetime(raw: &str) -> Result<Datetime> {
    let layout = DatetimeLayout::classify(raw).ok_or(Error::InvalidTimeValue)?;
    let utc = Utc.fix();

    let parsed = match layout {
        DatetimeLayout::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| utc.from_utc_datetime(&naive)),
        DatetimeLayout::DateTime => NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| utc.from_utc_datetime(&naive)),
        DatetimeLayout::Time => NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
            .ok()
            .and_then(|time| NaiveDate::from_ymd_opt(0, 1, 1).map(|date| date.and_time(time)))
            .map(|naive| utc.from_utc_datetime(&naive)),
        DatetimeLayout::Rfc3339 => DateTime::parse_from_rfc3339(raw).ok(),
    };

    parsed.ok_or(Error::InvalidTimeValue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, nanos: u32) -> Datetime {
        let naive = NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_nano_opt(h, mi, s, nanos)
            .unwrap();
        Utc.fix().from_utc_datetime(&naive)
    }

    #[test]
    fn test_is_comment() {
        assert!(is_comment(b'#', Some(b' ')));
        assert!(is_comment(b'#', None));
        assert!(is_comment(b'/', Some(b'/')));
        assert!(!is_comment(b'/', Some(b'a')));
        assert!(!is_comment(b'/', None));
        assert!(!is_comment(b'N', Some(b'o')));
    }

    #[test]
    fn test_unescape_u4() {
        assert_eq!(unescape_u4(b"6C49").unwrap(), '汉');
        assert_eq!(unescape_u4(b"0041").unwrap(), 'A');
        assert_eq!(unescape_u4(b"6c49x"), Err(Error::InvalidUtf8StringValue));
        assert_eq!(unescape_u4(b"6c4"), Err(Error::InvalidUtf8StringValue));
        assert_eq!(unescape_u4(b"zz49"), Err(Error::InvalidUtf8StringValue));
        assert_eq!(unescape_u4(b"D800").unwrap(), char::REPLACEMENT_CHARACTER);
    }

    #[test]
    fn test_decode_utf8_char() {
        assert_eq!(decode_utf8_char("汉x".as_bytes()), Some(('汉', 3)));
        assert_eq!(decode_utf8_char("é".as_bytes()), Some(('é', 2)));
        assert_eq!(decode_utf8_char(&[0xE6, 0xB1]), None);
        assert_eq!(decode_utf8_char(&[0xFF, 0x41]), None);
        assert_eq!(decode_utf8_char(&[0xC0, 0x80]), None);
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            DatetimeLayout::classify("2018-08-08"),
            Some(DatetimeLayout::Date)
        );
        assert_eq!(
            DatetimeLayout::classify("2019-09-09 13:54:46"),
            Some(DatetimeLayout::DateTime)
        );
        assert_eq!(
            DatetimeLayout::classify("13:54:46.5"),
            Some(DatetimeLayout::Time)
        );
        assert_eq!(
            DatetimeLayout::classify("2019-09-09T13:54:46Z"),
            Some(DatetimeLayout::Rfc3339)
        );
        assert_eq!(DatetimeLayout::classify("2019-09-09T13:54:46.123+a"), None);
        assert_eq!(DatetimeLayout::classify("12-34"), None);
    }

    #[test]
    fn test_parse_datetime_layouts() {
        assert_eq!(
            parse_datetime("2018-08-08").unwrap(),
            utc(2018, 8, 8, 0, 0, 0, 0)
        );
        assert_eq!(
            parse_datetime("2019-09-09 13:54:46").unwrap(),
            utc(2019, 9, 9, 13, 54, 46, 0)
        );
        assert_eq!(
            parse_datetime("2019-09-09T13:54:46.123Z").unwrap(),
            utc(2019, 9, 9, 13, 54, 46, 123_000_000)
        );

        let shanghai = parse_datetime("2019-09-09T13:54:46.123+08:00").unwrap();
        assert_eq!(shanghai.offset(), &FixedOffset::east_opt(8 * 3600).unwrap());
        assert_eq!(shanghai, utc(2019, 9, 9, 5, 54, 46, 123_000_000));
    }

    #[test]
    fn test_parse_time_only() {
        let t = parse_datetime("13:54:46").unwrap();
        assert_eq!(t, utc(0, 1, 1, 13, 54, 46, 0));

        let t = parse_datetime("07:00:01.25").unwrap();
        assert_eq!(t.nanosecond(), 250_000_000);
    }

    #[test]
    fn test_parse_datetime_errors() {
        assert_eq!(
            parse_datetime("2019-09-09T13:54:46.123+a"),
            Err(Error::InvalidTimeValue)
        );
        assert_eq!(parse_datetime("2019-13-45"), Err(Error::InvalidTimeValue));
        assert_eq!(
            parse_datetime("2019-09-09T13:54:46"),
            Err(Error::InvalidTimeValue)
        );
        assert_eq!(parse_datetime("1.2.3"), Err(Error::InvalidTimeValue));
    }
}
