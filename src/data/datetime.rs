// src/data/datetime.rs

//! Functions to transform datetime tokens taken from a log record into chrono
//! [`DateTime`] instances.
//!
//! A datetime token is a single whitespace-delimited token, for example
//! `2024-03-01T09:15:02.4471230+01:00` (RFC 3339, what .NET calls the
//! round-trip `"o"` format) or `2024-03-01T09:15:02.447` (no timezone).
//!
//! [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html

#[doc(hidden)]
pub use ::chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// A chrono [`DateTime`] type used in _tlplib_.
///
/// [`DateTime`]: https://docs.rs/chrono/0.4.40/chrono/struct.DateTime.html
pub type DateTimeL = DateTime<FixedOffset>;
pub type DateTimeLOpt = Option<DateTimeL>;

/// chrono [`strftime`] pattern.
///
/// [`strftime`]: https://docs.rs/chrono/0.4.40/chrono/format/strftime/index.html
#[allow(non_camel_case_types)]
pub type DateTimePattern_str = str;

/// Patterns tried, in order, for datetime tokens without a timezone.
/// `%.f` accepts zero to nine fractional digits.
pub const DATETIME_PATTERNS_NO_TZ: [&DateTimePattern_str; 2] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d_%H:%M:%S%.f",
];

/// Shortest possible datetime token, e.g. `2024-03-01T09:15:02`.
pub const DATETIME_TOKEN_LEN_MIN: usize = 19;

/// The UTC [`FixedOffset`], a fallback for datetimes without a timezone.
///
/// [`FixedOffset`]: https://docs.rs/chrono/0.4.40/chrono/offset/struct.FixedOffset.html
pub fn fixedoffset_utc() -> FixedOffset {
    Utc.fix()
}

/// Convert passed `[u8]` to `str` only if all bytes are ASCII.
///
/// Datetime tokens are always ASCII so anything else is not a datetime.
#[inline(always)]
pub fn u8_to_str_ascii(data: &[u8]) -> Option<&str> {
    if !data.is_ascii() {
        return None;
    }

    std::str::from_utf8(data).ok()
}

/// Parse a single datetime token.
///
/// First tries RFC 3339. If that fails then tries each of
/// [`DATETIME_PATTERNS_NO_TZ`], the result placed in timezone `tz_offset`.
///
/// Returns `None` if `data` is not a datetime.
pub fn datetime_parse_token(
    data: &str,
    tz_offset: &FixedOffset,
) -> DateTimeLOpt {
    defn!("({:?}, {:?})", data, tz_offset);
    // quick reject; most tokens tested are not datetimes at all
    let bytes = data.as_bytes();
    if bytes.len() < DATETIME_TOKEN_LEN_MIN || !bytes[0].is_ascii_digit() {
        defx!("return None; not datetime-like");
        return None;
    }
    match DateTime::parse_from_rfc3339(data) {
        Ok(dt) => {
            defx!("return Some({:?})", dt);
            return Some(dt);
        }
        Err(_err) => {
            defo!("DateTime::parse_from_rfc3339({:?}) failed {}", data, _err);
        }
    }
    for pattern in DATETIME_PATTERNS_NO_TZ.iter() {
        let dt_naive = match NaiveDateTime::parse_from_str(data, pattern) {
            Ok(val) => val,
            Err(_err) => {
                defo!("NaiveDateTime::parse_from_str({:?}, {:?}) failed {}", data, pattern, _err);
                continue;
            }
        };
        match tz_offset
            .from_local_datetime(&dt_naive)
            .earliest()
        {
            Some(dt) => {
                defx!("return Some({:?})", dt);
                return Some(dt);
            }
            None => {
                defo!("tz_offset.from_local_datetime({:?}) returned None", dt_naive);
            }
        }
    }
    defx!("return None");

    None
}

/// Parse a single datetime token from bytes.
///
/// See [`datetime_parse_token`].
pub fn bytes_to_datetime(
    data: &[u8],
    tz_offset: &FixedOffset,
) -> DateTimeLOpt {
    match u8_to_str_ascii(data) {
        Some(s) => datetime_parse_token(s, tz_offset),
        None => None,
    }
}
