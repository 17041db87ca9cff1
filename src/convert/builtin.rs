//! Builtin converters.
//!
//! Each conversion accepts the matching raw variant first and falls back to
//! parsing the text form of the value.
use crate::cell::from_serial_date;
use crate::cell::CellValue;
use crate::convert::Converter;
use crate::convert::FieldKind;
use crate::convert::FieldValue;
use chrono::DateTime;
use chrono::Duration;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::TimeZone;
use chrono::Timelike;
use iso8601_duration::Duration as IsoDuration;
use std::str::FromStr;
use std::sync::Arc;
use url::Url;

/// Date/time layouts accepted for text cells.
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"];

/// Time layouts accepted for text cells.
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S%.f", "%H:%M"];

/// The UTC offset.
pub(crate) fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).expect("Zero offset")
}

/// Converts boolean cells, or the text `true`/`false` in any case.
pub fn to_boolean(value: &CellValue) -> Option<bool> {
    match value {
        CellValue::Boolean(value) => Some(*value),
        CellValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Converts numeric cells and numeric text to an integer type.
/// Fractional, out of range and non-numeric values yield None.
pub fn to_integer<T>(value: &CellValue) -> Option<T>
where
    T: TryFrom<i64> + FromStr,
{
    match value {
        CellValue::Integer(value) => T::try_from(*value).ok(),
        CellValue::Decimal(value)
            if value.fract() == 0.0 && *value >= i64::MIN as f64 && *value < i64::MAX as f64 =>
        {
            T::try_from(*value as i64).ok()
        }
        CellValue::Text(text) => text.trim().parse::<T>().ok(),
        _ => None,
    }
}

/// Converts numeric cells and numeric text to a decimal.
pub fn to_decimal(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Integer(value) => Some(*value as f64),
        CellValue::Decimal(value) => Some(*value),
        CellValue::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

/// Converts date/time cells, serial date numbers and ISO date/time text.
pub fn to_datetime(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(value) => Some(*value),
        CellValue::Integer(value) => from_serial_date(*value as f64),
        CellValue::Decimal(value) => from_serial_date(*value),
        CellValue::Text(text) => parse_datetime(text.trim()),
        _ => None,
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Converts to the date component of [`to_datetime`].
pub fn to_date(value: &CellValue) -> Option<NaiveDate> {
    to_datetime(value).map(|datetime| datetime.date())
}

/// Converts to the time component of [`to_datetime`], or parses time-only text.
pub fn to_time(value: &CellValue) -> Option<NaiveTime> {
    to_datetime(value).map(|datetime| datetime.time()).or_else(|| match value {
        CellValue::Text(text) => TIME_FORMATS
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(text.trim(), format).ok()),
        _ => None,
    })
}

/// Converts to the time of day of [`to_datetime`] as elapsed time.
/// Text may also be an ISO 8601 duration (`PT1H30M`) or `H:MM:SS`.
pub fn to_duration(value: &CellValue) -> Option<Duration> {
    to_datetime(value)
        .map(|datetime| time_of_day(&datetime.time()))
        .or_else(|| match value {
            CellValue::Text(text) => parse_iso_duration(text.trim()).or_else(|| parse_clock_duration(text.trim())),
            _ => None,
        })
}

fn time_of_day(time: &NaiveTime) -> Duration {
    Duration::seconds(time.num_seconds_from_midnight() as i64)
        + Duration::nanoseconds(time.nanosecond() as i64)
}

fn parse_iso_duration(text: &str) -> Option<Duration> {
    let duration = text.parse::<IsoDuration>().ok()?;
    if duration.year != 0f32 || duration.month != 0f32 {
        return None;
    }
    let seconds = duration.day as f64 * 86_400f64
        + duration.hour as f64 * 3_600f64
        + duration.minute as f64 * 60f64
        + duration.second as f64;
    Some(Duration::milliseconds((seconds * 1_000f64).round() as i64))
}

fn parse_clock_duration(text: &str) -> Option<Duration> {
    let (negative, text) = match text.strip_prefix('-') {
        Some(text) => (true, text),
        None => (false, text),
    };
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return None;
    }
    let hours = parts[0].parse::<i64>().ok()?;
    let minutes = parts[1].parse::<i64>().ok().filter(|minutes| *minutes < 60)?;
    let seconds = parts[2].parse::<i64>().ok().filter(|seconds| *seconds < 60)?;
    let duration = Duration::seconds(hours.checked_mul(3_600)? + minutes * 60 + seconds);
    Some(if negative { -duration } else { duration })
}

/// Converts RFC 3339 text as is; any other date/time is read as local time in `time_zone`.
pub fn to_zoned_datetime(value: &CellValue, time_zone: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let CellValue::Text(text) = value {
        if let Ok(datetime) = DateTime::parse_from_rfc3339(text.trim()) {
            return Some(datetime);
        }
    }
    to_datetime(value).and_then(|datetime| time_zone.from_local_datetime(&datetime).single())
}

/// Parses non-blank text as a URL.
pub fn to_uri(value: &CellValue) -> Option<Url> {
    let text = value.to_text()?;
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Url::parse(text).ok()
    }
}

/// Splits text on newlines and parses each line as a URL, skipping invalid lines.
pub fn to_uris(value: &CellValue) -> Option<Vec<Url>> {
    let text = value.to_text()?;
    Some(
        text.split('\n')
            .filter_map(|line| to_uri(&CellValue::from(line)))
            .collect(),
    )
}

/// Returns the display string of any non-empty cell.
pub fn to_text(value: &CellValue) -> Option<String> {
    value.to_text()
}

fn converter<T, F, W>(convert: F, wrap: W) -> Converter
where
    F: Fn(&CellValue) -> Option<T> + Send + Sync + 'static,
    W: Fn(T) -> FieldValue + Send + Sync + 'static,
{
    Arc::new(move |value: &CellValue| convert(value).map(&wrap).unwrap_or(FieldValue::Null))
}

/// Returns the builtin converter table for a time zone.
pub(crate) fn converters(time_zone: FixedOffset) -> Vec<(FieldKind, Converter)> {
    vec![
        (FieldKind::Boolean, converter(to_boolean, FieldValue::Boolean)),
        (FieldKind::Byte, converter(to_integer::<u8>, FieldValue::Byte)),
        (FieldKind::UShort, converter(to_integer::<u16>, FieldValue::UShort)),
        (FieldKind::Integer, converter(to_integer::<i32>, FieldValue::Integer)),
        (FieldKind::Long, converter(to_integer::<i64>, FieldValue::Long)),
        (FieldKind::Decimal, converter(to_decimal, FieldValue::Decimal)),
        (FieldKind::Text, converter(to_text, FieldValue::Text)),
        (FieldKind::DateTime, converter(to_datetime, FieldValue::DateTime)),
        (FieldKind::Date, converter(to_date, FieldValue::Date)),
        (FieldKind::Time, converter(to_time, FieldValue::Time)),
        (FieldKind::Duration, converter(to_duration, FieldValue::Duration)),
        (
            FieldKind::ZonedDateTime,
            converter(move |value| to_zoned_datetime(value, &time_zone), FieldValue::ZonedDateTime),
        ),
        (FieldKind::Uri, converter(to_uri, FieldValue::Uri)),
        (FieldKind::UriList, converter(to_uris, FieldValue::UriList)),
    ]
}
