//! # Cell Value Module
//!
//! Raw, dynamically typed cell values as exchanged with a cell store, together
//! with the serial date arithmetic spreadsheets use for date/time cells.
use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;

pub mod reference;

/// A raw cell value as fetched from or written to a cell store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Empty cell or missing trailing cell
    #[default]
    Null,
    /// Boolean values (true/false)
    Boolean(bool),
    /// Whole numbers
    Integer(i64),
    /// Floating point numbers, including serial dates
    Decimal(f64),
    /// Text values
    Text(String),
    /// Already typed date/time values
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Returns true for empty cells.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Returns the display string of a non-empty cell.
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            _ => Some(self.to_string()),
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Boolean(value) => write!(f, "{}", value),
            CellValue::Integer(value) => write!(f, "{}", value),
            CellValue::Decimal(value) => write!(f, "{}", value),
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::DateTime(value) => write!(f, "{}", value),
        }
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Decimal(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_owned())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// Milliseconds per day, the precision serial date fractions are rounded to.
const MILLISECONDS_PER_DAY: f64 = 86_400_000f64;

/// Day zero of the serial date system.
fn serial_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("Hardcode serial epoch")
}

/// Converts a serial date number to a date/time.
///
/// The integral part counts days from 1899-12-30, the fractional part is the
/// time of day. For negative serials the fraction still moves forward in time,
/// so `-1.25` is 1899-12-29 06:00. Returns None for non-finite or out of range input.
pub fn from_serial_date(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc();
    if days.abs() > 2_958_465f64 {
        return None;
    }
    let milliseconds = (serial.fract().abs() * MILLISECONDS_PER_DAY).round() as i64;
    serial_epoch()
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::milliseconds(milliseconds))
}
