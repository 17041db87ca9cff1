//! # Field Conversion Module
//!
//! Maps the declared semantic type of a record field to a converter turning a
//! raw [`CellValue`] into a typed [`FieldValue`]. Converters never fail: a value
//! that cannot be converted degrades to [`FieldValue::Null`].
//!
//! The [`ConverterRegistry`] is built once, flattened, and never mutated
//! afterwards; layering custom converters over it produces a new registry.
use crate::cell::CellValue;
use chrono::DateTime;
use chrono::Duration;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use url::Url;

pub mod builtin;
pub mod format;

/// Semantic type of a record field, used to pick its converter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Boolean values (true/false)
    Boolean,
    /// Unsigned 8-bit integers
    Byte,
    /// Unsigned 16-bit integers
    UShort,
    /// Signed 32-bit integers
    Integer,
    /// Signed 64-bit integers
    Long,
    /// Floating point decimals
    Decimal,
    /// Text values
    Text,
    /// Date and time without time zone
    DateTime,
    /// Date without time component
    Date,
    /// Time without date component
    Time,
    /// Elapsed time, taken from the time-of-day part of a date/time
    Duration,
    /// Date and time in the registry's configured time zone
    ZonedDateTime,
    /// A single URL
    Uri,
    /// Newline-separated URLs
    UriList,
    /// Unconverted raw cell value
    Raw,
    /// Application-defined type with a caller-registered converter
    Custom(&'static str),
}

/// A converted, typed field value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FieldValue {
    #[default]
    Null,
    Boolean(bool),
    Byte(u8),
    UShort(u16),
    Integer(i32),
    Long(i64),
    Decimal(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Time(NaiveTime),
    Duration(Duration),
    ZonedDateTime(DateTime<FixedOffset>),
    Uri(Url),
    UriList(Vec<Url>),
    /// Raw value passed through for kinds without a converter
    Raw(CellValue),
}

impl FieldValue {
    /// Returns true if the value is absent, including a passed-through empty cell.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null | FieldValue::Raw(CellValue::Null))
    }

    /// Returns true if the value is the empty string.
    pub fn is_empty_text(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.is_empty(),
            FieldValue::Raw(CellValue::Text(value)) => value.is_empty(),
            _ => false,
        }
    }

    /// Converts the value to the raw cell written to a store.
    /// Zoned date/times are written as RFC 3339 text to keep their offset.
    pub fn to_cell(&self) -> CellValue {
        match self {
            FieldValue::Null => CellValue::Null,
            FieldValue::Boolean(value) => CellValue::Boolean(*value),
            FieldValue::Byte(value) => CellValue::Integer(*value as i64),
            FieldValue::UShort(value) => CellValue::Integer(*value as i64),
            FieldValue::Integer(value) => CellValue::Integer(*value as i64),
            FieldValue::Long(value) => CellValue::Integer(*value),
            FieldValue::Decimal(value) => CellValue::Decimal(*value),
            FieldValue::Text(value) => CellValue::Text(value.to_owned()),
            FieldValue::DateTime(value) => CellValue::DateTime(*value),
            FieldValue::Raw(value) => value.to_owned(),
            _ => CellValue::Text(self.to_string()),
        }
    }
}

impl Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Boolean(value) => write!(f, "{}", value),
            FieldValue::Byte(value) => write!(f, "{}", value),
            FieldValue::UShort(value) => write!(f, "{}", value),
            FieldValue::Integer(value) => write!(f, "{}", value),
            FieldValue::Long(value) => write!(f, "{}", value),
            FieldValue::Decimal(value) => write!(f, "{}", value),
            FieldValue::Text(value) => write!(f, "{}", value),
            FieldValue::DateTime(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S")),
            FieldValue::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            FieldValue::Time(value) => write!(f, "{}", value.format("%H:%M:%S")),
            FieldValue::Duration(value) => {
                let seconds = value.num_seconds();
                let sign = if seconds < 0 { "-" } else { "" };
                let seconds = seconds.abs();
                write!(f, "{}{}:{:02}:{:02}", sign, seconds / 3600, seconds / 60 % 60, seconds % 60)
            }
            FieldValue::ZonedDateTime(value) => write!(f, "{}", value.to_rfc3339()),
            FieldValue::Uri(value) => write!(f, "{}", value.as_str()),
            FieldValue::UriList(values) => {
                let values: Vec<&str> = values.iter().map(Url::as_str).collect();
                write!(f, "{}", values.join("\n"))
            }
            FieldValue::Raw(value) => write!(f, "{}", value),
        }
    }
}

/// A conversion from a raw cell value to a typed field value.
pub type Converter = Arc<dyn Fn(&CellValue) -> FieldValue + Send + Sync>;

/// Immutable mapping from semantic field kinds to converters.
#[derive(Clone)]
pub struct ConverterRegistry {
    converters: HashMap<FieldKind, Converter>,
    time_zone: FixedOffset,
}

impl ConverterRegistry {
    /// Creates a registry with the builtin converters in UTC.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts a registry seeded with the builtin converters.
    pub fn builder() -> ConverterRegistryBuilder {
        ConverterRegistryBuilder {
            time_zone: builtin::utc(),
            overrides: Vec::new(),
        }
    }

    /// Returns the converter registered for a kind.
    pub fn get(&self, kind: &FieldKind) -> Option<&Converter> {
        self.converters.get(kind)
    }

    /// Returns true if a converter is registered for a kind.
    pub fn contains(&self, kind: &FieldKind) -> bool {
        self.converters.contains_key(kind)
    }

    /// Time zone used for [`FieldKind::ZonedDateTime`] conversions.
    pub fn time_zone(&self) -> FixedOffset {
        self.time_zone
    }

    /// Converts a raw value for a field kind.
    /// Kinds without a converter pass the raw value through unconverted.
    pub fn convert(&self, kind: &FieldKind, value: &CellValue) -> FieldValue {
        match self.converters.get(kind) {
            Some(converter) => converter(value),
            None => FieldValue::Raw(value.to_owned()),
        }
    }

    /// Returns a new registry with the given converters layered over this one.
    /// For a kind registered more than once the last registration wins.
    pub fn with_overrides<I>(&self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (FieldKind, Converter)>,
    {
        let mut converters = self.converters.clone();
        converters.extend(overrides);
        Self {
            converters,
            time_zone: self.time_zone,
        }
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<String> = self.converters.keys().map(|kind| format!("{:?}", kind)).collect();
        kinds.sort();
        f.debug_struct("ConverterRegistry")
            .field("kinds", &kinds)
            .field("time_zone", &self.time_zone)
            .finish()
    }
}

/// Builder collecting the configuration of a [`ConverterRegistry`].
pub struct ConverterRegistryBuilder {
    time_zone: FixedOffset,
    overrides: Vec<(FieldKind, Converter)>,
}

impl ConverterRegistryBuilder {
    /// Sets the time zone used by the builtin zoned date/time converter.
    pub fn time_zone(mut self, time_zone: FixedOffset) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Registers a converter, replacing any builtin or earlier registration.
    pub fn register<F>(mut self, kind: FieldKind, converter: F) -> Self
    where
        F: Fn(&CellValue) -> FieldValue + Send + Sync + 'static,
    {
        self.overrides.push((kind, Arc::new(converter)));
        self
    }

    /// Flattens builtins and registrations into an immutable registry.
    pub fn build(self) -> ConverterRegistry {
        let mut converters: HashMap<FieldKind, Converter> =
            builtin::converters(self.time_zone).into_iter().collect();
        converters.extend(self.overrides);
        ConverterRegistry {
            converters,
            time_zone: self.time_zone,
        }
    }
}
