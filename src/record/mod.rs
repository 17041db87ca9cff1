//! # Record Mapping Module
//!
//! Statically declared record schemas and the engine exchanging records with
//! title-headed tables of raw cell values.
//!
//! A record type implements [`SheetRecord`] by listing its mapped members in
//! a [`Schema`]. Each member's Rust type implements [`FieldType`], which names
//! the semantic [`FieldKind`] used to select its converter and moves values
//! between the member and a [`FieldValue`].
use crate::cell::CellValue;
use crate::convert::FieldKind;
use crate::convert::FieldValue;
use chrono::DateTime;
use chrono::Duration;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use url::Url;

mod mapper;
mod schema;
mod table;

pub use mapper::Loader;
pub use mapper::RecordMapper;
pub use mapper::Saver;
pub use schema::FieldBuilder;
pub use schema::FieldDescriptor;
pub use schema::Schema;
pub use schema::SchemaBuilder;
pub use table::organize;
pub use table::rows_from_value_sets;
pub use table::titles_from_row;
pub use table::value_sets_from_rows;
pub use table::SheetData;
pub use table::ValueSet;

/// A record type exchanged with sheet rows.
pub trait SheetRecord: Default + Sized + 'static {
    /// Returns the mapped members of the record in declaration order.
    fn schema() -> Schema<Self>;
}

/// A member type that can be bound to a column.
pub trait FieldType: Sized {
    /// Semantic kind selecting the converter for this type.
    fn kind() -> FieldKind;

    /// Takes a converted value; values of another variant give the empty value.
    fn from_field(value: FieldValue) -> Self;

    /// Returns the current value.
    fn to_field(&self) -> FieldValue;
}

/// Implements [`FieldType`] for a type and its optional form.
macro_rules! field_type {
    ($type:ty, $kind:ident, $variant:ident) => {
        impl FieldType for $type {
            fn kind() -> FieldKind {
                FieldKind::$kind
            }

            fn from_field(value: FieldValue) -> Self {
                match value {
                    FieldValue::$variant(value) => value,
                    _ => Default::default(),
                }
            }

            fn to_field(&self) -> FieldValue {
                FieldValue::$variant(self.clone())
            }
        }

        optional_field_type!($type, $kind, $variant);
    };
}

/// Implements [`FieldType`] for the optional form of a type only.
macro_rules! optional_field_type {
    ($type:ty, $kind:ident, $variant:ident) => {
        impl FieldType for Option<$type> {
            fn kind() -> FieldKind {
                FieldKind::$kind
            }

            fn from_field(value: FieldValue) -> Self {
                match value {
                    FieldValue::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn to_field(&self) -> FieldValue {
                match self {
                    Some(value) => FieldValue::$variant(value.clone()),
                    None => FieldValue::Null,
                }
            }
        }
    };
}

field_type!(bool, Boolean, Boolean);
field_type!(u8, Byte, Byte);
field_type!(u16, UShort, UShort);
field_type!(i32, Integer, Integer);
field_type!(i64, Long, Long);
field_type!(f64, Decimal, Decimal);
field_type!(String, Text, Text);
field_type!(NaiveDateTime, DateTime, DateTime);
field_type!(NaiveDate, Date, Date);
field_type!(NaiveTime, Time, Time);
field_type!(Vec<Url>, UriList, UriList);
optional_field_type!(Duration, Duration, Duration);
optional_field_type!(DateTime<FixedOffset>, ZonedDateTime, ZonedDateTime);
optional_field_type!(Url, Uri, Uri);

impl FieldType for CellValue {
    fn kind() -> FieldKind {
        FieldKind::Raw
    }

    fn from_field(value: FieldValue) -> Self {
        match value {
            FieldValue::Raw(value) => value,
            value => value.to_cell(),
        }
    }

    fn to_field(&self) -> FieldValue {
        FieldValue::Raw(self.clone())
    }
}
