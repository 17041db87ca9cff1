//! # Rusty Sheet Mapper
//!
//! Maps typed Rust records to and from tables of cells addressed in
//! spreadsheet range notation.
//!
//! ## Features
//!
//! - **Range notation**: parse and format `Sheet!A1:D5` references, including
//!   whole-column (`A:D`), whole-row (`2:2`) and open (`A1`) spans
//! - **Typed records**: declare the mapped members of a record once with a
//!   [`Schema`] and load or save whole tables of them
//! - **Field converters**: builtin conversions for booleans, integers, decimals,
//!   text, dates, times, durations, zoned date/times and URLs, with custom
//!   converters layered per sheet
//! - **Required fields**: rows whose required members are missing or empty are
//!   left out of loaded tables
//! - **Output templates**: format members on save, e.g. `{0:%d.%m.%Y}` or
//!   `=HYPERLINK("{0}";"open")`
//! - **Pluggable storage**: any [`CellStore`] backend, with an in-memory
//!   [`MemoryStore`] included
//!
//! ## Example
//!
//! ```
//! use rusty_sheet_mapper::{CellValue, Document, MemoryStore, Schema, SheetRecord};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Person {
//!     name: String,
//!     age: Option<i32>,
//! }
//!
//! impl SheetRecord for Person {
//!     fn schema() -> Schema<Self> {
//!         Schema::builder()
//!             .field("name", |p: &Person| &p.name, |p: &mut Person| &mut p.name)
//!             .title("Name")
//!             .required()
//!             .field("age", |p: &Person| &p.age, |p: &mut Person| &mut p.age)
//!             .title("Age")
//!             .build()
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::new().with_sheet(
//!     "People",
//!     vec![
//!         vec![CellValue::from("Name"), CellValue::from("Age")],
//!         vec![CellValue::from("Ada"), CellValue::Integer(36)],
//!         vec![CellValue::Null, CellValue::Integer(41)],
//!     ],
//! );
//! let document = Document::new(Arc::new(store));
//! let people = document.sheet("People").load::<Person>("A1:B").await.unwrap();
//! assert_eq!(people.instances.len(), 1);
//! assert_eq!(people.instances[0].age, Some(36));
//! # });
//! ```
pub mod cell;
pub mod config;
pub mod convert;
pub mod document;
pub mod error;
pub mod range;
pub mod record;
pub mod store;

pub use cell::CellValue;
pub use config::SheetsConfig;
pub use convert::format::hyperlink;
pub use convert::format::FormatTemplate;
pub use convert::ConverterRegistry;
pub use convert::FieldKind;
pub use convert::FieldValue;
pub use document::Document;
pub use document::Sheet;
pub use error::SheetMapperError;
pub use range::Bound;
pub use range::RangeAddress;
pub use range::RangeError;
pub use record::RecordMapper;
pub use record::Schema;
pub use record::SheetData;
pub use record::SheetRecord;
pub use record::ValueSet;
pub use store::CellStore;
pub use store::MemoryStore;
pub use store::Rows;
