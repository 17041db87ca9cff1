//! # Cell Store Module
//!
//! The contract of the remote tabular service: rectangular blocks of raw cell
//! values fetched, written, appended and cleared by range string.
use crate::cell::CellValue;
use anyhow::Result;
use async_trait::async_trait;

mod memory;

pub use memory::MemoryStore;

/// Row-major block of raw cell values.
pub type Rows = Vec<Vec<CellValue>>;

/// Block level access to a spreadsheet document.
///
/// Ranges are full references in `Sheet!A1:B2` notation. Implementations report
/// failures as opaque errors; nothing is retried.
#[async_trait]
pub trait CellStore: Send + Sync {
    /// Fetches the cells of a range. With `raw_formulas` formula cells are
    /// returned as their formula text rather than their computed value.
    async fn fetch_block(&self, range: &str, raw_formulas: bool) -> Result<Rows>;

    /// Overwrites the cells of a range starting at its top-left corner.
    async fn write_block(&self, range: &str, rows: Rows) -> Result<()>;

    /// Writes rows below the last non-empty row of a range.
    async fn append_block(&self, range: &str, rows: Rows) -> Result<()>;

    /// Clears the contents of a range.
    async fn clear_block(&self, range: &str) -> Result<()>;
}
