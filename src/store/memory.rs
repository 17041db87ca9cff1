use crate::cell::reference::col_to_index;
use crate::cell::reference::row_to_index;
use crate::cell::CellValue;
use crate::range::RangeAddress;
use crate::store::CellStore;
use crate::store::Rows;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::trace;

/// A [`CellStore`] keeping named sheets in memory.
///
/// Formulas are not evaluated, so fetches return stored values whatever the
/// `raw_formulas` flag says. Empty text is stored as an empty cell, and
/// fetched blocks are trimmed of trailing empty cells and rows.
#[derive(Debug, Default)]
pub struct MemoryStore {
    sheets: RwLock<HashMap<String, Rows>>,
}

/// A resolved rectangle of 0-based, inclusive grid indexes.
/// Open sides extend to the data.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Area {
    top: usize,
    left: usize,
    bottom: Option<usize>,
    right: Option<usize>,
}

impl Area {
    fn contains_row(&self, row: usize) -> bool {
        row >= self.top && self.bottom.map_or(true, |bottom| row <= bottom)
    }

    fn cells<'a>(&self, row: &'a [CellValue]) -> &'a [CellValue] {
        let end = self.right.map_or(row.len(), |right| (right + 1).min(row.len()));
        row.get(self.left..end).unwrap_or(&[])
    }
}

impl MemoryStore {
    /// Creates a store without sheets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet while building the store.
    pub fn with_sheet(mut self, name: &str, rows: Rows) -> Self {
        self.sheets.get_mut().insert(name.to_owned(), rows);
        self
    }

    /// Adds or replaces a sheet.
    pub async fn insert_sheet(&self, name: &str, rows: Rows) {
        self.sheets.write().await.insert(name.to_owned(), rows);
    }

    /// Adds or replaces a sheet from a JSON array of rows.
    pub async fn insert_json(&self, name: &str, json: &str) -> Result<()> {
        let rows: Rows = serde_json::from_str(json).with_context(|| format!("Invalid rows for sheet '{}'", name))?;
        self.insert_sheet(name, rows).await;
        Ok(())
    }

    /// Returns a copy of all cells of a sheet.
    pub async fn rows(&self, name: &str) -> Option<Rows> {
        self.sheets.read().await.get(name).cloned()
    }
}

/// Splits a full range reference into its sheet name and grid area. The flag
/// is set for a reference without an end bound, which anchors writes.
fn resolve(range: &str) -> Result<(String, Area, bool)> {
    let address = RangeAddress::parse(range)?;
    let Some(sheet) = address.sheet() else {
        bail!("Range '{}' has no sheet name", range);
    };
    let start = address.start();
    let anchored = address.end().is_none();

    let start_column = column_index(start.column())?;
    let top = start.row().map(row_to_index).unwrap_or(0);
    let left = start_column.unwrap_or(0);
    let (bottom, right) = match address.end() {
        Some(end) => (end.row().map(row_to_index), column_index(end.column())?),
        None => (start.row().map(|_| top), start_column.map(|_| left)),
    };

    let area = Area {
        top: bottom.map_or(top, |bottom| top.min(bottom)),
        left: right.map_or(left, |right| left.min(right)),
        bottom: bottom.map(|bottom| top.max(bottom)),
        right: right.map(|right| left.max(right)),
    };
    trace!(range, ?area, "Resolved range");
    Ok((sheet.to_owned(), area, anchored))
}

fn column_index(column: Option<&str>) -> Result<Option<usize>> {
    match column {
        Some(column) => col_to_index(column)
            .map(Some)
            .with_context(|| format!("Column '{}' is out of range", column)),
        None => Ok(None),
    }
}

/// Largest grid, in cells, a write may grow a sheet to.
const MAX_CELLS: usize = 10_000_000;

/// Fails if rows placed at (top, left) would grow the sheet past [`MAX_CELLS`].
fn check_extent(range: &str, top: usize, left: usize, rows: &Rows) -> Result<()> {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Ok(());
    }
    let cells = (top + rows.len()).saturating_mul(left + width);
    if cells > MAX_CELLS {
        bail!("Writing to range '{}' would grow the sheet to {} cells", range, cells);
    }
    Ok(())
}

/// Writes rows into a grid with their first cell at (top, left).
fn place(grid: &mut Rows, top: usize, left: usize, rows: Rows) {
    for (offset, row) in rows.into_iter().enumerate() {
        let index = top + offset;
        if grid.len() <= index {
            grid.resize(index + 1, Vec::new());
        }
        let cells = &mut grid[index];
        for (column, cell) in row.into_iter().enumerate() {
            let column = left + column;
            if cells.len() <= column {
                cells.resize(column + 1, CellValue::Null);
            }
            cells[column] = match cell {
                CellValue::Text(text) if text.is_empty() => CellValue::Null,
                cell => cell,
            };
        }
    }
}

/// Fails if rows do not fit into the bounded sides of an area.
fn check_fits(range: &str, area: &Area, rows: &Rows) -> Result<()> {
    if let Some(bottom) = area.bottom {
        if area.top + rows.len() > bottom + 1 {
            bail!("Range '{}' is too small for {} rows", range, rows.len());
        }
    }
    if let Some(right) = area.right {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if area.left + width > right + 1 {
            bail!("Range '{}' is too small for {} columns", range, width);
        }
    }
    Ok(())
}

#[async_trait]
impl CellStore for MemoryStore {
    async fn fetch_block(&self, range: &str, _raw_formulas: bool) -> Result<Rows> {
        let (sheet, area, _) = resolve(range)?;
        let sheets = self.sheets.read().await;
        let grid = sheets.get(&sheet).with_context(|| format!("Unknown sheet '{}'", sheet))?;

        let mut rows: Rows = grid
            .iter()
            .enumerate()
            .filter(|(index, _)| area.contains_row(*index))
            .map(|(_, row)| {
                let mut cells = area.cells(row).to_vec();
                while cells.last().is_some_and(CellValue::is_null) {
                    cells.pop();
                }
                cells
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        Ok(rows)
    }

    async fn write_block(&self, range: &str, rows: Rows) -> Result<()> {
        let (sheet, area, anchored) = resolve(range)?;
        if !anchored {
            check_fits(range, &area, &rows)?;
        }
        check_extent(range, area.top, area.left, &rows)?;
        let mut sheets = self.sheets.write().await;
        let grid = sheets.entry(sheet).or_default();
        place(grid, area.top, area.left, rows);
        Ok(())
    }

    async fn append_block(&self, range: &str, rows: Rows) -> Result<()> {
        let (sheet, area, _) = resolve(range)?;
        let mut sheets = self.sheets.write().await;
        let top = sheets
            .get(&sheet)
            .and_then(|grid| {
                grid.iter()
                    .enumerate()
                    .skip(area.top)
                    .filter(|(_, row)| area.cells(row).iter().any(|cell| !cell.is_null()))
                    .map(|(index, _)| index + 1)
                    .last()
            })
            .unwrap_or(area.top);
        check_extent(range, top, area.left, &rows)?;
        let grid = sheets.entry(sheet).or_default();
        place(grid, top, area.left, rows);
        Ok(())
    }

    async fn clear_block(&self, range: &str) -> Result<()> {
        let (sheet, area, _) = resolve(range)?;
        let mut sheets = self.sheets.write().await;
        let grid = sheets.get_mut(&sheet).with_context(|| format!("Unknown sheet '{}'", sheet))?;
        for (index, row) in grid.iter_mut().enumerate() {
            if !area.contains_row(index) {
                continue;
            }
            let end = area.right.map_or(row.len(), |right| (right + 1).min(row.len()));
            for cell in row.iter_mut().take(end).skip(area.left) {
                *cell = CellValue::Null;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::from(value)
    }

    fn store() -> MemoryStore {
        MemoryStore::new().with_sheet(
            "Data",
            vec![
                vec![text("Name"), text("Age"), text("City")],
                vec![text("Ada"), CellValue::Integer(36), text("London")],
                vec![text("Alan"), CellValue::Integer(41)],
            ],
        )
    }

    #[test]
    fn resolve_areas() {
        let area = |range: &str| resolve(range).unwrap().1;
        assert_eq!(
            area("S!A1:D5"),
            Area { top: 0, left: 0, bottom: Some(4), right: Some(3) }
        );
        assert_eq!(area("S!B:C"), Area { top: 0, left: 1, bottom: None, right: Some(2) });
        assert_eq!(area("S!A2:C"), Area { top: 1, left: 0, bottom: None, right: Some(2) });
        assert_eq!(area("S!C3"), Area { top: 2, left: 2, bottom: Some(2), right: Some(2) });
        assert_eq!(area("S!B"), Area { top: 0, left: 1, bottom: None, right: Some(1) });
        assert_eq!(area("S!3"), Area { top: 2, left: 0, bottom: Some(2), right: None });
        assert_eq!(area("S!D5:A1"), area("S!A1:D5"));
    }

    #[test]
    fn resolve_requires_sheet() {
        assert!(resolve("A1:B2").is_err());
        assert!(resolve("S!").is_err());
    }

    #[tokio::test]
    async fn fetch_trims_trailing_cells() {
        let store = store();
        let rows = store.fetch_block("Data!A1:F10", false).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec![text("Alan"), CellValue::Integer(41)]);

        let rows = store.fetch_block("Data!B2:C", false).await.unwrap();
        assert_eq!(
            rows,
            vec![vec![CellValue::Integer(36), text("London")], vec![CellValue::Integer(41)]]
        );

        let rows = store.fetch_block("Data!A10:C20", false).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn fetch_unknown_sheet_fails() {
        let store = store();
        assert!(store.fetch_block("Missing!A1:B2", false).await.is_err());
        assert!(store.fetch_block("A1:B2", false).await.is_err());
    }

    #[tokio::test]
    async fn write_creates_sheet_and_stores_empty_text_as_null() {
        let store = MemoryStore::new();
        let rows = vec![vec![text("a"), text("")], vec![text(""), text("d")]];
        store.write_block("New!B2", rows).await.unwrap();
        assert_eq!(
            store.rows("New").await.unwrap(),
            vec![
                vec![],
                vec![CellValue::Null, text("a"), CellValue::Null],
                vec![CellValue::Null, CellValue::Null, text("d")],
            ]
        );
    }

    #[tokio::test]
    async fn write_outside_bounded_range_fails() {
        let store = MemoryStore::new();
        let rows = vec![vec![text("a")], vec![text("b")]];
        assert!(store.write_block("S!A1:B1", rows).await.is_err());
        assert_eq!(store.rows("S").await, None);
    }

    #[tokio::test]
    async fn write_far_from_origin_fails() {
        let store = MemoryStore::new();
        let error = store
            .write_block("S!XFD65535", vec![vec![text("x")]])
            .await
            .unwrap_err();
        assert!(error.to_string().contains("would grow the sheet"), "{}", error);
        assert!(store.append_block("S!XFD1:XFD", vec![vec![text("x")]; 1000]).await.is_err());
        assert_eq!(store.rows("S").await, None);

        store.write_block("S!Z100", vec![vec![text("x")]]).await.unwrap();
        let rows = store.fetch_block("S!Z100", false).await.unwrap();
        assert_eq!(rows, vec![vec![text("x")]]);
    }

    #[tokio::test]
    async fn append_writes_below_last_row() {
        let store = store();
        store
            .append_block("Data!A:C", vec![vec![text("Grace"), CellValue::Integer(85)]])
            .await
            .unwrap();
        let rows = store.fetch_block("Data!A4:C4", false).await.unwrap();
        assert_eq!(rows, vec![vec![text("Grace"), CellValue::Integer(85)]]);

        let store = MemoryStore::new();
        store.append_block("Empty!A1:B", vec![vec![text("x")]]).await.unwrap();
        assert_eq!(store.rows("Empty").await.unwrap(), vec![vec![text("x")]]);
    }

    #[tokio::test]
    async fn clear_empties_cells() {
        let store = store();
        store.clear_block("Data!B2:C").await.unwrap();
        let rows = store.fetch_block("Data!A1:C", false).await.unwrap();
        assert_eq!(
            rows,
            vec![
                vec![text("Name"), text("Age"), text("City")],
                vec![text("Ada")],
                vec![text("Alan")],
            ]
        );
        assert!(store.clear_block("Missing!A1").await.is_err());
    }

    #[tokio::test]
    async fn insert_rows_from_json() {
        let store = MemoryStore::new();
        store
            .insert_json("Json", r#"[["Name", "Age"], ["Ada", 36], ["Alan", null, true]]"#)
            .await
            .unwrap();
        let rows = store.fetch_block("Json!A1:C3", false).await.unwrap();
        assert_eq!(rows[1], vec![text("Ada"), CellValue::Integer(36)]);
        assert_eq!(rows[2], vec![text("Alan"), CellValue::Null, CellValue::Boolean(true)]);
        assert!(store.insert_json("Bad", "{").await.is_err());
    }
}
