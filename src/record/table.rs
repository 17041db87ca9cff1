use crate::cell::CellValue;
use crate::store::Rows;
use std::collections::HashMap;

/// One data row keyed by column title.
pub type ValueSet = HashMap<String, CellValue>;

/// A title list plus the records loaded from or saved to the rows below it.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetData<T> {
    /// Records in row order
    pub instances: Vec<T>,
    /// Column titles in sheet order
    pub titles: Vec<String>,
}

impl<T> SheetData<T> {
    /// Creates a table from records and titles.
    pub fn new(instances: Vec<T>, titles: Vec<String>) -> Self {
        Self { instances, titles }
    }

    /// Creates the empty table: no titles and no records.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Returns true for the empty table. A title-only table is not empty.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty() && self.titles.is_empty()
    }
}

impl<T> Default for SheetData<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Reads a header row; empty cells become empty titles.
pub fn titles_from_row(row: &[CellValue]) -> Vec<String> {
    row.iter().map(|cell| cell.to_text().unwrap_or_default()).collect()
}

/// Zips one row against the titles. Short rows are padded with nulls, cells
/// beyond the titles are ignored, and a repeated title keeps its last cell.
pub fn organize(titles: &[String], row: &[CellValue]) -> ValueSet {
    let mut values = ValueSet::with_capacity(titles.len());
    for (index, title) in titles.iter().enumerate() {
        let value = row.get(index).cloned().unwrap_or_default();
        values.insert(title.to_owned(), value);
    }
    values
}

/// Splits fetched rows into the title row and the value sets of the data rows.
pub fn value_sets_from_rows(rows: &Rows) -> SheetData<ValueSet> {
    let Some((header, data)) = rows.split_first() else {
        return SheetData::empty();
    };
    let titles = titles_from_row(header);
    let instances = data.iter().map(|row| organize(&titles, row)).collect();
    SheetData::new(instances, titles)
}

/// Lays value sets out in title order, optionally led by the title row.
/// Absent and null values are written as empty text, so every row has one
/// cell per title.
pub fn rows_from_value_sets(titles: &[String], value_sets: &[ValueSet], with_header: bool) -> Rows {
    let mut rows = Vec::with_capacity(value_sets.len() + 1);
    if with_header {
        rows.push(titles.iter().map(|title| CellValue::Text(title.to_owned())).collect());
    }
    for values in value_sets {
        let row = titles
            .iter()
            .map(|title| match values.get(title) {
                Some(value) if !value.is_null() => value.clone(),
                _ => CellValue::Text(String::new()),
            })
            .collect();
        rows.push(row);
    }
    rows
}
