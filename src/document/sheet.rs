use crate::convert::ConverterRegistry;
use crate::error::SheetMapperError;
use crate::range::RangeAddress;
use crate::record::titles_from_row;
use crate::record::value_sets_from_rows;
use crate::record::RecordMapper;
use crate::record::SheetData;
use crate::record::SheetRecord;
use crate::record::ValueSet;
use crate::store::CellStore;
use crate::store::Rows;
use anyhow::Context;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type Result<T> = std::result::Result<T, SheetMapperError>;

/// A named sheet of a document.
///
/// Ranges passed to a sheet are relative to it: any sheet prefix in the range
/// string is replaced by the sheet name before the store is called.
pub struct Sheet<S> {
    name: String,
    store: Arc<S>,
    registry: Arc<ConverterRegistry>,
    title_aliases: Arc<HashMap<String, String>>,
    raw_formulas: bool,
}

impl<S: CellStore> Sheet<S> {
    pub(crate) fn new(
        name: &str,
        store: Arc<S>,
        registry: Arc<ConverterRegistry>,
        title_aliases: Arc<HashMap<String, String>>,
        raw_formulas: bool,
    ) -> Self {
        Self {
            name: name.to_owned(),
            store,
            registry,
            title_aliases,
            raw_formulas,
        }
    }

    /// The sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fetches formulas instead of computed values.
    pub fn raw_formulas(mut self, raw_formulas: bool) -> Self {
        self.raw_formulas = raw_formulas;
        self
    }

    /// The converters used by this sheet.
    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    /// Creates a mapper for a record type with this sheet's converters and
    /// title aliases. Loaders and savers can be added before passing it to
    /// [`Sheet::load_with`] or [`Sheet::save_with`].
    pub fn mapper<T: SheetRecord>(&self) -> RecordMapper<T> {
        RecordMapper::new(self.registry.clone()).with_title_aliases(self.title_aliases.clone())
    }

    /// Parses a range and scopes it to this sheet.
    pub fn address(&self, range: &str) -> Result<RangeAddress> {
        Ok(RangeAddress::parse(range)?.with_sheet(&self.name))
    }

    /// Loads the titles from the first row of a range. Titles are always
    /// fetched as computed values.
    pub async fn load_titles(&self, range: &str) -> Result<Vec<String>> {
        let address = self.address(range)?.first_row();
        let rows = self.fetch(&address, false).await?;
        Ok(rows.first().map(|row| titles_from_row(row)).unwrap_or_default())
    }

    /// Loads the records of a range whose first row holds the titles.
    pub async fn load<T: SheetRecord>(&self, range: &str) -> Result<SheetData<T>> {
        self.load_with(range, &self.mapper()).await
    }

    /// Loads the records of a range through a prepared mapper.
    pub async fn load_with<T: SheetRecord>(&self, range: &str, mapper: &RecordMapper<T>) -> Result<SheetData<T>> {
        let address = self.address(range)?;
        let rows = self.fetch(&address, self.raw_formulas).await?;
        let data = mapper.load_table(&rows);
        debug!(
            sheet = %self.name,
            range = %address,
            loaded = rows.len().saturating_sub(1),
            kept = data.instances.len(),
            "Loaded records"
        );
        Ok(data)
    }

    /// Loads the rows of a range as title-keyed value sets.
    pub async fn load_value_sets(&self, range: &str) -> Result<SheetData<ValueSet>> {
        let address = self.address(range)?;
        let rows = self.fetch(&address, self.raw_formulas).await?;
        Ok(value_sets_from_rows(&rows))
    }

    /// Writes a table, title row first, to a range.
    pub async fn save<T: SheetRecord>(&self, range: &str, data: &SheetData<T>) -> Result<()> {
        self.save_with(range, data, &self.mapper()).await
    }

    /// Writes a table through a prepared mapper.
    pub async fn save_with<T: SheetRecord>(
        &self,
        range: &str,
        data: &SheetData<T>,
        mapper: &RecordMapper<T>,
    ) -> Result<()> {
        let rows = mapper.save_table(data);
        self.write(range, rows).await
    }

    /// Appends records below the last row of a range, laid out by titles.
    pub async fn append<T: SheetRecord>(&self, range: &str, titles: &[String], records: &[T]) -> Result<()> {
        self.append_with(range, titles, records, &self.mapper()).await
    }

    /// Appends records through a prepared mapper.
    pub async fn append_with<T: SheetRecord>(
        &self,
        range: &str,
        titles: &[String],
        records: &[T],
        mapper: &RecordMapper<T>,
    ) -> Result<()> {
        let address = self.address(range)?;
        let rows = mapper.append_rows(titles, records);
        debug!(sheet = %self.name, range = %address, rows = rows.len(), "Appending block");
        self.store
            .append_block(&address.to_string(), rows)
            .await
            .with_context(|| format!("Failed to append to range '{}'", address))?;
        Ok(())
    }

    /// Writes raw rows to a range.
    pub async fn save_raw(&self, range: &str, rows: Rows) -> Result<()> {
        self.write(range, rows).await
    }

    /// Clears the contents of a range.
    pub async fn clear(&self, range: &str) -> Result<()> {
        let address = self.address(range)?;
        debug!(sheet = %self.name, range = %address, "Clearing block");
        self.store
            .clear_block(&address.to_string())
            .await
            .with_context(|| format!("Failed to clear range '{}'", address))?;
        Ok(())
    }

    async fn fetch(&self, address: &RangeAddress, raw_formulas: bool) -> Result<Rows> {
        let rows = self
            .store
            .fetch_block(&address.to_string(), raw_formulas)
            .await
            .with_context(|| format!("Failed to fetch range '{}'", address))?;
        debug!(
            sheet = %self.name,
            range = %address,
            raw_formulas,
            rows = rows.len(),
            "Fetched block"
        );
        Ok(rows)
    }

    async fn write(&self, range: &str, rows: Rows) -> Result<()> {
        let address = self.address(range)?;
        debug!(sheet = %self.name, range = %address, rows = rows.len(), "Writing block");
        self.store
            .write_block(&address.to_string(), rows)
            .await
            .with_context(|| format!("Failed to write range '{}'", address))?;
        Ok(())
    }
}
