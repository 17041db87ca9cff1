use crate::cell::CellValue;
use crate::convert::ConverterRegistry;
use crate::record::table::organize;
use crate::record::table::rows_from_value_sets;
use crate::record::table::titles_from_row;
use crate::record::Schema;
use crate::record::SheetData;
use crate::record::SheetRecord;
use crate::record::ValueSet;
use crate::store::Rows;
use std::collections::HashMap;
use std::sync::Arc;

/// Post-processing step of a loaded record; returning None drops the row.
pub type Loader<T> = Box<dyn Fn(&ValueSet, T) -> Option<T> + Send + Sync>;

/// Post-processing step adding cells to the value set of a saved record.
pub type Saver<T> = Box<dyn Fn(&T, &mut ValueSet) + Send + Sync>;

/// Converts between records of one type and title-keyed rows.
pub struct RecordMapper<T> {
    schema: Schema<T>,
    registry: Arc<ConverterRegistry>,
    title_aliases: Arc<HashMap<String, String>>,
    loaders: Vec<Loader<T>>,
    savers: Vec<Saver<T>>,
}

impl<T: SheetRecord> RecordMapper<T> {
    /// Creates a mapper over the record's schema.
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            schema: T::schema(),
            registry,
            title_aliases: Arc::new(HashMap::new()),
            loaders: Vec::new(),
            savers: Vec::new(),
        }
    }

    /// Sets the member name to column title aliases.
    pub fn with_title_aliases(mut self, title_aliases: Arc<HashMap<String, String>>) -> Self {
        self.title_aliases = title_aliases;
        self
    }

    /// Adds a loader run after the members of a record are assigned.
    pub fn with_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(&ValueSet, T) -> Option<T> + Send + Sync + 'static,
    {
        self.loaders.push(Box::new(loader));
        self
    }

    /// Adds a saver run after the members of a record are stored.
    pub fn with_saver<F>(mut self, saver: F) -> Self
    where
        F: Fn(&T, &mut ValueSet) + Send + Sync + 'static,
    {
        self.savers.push(Box::new(saver));
        self
    }

    /// The record schema.
    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Column titles of the mapped members in declaration order.
    pub fn titles(&self) -> Vec<String> {
        self.schema.titles(&self.title_aliases)
    }

    /// Builds one record from one value set.
    ///
    /// Returns None if a required member converts to null or to the empty
    /// string, or if a loader drops the record.
    pub fn load(&self, values: &ValueSet) -> Option<T> {
        let mut record = T::default();
        for field in self.schema.fields() {
            let raw = values
                .get(field.effective_title(&self.title_aliases))
                .unwrap_or(&CellValue::Null);
            let value = self.registry.convert(&field.kind(), raw);
            if field.is_required() {
                if value.is_null() {
                    return None;
                }
                if value.is_empty_text() {
                    return None;
                }
            }
            field.write(&mut record, value);
        }
        self.loaders
            .iter()
            .try_fold(record, |record, loader| loader(values, record))
    }

    /// Builds the value set of one record.
    pub fn save(&self, record: &T) -> ValueSet {
        let mut values = ValueSet::with_capacity(self.schema.fields().len());
        for field in self.schema.fields() {
            let value = field.read(record);
            let cell = match field.format() {
                Some(template) => CellValue::Text(template.render(&value)),
                None => value.to_cell(),
            };
            values.insert(field.effective_title(&self.title_aliases).to_owned(), cell);
        }
        for saver in &self.savers {
            saver(record, &mut values);
        }
        values
    }

    /// Loads fetched rows: the first row holds the titles, every other row is
    /// one record. Rows failing to load are left out.
    pub fn load_table(&self, rows: &Rows) -> SheetData<T> {
        let Some((header, data)) = rows.split_first() else {
            return SheetData::empty();
        };
        let titles = titles_from_row(header);
        let instances = data
            .iter()
            .filter_map(|row| self.load(&organize(&titles, row)))
            .collect();
        SheetData::new(instances, titles)
    }

    /// Lays a table out as rows led by its title row.
    pub fn save_table(&self, data: &SheetData<T>) -> Rows {
        let value_sets = self.value_sets(&data.instances);
        rows_from_value_sets(&data.titles, &value_sets, true)
    }

    /// Lays records out as rows under existing titles, without a title row.
    pub fn append_rows(&self, titles: &[String], records: &[T]) -> Rows {
        let value_sets = self.value_sets(records);
        rows_from_value_sets(titles, &value_sets, false)
    }

    fn value_sets(&self, records: &[T]) -> Vec<ValueSet> {
        records.iter().map(|record| self.save(record)).collect()
    }
}
