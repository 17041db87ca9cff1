//! # Document Module
//!
//! Binds a cell store and a converter registry to the named sheets of one
//! spreadsheet document, exposing table level load and save operations.
use crate::config::SheetsConfig;
use crate::convert::Converter;
use crate::convert::ConverterRegistry;
use crate::convert::FieldKind;
use crate::error::SheetMapperError;
use crate::store::CellStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

mod sheet;

pub use sheet::Sheet;

/// A spreadsheet document reached through a cell store.
pub struct Document<S> {
    store: Arc<S>,
    registry: Arc<ConverterRegistry>,
    title_aliases: Arc<HashMap<String, String>>,
    raw_formulas: bool,
}

impl<S: CellStore> Document<S> {
    /// Creates a document with the builtin converters in UTC.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            registry: Arc::new(ConverterRegistry::new()),
            title_aliases: Arc::new(HashMap::new()),
            raw_formulas: false,
        }
    }

    /// Creates a document from configuration.
    pub fn with_config(store: Arc<S>, config: &SheetsConfig) -> Result<Self, SheetMapperError> {
        let registry = config.converter_registry()?;
        debug!(
            application = %config.application_name,
            time_zone = %registry.time_zone(),
            raw_formulas = config.raw_formulas,
            "Opened document"
        );
        Ok(Self {
            store,
            registry: Arc::new(registry),
            title_aliases: Arc::new(config.title_aliases.clone()),
            raw_formulas: config.raw_formulas,
        })
    }

    /// The document's base converters.
    pub fn registry(&self) -> &Arc<ConverterRegistry> {
        &self.registry
    }

    /// Returns a handle to a named sheet using the base converters.
    pub fn sheet(&self, name: &str) -> Sheet<S> {
        Sheet::new(
            name,
            self.store.clone(),
            self.registry.clone(),
            self.title_aliases.clone(),
            self.raw_formulas,
        )
    }

    /// Returns a handle to a named sheet with extra converters layered over
    /// the base ones. The base registry is left unchanged.
    pub fn sheet_with_converters<I>(&self, name: &str, converters: I) -> Sheet<S>
    where
        I: IntoIterator<Item = (FieldKind, Converter)>,
    {
        let registry = self.registry.with_overrides(converters);
        Sheet::new(
            name,
            self.store.clone(),
            Arc::new(registry),
            self.title_aliases.clone(),
            self.raw_formulas,
        )
    }
}
