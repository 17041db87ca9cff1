use thiserror::Error;

/// Main error type of the sheet mapper.
/// Aggregates errors from the range parser, configuration and the cell store.
#[derive(Error, Debug)]
pub enum SheetMapperError {
    #[error("{0}")]
    Range(#[from] crate::range::RangeError),

    #[error("{0}")]
    Config(#[from] crate::config::ConfigError),

    // Cell store failures, with the range as context
    #[error("{0:#}")]
    Store(#[from] anyhow::Error),
}
