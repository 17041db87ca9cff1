//! # Configuration Module
//!
//! Settings shared by every sheet of a document, loaded from JSON.
use crate::convert::ConverterRegistry;
use chrono::FixedOffset;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors related to loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid time zone '{0}', expected 'UTC' or an offset like '+03:00'")]
    InvalidTimeZone(String),
}

/// Document level settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SheetsConfig {
    /// Name reported in log events
    pub application_name: String,
    /// Time zone of zoned date/time fields: `UTC`, `Z` or `±HH:MM`
    pub time_zone: String,
    /// Fetch formulas instead of computed values by default
    pub raw_formulas: bool,
    /// Member name to column title aliases
    pub title_aliases: HashMap<String, String>,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            application_name: env!("CARGO_PKG_NAME").to_owned(),
            time_zone: "UTC".to_owned(),
            raw_formulas: false,
            title_aliases: HashMap::new(),
        }
    }
}

impl SheetsConfig {
    /// Parses a JSON configuration; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.time_zone_offset()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Returns the configured time zone as a UTC offset.
    pub fn time_zone_offset(&self) -> Result<FixedOffset, ConfigError> {
        let time_zone = self.time_zone.trim();
        if time_zone.is_empty() || time_zone.eq_ignore_ascii_case("UTC") || time_zone.eq_ignore_ascii_case("Z") {
            return FixedOffset::east_opt(0).ok_or_else(|| ConfigError::InvalidTimeZone(self.time_zone.clone()));
        }

        let pattern = Regex::new(r"^([+-])(\d{2}):?(\d{2})$").expect("Hardcode regex pattern");
        let invalid = || ConfigError::InvalidTimeZone(self.time_zone.clone());
        let captures = pattern.captures(time_zone).ok_or_else(invalid)?;
        let hours: i32 = captures[2].parse().map_err(|_| invalid())?;
        let minutes: i32 = captures[3].parse().map_err(|_| invalid())?;
        if hours > 14 || minutes > 59 {
            return Err(invalid());
        }
        let seconds = (hours * 3600 + minutes * 60) * if &captures[1] == "-" { -1 } else { 1 };
        FixedOffset::east_opt(seconds).ok_or_else(invalid)
    }

    /// Builds the converter registry for the configured time zone.
    pub fn converter_registry(&self) -> Result<ConverterRegistry, ConfigError> {
        Ok(ConverterRegistry::builder()
            .time_zone(self.time_zone_offset()?)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = SheetsConfig::from_json("{}").unwrap();
        assert_eq!(config, SheetsConfig::default());
        assert_eq!(config.time_zone_offset().unwrap(), FixedOffset::east_opt(0).unwrap());
        assert!(!config.raw_formulas);
    }

    #[test]
    fn config_from_json() {
        let config = SheetsConfig::from_json(
            r#"{
                "application_name": "timesheets",
                "time_zone": "+03:00",
                "raw_formulas": true,
                "title_aliases": { "name": "Full name" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.application_name, "timesheets");
        assert!(config.raw_formulas);
        assert_eq!(config.title_aliases["name"], "Full name");
        assert_eq!(config.converter_registry().unwrap().time_zone(), FixedOffset::east_opt(3 * 3600).unwrap());
    }

    #[test]
    fn time_zone_offsets() {
        let offset = |time_zone: &str| {
            SheetsConfig {
                time_zone: time_zone.to_owned(),
                ..SheetsConfig::default()
            }
            .time_zone_offset()
        };
        assert_eq!(offset("Z").unwrap(), FixedOffset::east_opt(0).unwrap());
        assert_eq!(offset("utc").unwrap(), FixedOffset::east_opt(0).unwrap());
        assert_eq!(offset("-0530").unwrap(), FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap());
        assert!(matches!(offset("Europe/Moscow"), Err(ConfigError::InvalidTimeZone(_))));
        assert!(matches!(offset("+25:00"), Err(ConfigError::InvalidTimeZone(_))));
    }

    #[test]
    fn config_errors() {
        assert!(matches!(SheetsConfig::from_json("[1, 2]"), Err(ConfigError::Json(_))));
        assert!(matches!(
            SheetsConfig::from_json(r#"{"time_zone": "somewhere"}"#),
            Err(ConfigError::InvalidTimeZone(_))
        ));
        assert!(matches!(SheetsConfig::from_path("/nonexistent/sheets.json"), Err(ConfigError::Io(_))));
    }
}
