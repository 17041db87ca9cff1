//! # Range Notation Module
//!
//! Parser and formatter for spreadsheet range references of the form
//! `[Sheet!]Start[:End]`, where each bound is `{column letters}{row number}`
//! with either half optional.
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

mod bound;

pub use bound::Bound;

/// Errors related to range notation parsing.
#[derive(Error, Debug, PartialEq)]
pub enum RangeError {
    /// The range string has no usable start bound
    #[error("Invalid range format '{0}'")]
    FormatError(String),

    /// A range was built from a start bound with neither column nor row
    #[error("Range start must have a column or a row")]
    EmptyStart,

    /// The row part of a bound is not a 16-bit row number
    #[error("Invalid row number in bound '{0}'")]
    InvalidRow(String),

    /// The column part of a bound contains non-letter characters
    #[error("Invalid column letters in bound '{0}'")]
    InvalidColumn(String),
}

/// A parsed range reference, optionally scoped to a named sheet.
///
/// The start bound is never empty and an empty end bound is stored as no end
/// bound, so every value formats to a string that parses back to it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RangeAddress {
    sheet: Option<String>,
    start: Bound,
    end: Option<Bound>,
}

impl RangeAddress {
    /// Creates a range from its parts. Fails for an empty start bound; an
    /// empty end bound is dropped.
    pub fn new(start: Bound, end: Option<Bound>, sheet: Option<&str>) -> Result<Self, RangeError> {
        if start.is_empty() {
            return Err(RangeError::EmptyStart);
        }
        Ok(Self::from_parts(start, end, sheet.map(str::to_owned)))
    }

    fn from_parts(start: Bound, end: Option<Bound>, sheet: Option<String>) -> Self {
        Self {
            sheet,
            start,
            end: end.filter(|end| !end.is_empty()),
        }
    }

    /// Sheet name prefix, None for a reference relative to the current sheet.
    pub fn sheet(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    /// Start of the interval.
    pub fn start(&self) -> &Bound {
        &self.start
    }

    /// End of the interval, None for an open span starting at `start`.
    pub fn end(&self) -> Option<&Bound> {
        self.end.as_ref()
    }

    /// Parses a range string.
    ///
    /// The sheet name is split off at the last `!`, the interval at the last `:`.
    /// A malformed start bound fails the whole parse; a malformed end bound is
    /// dropped and the result is an open span.
    pub fn parse(value: &str) -> Result<Self, RangeError> {
        let (sheet, interval) = match value.rfind('!') {
            Some(index) => (Some(&value[..index]), &value[(index + 1)..]),
            None => (None, value),
        };

        let (start, end) = match interval.rfind(':') {
            Some(index) => (
                &interval[..index],
                Bound::parse(&interval[(index + 1)..]).ok(),
            ),
            None => (interval, None),
        };

        let start = Bound::parse(start).map_err(|_| RangeError::FormatError(value.to_owned()))?;
        if start.is_empty() {
            return Err(RangeError::FormatError(value.to_owned()));
        }

        Ok(Self::from_parts(start, end, sheet.map(str::to_owned)))
    }

    /// Returns the same interval scoped to another sheet.
    pub fn with_sheet(&self, sheet: &str) -> Self {
        Self::from_parts(self.start.clone(), self.end.clone(), Some(sheet.to_owned()))
    }

    /// Returns the same interval without a sheet prefix.
    pub fn without_sheet(&self) -> Self {
        Self::from_parts(self.start.clone(), self.end.clone(), None)
    }

    /// Collapses the range to its first row, keeping the column span.
    /// Ranges without an end bound are returned unchanged, and an end bound
    /// left with neither column nor row is dropped.
    pub fn first_row(&self) -> Self {
        match &self.end {
            Some(end) => Self::from_parts(
                self.start.clone(),
                Some(end.with_row(self.start.row())),
                self.sheet.clone(),
            ),
            None => self.clone(),
        }
    }
}

impl TryFrom<&str> for RangeAddress {
    type Error = RangeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl FromStr for RangeAddress {
    type Err = RangeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Display for RangeAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(sheet) = &self.sheet {
            write!(f, "{}!", sheet)?;
        }
        write!(f, "{}", self.start)?;
        if let Some(end) = &self.end {
            write!(f, ":{}", end)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_with_sheet() {
        let range = RangeAddress::parse("Sheet1!A1:D5").unwrap();
        assert_eq!(range.sheet(), Some("Sheet1"));
        assert_eq!(range.start(), &Bound::cell("A", 1));
        assert_eq!(range.end(), Some(&Bound::cell("D", 5)));
        assert_eq!(range.to_string(), "Sheet1!A1:D5");
    }

    #[test]
    fn range_open_end_row() {
        let range = RangeAddress::parse("A1:D").unwrap();
        assert_eq!(range.sheet(), None);
        assert_eq!(range.start(), &Bound::cell("A", 1));
        assert_eq!(range.end(), Some(&Bound::new(Some("D"), None)));
        assert_eq!(range.first_row().to_string(), "A1:D1");
    }

    #[test]
    fn range_whole_columns() {
        let range = RangeAddress::parse("B:D").unwrap();
        assert_eq!(range.start(), &Bound::new(Some("B"), None));
        assert_eq!(range.end(), Some(&Bound::new(Some("D"), None)));
        assert_eq!(range.to_string(), "B:D");
        assert_eq!(range.first_row().to_string(), "B:D");
    }

    #[test]
    fn range_whole_rows() {
        let range = RangeAddress::parse("2:10").unwrap();
        assert_eq!(range.start(), &Bound::new(None, Some(2)));
        assert_eq!(range.end(), Some(&Bound::new(None, Some(10))));
        assert_eq!(range.first_row().to_string(), "2:2");
    }

    #[test]
    fn range_without_end() {
        let range = RangeAddress::parse("C3").unwrap();
        assert_eq!(range.end(), None);
        assert_eq!(range.first_row(), range);
        assert_eq!(range.to_string(), "C3");
    }

    #[test]
    fn range_sheet_name_split_on_last_separator() {
        let range = RangeAddress::parse("Odd!Name!A1:B2").unwrap();
        assert_eq!(range.sheet(), Some("Odd!Name"));
        assert_eq!(range.to_string(), "Odd!Name!A1:B2");
    }

    #[test]
    fn range_malformed_end_is_dropped() {
        let range = RangeAddress::parse("A1:1X").unwrap();
        assert_eq!(range.start(), &Bound::cell("A", 1));
        assert_eq!(range.end(), None);

        let range = RangeAddress::parse("Data!A1:").unwrap();
        assert_eq!(range.end(), None);
        assert_eq!(range.to_string(), "Data!A1");
    }

    #[test]
    fn range_malformed_start_fails() {
        assert_eq!(
            RangeAddress::parse("A1B:D5"),
            Err(RangeError::FormatError("A1B:D5".to_owned()))
        );
        assert!(RangeAddress::parse("").is_err());
        assert!(RangeAddress::parse(":D5").is_err());
        assert!(RangeAddress::parse("Sheet1!").is_err());
        assert!("$A$1".parse::<RangeAddress>().is_err());
    }

    #[test]
    fn range_round_trip() {
        for value in [
            "A1",
            "A1:D5",
            "a1:d5",
            "Sheet1!A1:D",
            "Sheet1!B",
            "A:Z",
            "3:3",
            "Report 2024!AA10:AB",
        ] {
            let range = RangeAddress::parse(value).unwrap();
            assert_eq!(range.to_string(), value);
            assert_eq!(RangeAddress::parse(&range.to_string()).unwrap(), range);
        }
    }

    #[test]
    fn range_first_row_idempotent() {
        for value in ["A1:D", "Sheet1!B2:C9", "A:D", "C3"] {
            let once = RangeAddress::parse(value).unwrap().first_row();
            assert_eq!(once.first_row(), once);
        }
    }

    #[test]
    fn range_first_row_without_end_column() {
        let range = RangeAddress::parse("A:5").unwrap().first_row();
        assert_eq!(range.end(), None);
        assert_eq!(range.to_string(), "A");
        assert_eq!(RangeAddress::parse(&range.to_string()).unwrap(), range);

        let range = RangeAddress::parse("Data!C:7").unwrap().first_row();
        assert_eq!(range.to_string(), "Data!C");
        assert_eq!(range.first_row(), range);
    }

    #[test]
    fn range_new_checks_bounds() {
        assert_eq!(
            RangeAddress::new(Bound::default(), None, None),
            Err(RangeError::EmptyStart)
        );

        let range = RangeAddress::new(Bound::cell("B", 2), Some(Bound::default()), Some("S")).unwrap();
        assert_eq!(range.end(), None);
        assert_eq!(range.to_string(), "S!B2");
        assert_eq!(RangeAddress::parse(&range.to_string()).unwrap(), range);

        let range = RangeAddress::new(Bound::cell("A", 1), Some(Bound::new(Some("C"), None)), None).unwrap();
        assert_eq!(RangeAddress::parse(&range.to_string()).unwrap(), range);
    }

    #[test]
    fn range_with_sheet_replaces_prefix() {
        let range = RangeAddress::parse("Old!A1:B").unwrap().with_sheet("New");
        assert_eq!(range.to_string(), "New!A1:B");
        assert_eq!(range.without_sheet().to_string(), "A1:B");
    }
}
