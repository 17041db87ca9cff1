use crate::range::RangeError;
use std::fmt::Display;

/// One end of a range: an optional column label and an optional 1-based row number.
///
/// The column label is kept exactly as written (no case folding, no arithmetic),
/// so a parsed bound always formats back to its source text.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bound {
    column: Option<String>,
    row: Option<u16>,
}

impl Bound {
    /// Creates a bound from a column label already known to be ASCII letters.
    pub(crate) fn new(column: Option<&str>, row: Option<u16>) -> Self {
        Self {
            column: column.filter(|column| !column.is_empty()).map(str::to_owned),
            row,
        }
    }

    #[cfg(test)]
    pub(crate) fn cell(column: &str, row: u16) -> Self {
        Self::new(Some(column), Some(row))
    }

    /// Column letters, None for a whole-row reference.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// Row number, None for a whole-column reference.
    pub fn row(&self) -> Option<u16> {
        self.row
    }

    /// Returns true if neither the column nor the row part is present.
    pub fn is_empty(&self) -> bool {
        self.column.is_none() && self.row.is_none()
    }

    /// Parses a bound token such as `A1`, `AB`, `12` or the empty string.
    ///
    /// Everything before the first ASCII digit is the column part, the rest is
    /// the row part. Fails if the row part is not a `u16` or the column part
    /// contains anything but ASCII letters.
    pub fn parse(value: &str) -> Result<Self, RangeError> {
        let (column, row) = match value.find(|c: char| c.is_ascii_digit()) {
            Some(index) => (&value[..index], Some(&value[index..])),
            None => (value, None),
        };

        let row = match row {
            Some(row) => Some(
                row.parse::<u16>()
                    .map_err(|_| RangeError::InvalidRow(value.to_owned()))?,
            ),
            None => None,
        };

        if !column.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RangeError::InvalidColumn(value.to_owned()));
        }

        Ok(Self::new(Some(column), row))
    }

    /// Returns a copy of this bound with the row replaced.
    pub fn with_row(&self, row: Option<u16>) -> Self {
        Self {
            column: self.column.clone(),
            row,
        }
    }
}

impl TryFrom<&str> for Bound {
    type Error = RangeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(column) = &self.column {
            write!(f, "{}", column)?;
        }
        if let Some(row) = self.row {
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_parse_cell() {
        let bound = Bound::parse("AB12").unwrap();
        assert_eq!(bound.column.as_deref(), Some("AB"));
        assert_eq!(bound.row, Some(12));
        assert_eq!(bound.to_string(), "AB12");
    }

    #[test]
    fn bound_parse_partial() {
        let column = Bound::parse("D").unwrap();
        assert_eq!(column.column.as_deref(), Some("D"));
        assert_eq!(column.row, None);

        let row = Bound::parse("7").unwrap();
        assert_eq!(row.column, None);
        assert_eq!(row.row, Some(7));

        let empty = Bound::parse("").unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn bound_keeps_column_case() {
        let bound = Bound::parse("aB3").unwrap();
        assert_eq!(bound.column.as_deref(), Some("aB"));
        assert_eq!(bound.to_string(), "aB3");
    }

    #[test]
    fn bound_parse_invalid() {
        assert!(matches!(Bound::parse("A1B"), Err(RangeError::InvalidRow(_))));
        assert!(matches!(Bound::parse("A70000"), Err(RangeError::InvalidRow(_))));
        assert!(matches!(Bound::parse("A-1"), Err(RangeError::InvalidColumn(_))));
        assert!(matches!(Bound::parse("$A"), Err(RangeError::InvalidColumn(_))));
    }
}
