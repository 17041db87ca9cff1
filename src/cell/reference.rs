//! Conversions from column letters and row numbers to 0-based grid indexes.

/// Converts column letters (case-insensitive) to a 0-based column index.
/// Returns None for empty input or non-letter characters.
pub fn col_to_index(column: &str) -> Option<usize> {
    if column.is_empty() {
        return None;
    }
    let mut index: usize = 0;
    for char in column.chars() {
        if !char.is_ascii_alphabetic() {
            return None;
        }
        let digit = (char.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    Some(index - 1)
}

/// Converts a 1-based row number to a 0-based row index.
/// Row 0 is clamped to the first row.
pub fn row_to_index(row: u16) -> usize {
    (row as usize).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_index("A"), Some(0));
        assert_eq!(col_to_index("z"), Some(25));
        assert_eq!(col_to_index("AA"), Some(26));
        assert_eq!(col_to_index("AZ"), Some(51));
        assert_eq!(col_to_index("XFD"), Some(16_383));
        assert_eq!(col_to_index(""), None);
        assert_eq!(col_to_index("A1"), None);
    }

    #[test]
    fn column_letters_overflow() {
        assert_eq!(col_to_index("ZZ"), Some(701));
        assert_eq!(col_to_index("AAA"), Some(702));
        assert_eq!(col_to_index(&"Z".repeat(40)), None);
    }

    #[test]
    fn row_numbers() {
        assert_eq!(row_to_index(1), 0);
        assert_eq!(row_to_index(10), 9);
        assert_eq!(row_to_index(0), 0);
    }
}
