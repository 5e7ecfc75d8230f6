//! Fixed-width field access for 28-character state records
//!
//! Layout: `[0..3]` state number, `[3]` type discriminator and eight
//! three-character entries at `[4..28]`. Entries are addressed by their
//! NDC table index: 1 is the type, 2..=9 are the data entries.

/// Length of a complete state record
pub const RECORD_LEN: usize = 28;

/// Width of the number field and of every data entry
pub const FIELD_WIDTH: usize = 3;

/// Index of the first data entry
pub const FIRST_ENTRY: usize = 2;

/// Index of the last data entry
pub const LAST_ENTRY: usize = 9;

/// Get a table entry from a record.
///
/// Index 1 yields the type character, 2..=9 a three-character entry.
/// Any other index yields `None`. Offsets are counted in characters and
/// clamped to the record, so a short record gives short (possibly empty)
/// entries rather than failing.
pub fn extract_field(record: &str, index: usize) -> Option<&str> {
    match index {
        1 => Some(char_slice(record, 3, 4)),
        FIRST_ENTRY..=LAST_ENTRY => {
            let start = 1 + FIELD_WIDTH * (index - 1);
            Some(char_slice(record, start, start + FIELD_WIDTH))
        }
        _ => None,
    }
}

/// The state number part of a record
pub fn extract_number(record: &str) -> &str {
    char_slice(record, 0, FIELD_WIDTH)
}

fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let byte_at = |pos: usize| {
        s.char_indices()
            .nth(pos)
            .map(|(idx, _)| idx)
            .unwrap_or(s.len())
    };
    let from = byte_at(start);
    let to = byte_at(end).max(from);
    &s[from..to]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LETTERS: &str = "000ABCDEFGHIJKLMNOPQRSTUVWXY";

    #[test]
    fn test_type_entry() {
        assert_eq!(extract_field(LETTERS, 1), Some("A"));
    }

    #[test]
    fn test_data_entries() {
        let expected = ["BCD", "EFG", "HIJ", "KLM", "NOP", "QRS", "TUV", "WXY"];
        for (offset, value) in expected.iter().enumerate() {
            assert_eq!(extract_field(LETTERS, offset + 2), Some(*value));
        }
    }

    #[test]
    fn test_out_of_range_entries() {
        assert_eq!(extract_field(LETTERS, 0), None);
        assert_eq!(extract_field(LETTERS, 10), None);
    }

    #[test]
    fn test_short_record() {
        assert_eq!(extract_field("000A87", 2), Some("87"));
        assert_eq!(extract_field("000A87", 3), Some(""));
        assert_eq!(extract_field("", 1), Some(""));
        assert_eq!(extract_number("01"), "01");
    }

    #[test]
    fn test_multibyte_record_does_not_split_chars() {
        assert_eq!(extract_field("000é123", 1), Some("é"));
        assert_eq!(extract_field("000é123", 2), Some("123"));
    }

    proptest! {
        #[test]
        fn extract_field_is_total(record in ".{0,40}", index in 0usize..20) {
            let entry = extract_field(&record, index);
            match index {
                1 => prop_assert!(entry.is_some_and(|e| e.chars().count() <= 1)),
                2..=9 => prop_assert!(entry.is_some_and(|e| e.chars().count() <= 3)),
                _ => prop_assert!(entry.is_none()),
            }
        }

        #[test]
        fn full_records_give_full_entries(record in "[0-9]{3}[A-Za-z][0-9A-Z]{24}") {
            prop_assert_eq!(extract_field(&record, 1).map(str::len), Some(1));
            for index in FIRST_ENTRY..=LAST_ENTRY {
                let start = 1 + 3 * (index - 1);
                prop_assert_eq!(extract_field(&record, index), Some(&record[start..start + 3]));
            }
        }
    }
}
