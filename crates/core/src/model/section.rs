//! Section naming rules.
//!
//! Sections are named `<prefix>_<index>[...]` (e.g. `section_16`), and every
//! cell identifier starts with the name of its owning section followed by `_`.

use crate::error::{HoodError, Result};

/// Delimiter between the section name and the rest of a cell identifier.
pub const SECTION_DELIMITER: char = '_';

/// Numeric index of a section, taken from the second `_`-separated field.
pub fn section_index(section: &str) -> Result<i64> {
    let field = section.split(SECTION_DELIMITER).nth(1).ok_or_else(|| {
        HoodError::DataIntegrity(format!("section {section:?} has no numeric index field"))
    })?;
    field.trim().parse::<i64>().map_err(|_| {
        HoodError::DataIntegrity(format!(
            "section {section:?} has a non-numeric index field {field:?}"
        ))
    })
}

/// Whether `cell_id` is owned by `section`.
///
/// Stricter than a bare string-prefix test: the section name must be
/// followed by the delimiter or end the identifier, so `section_1` does not
/// own `section_10_A1`. Both the 2D source selection and the section
/// restriction use this rule.
pub fn cell_in_section(cell_id: &str, section: &str) -> bool {
    match cell_id.strip_prefix(section) {
        Some(rest) => rest.is_empty() || rest.starts_with(SECTION_DELIMITER),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_from_second_field() {
        assert_eq!(section_index("section_16").unwrap(), 16);
        assert_eq!(section_index("section_4_rescan").unwrap(), 4);
    }

    #[test]
    fn index_missing_or_non_numeric() {
        assert!(matches!(
            section_index("section"),
            Err(HoodError::DataIntegrity(_))
        ));
        assert!(matches!(
            section_index("section_A"),
            Err(HoodError::DataIntegrity(_))
        ));
    }

    #[test]
    fn ownership_requires_delimiter() {
        assert!(cell_in_section("section_10_A1", "section_10"));
        assert!(!cell_in_section("section_10_A1", "section_1"));
        assert!(!cell_in_section("section_16_A1", "section_10"));
        assert!(cell_in_section("section_10", "section_10"));
    }
}
