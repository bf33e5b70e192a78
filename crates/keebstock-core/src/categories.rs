//! Per-category sheet layouts.
//!
//! Each shop category lives on its own sheet tab with its own column order,
//! so every category carries an A1-style range plus column indices relative
//! to the range's left edge. The four built-in layouts match the shop's
//! current spreadsheet; `KEEBSTOCK_CATEGORIES_PATH` can point at a YAML file
//! with the same shape to adjust ranges without a rebuild.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLayout {
    /// Category label stamped onto every record from this range.
    pub category: String,
    /// A1-notation range including the sheet tab, e.g. `"Switches!C8:H50"`.
    pub range: String,
    /// Column holding the product name, relative to the range's left edge.
    pub name_col: usize,
    pub stock_col: usize,
    pub price_col: usize,
    #[serde(default)]
    pub status_col: Option<usize>,
    #[serde(default)]
    pub profile_col: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CategoriesFile {
    pub categories: Vec<CategoryLayout>,
}

/// The shop's four category tabs as currently laid out.
#[must_use]
pub fn default_layouts() -> Vec<CategoryLayout> {
    vec![
        CategoryLayout {
            category: "Switches".to_string(),
            range: "Switches!C8:H50".to_string(),
            name_col: 0,
            stock_col: 3,
            price_col: 4,
            status_col: Some(5),
            profile_col: None,
        },
        CategoryLayout {
            category: "Keycaps".to_string(),
            range: "Keycaps!B5:G80".to_string(),
            name_col: 0,
            stock_col: 3,
            price_col: 4,
            status_col: None,
            profile_col: Some(1),
        },
        CategoryLayout {
            category: "Stabilizers".to_string(),
            range: "Stabilizers!A2:D40".to_string(),
            name_col: 0,
            stock_col: 1,
            price_col: 2,
            status_col: Some(3),
            profile_col: None,
        },
        CategoryLayout {
            category: "Deskmats".to_string(),
            range: "Deskmats!A3:E45".to_string(),
            name_col: 0,
            stock_col: 2,
            price_col: 3,
            status_col: None,
            profile_col: None,
        },
    ]
}

/// Load and validate category layouts from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_categories(path: &Path) -> Result<CategoriesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CategoriesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CategoriesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CategoriesFileParse)?;

    validate_categories(&file.categories)?;

    Ok(file)
}

fn validate_categories(categories: &[CategoryLayout]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::Validation(
            "at least one category layout is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for layout in categories {
        if layout.category.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category label must be non-empty".to_string(),
            ));
        }
        if !seen.insert(layout.category.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category: '{}'",
                layout.category
            )));
        }

        let width = range_width(&layout.range).ok_or_else(|| {
            ConfigError::Validation(format!(
                "category '{}' has malformed range '{}'; expected Sheet!A1:B2 notation",
                layout.category, layout.range
            ))
        })?;

        let mut columns = vec![layout.name_col, layout.stock_col, layout.price_col];
        columns.extend(layout.status_col);
        columns.extend(layout.profile_col);

        let mut distinct = HashSet::new();
        for col in &columns {
            if !distinct.insert(*col) {
                return Err(ConfigError::Validation(format!(
                    "category '{}' maps column {} twice",
                    layout.category, col
                )));
            }
            if *col >= width {
                return Err(ConfigError::Validation(format!(
                    "category '{}' maps column {} outside its {}-column range '{}'",
                    layout.category, col, width, layout.range
                )));
            }
        }
    }

    Ok(())
}

/// Number of columns an A1 range spans, or `None` if the range is malformed.
fn range_width(range: &str) -> Option<usize> {
    let (sheet, cells) = range.split_once('!')?;
    if sheet.trim().is_empty() {
        return None;
    }
    let (start, end) = cells.split_once(':')?;
    let start_col = column_index(start)?;
    let end_col = column_index(end)?;
    end_col.checked_sub(start_col).map(|w| w + 1)
}

/// Zero-based column index from a cell reference's letter prefix
/// (`"C8"` → 2, `"AA3"` → 26). Letter runs too long to index are
/// treated as malformed.
fn column_index(cell: &str) -> Option<usize> {
    let mut index = 0usize;
    let mut seen_letter = false;
    for c in cell.chars() {
        if c.is_ascii_alphabetic() {
            seen_letter = true;
            let letter = usize::from(c.to_ascii_uppercase() as u8 - b'A') + 1;
            index = index.checked_mul(26)?.checked_add(letter)?;
        } else {
            break;
        }
    }
    if seen_letter {
        Some(index - 1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_layout(category: &str, range: &str) -> CategoryLayout {
        CategoryLayout {
            category: category.to_string(),
            range: range.to_string(),
            name_col: 0,
            stock_col: 1,
            price_col: 2,
            status_col: None,
            profile_col: None,
        }
    }

    #[test]
    fn column_index_single_and_double_letters() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("C8"), Some(2));
        assert_eq!(column_index("H50"), Some(7));
        assert_eq!(column_index("AA3"), Some(26));
        assert_eq!(column_index("8"), None);
        assert_eq!(column_index(&"Z".repeat(40)), None);
    }

    #[test]
    fn range_width_for_typical_ranges() {
        assert_eq!(range_width("Switches!C8:H50"), Some(6));
        assert_eq!(range_width("Stabilizers!A2:D40"), Some(4));
        assert_eq!(range_width("Sheet!A:D"), Some(4));
        assert_eq!(range_width("no-separator"), None);
        assert_eq!(range_width("!A1:B2"), None);
        assert_eq!(range_width("Sheet!A1"), None);
    }

    #[test]
    fn default_layouts_pass_validation() {
        let layouts = default_layouts();
        assert_eq!(layouts.len(), 4);
        assert!(validate_categories(&layouts).is_ok());
    }

    #[test]
    fn validate_rejects_empty_list() {
        let err = validate_categories(&[]).unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[test]
    fn validate_rejects_duplicate_category() {
        let layouts = vec![
            make_layout("Switches", "Switches!A1:D10"),
            make_layout("switches", "Extra!A1:D10"),
        ];
        let err = validate_categories(&layouts).unwrap_err();
        assert!(err.to_string().contains("duplicate category"));
    }

    #[test]
    fn validate_rejects_malformed_range() {
        let layouts = vec![make_layout("Switches", "SwitchesC8H50")];
        let err = validate_categories(&layouts).unwrap_err();
        assert!(err.to_string().contains("malformed range"));
    }

    #[test]
    fn validate_rejects_overlong_column_letters() {
        let range = format!("Sheet!A1:{}10", "Z".repeat(40));
        let layouts = vec![make_layout("Switches", &range)];
        let err = validate_categories(&layouts).unwrap_err();
        assert!(err.to_string().contains("malformed range"));
    }

    #[test]
    fn validate_rejects_column_collision() {
        let mut layout = make_layout("Switches", "Switches!A1:D10");
        layout.status_col = Some(1);
        let err = validate_categories(&[layout]).unwrap_err();
        assert!(err.to_string().contains("maps column 1 twice"));
    }

    #[test]
    fn validate_rejects_column_outside_range() {
        let mut layout = make_layout("Switches", "Switches!A1:C10");
        layout.price_col = 3;
        let err = validate_categories(&[layout]).unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn load_categories_from_real_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("categories.yaml");
        assert!(
            path.exists(),
            "categories.yaml missing at {path:?} — required for this test"
        );
        let result = load_categories(&path);
        assert!(result.is_ok(), "failed to load categories.yaml: {result:?}");
        // The checked-in file mirrors the built-in table.
        assert_eq!(result.unwrap().categories, default_layouts());
    }
}
