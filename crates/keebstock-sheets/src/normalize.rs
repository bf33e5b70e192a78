//! Row normalization: raw cell text into typed [`InventoryRecord`]s.
//!
//! The sheet is hand-maintained by shop staff, so cells carry whatever was
//! typed in: `"45pcs"`, `"OOS"`, `"₱1,250.50"`, stray header rows, rows that
//! only hold an order-form link. Parsing here is deliberately forgiving and
//! never fails a whole range over one bad cell.

use keebstock_core::{CategoryLayout, InventoryRecord, StockLevel};

/// Converts the raw rows of one category range into inventory records.
///
/// Rows are dropped when their name cell is blank, is the `"Name"` header
/// repeated mid-sheet, or contains `"link"` (order-form rows). Everything
/// else becomes a record; unparseable stock and price cells default to zero
/// rather than poisoning the row.
#[must_use]
pub fn rows_to_records(layout: &CategoryLayout, rows: &[Vec<String>]) -> Vec<InventoryRecord> {
    rows.iter()
        .filter_map(|row| row_to_record(layout, row))
        .collect()
}

fn row_to_record(layout: &CategoryLayout, row: &[String]) -> Option<InventoryRecord> {
    let name = cell(row, layout.name_col).trim();
    if is_noise_row(name) {
        return None;
    }

    Some(InventoryRecord {
        name: name.to_owned(),
        stock: parse_stock(cell(row, layout.stock_col)),
        price: parse_price(cell(row, layout.price_col)),
        category: layout.category.clone(),
        status: layout.status_col.and_then(|i| non_empty(cell(row, i))),
        profile: layout.profile_col.and_then(|i| non_empty(cell(row, i))),
    })
}

/// Ragged-row safe cell access: out-of-range indices read as empty cells.
fn cell(row: &[String], index: usize) -> &str {
    row.get(index).map_or("", String::as_str)
}

/// `true` for rows that are sheet furniture rather than products: blank
/// names, repeated `"Name"` header rows, and order-form link rows.
fn is_noise_row(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    let lower = name.to_lowercase();
    lower == "name" || lower.contains("link")
}

/// Parses a stock cell into a [`StockLevel`].
///
/// `"oos"` in any casing marks the item out of stock. Cells containing
/// `"pcs"` have their digits extracted (`"120pcs"` is 120). Anything else is
/// parsed as a plain integer, defaulting to zero.
fn parse_stock(raw: &str) -> StockLevel {
    let trimmed = raw.trim();
    let lower = trimmed.to_lowercase();

    if lower == "oos" {
        return StockLevel::OutOfStock;
    }
    if lower.contains("pcs") {
        let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
        return StockLevel::Count(digits.parse().unwrap_or(0));
    }
    StockLevel::Count(trimmed.parse().unwrap_or(0))
}

/// Parses a price cell into pesos, dropping currency symbols and thousands
/// separators. `"₱1,250.50"` is 1250.50; unparseable cells are 0.0.
fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switches_layout() -> CategoryLayout {
        CategoryLayout {
            category: "Switches".to_string(),
            range: "Switches!C8:H50".to_string(),
            name_col: 0,
            stock_col: 3,
            price_col: 4,
            status_col: Some(5),
            profile_col: None,
        }
    }

    fn keycaps_layout() -> CategoryLayout {
        CategoryLayout {
            category: "Keycaps".to_string(),
            range: "Keycaps!B5:G80".to_string(),
            name_col: 0,
            stock_col: 3,
            price_col: 4,
            status_col: None,
            profile_col: Some(1),
        }
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    // -----------------------------------------------------------------------
    // parse_stock
    // -----------------------------------------------------------------------

    #[test]
    fn stock_plain_integer_parses() {
        assert_eq!(parse_stock("45"), StockLevel::Count(45));
        assert_eq!(parse_stock(" 45 "), StockLevel::Count(45));
    }

    #[test]
    fn stock_pcs_suffix_extracts_digits() {
        assert_eq!(parse_stock("120pcs"), StockLevel::Count(120));
        assert_eq!(parse_stock("45 pcs"), StockLevel::Count(45));
        assert_eq!(parse_stock("88 PCS"), StockLevel::Count(88));
    }

    #[test]
    fn stock_pcs_without_digits_defaults_to_zero() {
        assert_eq!(parse_stock("pcs"), StockLevel::Count(0));
    }

    #[test]
    fn stock_oos_any_casing_is_out_of_stock() {
        assert_eq!(parse_stock("oos"), StockLevel::OutOfStock);
        assert_eq!(parse_stock("OOS"), StockLevel::OutOfStock);
        assert_eq!(parse_stock(" Oos "), StockLevel::OutOfStock);
    }

    #[test]
    fn stock_garbage_defaults_to_zero() {
        assert_eq!(parse_stock(""), StockLevel::Count(0));
        assert_eq!(parse_stock("n/a"), StockLevel::Count(0));
        assert_eq!(parse_stock("soon"), StockLevel::Count(0));
    }

    // -----------------------------------------------------------------------
    // parse_price
    // -----------------------------------------------------------------------

    #[test]
    fn price_with_peso_sign_and_separators_parses() {
        assert!((parse_price("₱1,250.50") - 1250.50).abs() < f64::EPSILON);
        assert!((parse_price("₱12.00") - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_plain_number_parses() {
        assert!((parse_price("350") - 350.0).abs() < f64::EPSILON);
    }

    #[test]
    fn price_unparseable_defaults_to_zero() {
        assert!((parse_price("") - 0.0).abs() < f64::EPSILON);
        assert!((parse_price("TBD") - 0.0).abs() < f64::EPSILON);
        // Two decimal points survive the character filter but fail the parse.
        assert!((parse_price("1.2.3") - 0.0).abs() < f64::EPSILON);
    }

    // -----------------------------------------------------------------------
    // row filtering
    // -----------------------------------------------------------------------

    #[test]
    fn header_rows_are_dropped() {
        let layout = switches_layout();
        let rows = vec![
            row(&["Name", "", "", "Stock", "Price", "Status"]),
            row(&["Blue Switch Set", "", "", "45pcs", "₱12.00", "Restocked"]),
        ];
        let records = rows_to_records(&layout, &rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Blue Switch Set");
    }

    #[test]
    fn blank_and_link_rows_are_dropped() {
        let layout = switches_layout();
        let rows = vec![
            row(&[]),
            row(&["", "", "", "10", "₱5.00"]),
            row(&["Order form LINK here", "", "", "", ""]),
            row(&["Red Switch Set", "", "", "30", "₱10.00"]),
        ];
        let records = rows_to_records(&layout, &rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Red Switch Set");
    }

    // -----------------------------------------------------------------------
    // full row mapping
    // -----------------------------------------------------------------------

    #[test]
    fn row_maps_all_layout_columns() {
        let layout = switches_layout();
        let rows = vec![row(&[
            "Blue Switch Set",
            "ignored",
            "ignored",
            "45pcs",
            "₱12.00",
            "Restocked 2025-08",
        ])];
        let records = rows_to_records(&layout, &rows);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.name, "Blue Switch Set");
        assert_eq!(record.stock, StockLevel::Count(45));
        assert!((record.price - 12.0).abs() < f64::EPSILON);
        assert_eq!(record.category, "Switches");
        assert_eq!(record.status.as_deref(), Some("Restocked 2025-08"));
        assert!(record.profile.is_none(), "switches layout has no profile column");
    }

    #[test]
    fn profile_column_is_read_when_configured() {
        let layout = keycaps_layout();
        let rows = vec![row(&["GMK Clone Set", "Cherry", "", "OOS", "₱2,500.00"])];
        let records = rows_to_records(&layout, &rows);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.stock, StockLevel::OutOfStock);
        assert_eq!(record.profile.as_deref(), Some("Cherry"));
        assert!(record.status.is_none(), "keycaps layout has no status column");
    }

    #[test]
    fn ragged_rows_read_missing_cells_as_empty() {
        let layout = switches_layout();
        // Row ends right after the name cell.
        let rows = vec![row(&["Bare Switch Set"])];
        let records = rows_to_records(&layout, &rows);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.stock, StockLevel::Count(0));
        assert!((record.price - 0.0).abs() < f64::EPSILON);
        assert!(record.status.is_none());
    }

    #[test]
    fn name_is_trimmed_in_the_record() {
        let layout = switches_layout();
        let rows = vec![row(&["  Blue Switch Set  ", "", "", "45", "12"])];
        let records = rows_to_records(&layout, &rows);
        assert_eq!(records[0].name, "Blue Switch Set");
    }
}
