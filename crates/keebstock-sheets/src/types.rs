//! Values API response types.

use serde::Deserialize;

/// A block of cell values for one A1 range, as returned by
/// `GET /v4/spreadsheets/{id}/values/{range}`.
///
/// `values` is row-major and ragged: trailing empty cells are omitted from
/// each row, and the field itself is omitted entirely when the range holds no
/// data. Cells arrive as formatted strings, so `"₱1,250.50"` and `"45pcs"`
/// are literal cell text to be parsed downstream.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub major_dimension: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_field_deserializes_to_empty() {
        let parsed: ValueRange =
            serde_json::from_str(r#"{"range":"Switches!C8:H50","majorDimension":"ROWS"}"#)
                .expect("should deserialize without values");
        assert_eq!(parsed.range, "Switches!C8:H50");
        assert!(parsed.values.is_empty());
    }

    #[test]
    fn ragged_rows_survive_deserialization() {
        let parsed: ValueRange = serde_json::from_str(
            r#"{"range":"Switches!C8:H50","majorDimension":"ROWS","values":[["Blue Switch Set","","","45pcs"],["Red Switch Set"]]}"#,
        )
        .expect("should deserialize ragged rows");
        assert_eq!(parsed.values.len(), 2);
        assert_eq!(parsed.values[0].len(), 4);
        assert_eq!(parsed.values[1].len(), 1);
    }
}
