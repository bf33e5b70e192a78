use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Sentinel string the shop staff type into a stock cell to mark a product
/// as sold out. Serialized verbatim so the UI can display it as-is.
pub const OUT_OF_STOCK_LABEL: &str = "Out of Stock";

/// Stock quantity for one inventory row: either a counted quantity or the
/// out-of-stock marker.
///
/// Serializes untagged: `Count(45)` becomes the JSON number `45` and
/// `OutOfStock` the string `"Out of Stock"`, matching what the storefront UI
/// expects in the `stock` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockLevel {
    /// Parsed integer quantity. Zero and negative counts are representable;
    /// both mean "not in stock" for availability purposes.
    Count(i64),
    /// The sheet's literal out-of-stock marker ("OOS" in the cell).
    OutOfStock,
}

impl StockLevel {
    /// Returns `true` only for a strictly positive counted quantity.
    #[must_use]
    pub fn is_positive(self) -> bool {
        matches!(self, StockLevel::Count(n) if n > 0)
    }
}

impl Default for StockLevel {
    fn default() -> Self {
        StockLevel::Count(0)
    }
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StockLevel::Count(n) => write!(f, "{n}"),
            StockLevel::OutOfStock => write!(f, "{OUT_OF_STOCK_LABEL}"),
        }
    }
}

impl Serialize for StockLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StockLevel::Count(n) => serializer.serialize_i64(*n),
            StockLevel::OutOfStock => serializer.serialize_str(OUT_OF_STOCK_LABEL),
        }
    }
}

impl<'de> Deserialize<'de> for StockLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Count(i64),
            Label(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Count(n) => Ok(StockLevel::Count(n)),
            Raw::Label(s) if s.eq_ignore_ascii_case(OUT_OF_STOCK_LABEL) => {
                Ok(StockLevel::OutOfStock)
            }
            Raw::Label(s) => Err(D::Error::custom(format!(
                "stock must be an integer or \"{OUT_OF_STOCK_LABEL}\", got \"{s}\""
            ))),
        }
    }
}

/// One normalized spreadsheet row of live stock data.
///
/// Produced fresh on every uncached read of the inventory adapter; rows have
/// no persistent identity across reads. Order and content can change between
/// polls, and `name` is free text, NOT a stable key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    pub name: String,
    pub stock: StockLevel,
    /// Unit price with currency symbols and thousands separators already
    /// stripped; `0.0` when the cell was absent or unparseable.
    pub price: f64,
    /// Category label of the sheet range this row came from.
    pub category: String,
    /// Free-text status column, when the category's layout has one.
    #[serde(default)]
    pub status: Option<String>,
    /// Keycap profile column, when the category's layout has one.
    #[serde(default)]
    pub profile: Option<String>,
}
