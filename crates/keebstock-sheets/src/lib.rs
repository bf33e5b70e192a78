//! Client for the spreadsheet that is the shop's live inventory system.
//!
//! The sheet is read through the Google Sheets values API, one A1 range per
//! category tab, and each row is normalized into a
//! [`keebstock_core::InventoryRecord`] with typed stock and price fields.

pub mod client;
pub mod error;
pub mod normalize;
pub mod retry;
pub mod types;

pub use client::SheetsClient;
pub use error::SheetsError;
pub use normalize::rows_to_records;
pub use types::ValueRange;
