//! Shared domain types and configuration for the keebstock catalog service.

use thiserror::Error;

pub mod app_config;
pub mod catalog;
pub mod categories;
pub mod config;
pub mod inventory;
pub mod merge;

pub use app_config::{AppConfig, Environment};
pub use catalog::ContentProduct;
pub use categories::{default_layouts, load_categories, CategoryLayout};
pub use config::{load_app_config, load_app_config_from_env};
pub use inventory::{InventoryRecord, StockLevel, OUT_OF_STOCK_LABEL};
pub use merge::{merge, merge_one, normalize_name, EnrichedProduct};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read category layout file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse category layout file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Validation(String),
}
