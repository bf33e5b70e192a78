//! Client for the hosted content store that holds the product catalog.
//!
//! The store speaks the Contentful Content Delivery API dialect. This crate
//! wraps it behind [`CmsClient`], which returns fully resolved
//! [`keebstock_core::ContentProduct`] values with image links already
//! dereferenced against the response's asset sidecar.

pub mod client;
pub mod error;
pub mod normalize;
pub mod retry;
pub mod types;

pub use client::CmsClient;
pub use error::CmsError;
pub use types::{Asset, EntriesResponse, Entry};
