//! Product image acquisition engine for clothing items.
//!
//! Locates and downloads product photos for items identified by partial
//! metadata (brand, model, style, color, barcode, or a direct URL). A
//! prioritized chain of search strategies feeds per-site extractors;
//! candidates flow through deduplication into sequential downloads until
//! the requested image count is met.

pub mod batch;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod download;
pub mod engine;
pub mod error;
pub mod extract;
pub mod http;
pub mod logging;
pub mod models;
pub mod strategy;

pub use engine::{EngineSettings, ImageScraper};
pub use error::EngineError;
pub use models::{Item, ItemOutcome, ItemStatus};
