//! Batch input readers and the multi-item driver.
//!
//! Thin callers around the engine: read item records from CSV or JSON,
//! feed them through one at a time, and aggregate stats. One item's
//! failure never stops the run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::ImageScraper;
use crate::models::{Item, ItemStatus};

/// Aggregate statistics for a batch run.
#[derive(Debug, Default)]
pub struct BatchStats {
    pub total_items: usize,
    pub satisfied: usize,
    pub partial: usize,
    pub not_found: usize,
    pub invalid: usize,
    pub total_images: usize,
}

/// CSV row shape. Unknown columns are ignored; known columns may be empty.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    style: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    barcode: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    max_images: Option<usize>,
    #[serde(default)]
    notes: Option<String>,
}

impl From<CsvRow> for Item {
    fn from(row: CsvRow) -> Self {
        Item {
            brand: row.brand,
            model: row.model,
            style: row.style,
            color: row.color,
            barcode: row.barcode,
            url: row.url,
            max_images: row.max_images.unwrap_or(5),
            notes: row.notes,
        }
    }
}

/// Read items from a CSV file. Expected headers are brand, model, style,
/// color, barcode, url, max_images, notes, in any order and any subset.
pub fn read_csv_items(path: &Path) -> Result<Vec<Item>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let mut items = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        let row = row.context("Failed to parse CSV row")?;
        items.push(Item::from(row));
    }
    Ok(items)
}

/// Read items from a JSON file holding an array of item records.
pub fn read_json_items(path: &Path) -> Result<Vec<Item>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file {}", path.display()))?;
    serde_json::from_str(&contents).context("Failed to parse JSON item array")
}

/// Run a list of items through the engine sequentially, aggregating stats.
/// Invalid items are counted and logged, never fatal.
pub async fn run_batch(scraper: &ImageScraper, items: &[Item]) -> BatchStats {
    let mut stats = BatchStats {
        total_items: items.len(),
        ..Default::default()
    };

    for (index, item) in items.iter().enumerate() {
        scraper.log().info(&format!(
            "--- Item {}/{}: {} ---",
            index + 1,
            items.len(),
            item.display_name()
        ));

        match scraper.process_item(item).await {
            Ok(outcome) => {
                stats.total_images += outcome.files.len();
                match outcome.status {
                    ItemStatus::Satisfied => stats.satisfied += 1,
                    ItemStatus::Exhausted => stats.partial += 1,
                    ItemStatus::NotFound => stats.not_found += 1,
                }
            }
            Err(e) => {
                stats.invalid += 1;
                scraper.log().error(&format!(
                    "Item {}/{} rejected: {}",
                    index + 1,
                    items.len(),
                    e
                ));
            }
        }
    }

    scraper.log().info(&format!(
        "Batch complete: {} items, {} satisfied, {} partial, {} not found, {} invalid, {} images",
        stats.total_items,
        stats.satisfied,
        stats.partial,
        stats.not_found,
        stats.invalid,
        stats.total_images
    ));

    stats
}
