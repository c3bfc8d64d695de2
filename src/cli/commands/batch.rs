//! Batch scrape commands.

use std::path::Path;

use anyhow::Context;

use crate::batch::{read_csv_items, read_json_items, run_batch};
use crate::engine::{EngineSettings, ImageScraper};
use crate::models::Item;

pub async fn execute_csv(settings: EngineSettings, file: &Path) -> anyhow::Result<()> {
    let items = read_csv_items(file)?;
    run(settings, items).await
}

pub async fn execute_json(settings: EngineSettings, file: &Path) -> anyhow::Result<()> {
    let items = read_json_items(file)?;
    run(settings, items).await
}

async fn run(settings: EngineSettings, items: Vec<Item>) -> anyhow::Result<()> {
    if items.is_empty() {
        println!("No items to process");
        return Ok(());
    }

    let scraper = ImageScraper::new(settings).context("Failed to initialize engine")?;
    let stats = run_batch(&scraper, &items).await;

    println!(
        "Processed {} items: {} satisfied, {} partial, {} not found, {} invalid",
        stats.total_items, stats.satisfied, stats.partial, stats.not_found, stats.invalid
    );
    println!("Total images saved: {}", stats.total_images);

    Ok(())
}
