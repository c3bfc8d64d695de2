//! Single-item scrape command.

use anyhow::Context;

use crate::engine::{EngineSettings, ImageScraper};
use crate::models::{Item, ItemStatus};

pub async fn execute(settings: EngineSettings, item: Item) -> anyhow::Result<()> {
    item.validate()
        .context("Provide at least one of --brand/--model/--style/--color/--barcode, or --url")?;

    let scraper = ImageScraper::new(settings).context("Failed to initialize engine")?;
    let outcome = scraper.process_item(&item).await?;

    for path in &outcome.files {
        println!("{}", path.display());
    }

    let attempts = outcome.results.len();
    match outcome.status {
        ItemStatus::Satisfied => {
            println!(
                "Done: {} images saved ({} attempts)",
                outcome.files.len(),
                attempts
            );
        }
        ItemStatus::Exhausted => {
            println!(
                "Partial: {}/{} images saved ({} attempts)",
                outcome.files.len(),
                item.max_images,
                attempts
            );
        }
        ItemStatus::NotFound => {
            println!("No images found for {}", item.display_name());
        }
    }

    Ok(())
}
