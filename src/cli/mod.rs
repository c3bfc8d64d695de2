//! CLI commands implementation.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apparel")]
#[command(about = "Product image acquisition for clothing items")]
#[command(version)]
pub struct Cli {
    /// Output directory for images and logs
    #[arg(short, long, global = true, env = "APPAREL_OUTPUT_DIR")]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape images for a single item described by flags
    Scrape {
        /// Brand name
        #[arg(long)]
        brand: Option<String>,
        /// Model name or number
        #[arg(long)]
        model: Option<String>,
        /// Style descriptor
        #[arg(long)]
        style: Option<String>,
        /// Color
        #[arg(long)]
        color: Option<String>,
        /// Product barcode / UPC
        #[arg(long)]
        barcode: Option<String>,
        /// Direct product page URL (skips search)
        #[arg(long)]
        url: Option<String>,
        /// Maximum images to download
        #[arg(long, default_value = "5")]
        max_images: usize,
    },

    /// Scrape images for many items from a batch file
    Batch {
        #[command(subcommand)]
        command: BatchCommands,
    },
}

#[derive(Subcommand)]
enum BatchCommands {
    /// Items from a CSV file (headers: brand, model, style, color, barcode, url, max_images, notes)
    Csv {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Items from a JSON file holding an array of item records
    Json {
        /// Path to the JSON file
        file: PathBuf,
    },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = crate::engine::EngineSettings::from_config().await;
    if let Some(output) = cli.output {
        settings.output_dir = output;
    }

    match cli.command {
        Commands::Scrape {
            brand,
            model,
            style,
            color,
            barcode,
            url,
            max_images,
        } => {
            let item = crate::models::Item {
                brand,
                model,
                style,
                color,
                barcode,
                url,
                max_images,
                notes: None,
            };
            commands::scrape::execute(settings, item).await
        }
        Commands::Batch { command } => match command {
            BatchCommands::Csv { file } => commands::batch::execute_csv(settings, &file).await,
            BatchCommands::Json { file } => commands::batch::execute_json(settings, &file).await,
        },
    }
}
