//! The image acquisition engine.
//!
//! One entry point per item: validate, run the strategy chain, push
//! candidates through dedup and download until the requested count is
//! reached or everything is exhausted. Items are processed strictly
//! sequentially; the only state shared across items is the request
//! client's identity rotation and politeness timer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::dedup::Deduplicator;
use crate::download::Downloader;
use crate::error::EngineError;
use crate::extract::ExtractorRegistry;
use crate::http::{RequestClient, RequestConfig, Transport};
use crate::logging::DualLog;
use crate::models::{Item, ItemOutcome, ItemStatus};
use crate::strategy::{plan, Selector};

/// Engine construction settings.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Directory for saved images and the log pair.
    pub output_dir: PathBuf,
    pub request: RequestConfig,
    /// Explicit full-log path; the success log sits beside it. Defaults to
    /// `scraper.log` inside the output directory.
    pub log_path: Option<PathBuf>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloaded_images"),
            request: RequestConfig::default(),
            log_path: None,
        }
    }
}

impl EngineSettings {
    /// Settings with config-file values folded in.
    pub async fn from_config() -> Self {
        let mut settings = Self::default();
        Config::load().await.apply_to_settings(&mut settings);
        settings
    }
}

pub struct ImageScraper {
    client: RequestClient,
    registry: ExtractorRegistry,
    output_dir: PathBuf,
    log: DualLog,
}

impl ImageScraper {
    pub fn new(settings: EngineSettings) -> Result<Self, EngineError> {
        let client = RequestClient::new(settings.request.clone());
        Self::build(client, settings)
    }

    /// Engine over an injected transport (used by tests).
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        settings: EngineSettings,
    ) -> Result<Self, EngineError> {
        let client = RequestClient::with_transport(transport, settings.request.clone());
        Self::build(client, settings)
    }

    /// Replace the built-in extractor registry. Lets callers add site
    /// rules without touching dispatch logic.
    pub fn with_registry(mut self, registry: ExtractorRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn build(client: RequestClient, settings: EngineSettings) -> Result<Self, EngineError> {
        let log = match settings.log_path {
            Some(ref path) => DualLog::open_at(path)?,
            None => DualLog::open(&settings.output_dir)?,
        };
        Ok(Self {
            client,
            registry: ExtractorRegistry::builtin(),
            output_dir: settings.output_dir,
            log,
        })
    }

    pub fn log(&self) -> &DualLog {
        &self.log
    }

    /// Process one item into the engine's default output directory.
    pub async fn process_item(&self, item: &Item) -> Result<ItemOutcome, EngineError> {
        let target_dir = self.output_dir.clone();
        self.process_item_into(item, &target_dir).await
    }

    /// Process one item end to end, saving images under `target_dir`.
    /// Per-item directory policy stays with the caller; the identity pool
    /// and delay timer are shared across calls on the same engine.
    ///
    /// The only hard error is an invalid item, raised before any network
    /// traffic. Every network, extraction, and download failure is absorbed
    /// into the outcome's result list and the log.
    pub async fn process_item_into(
        &self,
        item: &Item,
        target_dir: &Path,
    ) -> Result<ItemOutcome, EngineError> {
        item.validate()?;

        let name = item.display_name();
        self.log.info(&format!("Processing item: {}", name));

        let selector = Selector::new(&self.client, &self.registry);
        let downloader = Downloader::new(target_dir);
        let mut dedup = Deduplicator::new();
        let mut outcome = ItemOutcome {
            files: Vec::new(),
            results: Vec::new(),
            status: ItemStatus::NotFound,
        };
        let mut saw_candidates = false;

        'strategies: for strategy in plan(item) {
            self.log
                .info(&format!("Trying strategy: {}", strategy.label()));

            let candidates = selector.gather(strategy, item).await;
            if candidates.is_empty() {
                self.log
                    .info(&format!("No candidates from {}", strategy.label()));
                continue;
            }
            saw_candidates = true;

            for candidate in &candidates {
                if outcome.files.len() >= item.max_images {
                    break 'strategies;
                }
                if !dedup.admit_url(&candidate.source_url) {
                    self.log.info(&format!(
                        "Skipping duplicate candidate: {}",
                        candidate.source_url
                    ));
                    continue;
                }

                let image_num = outcome.files.len() + 1;
                let result = downloader
                    .download(&self.client, candidate, item, image_num, &mut dedup)
                    .await;

                if result.success {
                    if let Some(ref path) = result.file_path {
                        self.log.success(&format!(
                            "Downloaded {} via {} from {}",
                            path.file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_else(|| path.display().to_string()),
                            result.strategy,
                            result.source_url
                        ));
                        outcome.files.push(path.clone());
                    }
                } else {
                    self.log.warning(&format!(
                        "Download failed ({}) for {}",
                        result.error.as_deref().unwrap_or("unknown"),
                        result.source_url
                    ));
                }
                outcome.results.push(result);
            }

            if outcome.files.len() >= item.max_images {
                break;
            }
        }

        outcome.status = if outcome.files.len() >= item.max_images {
            ItemStatus::Satisfied
        } else if saw_candidates {
            ItemStatus::Exhausted
        } else {
            ItemStatus::NotFound
        };

        match outcome.status {
            ItemStatus::Satisfied => self.log.info(&format!(
                "Item satisfied: {} ({} images)",
                name,
                outcome.files.len()
            )),
            ItemStatus::Exhausted => self.log.warning(&format!(
                "Candidates exhausted for {}: {}/{} images",
                name,
                outcome.files.len(),
                item.max_images
            )),
            ItemStatus::NotFound => self.log.warning(&format!("No images found for {}", name)),
        }

        Ok(outcome)
    }
}
