//! Core data types for the image acquisition engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

fn default_max_images() -> usize {
    5
}

/// One unit of search criteria describing a product to find images for.
///
/// An item is valid when at least one of the metadata fields is non-empty,
/// or a direct product URL is given. The `notes` field is accepted from
/// batch inputs but never read by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    /// Direct product page URL. When set, search strategies are skipped
    /// and this page is extracted directly.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            brand: None,
            model: None,
            style: None,
            color: None,
            barcode: None,
            url: None,
            max_images: default_max_images(),
            notes: None,
        }
    }
}

/// Treat empty and whitespace-only strings as absent.
fn nonempty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Item {
    /// Non-empty criteria fields in fixed priority order:
    /// brand, model, style, color, barcode.
    pub fn criteria(&self) -> Vec<&str> {
        [
            &self.brand,
            &self.model,
            &self.style,
            &self.color,
            &self.barcode,
        ]
        .into_iter()
        .filter_map(nonempty)
        .collect()
    }

    /// The direct product URL, if one was provided.
    pub fn direct_url(&self) -> Option<&str> {
        nonempty(&self.url)
    }

    /// Check the validity invariant: some criteria field or a URL.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.criteria().is_empty() && self.direct_url().is_none() {
            return Err(EngineError::InvalidItem);
        }
        Ok(())
    }

    /// Build the search query string: non-empty fields joined by spaces
    /// in the fixed field order.
    pub fn search_query(&self) -> String {
        self.criteria().join(" ")
    }

    /// Human-readable label for log lines.
    pub fn display_name(&self) -> String {
        let criteria = self.criteria();
        if criteria.is_empty() {
            self.direct_url().unwrap_or("(empty)").to_string()
        } else {
            criteria.join(" ")
        }
    }
}

/// An image URL proposed by a strategy/extractor, before download and dedup.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// The image URL to download.
    pub source_url: String,
    /// The strategy that produced it, e.g. `google_shopping` or `retailer:Zappos`.
    pub origin_strategy: String,
    /// Host of the page the image was found on.
    pub origin_domain: String,
}

/// Outcome of one download attempt.
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub file_path: Option<PathBuf>,
    pub source_url: String,
    pub strategy: String,
    pub success: bool,
    pub error: Option<String>,
}

impl DownloadResult {
    pub fn succeeded(candidate: &Candidate, path: PathBuf) -> Self {
        Self {
            file_path: Some(path),
            source_url: candidate.source_url.clone(),
            strategy: candidate.origin_strategy.clone(),
            success: true,
            error: None,
        }
    }

    pub fn failed(candidate: &Candidate, error: impl Into<String>) -> Self {
        Self {
            file_path: None,
            source_url: candidate.source_url.clone(),
            strategy: candidate.origin_strategy.clone(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Terminal state of item processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    /// Reached the requested image count.
    Satisfied,
    /// Candidates ran out before the requested count; partial, not an error.
    Exhausted,
    /// No strategy produced a single candidate.
    NotFound,
}

/// Per-item result returned to the caller.
#[derive(Debug)]
pub struct ItemOutcome {
    /// Saved file paths, in download order.
    pub files: Vec<PathBuf>,
    /// Every download attempt, success or failure.
    pub results: Vec<DownloadResult>,
    pub status: ItemStatus,
}

impl ItemOutcome {
    pub fn is_satisfied(&self) -> bool {
        self.status == ItemStatus::Satisfied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(brand: &str, model: &str, color: &str) -> Item {
        Item {
            brand: Some(brand.to_string()),
            model: Some(model.to_string()),
            color: Some(color.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_search_query_field_order() {
        let mut it = item("Nike", "Air Max 90", "White");
        it.style = Some("Sneaker".to_string());
        it.barcode = Some("194954123456".to_string());
        assert_eq!(
            it.search_query(),
            "Nike Air Max 90 Sneaker White 194954123456"
        );
    }

    #[test]
    fn test_empty_fields_skipped() {
        let mut it = item("Nike", "", "White");
        it.model = Some("   ".to_string());
        assert_eq!(it.search_query(), "Nike White");
    }

    #[test]
    fn test_validate_rejects_empty_item() {
        let it = Item::default();
        assert!(matches!(it.validate(), Err(EngineError::InvalidItem)));
    }

    #[test]
    fn test_validate_accepts_url_only() {
        let it = Item {
            url: Some("https://www.zappos.com/p/shoe".to_string()),
            ..Default::default()
        };
        assert!(it.validate().is_ok());
    }

    #[test]
    fn test_validate_accepts_barcode_only() {
        let it = Item {
            barcode: Some("012345678905".to_string()),
            ..Default::default()
        };
        assert!(it.validate().is_ok());
    }
}
