//! Search strategy selection and candidate gathering.
//!
//! Strategies run in fixed priority order: a direct product URL short-
//! circuits everything, otherwise Google Shopping, then Google Images,
//! then retailer site searches. A strategy that errors anywhere simply
//! yields no candidates; the engine logs and falls through.

use scraper::Html;
use tracing::debug;
use url::Url;

use crate::extract::{self, ExtractorRegistry};
use crate::http::{RequestClient, GOOGLE_REFERER};
use crate::models::{Candidate, Item};

/// Retailer searches stop after this many produced a product page; the
/// remaining, less accessible sites aren't worth the request budget.
const MAX_RETAILER_HITS: usize = 5;

/// One image-discovery method, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DirectUrl,
    GoogleShopping,
    GoogleImages,
    Retailers,
}

impl Strategy {
    /// Name used in result attribution and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::DirectUrl => "direct_url",
            Strategy::GoogleShopping => "google_shopping",
            Strategy::GoogleImages => "google_images",
            Strategy::Retailers => "retailer_search",
        }
    }
}

/// The strategies to attempt for an item. A direct URL makes it the sole
/// strategy; searches are skipped entirely.
pub fn plan(item: &Item) -> Vec<Strategy> {
    if item.direct_url().is_some() {
        vec![Strategy::DirectUrl]
    } else {
        vec![
            Strategy::GoogleShopping,
            Strategy::GoogleImages,
            Strategy::Retailers,
        ]
    }
}

/// Gathers candidates for one strategy at a time over the shared client
/// and extractor registry.
pub struct Selector<'a> {
    client: &'a RequestClient,
    registry: &'a ExtractorRegistry,
}

impl<'a> Selector<'a> {
    pub fn new(client: &'a RequestClient, registry: &'a ExtractorRegistry) -> Self {
        Self { client, registry }
    }

    /// Run one strategy to exhaustion. Errors yield an empty list.
    pub async fn gather(&self, strategy: Strategy, item: &Item) -> Vec<Candidate> {
        match strategy {
            Strategy::DirectUrl => match item.direct_url() {
                Some(url) => self.product_page_candidates(url, strategy.label()).await,
                None => Vec::new(),
            },
            Strategy::GoogleShopping => {
                let url = extract::shopping_search_url(&item.search_query());
                self.google_candidates(&url, strategy.label(), extract::shopping_results)
                    .await
            }
            Strategy::GoogleImages => {
                let url = extract::image_search_url(&item.search_query());
                self.google_candidates(&url, strategy.label(), |html| {
                    extract::image_results(html)
                })
                .await
            }
            Strategy::Retailers => self.retailer_candidates(&item.search_query()).await,
        }
    }

    async fn fetch_html(&self, url: &str, referer: Option<&str>) -> Option<Html> {
        let outcome = self.client.fetch(url, referer).await;
        match outcome.success() {
            Some(response) => Some(Html::parse_document(&response.text())),
            None => {
                debug!("no page from {}", url);
                None
            }
        }
    }

    async fn google_candidates(
        &self,
        search_url: &str,
        label: &str,
        results: impl Fn(&Html) -> Vec<String>,
    ) -> Vec<Candidate> {
        let Some(html) = self.fetch_html(search_url, None).await else {
            return Vec::new();
        };
        results(&html)
            .into_iter()
            .map(|source_url| Candidate {
                source_url,
                origin_strategy: label.to_string(),
                origin_domain: "www.google.com".to_string(),
            })
            .collect()
    }

    /// Extract images from one product page, attributed to `label`.
    async fn product_page_candidates(&self, page_url: &str, label: &str) -> Vec<Candidate> {
        let Ok(parsed) = Url::parse(page_url) else {
            return Vec::new();
        };
        let Some(html) = self.fetch_html(page_url, Some(GOOGLE_REFERER)).await else {
            return Vec::new();
        };

        let extractor = self.registry.for_url(page_url);
        let domain = parsed.host_str().unwrap_or("").to_string();
        extract::extract_product_images(&html, &parsed, extractor)
            .into_iter()
            .map(|source_url| Candidate {
                source_url,
                origin_strategy: label.to_string(),
                origin_domain: domain.clone(),
            })
            .collect()
    }

    /// Search each retailer, follow the first product link found, and
    /// extract from that page. Stops after enough retailers hit.
    async fn retailer_candidates(&self, query: &str) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        let mut hits = 0;

        for (name, search_url) in extract::search_targets(query) {
            if hits >= MAX_RETAILER_HITS {
                break;
            }
            let Ok(parsed_search) = Url::parse(&search_url) else {
                continue;
            };
            let Some(html) = self.fetch_html(&search_url, Some(GOOGLE_REFERER)).await else {
                debug!("{} search inaccessible, skipping", name);
                continue;
            };

            let links = extract::find_product_links(&html, &parsed_search);
            let Some(product_url) = links.first() else {
                debug!("no products found on {}", name);
                continue;
            };

            let label = format!("retailer:{}", name);
            let page_candidates = self.product_page_candidates(product_url, &label).await;
            if !page_candidates.is_empty() {
                hits += 1;
                candidates.extend(page_candidates);
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_url_is_sole_strategy() {
        let item = Item {
            url: Some("https://www.zappos.com/p/shoe".to_string()),
            brand: Some("Nike".to_string()),
            ..Default::default()
        };
        assert_eq!(plan(&item), vec![Strategy::DirectUrl]);
    }

    #[test]
    fn test_search_strategy_order() {
        let item = Item {
            brand: Some("Nike".to_string()),
            ..Default::default()
        };
        assert_eq!(
            plan(&item),
            vec![
                Strategy::GoogleShopping,
                Strategy::GoogleImages,
                Strategy::Retailers,
            ]
        );
    }
}
