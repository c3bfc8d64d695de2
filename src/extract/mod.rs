//! Per-site HTML extraction layer.
//!
//! A registry maps domain substrings to extraction functions; each function
//! knows where image URLs live in one page shape and nothing else. Missing
//! markup yields an empty list, never an error; page structure drift is
//! expected. Adding a retailer is one function plus one registry row.

mod google;
mod meta;
mod retailers;
mod upgrade;

pub use google::{image_results, image_search_url, shopping_results, shopping_search_url};
pub use meta::extract_highres;
pub use retailers::{find_product_links, search_targets};
pub use upgrade::upgrade_image_url;

use scraper::{Html, Selector};
use url::Url;

/// One extraction rule: given a parsed page and its URL, the image URLs.
pub type ExtractFn = fn(&Html, &Url) -> Vec<String>;

/// Registry of per-site extraction rules keyed by domain substring.
pub struct ExtractorRegistry {
    entries: Vec<(&'static str, ExtractFn)>,
}

impl ExtractorRegistry {
    /// Registry with the built-in retailer rules.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                ("tjmaxx.", retailers::extract_tjx),
                ("marshalls.", retailers::extract_tjx),
                ("nordstrom.", retailers::extract_nordstrom),
                ("macys.", retailers::extract_macys),
                ("zappos.", retailers::extract_zappos),
                ("amazon.", retailers::extract_amazon),
                ("nike.", retailers::extract_nike),
            ],
        }
    }

    /// Add a rule. Later additions win over built-ins for the same domain.
    pub fn register(&mut self, domain_fragment: &'static str, extract: ExtractFn) {
        self.entries.insert(0, (domain_fragment, extract));
    }

    /// Pick the rule for a page URL, falling back to the generic extractor.
    pub fn for_url(&self, url: &str) -> ExtractFn {
        let lower = url.to_ascii_lowercase();
        for (fragment, extract) in &self.entries {
            if lower.contains(fragment) {
                return *extract;
            }
        }
        retailers::extract_generic
    }
}

impl Default for ExtractorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Extract product images from a fetched page: structured/high-res sources
/// first, then the site-specific rule, then quality upgrades and filtering.
pub fn extract_product_images(html: &Html, page_url: &Url, extract: ExtractFn) -> Vec<String> {
    let mut images = meta::extract_highres(html, page_url);
    images.extend(extract(html, page_url));

    images
        .into_iter()
        .map(|url| upgrade::upgrade_image_url(&url))
        .filter(|url| !is_non_product_asset(url))
        .collect()
}

/// Parse a CSS selector, treating an invalid pattern as "matches nothing".
pub(crate) fn selector(pattern: &str) -> Option<Selector> {
    Selector::parse(pattern).ok()
}

/// Resolve an image src to an absolute http(s) URL against the page URL.
/// Protocol-relative and root-relative forms are handled; anything that
/// doesn't resolve to http(s) is dropped.
pub fn resolve_image_url(src: &str, base: &Url) -> Option<String> {
    let src = src.trim();
    if src.is_empty() {
        return None;
    }
    if let Some(rest) = src.strip_prefix("//") {
        return Some(format!("https://{}", rest));
    }
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(src.to_string());
    }
    if src.starts_with('/') {
        return base.join(src).ok().map(|u| u.to_string());
    }
    None
}

/// Cheap URL-level filter for things that are never product photos:
/// vector assets, icons, animations, data URIs, tracking pixels.
pub fn is_non_product_asset(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("data:") {
        return true;
    }
    let path = lower.split('?').next().unwrap_or(&lower);
    if path.ends_with(".svg") || path.ends_with(".gif") || path.ends_with(".ico") {
        return true;
    }
    lower.contains("sprite") || lower.contains("pixel.") || lower.contains("1x1")
}

/// True when the element's width/height attributes mark it as too small to
/// be a product photo. Missing or unparseable attributes pass.
pub(crate) fn too_small(element: &scraper::ElementRef<'_>, min_dimension: u32) -> bool {
    let dim = |attr: &str| {
        element
            .value()
            .attr(attr)
            .and_then(|v| v.trim().parse::<u32>().ok())
    };
    match (dim("width"), dim("height")) {
        (Some(w), Some(h)) => w < min_dimension || h < min_dimension,
        _ => false,
    }
}
