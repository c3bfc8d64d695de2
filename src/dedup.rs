//! Duplicate detection across an item's candidates.
//!
//! Two layers. Before download, a URL signature built from the host and a
//! size-stripped filename stem catches the same asset served under
//! different query strings or renditions. After download, a SHA-256 of the
//! bytes catches the same pixels served from different URLs (CDN mirrors,
//! renamed copies).

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use url::Url;

/// Canonical identity of an image URL: host plus the filename stem with any
/// `_`-delimited size/rendition suffix dropped. Query strings never
/// participate. URLs that don't parse fall back to the raw string so they
/// still dedup against exact repeats.
pub fn url_signature(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let host = parsed.host_str().unwrap_or("");
    let path = parsed.path();

    let filename = path.rsplit('/').next().unwrap_or("");
    if filename.is_empty() {
        return format!("{}{}", host, path);
    }
    let stem = filename.split('_').next().unwrap_or(filename);
    format!("{}/{}", host, stem)
}

/// Seen-set for one item's processing. Not persisted; each item starts
/// fresh so identical products in a batch each get their own images.
#[derive(Default)]
pub struct Deduplicator {
    seen_urls: HashSet<String>,
    seen_content: HashSet<[u8; 32]>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a candidate URL. Returns false when its signature was
    /// already seen.
    pub fn admit_url(&mut self, url: &str) -> bool {
        self.seen_urls.insert(url_signature(url))
    }

    /// Record downloaded bytes. Returns false when identical content was
    /// already saved for this item.
    pub fn admit_content(&mut self, bytes: &[u8]) -> bool {
        let digest: [u8; 32] = Sha256::digest(bytes).into();
        let fresh = self.seen_content.insert(digest);
        if !fresh {
            tracing::debug!("repeat image content {}", hex::encode(digest));
        }
        fresh
    }
}
