//! Image download and on-disk naming.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::dedup::Deduplicator;
use crate::http::{FetchOutcome, RequestClient, GOOGLE_REFERER};
use crate::models::{Candidate, DownloadResult, Item};

/// Characters stripped from filenames; everything a mainstream filesystem
/// rejects, so names stay portable.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Build the on-disk filename for an item's nth image:
/// non-empty criteria fields joined by underscores, reserved characters
/// removed, spaces collapsed to underscores, then ` - {n}.jpg`.
///
/// The scheme is deterministic, so re-running an item overwrites its
/// earlier files instead of accumulating copies.
pub fn build_filename(item: &Item, image_num: usize) -> String {
    let joined = item.criteria().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| !RESERVED_CHARS.contains(c))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    format!("{} - {}.jpg", cleaned, image_num)
}

/// Downloads one candidate at a time through the shared request client,
/// rejecting non-image payloads and byte-identical repeats.
pub struct Downloader {
    output_dir: PathBuf,
}

impl Downloader {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetch a candidate and save it under the item's filename scheme.
    ///
    /// A non-2xx status, a non-image payload, or content already saved for
    /// this item all produce a failed [`DownloadResult`]; only an I/O error
    /// writing the file does too, with the error recorded rather than
    /// propagated so the caller can move on to the next candidate.
    pub async fn download(
        &self,
        client: &RequestClient,
        candidate: &Candidate,
        item: &Item,
        image_num: usize,
        dedup: &mut Deduplicator,
    ) -> DownloadResult {
        // Image requests that came out of a Google strategy carry the
        // search results page as Referer, like a click-through would.
        let referer = candidate
            .origin_strategy
            .starts_with("google")
            .then_some(GOOGLE_REFERER);
        let response = match client.fetch(&candidate.source_url, referer).await {
            FetchOutcome::Success(response) => response,
            other => {
                debug!("download failed for {}: {}", candidate.source_url, other.describe());
                return DownloadResult::failed(candidate, other.describe());
            }
        };

        if !looks_like_image(response.content_type.as_deref(), &response.body) {
            warn!(
                "not an image: {} ({})",
                candidate.source_url,
                response.content_type.as_deref().unwrap_or("no content type")
            );
            return DownloadResult::failed(candidate, "payload is not an image");
        }

        if !dedup.admit_content(&response.body) {
            debug!("duplicate content from {}", candidate.source_url);
            return DownloadResult::failed(candidate, "duplicate image content");
        }

        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            return DownloadResult::failed(candidate, e.to_string());
        }
        let path = self.output_dir.join(build_filename(item, image_num));
        if let Err(e) = tokio::fs::write(&path, &response.body).await {
            warn!("failed to write {}: {}", path.display(), e);
            return DownloadResult::failed(candidate, e.to_string());
        }

        DownloadResult::succeeded(candidate, path)
    }
}

/// Accept a payload as an image when the Content-Type says so, or when
/// byte sniffing recognizes an image format. Either suffices; CDNs lie
/// about types often enough that a wrong header alone doesn't reject.
fn looks_like_image(content_type: Option<&str>, body: &[u8]) -> bool {
    if content_type.is_some_and(|ct| ct.contains("image")) {
        return true;
    }
    infer::get(body)
        .map(|kind| kind.matcher_type() == infer::MatcherType::Image)
        .unwrap_or(false)
}
