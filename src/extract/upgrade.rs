//! Image URL quality upgrades.
//!
//! CDN URLs encode the rendition size three ways: filename suffixes,
//! path segments, and query parameters. All three are rewritten toward
//! the largest rendition. The rewrites are speculative; a URL the CDN
//! rejects simply fails its download and the candidate after it is tried.

use url::Url;

/// Filename suffixes that select a reduced rendition.
const SIZE_SUFFIXES: &[&str] = &[
    "_thumb",
    "_small",
    "_tiny",
    "_mini",
    "_xs",
    "_sm",
    "_med",
    "_150x150",
    "_200x200",
    "_300x300",
    "_100x100",
    "_64x64",
    "_thumbnail",
    "_preview",
    "_low",
    "_lowres",
];

/// Path segments swapped for their full-size counterparts.
const PATH_REPLACEMENTS: &[(&str, &str)] = &[
    ("/thumbnail/", "/original/"),
    ("/thumbnails/", "/originals/"),
    ("/preview/", "/full/"),
    ("/small/", "/large/"),
    ("/medium/", "/large/"),
    ("/thumbs/", "/images/"),
];

/// Size/quality query parameters forced to their maximum values.
const PARAM_UPGRADES: &[(&str, &str)] = &[
    ("width", "1200"),
    ("w", "1200"),
    ("wid", "1200"),
    ("size", "large"),
    ("quality", "100"),
    ("q", "100"),
];

/// Rewrite an image URL toward its highest-quality rendition. Returns the
/// input unchanged when no heuristic applies.
pub fn upgrade_image_url(url: &str) -> String {
    let mut upgraded = url.to_string();

    for suffix in SIZE_SUFFIXES {
        if upgraded.contains(suffix) {
            upgraded = upgraded.replace(suffix, "");
        }
    }

    for (old_segment, new_segment) in PATH_REPLACEMENTS {
        if upgraded.contains(old_segment) {
            upgraded = upgraded.replace(old_segment, new_segment);
        }
    }

    upgrade_params(&upgraded).unwrap_or(upgraded)
}

/// Bump size/quality query parameters where present. Parameters the URL
/// doesn't already carry are never added.
fn upgrade_params(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.query()?;

    let mut changed = false;
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(name, value)| {
            match PARAM_UPGRADES
                .iter()
                .find(|(param, _)| *param == name.as_ref())
            {
                Some((_, upgraded_value)) => {
                    changed = true;
                    (name.into_owned(), upgraded_value.to_string())
                }
                None => (name.into_owned(), value.into_owned()),
            }
        })
        .collect();

    if !changed {
        return None;
    }

    let mut rebuilt = parsed.clone();
    rebuilt
        .query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    Some(rebuilt.to_string())
}
