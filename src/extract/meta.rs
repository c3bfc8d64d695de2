//! High-resolution image discovery from structured page data.
//!
//! Runs before the per-site rules on every product page: srcset entries,
//! zoom/high-res data attributes, Open Graph and Twitter card meta tags,
//! and JSON-LD product records all tend to reference the original
//! full-size asset rather than the displayed thumbnail.

use scraper::Html;
use serde_json::Value;
use url::Url;

use super::{resolve_image_url, selector};

/// Data attributes retailers use to stash the full-size rendition.
const HIGHRES_ATTRS: &[&str] = &[
    "data-full",
    "data-zoom",
    "data-highres",
    "data-zoom-image",
    "data-large",
    "data-original",
    "data-hi-res",
    "data-full-size",
    "data-old-hires",
    "data-a-hires",
    "data-src-zoom",
];

/// Extract high-resolution image URLs from a page's structured sources.
pub fn extract_highres(html: &Html, base: &Url) -> Vec<String> {
    let mut urls = Vec::new();

    collect_srcset(html, base, &mut urls);
    collect_highres_attrs(html, base, &mut urls);
    collect_meta_tags(html, &mut urls);
    collect_jsonld(html, &mut urls);

    urls
}

/// For each img with a srcset, keep the widest entry.
fn collect_srcset(html: &Html, base: &Url, urls: &mut Vec<String>) {
    let Some(sel) = selector("img[srcset]") else {
        return;
    };
    for img in html.select(&sel) {
        let srcset = img.value().attr("srcset").unwrap_or("");
        let best = srcset
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split_whitespace();
                let url = parts.next()?;
                let width = parts
                    .next()
                    .and_then(|w| w.strip_suffix('w'))
                    .and_then(|w| w.parse::<u32>().ok())
                    .unwrap_or(0);
                Some((url, width))
            })
            .max_by_key(|(_, width)| *width);
        if let Some((url, _)) = best {
            if let Some(resolved) = resolve_image_url(url, base) {
                urls.push(resolved);
            }
        }
    }
}

fn collect_highres_attrs(html: &Html, base: &Url, urls: &mut Vec<String>) {
    for attr in HIGHRES_ATTRS {
        let Some(sel) = selector(&format!("[{}]", attr)) else {
            continue;
        };
        for element in html.select(&sel) {
            if let Some(src) = element.value().attr(attr) {
                if let Some(resolved) = resolve_image_url(src, base) {
                    urls.push(resolved);
                }
            }
        }
    }
}

fn collect_meta_tags(html: &Html, urls: &mut Vec<String>) {
    let metas = [
        r#"meta[property="og:image"]"#,
        r#"meta[name="twitter:image"]"#,
    ];
    for pattern in metas {
        let Some(sel) = selector(pattern) else {
            continue;
        };
        for meta in html.select(&sel) {
            if let Some(content) = meta.value().attr("content") {
                if content.starts_with("http") {
                    urls.push(content.to_string());
                }
            }
        }
    }
}

/// JSON-LD product records carry `image` as a string, a list of strings,
/// or a list of objects with `url`/`contentUrl`. Malformed JSON is skipped.
fn collect_jsonld(html: &Html, urls: &mut Vec<String>) {
    let Some(sel) = selector(r#"script[type="application/ld+json"]"#) else {
        return;
    };
    for script in html.select(&sel) {
        let text: String = script.text().collect();
        let Ok(data) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        match data {
            Value::Array(items) => {
                for item in items {
                    jsonld_images(&item, urls);
                }
            }
            item => jsonld_images(&item, urls),
        }
    }
}

fn jsonld_images(data: &Value, urls: &mut Vec<String>) {
    let Some(image) = data.get("image") else {
        return;
    };
    match image {
        Value::String(s) if s.starts_with("http") => urls.push(s.clone()),
        Value::Array(entries) => {
            for entry in entries {
                match entry {
                    Value::String(s) if s.starts_with("http") => urls.push(s.clone()),
                    Value::Object(obj) => {
                        let url = obj
                            .get("url")
                            .or_else(|| obj.get("contentUrl"))
                            .and_then(Value::as_str);
                        if let Some(url) = url {
                            if url.starts_with("http") {
                                urls.push(url.to_string());
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.retailer.com/p/dress").unwrap()
    }

    #[test]
    fn test_srcset_prefers_widest() {
        let html = Html::parse_document(
            r#"<img srcset="https://c.img/a_320.jpg 320w, https://c.img/a_1600.jpg 1600w, https://c.img/a_800.jpg 800w">"#,
        );
        let urls = extract_highres(&html, &base());
        assert_eq!(urls, vec!["https://c.img/a_1600.jpg".to_string()]);
    }

    #[test]
    fn test_highres_data_attributes() {
        let html = Html::parse_document(
            r#"<img src="/small.jpg" data-zoom-image="/zoom.jpg"><div data-old-hires="https://c.img/hires.jpg"></div>"#,
        );
        let urls = extract_highres(&html, &base());
        assert!(urls.contains(&"https://www.retailer.com/zoom.jpg".to_string()));
        assert!(urls.contains(&"https://c.img/hires.jpg".to_string()));
    }

    #[test]
    fn test_meta_tags() {
        let html = Html::parse_document(
            r#"<head>
            <meta property="og:image" content="https://c.img/og.jpg">
            <meta name="twitter:image" content="https://c.img/tw.jpg">
            </head>"#,
        );
        let urls = extract_highres(&html, &base());
        assert_eq!(
            urls,
            vec![
                "https://c.img/og.jpg".to_string(),
                "https://c.img/tw.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn test_jsonld_image_shapes() {
        let html = Html::parse_document(
            r#"<script type="application/ld+json">
            {"@type": "Product", "image": ["https://c.img/1.jpg", {"url": "https://c.img/2.jpg"}]}
            </script>
            <script type="application/ld+json">not json</script>"#,
        );
        let urls = extract_highres(&html, &base());
        assert_eq!(
            urls,
            vec![
                "https://c.img/1.jpg".to_string(),
                "https://c.img/2.jpg".to_string(),
            ]
        );
    }
}
