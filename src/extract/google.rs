//! Google search result extraction.
//!
//! Two surfaces: Shopping (`tbm=shop`) and Images (`tbm=isch`). Shopping is
//! the preferred strategy because result thumbnails link to the original
//! retailer image through `imgurl=` redirect parameters.

use scraper::Html;
use urlencoding::{decode, encode};

use super::selector;

/// Shopping results cap per search page.
const SHOPPING_RESULT_CAP: usize = 15;
/// Image results cap per search page.
const IMAGE_RESULT_CAP: usize = 10;

/// Search URL for Google Shopping.
pub fn shopping_search_url(query: &str) -> String {
    format!("https://www.google.com/search?q={}&tbm=shop", encode(query))
}

/// Search URL for Google Images.
pub fn image_search_url(query: &str) -> String {
    format!("https://www.google.com/search?q={}&tbm=isch", encode(query))
}

/// Extract product image URLs from a Google Shopping results page.
///
/// Thumbnails hosted by Google itself are skipped; links carrying an
/// `imgurl=` parameter are unwrapped to the original retailer image, which
/// is always higher quality than the thumbnail. Caps at 15 URLs.
pub fn shopping_results(html: &Html) -> Vec<String> {
    let mut urls = Vec::new();

    if let Some(img_sel) = selector("img") {
        for img in html.select(&img_sel) {
            let src = img
                .value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"));
            if let Some(src) = src {
                if src.starts_with("http") && !src.contains("google") {
                    urls.push(src.to_string());
                }
            }
        }
    }

    if let Some(a_sel) = selector("a[href]") {
        for anchor in html.select(&a_sel) {
            let href = anchor.value().attr("href").unwrap_or("");
            if let Some(wrapped) = unwrap_imgurl(href) {
                urls.push(wrapped);
            }
        }
    }

    urls.truncate(SHOPPING_RESULT_CAP);
    urls
}

/// Extract image URLs from a Google Images results page. Caps at 10 URLs.
pub fn image_results(html: &Html) -> Vec<String> {
    let mut urls = Vec::new();

    if let Some(img_sel) = selector("img") {
        for img in html.select(&img_sel) {
            let src = img
                .value()
                .attr("src")
                .or_else(|| img.value().attr("data-src"));
            if let Some(src) = src {
                if src.starts_with("http") {
                    urls.push(src.to_string());
                }
            }
        }
    }

    if let Some(div_sel) = selector("div[data-src]") {
        for div in html.select(&div_sel) {
            if let Some(src) = div.value().attr("data-src") {
                if src.starts_with("http") {
                    urls.push(src.to_string());
                }
            }
        }
    }

    urls.truncate(IMAGE_RESULT_CAP);
    urls
}

/// Pull the original image URL out of a Google redirect href carrying an
/// `imgurl=` parameter.
fn unwrap_imgurl(href: &str) -> Option<String> {
    let (_, rest) = href.split_once("imgurl=")?;
    let encoded = rest.split('&').next()?;
    let decoded = decode(encoded).ok()?;
    if decoded.starts_with("http") {
        Some(decoded.into_owned())
    } else {
        None
    }
}
