//! Retailer search targets and per-site image extraction rules.

use regex::Regex;
use scraper::{ElementRef, Html};
use url::Url;
use urlencoding::encode;

use super::{resolve_image_url, selector, too_small};

/// Path fragments that mark an anchor as a product detail page.
pub const PRODUCT_LINK_PATTERNS: &[&str] = &["/product/", "/p/", "/item/", "/dp/", "/pd/"];

/// Retailer search pages tried for every query, in priority order. The most
/// accessible sites come first; later entries tolerate automation poorly and
/// often 403, which the request layer absorbs.
const RETAILER_SEARCHES: &[(&str, &str)] = &[
    ("Zappos", "https://www.zappos.com/search?term={q}"),
    ("DSW", "https://www.dsw.com/en/us/search?q={q}"),
    ("Amazon", "https://www.amazon.com/s?k={q}"),
    ("eBay", "https://www.ebay.com/sch/i.html?_nkw={q}"),
    ("Belk", "https://www.belk.com/search/?q={q}"),
    ("Forever 21", "https://www.forever21.com/us/search?q={q}"),
    ("Lord & Taylor", "https://www.lordandtaylor.com/search?q={q}"),
    ("ModeSens", "https://modesens.com/search/?q={q}"),
    ("Clothbase", "https://clothbase.com/search?q={q}"),
    ("Editorialist", "https://editorialist.com/search?q={q}"),
    ("Level Shoes", "https://us.levelshoes.com/search?q={q}"),
    ("YOOX", "https://www.yoox.com/us/search?q={q}"),
    ("Walmart", "https://www.walmart.com/search?q={q}"),
    ("Target", "https://www.target.com/s?searchTerm={q}"),
    ("6pm", "https://www.6pm.com/search?term={q}"),
];

/// Brand-direct search pages, added only when the query names the brand.
const BRAND_SEARCHES: &[(&str, &str, &str)] = &[
    ("nike", "Nike", "https://www.nike.com/w?q={q}"),
    ("adidas", "Adidas", "https://www.adidas.com/us/search?q={q}"),
    ("puma", "Puma", "https://us.puma.com/us/en/search?q={q}"),
    (
        "new balance",
        "New Balance",
        "https://www.newbalance.com/search/?q={q}",
    ),
    ("converse", "Converse", "https://www.converse.com/shop?q={q}"),
    ("vans", "Vans", "https://www.vans.com/shop/search?q={q}"),
    (
        "stuart weitzman",
        "Stuart Weitzman",
        "https://www.stuartweitzman.com/search/?q={q}",
    ),
    (
        "sam edelman",
        "Sam Edelman",
        "https://www.samedelman.com/search?q={q}",
    ),
    (
        "steve madden",
        "Steve Madden",
        "https://www.stevemadden.com/search?q={q}",
    ),
];

/// Build the list of (retailer name, search URL) targets for a query.
/// Brand-direct entries slot in after the general retailers when the query
/// mentions the brand.
pub fn search_targets(query: &str) -> Vec<(String, String)> {
    let encoded = encode(query);
    let mut targets: Vec<(String, String)> = RETAILER_SEARCHES
        .iter()
        .map(|(name, template)| (name.to_string(), template.replace("{q}", &encoded)))
        .collect();

    let query_lower = query.to_lowercase();
    for (fragment, name, template) in BRAND_SEARCHES {
        if query_lower.contains(fragment) {
            targets.push((name.to_string(), template.replace("{q}", &encoded)));
        }
    }

    targets
}

/// Find product detail links on a retailer search results page, resolved
/// to absolute URLs against the search page URL.
pub fn find_product_links(html: &Html, search_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let Some(a_sel) = selector("a[href]") else {
        return links;
    };

    for anchor in html.select(&a_sel) {
        let href = anchor.value().attr("href").unwrap_or("");
        let lower = href.to_ascii_lowercase();
        if !PRODUCT_LINK_PATTERNS
            .iter()
            .any(|pattern| lower.contains(pattern))
        {
            continue;
        }

        let absolute = if href.starts_with('/') {
            match search_url.join(href) {
                Ok(u) => u.to_string(),
                Err(_) => continue,
            }
        } else if href.starts_with("http") {
            href.to_string()
        } else {
            continue;
        };
        links.push(absolute);
    }

    links
}

fn class_attr(element: &ElementRef<'_>) -> String {
    element.value().attr("class").unwrap_or("").to_string()
}

fn src_or_data_src<'a>(element: &ElementRef<'a>) -> Option<&'a str> {
    element
        .value()
        .attr("src")
        .or_else(|| element.value().attr("data-src"))
}

/// TJX family (TJ Maxx, Marshalls). Product/slide image classes, with an
/// inline size upgrade; any product-classed img as fallback.
pub fn extract_tjx(html: &Html, base: &Url) -> Vec<String> {
    let mut images = Vec::new();
    let class_pattern = Regex::new(r"(?i)product.*image|slide.*image").unwrap();

    if let Some(img_sel) = selector("img") {
        for img in html.select(&img_sel) {
            if !class_pattern.is_match(&class_attr(&img)) {
                continue;
            }
            if let Some(src) = src_or_data_src(&img) {
                if let Some(resolved) = resolve_image_url(src, base) {
                    images.push(resolved.replace("_small", "_large").replace("_thumb", "_large"));
                }
            }
        }

        if images.is_empty() {
            for img in html.select(&img_sel) {
                if !class_attr(&img).to_lowercase().contains("product") {
                    continue;
                }
                if let Some(src) = src_or_data_src(&img) {
                    if src.starts_with("http") {
                        images.push(src.to_string());
                    }
                }
            }
        }
    }

    images
}

/// Nordstrom serves responsive `picture` elements; the last srcset entry is
/// the largest rendition.
pub fn extract_nordstrom(html: &Html, _base: &Url) -> Vec<String> {
    let mut images = Vec::new();

    if let Some(source_sel) = selector("picture source[srcset]") {
        for source in html.select(&source_sel) {
            if let Some(srcset) = source.value().attr("srcset") {
                if let Some(last) = srcset
                    .split(',')
                    .filter_map(|entry| entry.trim().split_whitespace().next())
                    .last()
                {
                    images.push(last.to_string());
                }
            }
        }
    }

    if let Some(img_sel) = selector("img[data-src]") {
        for img in html.select(&img_sel) {
            if let Some(src) = img.value().attr("data-src") {
                images.push(src.to_string());
            }
        }
    }

    images
}

/// Macy's product image classes, with the FPX width upgrade applied.
pub fn extract_macys(html: &Html, _base: &Url) -> Vec<String> {
    let mut images = Vec::new();
    let class_pattern = Regex::new(r"(?i)productImage|mainImage").unwrap();

    if let Some(img_sel) = selector("img") {
        for img in html.select(&img_sel) {
            if !class_pattern.is_match(&class_attr(&img)) {
                continue;
            }
            if let Some(src) = src_or_data_src(&img) {
                images.push(src.replace("_fpx.tif", "_fpx.tif?wid=1200"));
            }
        }
    }

    images
}

/// Zappos marks product images with `itemprop="image"` and keeps zoom
/// renditions in `data-zoom-image`.
pub fn extract_zappos(html: &Html, _base: &Url) -> Vec<String> {
    let mut images = Vec::new();

    if let Some(item_sel) = selector(r#"img[itemprop="image"]"#) {
        for img in html.select(&item_sel) {
            if let Some(src) = img.value().attr("src") {
                images.push(src.to_string());
            }
        }
    }

    if let Some(zoom_sel) = selector("img[data-zoom-image]") {
        for img in html.select(&zoom_sel) {
            if let Some(src) = img.value().attr("data-zoom-image") {
                images.push(src.to_string());
            }
        }
    }

    images
}

/// Amazon keeps original-resolution URLs in `data-old-hires` and
/// `data-a-hires`; classed product images are the fallback.
pub fn extract_amazon(html: &Html, _base: &Url) -> Vec<String> {
    let mut images = Vec::new();

    for attr in ["data-old-hires", "data-a-hires"] {
        if let Some(sel) = selector(&format!("img[{}]", attr)) {
            for img in html.select(&sel) {
                if let Some(src) = img.value().attr(attr) {
                    images.push(src.to_string());
                }
            }
        }
    }

    if images.is_empty() {
        let class_pattern = Regex::new(r"(?i)product|main").unwrap();
        if let Some(img_sel) = selector("img") {
            for img in html.select(&img_sel) {
                if !class_pattern.is_match(&class_attr(&img)) {
                    continue;
                }
                if let Some(src) = img.value().attr("src") {
                    if src.contains("images-amazon") {
                        images.push(src.to_string());
                    }
                }
            }
        }
    }

    images
}

/// Nike wraps product imagery in `picture` elements.
pub fn extract_nike(html: &Html, _base: &Url) -> Vec<String> {
    let mut images = Vec::new();

    if let Some(sel) = selector("picture img") {
        for img in html.select(&sel) {
            if let Some(src) = img.value().attr("src") {
                images.push(src.to_string());
            }
        }
    }

    images
}

/// Generic extraction for unknown sites: common product image markup first,
/// then any img large enough to plausibly be a product photo.
pub fn extract_generic(html: &Html, base: &Url) -> Vec<String> {
    let mut images = Vec::new();

    let patterns = [
        r#"img[itemprop="image"]"#.to_string(),
        "img[class*='product' i][class*='image' i]".to_string(),
        "img[class*='gallery' i][class*='image' i]".to_string(),
        "img[class*='zoom' i][class*='image' i]".to_string(),
        "img[id*='product' i][id*='image' i]".to_string(),
    ];

    for pattern in &patterns {
        if let Some(sel) = selector(pattern) {
            for img in html.select(&sel) {
                let src = src_or_data_src(&img).or_else(|| img.value().attr("data-zoom-image"));
                if let Some(src) = src {
                    if let Some(resolved) = resolve_image_url(src, base) {
                        images.push(resolved);
                    }
                }
            }
        }
    }

    if images.is_empty() {
        if let Some(img_sel) = selector("img[src]") {
            for img in html.select(&img_sel) {
                let src = img.value().attr("src").unwrap_or("");
                if src.starts_with("http") && !too_small(&img, 200) {
                    images.push(src.to_string());
                }
            }
        }
    }

    images
}
