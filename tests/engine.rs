//! End-to-end engine tests over a stub transport. No network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use apparelscrape::engine::{EngineSettings, ImageScraper};
use apparelscrape::extract::ExtractorRegistry;
use apparelscrape::http::{RequestConfig, Transport, TransportError, WireRequest, WireResponse};
use apparelscrape::models::{Item, ItemStatus};

/// Serves canned responses by URL substring; anything unmatched is a 404.
/// Records every URL it was asked for.
struct StubTransport {
    routes: Vec<(String, WireResponse)>,
    calls: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl StubTransport {
    fn new() -> Self {
        Self {
            routes: Vec::new(),
            calls: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    fn html(mut self, url_fragment: &str, body: &str) -> Self {
        self.routes.push((
            url_fragment.to_string(),
            WireResponse {
                status: 200,
                content_type: Some("text/html".to_string()),
                body: body.as_bytes().to_vec(),
            },
        ));
        self
    }

    fn image(mut self, url_fragment: &str, bytes: &[u8]) -> Self {
        self.routes.push((
            url_fragment.to_string(),
            WireResponse {
                status: 200,
                content_type: Some("image/jpeg".to_string()),
                body: bytes.to_vec(),
            },
        ));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn execute(&self, request: &WireRequest) -> Result<WireResponse, TransportError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(request.url.clone());
        for (fragment, response) in &self.routes {
            if request.url.contains(fragment) {
                return Ok(response.clone());
            }
        }
        Ok(WireResponse {
            status: 404,
            content_type: None,
            body: Vec::new(),
        })
    }
}

fn settings(dir: &std::path::Path) -> EngineSettings {
    EngineSettings {
        output_dir: dir.to_path_buf(),
        request: RequestConfig {
            timeout: Duration::from_secs(1),
            request_delay: Duration::ZERO,
            retry_attempts: 3,
            retry_backoff: Duration::ZERO,
        },
        log_path: None,
    }
}

fn scraper_with(
    transport: Arc<StubTransport>,
    dir: &std::path::Path,
) -> ImageScraper {
    ImageScraper::with_transport(transport, settings(dir)).unwrap()
}

#[tokio::test]
async fn invalid_item_makes_no_network_calls() {
    let dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(StubTransport::new());
    let scraper = scraper_with(transport.clone(), dir.path());

    let item = Item::default();
    let result = scraper.process_item(&item).await;

    assert!(result.is_err());
    assert_eq!(transport.call_count.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fallthrough_to_retailer_attributes_success_log() {
    // Google strategies come back empty; Zappos search finds a product
    // page carrying two images.
    let product_page = r#"<html><body>
        <img itemprop="image" src="https://m.media.zappos.test/one.jpg">
        <img itemprop="image" src="https://m.media.zappos.test/two.jpg">
        </body></html>"#;
    let search_page = r#"<html><body>
        <a href="/p/nike-air-max-90/12345">Nike Air Max 90</a>
        </body></html>"#;

    let transport = Arc::new(
        StubTransport::new()
            .html("tbm=shop", "<html><body>nothing here</body></html>")
            .html("tbm=isch", "<html><body>nothing here</body></html>")
            .html("zappos.com/search", search_page)
            .html("zappos.com/p/", product_page)
            .image("media.zappos.test/one.jpg", b"jpegbytes-one")
            .image("media.zappos.test/two.jpg", b"jpegbytes-two"),
    );

    let dir = tempfile::tempdir().unwrap();
    let scraper = scraper_with(transport.clone(), dir.path());

    let item = Item {
        brand: Some("Nike".to_string()),
        model: Some("Air Max 90".to_string()),
        max_images: 2,
        ..Default::default()
    };
    let outcome = scraper.process_item(&item).await.unwrap();

    assert_eq!(outcome.status, ItemStatus::Satisfied);
    assert_eq!(outcome.files.len(), 2);
    assert!(outcome
        .results
        .iter()
        .all(|r| r.strategy == "retailer:Zappos"));

    let success_log =
        std::fs::read_to_string(dir.path().join("scraper_SUCCESS_ONLY.log")).unwrap();
    assert_eq!(success_log.matches("[SUCCESS]").count(), 2);
    assert!(success_log.contains("retailer:Zappos"));
    assert!(success_log.contains("https://m.media.zappos.test/one.jpg"));
}

#[tokio::test]
async fn exhausted_when_candidates_run_out() {
    // Five candidates, three of which download; the other two 404.
    let shopping_page = r#"<html><body>
        <img src="https://cdn-a.test/img/alpha.jpg">
        <img src="https://cdn-b.test/img/bravo.jpg">
        <img src="https://cdn-c.test/img/charlie.jpg">
        <img src="https://cdn-d.test/img/delta.jpg">
        <img src="https://cdn-e.test/img/echo.jpg">
        </body></html>"#;

    let transport = Arc::new(
        StubTransport::new()
            .html("tbm=shop", shopping_page)
            .html("tbm=isch", "<html></html>")
            .image("cdn-a.test", b"bytes-alpha")
            .image("cdn-c.test", b"bytes-charlie")
            .image("cdn-e.test", b"bytes-echo"),
    );

    let dir = tempfile::tempdir().unwrap();
    let scraper = scraper_with(transport.clone(), dir.path());

    let item = Item {
        brand: Some("Acme".to_string()),
        color: Some("Red".to_string()),
        max_images: 5,
        ..Default::default()
    };
    let outcome = scraper.process_item(&item).await.unwrap();

    assert_eq!(outcome.status, ItemStatus::Exhausted);
    assert_eq!(outcome.files.len(), 3);
    assert_eq!(outcome.results.iter().filter(|r| !r.success).count(), 2);
}

#[tokio::test]
async fn not_found_when_no_strategy_yields_candidates() {
    let transport = Arc::new(StubTransport::new());
    let dir = tempfile::tempdir().unwrap();
    let scraper = scraper_with(transport.clone(), dir.path());

    let item = Item {
        brand: Some("Obscurio".to_string()),
        ..Default::default()
    };
    let outcome = scraper.process_item(&item).await.unwrap();

    assert_eq!(outcome.status, ItemStatus::NotFound);
    assert!(outcome.files.is_empty());
}

#[tokio::test]
async fn filenames_are_deterministic_and_reruns_overwrite() {
    let shopping_page = r#"<html><body>
        <img src="https://cdn.levis.test/front.jpg">
        <img src="https://cdn.levis.test/back.jpg">
        <img src="https://cdn.levis.test/side.jpg">
        </body></html>"#;

    let transport = Arc::new(
        StubTransport::new()
            .html("tbm=shop", shopping_page)
            .image("front.jpg", b"front-bytes")
            .image("back.jpg", b"back-bytes")
            .image("side.jpg", b"side-bytes"),
    );

    let dir = tempfile::tempdir().unwrap();
    let scraper = scraper_with(transport.clone(), dir.path());

    let item = Item {
        brand: Some("Levi's".to_string()),
        model: Some("501".to_string()),
        color: Some("Blue".to_string()),
        max_images: 3,
        ..Default::default()
    };

    let first = scraper.process_item(&item).await.unwrap();
    let second = scraper.process_item(&item).await.unwrap();

    let names: Vec<String> = first
        .files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "Levi's_501_Blue - 1.jpg".to_string(),
            "Levi's_501_Blue - 2.jpg".to_string(),
            "Levi's_501_Blue - 3.jpg".to_string(),
        ]
    );
    assert_eq!(first.files, second.files);

    // Reruns overwrite; image files never accumulate.
    let image_count = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().map(|x| x == "jpg").unwrap_or(false))
        .count();
    assert_eq!(image_count, 3);
}

#[tokio::test]
async fn query_variants_of_same_image_downloaded_once() {
    let shopping_page = r#"<html><body>
        <img src="https://cdn.x.test/img/shoe.jpg?utm_source=newsletter">
        <img src="https://cdn.x.test/img/shoe.jpg">
        </body></html>"#;

    let transport = Arc::new(
        StubTransport::new()
            .html("tbm=shop", shopping_page)
            .image("cdn.x.test", b"shoe-bytes"),
    );

    let dir = tempfile::tempdir().unwrap();
    let scraper = scraper_with(transport.clone(), dir.path());

    let item = Item {
        brand: Some("Acme".to_string()),
        max_images: 5,
        ..Default::default()
    };
    let outcome = scraper.process_item(&item).await.unwrap();

    assert_eq!(outcome.files.len(), 1);
    let image_fetches = transport
        .calls()
        .iter()
        .filter(|url| url.contains("cdn.x.test"))
        .count();
    assert_eq!(image_fetches, 1);
}

#[tokio::test]
async fn registered_site_rule_is_dispatched() {
    // A site that stashes its product image where no built-in rule or
    // structured-data probe looks.
    fn extract_lookbook(html: &scraper::Html, _base: &url::Url) -> Vec<String> {
        let sel = scraper::Selector::parse("div[data-frames]").unwrap();
        html.select(&sel)
            .filter_map(|div| div.value().attr("data-frames"))
            .map(str::to_string)
            .collect()
    }

    let product_page = r#"<html><body>
        <div class="media-strip" data-frames="https://cdn.lookbook.test/frame.jpg"></div>
        </body></html>"#;

    let transport = Arc::new(
        StubTransport::new()
            .html("lookbook.test/item", product_page)
            .image("cdn.lookbook.test", b"frame-bytes"),
    );

    let dir = tempfile::tempdir().unwrap();
    let mut registry = ExtractorRegistry::builtin();
    registry.register("lookbook.test", extract_lookbook);
    let scraper = ImageScraper::with_transport(transport.clone(), settings(dir.path()))
        .unwrap()
        .with_registry(registry);

    let item = Item {
        url: Some("https://www.lookbook.test/item/coat-7".to_string()),
        max_images: 1,
        ..Default::default()
    };
    let outcome = scraper.process_item(&item).await.unwrap();

    assert_eq!(outcome.status, ItemStatus::Satisfied);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(
        outcome.results[0].source_url,
        "https://cdn.lookbook.test/frame.jpg"
    );
}

#[tokio::test]
async fn per_item_target_directories_share_one_engine() {
    let shopping_page = r#"<html><body>
        <img src="https://cdn.shared.test/look.jpg">
        </body></html>"#;

    let transport = Arc::new(
        StubTransport::new()
            .html("tbm=shop", shopping_page)
            .image("cdn.shared.test", b"look-bytes"),
    );

    let root = tempfile::tempdir().unwrap();
    let scraper = scraper_with(transport.clone(), root.path());

    let coats_dir = root.path().join("coats");
    let boots_dir = root.path().join("boots");

    let coat = Item {
        brand: Some("Acme".to_string()),
        style: Some("Coat".to_string()),
        max_images: 1,
        ..Default::default()
    };
    let boot = Item {
        brand: Some("Acme".to_string()),
        style: Some("Boot".to_string()),
        max_images: 1,
        ..Default::default()
    };

    let first = scraper.process_item_into(&coat, &coats_dir).await.unwrap();
    let second = scraper.process_item_into(&boot, &boots_dir).await.unwrap();

    assert_eq!(first.files, vec![coats_dir.join("Acme_Coat - 1.jpg")]);
    assert_eq!(second.files, vec![boots_dir.join("Acme_Boot - 1.jpg")]);
    assert!(coats_dir.join("Acme_Coat - 1.jpg").is_file());
    assert!(boots_dir.join("Acme_Boot - 1.jpg").is_file());
}

#[tokio::test]
async fn direct_url_skips_search_entirely() {
    let product_page = r#"<html><body>
        <meta property="og:image" content="https://cdn.shop.test/dress.jpg">
        </body></html>"#;

    let transport = Arc::new(
        StubTransport::new()
            .html("boutique.test/product", product_page)
            .image("cdn.shop.test", b"dress-bytes"),
    );

    let dir = tempfile::tempdir().unwrap();
    let scraper = scraper_with(transport.clone(), dir.path());

    let item = Item {
        brand: Some("Label".to_string()),
        url: Some("https://www.boutique.test/product/dress-1".to_string()),
        max_images: 1,
        ..Default::default()
    };
    let outcome = scraper.process_item(&item).await.unwrap();

    assert_eq!(outcome.status, ItemStatus::Satisfied);
    assert!(outcome.results.iter().all(|r| r.strategy == "direct_url"));
    assert!(transport
        .calls()
        .iter()
        .all(|url| !url.contains("google.com")));
}
