pub mod batch;
pub mod scrape;
