use scraper::Html;
use std::fmt;
use tracing::{error, info, warn};

pub mod fetch;
pub mod funpay;
pub mod web;

mod error;

pub use error::HunterError;
pub use fetch::HttpFetcher;

/// A fetched listing page, alive for one request.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub url: String,
    pub status: u16,
    pub body: String,
}

#[async_trait::async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ListingPage, HunterError>;
}

pub trait Extractor {
    type Item;
    type Snapshot: fmt::Display;

    fn extract(&self, doc: &Html) -> Vec<Self::Item>;
    fn inspect(&self, doc: &Html) -> Option<Self::Snapshot>;
}

/// Fetches `url` once and extracts its items.
///
/// Never fails: a fetch error is logged and yields an empty list.
pub async fn run_parse<S, E>(source: &S, extractor: &E, url: &str) -> Vec<E::Item>
where
    S: PageSource + ?Sized,
    E: Extractor,
{
    info!("Parsing listing {}", url);

    let page = match source.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            error!("Fetch failed: {}", e);
            return vec![];
        }
    };

    let doc = Html::parse_document(&page.body);
    extractor.extract(&doc)
}

/// Fetches `url` once and logs the layout of its first card.
///
/// Returns `false` only when the page could not be fetched.
pub async fn run_inspect<S, E>(source: &S, extractor: &E, url: &str) -> bool
where
    S: PageSource + ?Sized,
    E: Extractor,
{
    info!("Inspecting page structure of {}", url);

    let page = match source.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            error!("Structure inspection failed: {}", e);
            return false;
        }
    };

    let doc = Html::parse_document(&page.body);
    match extractor.inspect(&doc) {
        Some(card) => info!("First card structure:\n{}", card),
        None => warn!("No product cards on {} (status {})", page.url, page.status),
    }

    true
}
