use super::{
    parse_price, Lot, BASE_URL, KEYWORDS, MAX_CARDS, MAX_PRICE, MAX_TITLE_CHARS, MIN_PRICE,
};
use crate::{Extractor, HunterError};
use itertools::Itertools;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use tracing::{debug, info, warn};

const E: &str = "Invalid selector";
lazy_static! {
    static ref CARD: Selector = Selector::parse("a.tc-item").expect(E);
    static ref TITLE: Selector = Selector::parse("div.tc-desc-text").expect(E);
    static ref PRICE: Selector = Selector::parse("div.tc-price").expect(E);
}

/// What happened to a single `a.tc-item` card.
#[derive(Debug)]
pub enum CardOutcome {
    Accepted(Lot),
    MissingField(&'static str),
    NoKeyword,
    UnparsablePrice,
    OutOfRange(u64),
    Failed(HunterError),
}

/// Snapshot of the first card on a page, used to recalibrate the selectors
/// when the site markup changes.
#[derive(Debug, PartialEq, Eq)]
pub struct CardStructure {
    pub classes: Vec<String>,
    pub data_attributes: Vec<(String, String)>,
    pub title: Option<String>,
    pub price_html: Option<String>,
    pub price_text: Option<String>,
}

impl fmt::Display for CardStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Classes         : {}", self.classes.join(" "))?;
        for (name, value) in &self.data_attributes {
            writeln!(f, "{:<16}: {}", name, value)?;
        }
        writeln!(
            f,
            "Title           : {}",
            self.title.as_deref().unwrap_or("None")
        )?;
        writeln!(
            f,
            "Price HTML      : {}",
            self.price_html.as_deref().unwrap_or("None")
        )?;
        if let Some(text) = self.price_text.as_ref() {
            writeln!(f, "Price text      : '{}'", text)?;
        } else {
            writeln!(f, "Price text      : None")?;
        }

        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FunPayExtractor;

impl FunPayExtractor {
    pub fn evaluate_card(&self, card: ElementRef<'_>) -> CardOutcome {
        let Some(title_el) = card.select(&TITLE).next() else {
            return CardOutcome::MissingField("title");
        };
        let title = element_text(title_el);

        let title_lower = title.to_lowercase();
        if !KEYWORDS.iter().any(|k| title_lower.contains(k)) {
            return CardOutcome::NoKeyword;
        }

        let Some(price_el) = card.select(&PRICE).next() else {
            return CardOutcome::MissingField("price");
        };
        let price_text = element_text(price_el);

        let price = match parse_price(&price_text) {
            Ok(Some(price)) => price,
            Ok(None) => return CardOutcome::UnparsablePrice,
            Err(e) => return CardOutcome::Failed(e.into()),
        };
        if !(MIN_PRICE..=MAX_PRICE).contains(&price) {
            return CardOutcome::OutOfRange(price);
        }

        let card = card.value();
        let link = resolve_link(card.attr("href").unwrap_or_default());
        let seller_online = card.attr("data-online") == Some("1");
        let seller_id = card.attr("data-user").unwrap_or_default().to_string();

        CardOutcome::Accepted(Lot {
            title: truncate_chars(&title, MAX_TITLE_CHARS),
            price,
            link,
            seller_online,
            seller_id,
            raw_price_text: price_text,
        })
    }
}

impl Extractor for FunPayExtractor {
    type Item = Lot;
    type Snapshot = CardStructure;

    fn extract(&self, doc: &Html) -> Vec<Self::Item> {
        let cards = doc.select(&CARD).collect::<Vec<_>>();
        info!("Found {} product cards", cards.len());

        let mut lots = vec![];
        for card in cards.into_iter().take(MAX_CARDS) {
            match self.evaluate_card(card) {
                CardOutcome::Accepted(lot) => {
                    info!(
                        "Accepted '{}' - {} руб. | {}",
                        truncate_chars(&lot.title, 50),
                        lot.price,
                        if lot.seller_online {
                            "online"
                        } else {
                            "offline"
                        }
                    );
                    lots.push(lot);
                }
                CardOutcome::Failed(e) => {
                    warn!("Skipping card: {}", e);
                }
                skipped => {
                    debug!("Skipping card: {:?}", skipped);
                }
            }
        }

        info!("Black Russia lots found: {}", lots.len());
        lots
    }

    fn inspect(&self, doc: &Html) -> Option<CardStructure> {
        let card = doc.select(&CARD).next()?;

        let classes = card.value().classes().map(ToString::to_string).collect();
        // Attribute storage is unordered.
        let data_attributes = card
            .value()
            .attrs()
            .filter(|(name, _)| name.starts_with("data-"))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .sorted()
            .collect();
        let title = card
            .select(&TITLE)
            .next()
            .map(|el| truncate_chars(&element_text(el), MAX_TITLE_CHARS));
        let price_el = card.select(&PRICE).next();

        Some(CardStructure {
            classes,
            data_attributes,
            title,
            price_html: price_el.map(|el| el.html()),
            price_text: price_el.map(element_text),
        })
    }
}

/// Text of every descendant text node, each trimmed, glued together.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

fn resolve_link(href: &str) -> String {
    if href.starts_with('/') {
        format!("{}{}", BASE_URL, href)
    } else {
        href.to_string()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
