mod extractor;
mod price;

pub use extractor::{CardOutcome, CardStructure, FunPayExtractor};
pub use price::parse_price;

use serde::Serialize;
use std::fmt;

pub const BASE_URL: &str = "https://funpay.com";
pub const LISTING_URL: &str = "https://funpay.com/chips/186/";

/// Cards past this index are never looked at.
pub const MAX_CARDS: usize = 30;
pub const MAX_TITLE_CHARS: usize = 100;
pub const MIN_PRICE: u64 = 10;
pub const MAX_PRICE: u64 = 50_000;

/// Lower-case substrings a title must contain one of.
pub const KEYWORDS: [&str; 4] = ["black russia", "blackrussia", "блек раша", "блэк раша"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lot {
    pub title: String,
    pub price: u64,
    pub link: String,
    pub seller_online: bool,
    pub seller_id: String,
    pub raw_price_text: String,
}

impl fmt::Display for Lot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title           : {}", self.title)?;
        writeln!(
            f,
            "Price           : {} руб. ({})",
            self.price, self.raw_price_text
        )?;
        writeln!(
            f,
            "Seller          : {}",
            if self.seller_online {
                "online"
            } else {
                "offline"
            }
        )?;
        if self.seller_id.is_empty() {
            writeln!(f, "Seller ID       : None")?;
        } else {
            writeln!(f, "Seller ID       : {}", self.seller_id)?;
        }
        writeln!(f, "Link            : {}", self.link)?;

        Ok(())
    }
}
