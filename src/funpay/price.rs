use itertools::Itertools;
use lazy_regex::regex;
use std::num::{IntErrorKind, ParseIntError};

/// Reads a rouble amount out of a price label.
///
/// A number directly followed by `руб`, `₽` or `р.` wins, with thousands
/// separators (plain or non-breaking spaces) dropped. Without such a marker
/// every digit in the label is concatenated, so `"2 3 0 0 0 coins"` reads as
/// `23000`. Returns `Ok(None)` when the label has no digits at all.
///
/// Any other whitespace inside the number next to the marker (a tab, a line
/// break, a thin space) makes the label an error. Digit runs too long for a
/// `u64` saturate to `u64::MAX`.
pub fn parse_price(text: &str) -> Result<Option<u64>, ParseIntError> {
    if let Some(caps) = regex!(r"([0-9]+\s*[0-9]*)\s*(?:руб|₽|р\.)").captures(text) {
        let digits = caps[1].replace([' ', '\u{a0}'], "");
        return parse_digits(&digits).map(Some);
    }

    let compact = text.replace(' ', "");
    let digits = regex!(r"[0-9]+")
        .find_iter(&compact)
        .map(|m| m.as_str())
        .join("");
    if digits.is_empty() {
        return Ok(None);
    }
    parse_digits(&digits).map(Some)
}

fn parse_digits(digits: &str) -> Result<u64, ParseIntError> {
    match digits.parse::<u64>() {
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(u64::MAX),
        res => res,
    }
}
