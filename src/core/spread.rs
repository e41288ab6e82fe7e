//! Spread parsing and the derived display value

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses user-entered spread text as a percentage.
///
/// Surrounding whitespace is ignored and empty input counts as zero. Plain and
/// scientific notation are both accepted. Returns `None` for anything that is not
/// a number, including digit separators such as `1_000`.
pub fn parse_spread(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Decimal::ZERO);
    }
    if text.contains('_') {
        return None;
    }

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Applies a percentage spread to a price: `price * (1 + spread / 100)`.
///
/// A zero spread yields `price` unchanged. Arithmetic overflow also falls back to `price`.
pub fn apply_spread(price: Decimal, spread: Decimal) -> Decimal {
    if spread.is_zero() {
        return price;
    }

    spread
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|pct| Decimal::ONE.checked_add(pct))
        .and_then(|factor| price.checked_mul(factor))
        .unwrap_or(price)
}

/// Value shown to the user for the given base price and raw spread text.
pub fn displayed_value(price: Decimal, spread_text: &str) -> Decimal {
    match parse_spread(spread_text) {
        Some(spread) => apply_spread(price, spread),
        None => price,
    }
}
