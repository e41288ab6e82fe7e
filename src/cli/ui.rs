use crate::core::QuotationState;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::{Decimal, RoundingStrategy};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Success,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Success => style(text).green().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled label cell for the quotation card.
pub fn label_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats a price with four fixed decimal places.
pub fn format_price(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.4}")
}

/// Renders the quotation card: currency, base quotation, spread input and the
/// derived price.
pub fn quotation_card(
    label: &str,
    currency_symbol: &str,
    state: &QuotationState,
    spread_input: &str,
) -> Table {
    let mut table = new_styled_table();

    let quotation = state
        .base_price()
        .map_or(Cell::new("…").fg(Color::DarkGrey), |price| {
            Cell::new(format_price(price))
        });
    let spread = if spread_input.is_empty() {
        Cell::new("0.5").fg(Color::DarkGrey)
    } else {
        Cell::new(spread_input)
    };
    let price = Cell::new(format!(
        "{} {}",
        currency_symbol,
        format_price(state.value_to_copy())
    ))
    .add_attribute(Attribute::Bold)
    .fg(Color::Green);

    table.add_row(vec![label_cell("Currency"), Cell::new(label)]);
    table.add_row(vec![
        label_cell("Quotation"),
        quotation.set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        label_cell("Spread (%)"),
        spread.set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        label_cell("Price"),
        price.set_alignment(CellAlignment::Right),
    ]);
    table
}

/// Creates a new `indicatif::ProgressBar` spinner with standard styling.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
