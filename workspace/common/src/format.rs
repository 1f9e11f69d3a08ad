//! Display formatting for dashboard figures.
//!
//! Every helper follows one fixed regional convention: Ugandan shillings,
//! `,` as the digit group separator and day-month-year dates. Grouping and
//! the shilling symbol come from `rusty_money`'s UGX currency.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::*;
use rusty_money::{Formatter, Money, Params, Position, iso};

/// Currency code printed in front of abbreviated stat amounts.
pub const CURRENCY_CODE: &str = "UGX";

/// Plain numbers keep at most this many fractional digits.
const MAX_FRACTION_DIGITS: u32 = 3;

/// How a live stat is rendered on its stat card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFormat {
    /// `UGX 2.5M`
    Millions,
    /// `87%`
    Percentage,
    /// `12,345`
    Plain,
}

impl StatFormat {
    /// Picks the format from the stat key by substring match.
    ///
    /// `revenue` is checked first, so `revenue_rate` renders as millions.
    pub fn for_key(key: &str) -> Self {
        if key.contains("revenue") {
            StatFormat::Millions
        } else if key.contains("rate") || key.contains("percentage") {
            StatFormat::Percentage
        } else {
            StatFormat::Plain
        }
    }

    pub fn apply(self, value: f64) -> String {
        match self {
            StatFormat::Millions => format_millions(value),
            StatFormat::Percentage => format!("{}%", plain_number(value)),
            StatFormat::Plain => format_number(value),
        }
    }
}

/// Formats a live stat for display on the card tagged with `key`.
pub fn format_stat_value(key: &str, value: f64) -> String {
    StatFormat::for_key(key).apply(value)
}

/// Abbreviates an amount to millions with one decimal place, e.g. `UGX 1.2M`.
pub fn format_millions(value: f64) -> String {
    format!("{} {}M", CURRENCY_CODE, to_fixed(value / 1_000_000.0, 1))
}

/// Formats a number with `,` grouping and up to three fractional digits.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let symbol = if value > 0.0 { "∞" } else { "-∞" };
        return symbol.to_string();
    }

    let Some(decimal) = Decimal::from_f64_retain(value) else {
        // Outside the Decimal range; grouping such magnitudes is not useful.
        return value.to_string();
    };
    let rounded = decimal
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    if rounded.is_zero() {
        return "0".to_string();
    }

    let mut out = String::new();
    if rounded.is_sign_negative() {
        out.push('-');
    }
    out.push_str(&grouped_integer(rounded.trunc().abs()));
    let fraction = rounded.fract().abs().to_string();
    if let Some(digits) = fraction.strip_prefix("0.") {
        out.push('.');
        out.push_str(digits);
    }
    out
}

/// Formats an amount as whole Ugandan shillings, e.g. `USh 1,234,567`.
pub fn format_currency(amount: f64) -> String {
    let Some(decimal) = Decimal::from_f64_retain(amount) else {
        return format!("{} {}", iso::UGX.symbol, amount);
    };

    let rounded = decimal.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    let params = Params {
        positions: vec![Position::Sign, Position::Symbol, Position::Space, Position::Amount],
        rounding: Some(0),
        symbol: Some(iso::UGX.symbol),
        ..Params::default()
    };
    Formatter::money(&Money::from_decimal(rounded, iso::UGX), params)
}

/// Formats a date string as a short day-month-year date, e.g. `15 Jan 2024`.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DDTHH:MM:SS`. The
/// calendar date is taken as written, without converting time zones.
pub fn format_date(input: &str) -> Result<String, String> {
    parse_date(input).map(format_naive_date)
}

pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

fn parse_date(input: &str) -> Result<NaiveDate, String> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Ok(timestamp.date());
        }
    }

    Err(format!("Failed to parse date '{}'", input))
}

/// Renders a number the way string interpolation does: integral values
/// without a decimal point, everything else in shortest round-trip form.
fn plain_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let symbol = if value > 0.0 { "Infinity" } else { "-Infinity" };
        symbol.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}

/// Fixed-point rendering of the float's exact value, ties away from zero.
fn to_fixed(value: f64, digits: u32) -> String {
    match Decimal::from_f64_retain(value) {
        Some(decimal) => {
            let mut rounded =
                decimal.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
            rounded.rescale(digits);
            rounded.to_string()
        }
        None => format!("{:.*}", digits as usize, value),
    }
}

/// `,`-grouped digits of a non-negative integral amount.
fn grouped_integer(integer: Decimal) -> String {
    let params = Params {
        positions: vec![Position::Amount],
        rounding: Some(0),
        ..Params::default()
    };
    Formatter::money(&Money::from_decimal(integer, iso::UGX), params)
}
