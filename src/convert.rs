//! Unit-to-peso conversion and es-UY amount formatting
//!
//! `convert` is deliberately permissive: anything that does not parse as a
//! finite number counts as zero units. Rounding only happens when formatting,
//! and midpoints round away from zero the way es-UY locale output does.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Converts a raw unit amount to pesos at `rate`.
///
/// Unparsable, empty or non-finite input counts as `0`. With no rate the
/// result is `0`.
pub fn convert(raw: &str, rate: Option<f64>) -> f64 {
    let Some(rate) = rate else {
        return 0.0;
    };
    parse_amount(raw) * rate
}

/// Parses user input as a decimal amount, falling back to `0`
pub fn parse_amount(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Formats a peso amount as `$ 174.725,00`
pub fn format_pesos(amount: f64) -> String {
    format!("$ {}", format_es_uy(amount, 2, 2))
}

/// Formats a unit rate keeping up to four decimals, e.g. `$ 6,2323`
pub fn format_rate(rate: f64) -> String {
    format!("$ {}", format_es_uy(rate, 2, 4))
}

/// Formats `value` with `.` thousands separators and a `,` decimal mark,
/// using between `min_decimals` and `max_decimals` fraction digits
fn format_es_uy(value: f64, min_decimals: u32, max_decimals: u32) -> String {
    let mut rounded = Decimal::from_f64(value)
        .unwrap_or_default()
        .round_dp_with_strategy(max_decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(max_decimals);

    let fixed = rounded.abs().to_string();
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.to_string();
    while frac.len() > min_decimals as usize && frac.ends_with('0') {
        frac.pop();
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    if frac.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{},{}", sign, group_thousands(int_part), frac)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    grouped
}
