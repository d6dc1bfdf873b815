//! Money amounts as rendered by the storefront.
//!
//! Schema returns amounts as JSON numbers (occasionally as numeric strings).
//! Amounts are carried as [`Decimal`] so formatting never goes through binary
//! floating point.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

/// Read a decimal amount from a JSON value.
///
/// Accepts JSON numbers and numeric strings. Returns `None` for anything else.
#[must_use]
pub fn amount_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64().and_then(|f| Decimal::try_from(f).ok())
            }
        }
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Format an amount as US dollars: `$` + two decimals with thousands separators.
///
/// Midpoints round away from zero. The sign follows the symbol (`$-5.00`).
///
/// ```
/// use rust_decimal::Decimal;
/// use schema_storefront_core::format_usd;
///
/// assert_eq!(format_usd(Decimal::new(123_456_789, 2)), "$1,234,567.89");
/// assert_eq!(format_usd(Decimal::ZERO), "$0.00");
/// ```
#[must_use]
pub fn format_usd(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };

    let fixed = format!("{:.2}", rounded.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    format!("${sign}{}.{cents}", group_thousands(whole))
}

/// Insert `,` between every group of three digits.
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_format_small_amounts() {
        assert_eq!(format_usd(Decimal::new(5, 0)), "$5.00");
        assert_eq!(format_usd(Decimal::new(1999, 2)), "$19.99");
        assert_eq!(format_usd(Decimal::new(999, 3)), "$1.00");
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(format_usd(Decimal::new(1000, 0)), "$1,000.00");
        assert_eq!(format_usd(Decimal::new(100_000, 0)), "$100,000.00");
        assert_eq!(format_usd(Decimal::new(123_456_750, 2)), "$1,234,567.50");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_usd(Decimal::new(-500, 2)), "$-5.00");
        assert_eq!(format_usd(Decimal::new(-1, 3)), "$0.00");
    }

    #[test]
    fn test_amount_from_value() {
        assert_eq!(amount_from_value(&json!(12)), Some(Decimal::new(12, 0)));
        assert_eq!(amount_from_value(&json!("4.25")), Some(Decimal::new(425, 2)));
        assert_eq!(amount_from_value(&json!(2.5)), Some(Decimal::new(25, 1)));
        assert_eq!(amount_from_value(&json!("n/a")), None);
        assert_eq!(amount_from_value(&json!(null)), None);
        assert_eq!(amount_from_value(&json!({"amount": 1})), None);
    }
}
