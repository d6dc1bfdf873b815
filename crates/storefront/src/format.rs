//! Presentation helpers for record values.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use schema_storefront_core::{amount_from_value, format_usd};
use serde_json::Value;

/// HTML-escape text for output in markup.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Format the amount at a dotted `path` in `record` as dollars.
///
/// Renders `$0.00` when the path does not lead to a number.
///
/// ```
/// use schema_storefront::format::currency;
/// use serde_json::json;
///
/// let cart = json!({"shipping": {"price": 1234.5}});
/// assert_eq!(currency(&cart, "shipping.price"), "$1,234.50");
/// assert_eq!(currency(&cart, "billing.price"), "$0.00");
/// ```
#[must_use]
pub fn currency(record: &Value, path: &str) -> String {
    let amount = path
        .split('.')
        .try_fold(record, |value, key| match value {
            Value::Object(map) => map.get(key),
            Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .and_then(amount_from_value)
        .unwrap_or_default();

    format_usd(amount)
}

/// Format a date as `YYYY-MM-DD`.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS`, bare dates, and unix
/// seconds. Returns an empty string for anything else.
#[must_use]
pub fn date(value: &str) -> String {
    parse_date(value.trim()).map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    value
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.date_naive())
}
