//! Presentation helpers shared by the pages.
//!
//! Numbers follow the browser conventions the dashboard was designed around:
//! counts use `1,234,567` grouping, money is rupiah with `.` grouping and no
//! fraction digits.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::SyncStatus;

/// Placeholder for a missing value.
pub const DASH: &str = "-";

/// Returns the value or the placeholder dash.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or(DASH)
}

/// JavaScript `Number(value)` semantics; `None` stands for `NaN`.
pub fn js_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok().filter(|f| f.is_finite())
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// `Number(value) || 0`: anything non-numeric counts as zero.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    value.and_then(js_number).unwrap_or(0.0)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}

/// Formats a count with thousands separators, keeping up to three fraction digits.
pub fn format_number(n: f64) -> String {
    let sign = if n < 0.0 { "-" } else { "" };
    let rounded = format!("{:.3}", n.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac = frac_part.trim_end_matches('0');
    let mut out = format!("{}{}", sign, group_digits(int_part, ','));
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Formats a KPI value: numbers grouped, other values as text, missing as a dash.
pub fn format_maybe_number(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => DASH.to_string(),
        Some(Value::Number(n)) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Formats an amount as Indonesian rupiah without fraction digits.
///
/// Missing or empty values render as a dash; values that are not numeric
/// render as their own text.
pub fn format_money(value: Option<&Value>) -> String {
    let value = match value {
        None | Some(Value::Null) => return DASH.to_string(),
        Some(Value::String(s)) if s.is_empty() => return DASH.to_string(),
        Some(v) => v,
    };
    match js_number(value) {
        Some(n) => format_rupiah(n),
        None => match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    }
}

/// Formats a number as rupiah, e.g. `Rp 1.500.000`.
pub fn format_rupiah(n: f64) -> String {
    let rounded = n.abs().round();
    let digits = format!("{:.0}", rounded);
    let sign = if n < 0.0 && rounded > 0.0 { "-" } else { "" };
    format!("{}Rp {}", sign, group_digits(&digits, '.'))
}

/// Renders an RFC 3339 timestamp in UTC; anything unparsable is shown as-is.
pub fn format_timestamp(value: Option<&str>) -> String {
    match value {
        None => DASH.to_string(),
        Some(s) if s.trim().is_empty() => DASH.to_string(),
        Some(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| {
                dt.with_timezone(&Utc)
                    .format("%Y-%m-%d %H:%M:%S UTC")
                    .to_string()
            })
            .unwrap_or_else(|_| s.to_string()),
    }
}

/// CSS class of the sync-status badge.
pub fn badge_class(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Ok => "badge badge-ok",
        SyncStatus::Warn => "badge badge-warn",
        SyncStatus::Bad | SyncStatus::Unknown => "badge badge-bad",
    }
}

/// Pretty-prints a JSON value with two-space indentation.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Sorts a `key -> count` breakdown by count, largest first.
pub fn sorted_breakdown(map: &serde_json::Map<String, Value>) -> Vec<(String, Value)> {
    let mut entries: Vec<(String, Value)> =
        map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    entries.sort_by(|a, b| {
        coerce_number(Some(&b.1))
            .partial_cmp(&coerce_number(Some(&a.1)))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries
}

/// Escapes text for inclusion in HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
