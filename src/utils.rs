//! Small helpers: defensive coercion of untrusted values, rounding, date keys.

use serde_json::Value;

use crate::types::Currency;

/// Coerce a decoded value to a finite number, or `fallback`.
///
/// Numbers pass through, numeric strings are parsed. `null`, missing,
/// booleans, arrays, objects and anything non-finite yield `fallback`.
pub fn to_number(value: Option<&Value>, fallback: f64) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() => n,
        _ => fallback,
    }
}

pub fn finite_or(x: f64, fallback: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        fallback
    }
}

/// Round money to cents. Non-finite input is returned unchanged.
pub fn round2(x: f64) -> f64 {
    if !x.is_finite() {
        return x;
    }
    let r = (x * 100.0).round() / 100.0;
    // avoid "-0" on the wire
    if r == 0.0 {
        0.0
    } else {
        r
    }
}

/// Round a count, clamping negatives and garbage to zero.
pub fn to_count(x: f64) -> u32 {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    x.round().min(u32::MAX as f64) as u32
}

/// First `n` characters of `s` (the whole string when shorter).
pub fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// "2024-02-10T15:00:00Z" -> "2024-02"
pub fn month_key(s: &str) -> &str {
    prefix(s, 7)
}

/// "2024-02-10T15:00:00Z" -> "2024-02-10"
pub fn day_key(s: &str) -> &str {
    prefix(s, 10)
}

pub fn pad2(n: u32) -> String {
    format!("{:02}", n)
}

/// Trim notes; blank becomes `None`.
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
    let t = notes?.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

/// Non-empty string from a decoded value. Numbers are stringified.
pub fn opt_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode an enum from its wire string; anything else is `None`.
pub fn parse_enum<T>(value: Option<&Value>, parse: fn(&str) -> Option<T>) -> Option<T> {
    value.and_then(Value::as_str).and_then(parse)
}

/// JSON number in its shortest form: integral values are written without ".0".
/// Non-finite input becomes 0.
pub fn num_value(x: f64) -> Value {
    let x = finite_or(x, 0.0);
    if x.fract() == 0.0 && x.abs() < 9_007_199_254_740_992.0 {
        Value::from(x as i64)
    } else {
        Value::from(x)
    }
}

/// Realized P/L in USD. CAD is scaled by `rate`, USD is unchanged.
pub fn to_usd(pnl: f64, currency: Currency, rate: f64) -> f64 {
    match currency {
        Currency::Cad => pnl * rate,
        Currency::Usd => pnl,
    }
}
