//! Expansion: compact tokens -> full shared payloads.
//!
//! Input is untrusted, so everything is read from a loose `serde_json::Value`
//! and coerced field by field. Failure policy differs by payload kind:
//! a bad daily bucket is dropped and decoding continues, a bad trade tuple
//! rejects the whole token.

use serde_json::{Map, Value};
use tracing::debug;

use crate::builder::trades_total_usd;
use crate::types::{
    AssetType, Currency, Direction, OptionType, PnlBucket, PnlSummary, SharedSummaryPayload,
    SharedTrade, SharedTradesPayload,
};
use crate::utils::{
    day_key, normalize_notes, opt_string, pad2, parse_enum, round2, to_count, to_number,
};

/// Rebuild a summary payload from `{m, g, e?, o?, s}`.
///
/// Monthly history is not in the token; `monthly` comes back as one bucket
/// holding the shared month's aggregate.
pub fn expand_summary(
    token: &Map<String, Value>,
    fallback_generated_at: &str,
) -> Option<SharedSummaryPayload> {
    let Some(month) = token.get("m").and_then(Value::as_str).filter(|m| !m.is_empty()) else {
        debug!("summary token rejected: missing month");
        return None;
    };
    let Some(s) = token.get("s").and_then(Value::as_array).filter(|s| s.len() >= 3) else {
        debug!("summary token rejected: bad summary tuple");
        return None;
    };
    let Some(daily_raw) = s[2].as_array() else {
        debug!("summary token rejected: daily buckets are not a list");
        return None;
    };

    let daily: Vec<PnlBucket> = daily_raw
        .iter()
        .filter_map(|b| expand_bucket(month, b))
        .collect();
    if daily.len() < daily_raw.len() {
        debug!(
            "summary token: dropped {} malformed daily bucket(s)",
            daily_raw.len() - daily.len()
        );
    }

    let daily_pnl = round2(daily.iter().map(|b| b.pnl).sum());
    let daily_trades = daily.iter().fold(0u32, |n, b| n.saturating_add(b.trades));
    let total_pnl = to_number(s.first(), daily_pnl);
    let trade_count = to_count(to_number(s.get(1), daily_trades as f64));

    Some(SharedSummaryPayload {
        month: month.to_string(),
        summary: PnlSummary {
            total_pnl,
            trade_count,
            daily,
            monthly: vec![PnlBucket {
                period: month.to_string(),
                pnl: total_pnl,
                trades: trade_count,
            }],
            cad_to_usd_rate: fx_rate(s.get(3)),
            fx_date: opt_string(s.get(4)),
        },
        generated_at: opt_string(token.get("g")).unwrap_or_else(|| fallback_generated_at.to_string()),
        env: opt_string(token.get("e")),
        origin: opt_string(token.get("o")),
    })
}

/// `[day, pnl, trades]` -> bucket for `month`. `None` drops the bucket.
fn expand_bucket(month: &str, raw: &Value) -> Option<PnlBucket> {
    let b = raw.as_array().filter(|b| b.len() >= 3)?;
    let day = to_number(b.first(), f64::NAN);
    if !(1.0..=31.0).contains(&day) {
        return None;
    }
    Some(PnlBucket {
        period: format!("{}-{}", month, pad2(day.trunc() as u32)),
        pnl: to_number(b.get(1), 0.0),
        trades: to_count(to_number(b.get(2), 0.0)),
    })
}

/// Rebuild a trades payload from `{d, g, e?, o?, t, p, r?, f?}`.
/// Any malformed trade tuple rejects the whole token.
pub fn expand_trades(
    token: &Map<String, Value>,
    fallback_generated_at: &str,
) -> Option<SharedTradesPayload> {
    let Some(date) = token.get("d").and_then(Value::as_str).filter(|d| !d.is_empty()) else {
        debug!("trades token rejected: missing date");
        return None;
    };
    let Some(raw_trades) = token.get("t").and_then(Value::as_array) else {
        debug!("trades token rejected: trades are not a list");
        return None;
    };

    let trades = raw_trades
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let trade = expand_trade(raw);
            if trade.is_none() {
                debug!("trades token rejected: malformed trade tuple #{}", i);
            }
            trade
        })
        .collect::<Option<Vec<SharedTrade>>>()?;

    let cad_to_usd_rate = fx_rate(token.get("r"));
    let total_pnl = to_number(token.get("p"), trades_total_usd(&trades, cad_to_usd_rate));

    Some(SharedTradesPayload {
        date: day_key(date).to_string(),
        trades,
        total_pnl,
        generated_at: opt_string(token.get("g")).unwrap_or_else(|| fallback_generated_at.to_string()),
        env: opt_string(token.get("e")),
        origin: opt_string(token.get("o")),
        cad_to_usd_rate,
        fx_date: opt_string(token.get("f")),
    })
}

/// Decode one positional trade tuple; see `compact::trade_tuple` for the layout.
pub fn expand_trade(raw: &Value) -> Option<SharedTrade> {
    let t = raw.as_array().filter(|t| t.len() >= 11)?;

    let symbol = t[0].as_str()?;
    let asset_type = parse_enum(t.get(1), AssetType::parse)?;
    let direction = parse_enum(t.get(2), Direction::parse)?;
    let currency = parse_enum(t.get(8), Currency::parse)?;
    let opened_at = t[9].as_str()?;
    let closed_at = t[10].as_str()?;

    let notes = normalize_notes(t.get(11).and_then(Value::as_str));

    // option fields are rehydrated only for options, whatever the tuple holds
    let (option_type, strike_price, expiry_date) = if asset_type == AssetType::Option {
        (
            parse_enum(t.get(12), OptionType::parse),
            t.get(13)
                .filter(|v| !v.is_null())
                .map(|v| to_number(Some(v), 0.0)),
            opt_string(t.get(14)),
        )
    } else {
        (None, None, None)
    };

    Some(SharedTrade {
        symbol: symbol.to_string(),
        currency,
        asset_type,
        direction,
        quantity: to_number(t.get(3), 0.0),
        entry_price: to_number(t.get(4), 0.0),
        exit_price: to_number(t.get(5), 0.0),
        fees: to_number(t.get(6), 0.0),
        realized_pnl: to_number(t.get(7), 0.0),
        opened_at: opened_at.to_string(),
        closed_at: closed_at.to_string(),
        notes,
        option_type,
        strike_price,
        expiry_date,
    })
}

/// A usable FX rate is finite and positive; anything else counts as absent.
fn fx_rate(value: Option<&Value>) -> Option<f64> {
    let rate = to_number(value, f64::NAN);
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
