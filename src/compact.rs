//! Compaction: shared payloads -> short-key, positional-tuple tokens.
//!
//! Summary token: `{m, g, e?, o?, s: [total, count, [[day, pnl, trades]..], rate?, fxDate?]}`.
//! Trades token:  `{d, g, e?, o?, t: [[trade tuple]..], p, r?, f?}`.
//!
//! Month and year are carried once in `m`, so daily buckets store only the
//! day of month. Monthly buckets are not encoded at all.

use serde_json::{Map, Value};

use crate::types::{
    AssetType, PnlBucket, SharedPayload, SharedSummaryPayload, SharedTrade, SharedTradesPayload,
};
use crate::utils::{day_key, month_key, normalize_notes, num_value, round2};

#[derive(Debug, Clone, PartialEq)]
pub struct CompactSummaryToken {
    pub m: String,
    pub g: String,
    pub e: Option<String>,
    pub o: Option<String>,
    pub s: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompactTradesToken {
    pub d: String,
    pub g: String,
    pub e: Option<String>,
    pub o: Option<String>,
    pub t: Vec<Vec<Value>>,
    pub p: Value,
    pub r: Option<Value>,
    pub f: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompactToken {
    Summary(CompactSummaryToken),
    Trades(CompactTradesToken),
}

impl From<CompactSummaryToken> for Value {
    fn from(token: CompactSummaryToken) -> Self {
        let mut map = Map::new();
        map.insert("m".into(), Value::from(token.m));
        map.insert("g".into(), Value::from(token.g));
        insert_opt(&mut map, "e", token.e.map(Value::from));
        insert_opt(&mut map, "o", token.o.map(Value::from));
        map.insert("s".into(), Value::Array(token.s));
        Value::Object(map)
    }
}

impl From<CompactTradesToken> for Value {
    fn from(token: CompactTradesToken) -> Self {
        let mut map = Map::new();
        map.insert("d".into(), Value::from(token.d));
        map.insert("g".into(), Value::from(token.g));
        insert_opt(&mut map, "e", token.e.map(Value::from));
        insert_opt(&mut map, "o", token.o.map(Value::from));
        let t = token.t.into_iter().map(Value::Array).collect();
        map.insert("t".into(), Value::Array(t));
        map.insert("p".into(), token.p);
        insert_opt(&mut map, "r", token.r);
        insert_opt(&mut map, "f", token.f.map(Value::from));
        Value::Object(map)
    }
}

impl From<CompactToken> for Value {
    fn from(token: CompactToken) -> Self {
        match token {
            CompactToken::Summary(t) => t.into(),
            CompactToken::Trades(t) => t.into(),
        }
    }
}

// absent keys are left out entirely, never written as null
fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(v) = value {
        map.insert(key.to_string(), v);
    }
}

pub fn compact_payload(payload: &SharedPayload) -> CompactToken {
    match payload {
        SharedPayload::Summary(p) => CompactToken::Summary(compact_summary(p)),
        SharedPayload::Trades(p) => CompactToken::Trades(compact_trades(p)),
    }
}

pub fn compact_summary(payload: &SharedSummaryPayload) -> CompactSummaryToken {
    let month = month_key(&payload.month);
    let summary = &payload.summary;

    let daily: Vec<Value> = summary
        .daily
        .iter()
        .filter(|b| b.period.starts_with(month))
        .filter_map(compact_bucket)
        .collect();

    let mut s = vec![
        num_value(round2(summary.total_pnl)),
        Value::from(summary.trade_count),
        Value::Array(daily),
    ];
    // FX slots only exist when the summary carries FX info at all
    if summary.cad_to_usd_rate.is_some() || summary.fx_date.is_some() {
        s.push(summary.cad_to_usd_rate.map(num_value).unwrap_or(Value::Null));
        s.push(summary.fx_date.clone().map(Value::from).unwrap_or(Value::Null));
    }
    trim_trailing_nulls(&mut s);

    CompactSummaryToken {
        m: month.to_string(),
        g: payload.generated_at.clone(),
        e: payload.env.clone(),
        o: payload.origin.clone(),
        s,
    }
}

/// `[day, pnl, trades]`, or `None` when the period has no valid day of month.
fn compact_bucket(bucket: &PnlBucket) -> Option<Value> {
    let day = day_of_month(&bucket.period)?;
    Some(Value::Array(vec![
        Value::from(day),
        num_value(round2(bucket.pnl)),
        Value::from(bucket.trades),
    ]))
}

/// "2024-02-09" -> 9
fn day_of_month(period: &str) -> Option<u32> {
    let dd: String = period.chars().skip(8).take(2).collect();
    let day: u32 = dd.parse().ok()?;
    (1..=31).contains(&day).then_some(day)
}

pub fn compact_trades(payload: &SharedTradesPayload) -> CompactTradesToken {
    CompactTradesToken {
        d: day_key(&payload.date).to_string(),
        g: payload.generated_at.clone(),
        e: payload.env.clone(),
        o: payload.origin.clone(),
        t: payload.trades.iter().map(trade_tuple).collect(),
        p: num_value(round2(payload.total_pnl)),
        r: payload.cad_to_usd_rate.map(num_value),
        f: payload.fx_date.clone(),
    }
}

/// `[symbol, assetType, direction, qty, entry, exit, fees, pnl, currency,
///   openedAt, closedAt, notes?, optionType?, strike?, expiry?]`
pub fn trade_tuple(trade: &SharedTrade) -> Vec<Value> {
    let is_option = trade.asset_type == AssetType::Option;

    let mut tuple = vec![
        Value::from(trade.symbol.as_str()),
        Value::from(trade.asset_type.as_str()),
        Value::from(trade.direction.as_str()),
        num_value(trade.quantity),
        num_value(trade.entry_price),
        num_value(trade.exit_price),
        num_value(trade.fees),
        num_value(trade.realized_pnl),
        Value::from(trade.currency.as_str()),
        Value::from(day_key(&trade.opened_at)),
        Value::from(day_key(&trade.closed_at)),
        normalize_notes(trade.notes.as_deref())
            .map(Value::from)
            .unwrap_or(Value::Null),
    ];

    // stale option fields on a stock never reach the wire
    if is_option {
        tuple.push(
            trade
                .option_type
                .map(|o| Value::from(o.as_str()))
                .unwrap_or(Value::Null),
        );
        tuple.push(trade.strike_price.map(num_value).unwrap_or(Value::Null));
        tuple.push(
            trade
                .expiry_date
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(Value::from)
                .unwrap_or(Value::Null),
        );
    }

    trim_trailing_nulls(&mut tuple);
    tuple
}

fn trim_trailing_nulls(tuple: &mut Vec<Value>) {
    while matches!(tuple.last(), Some(Value::Null)) {
        tuple.pop();
    }
}
