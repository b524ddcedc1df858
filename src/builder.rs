//! Build share payloads: slice a full summary or trade list down to one month or day.

use chrono::{SecondsFormat, Utc};

use crate::types::{
    AssetType, PnlBucket, PnlSummary, SharedSummaryPayload, SharedTrade, SharedTradesPayload, Trade,
};
use crate::utils::{day_key, finite_or, month_key, normalize_notes, round2, to_usd};

/// Metadata stamped onto a payload at share time.
#[derive(Debug, Clone, Default)]
pub struct ShareOptions {
    pub env: Option<String>,
    pub origin: Option<String>,
    /// Defaults to now when `None`.
    pub generated_at: Option<String>,
    /// Trades payloads only.
    pub cad_to_usd_rate: Option<f64>,
    /// Trades payloads only.
    pub fx_date: Option<String>,
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Month snapshot. `month` is cut to its `YYYY-MM` prefix.
///
/// Totals come from the month's monthly bucket(s) when present, otherwise
/// from the month's daily buckets.
pub fn build_share_payload(
    month: &str,
    summary: &PnlSummary,
    options: &ShareOptions,
) -> SharedSummaryPayload {
    let month = month_key(month);
    let daily = filter_buckets(&summary.daily, month);
    let monthly = filter_buckets(&summary.monthly, month);

    let source = if monthly.is_empty() { &daily } else { &monthly };
    let total_pnl: f64 = source.iter().map(|b| b.pnl).sum();
    let trade_count = source.iter().fold(0u32, |n, b| n.saturating_add(b.trades));

    SharedSummaryPayload {
        month: month.to_string(),
        summary: PnlSummary {
            total_pnl: round2(total_pnl),
            trade_count,
            daily,
            monthly,
            cad_to_usd_rate: summary.cad_to_usd_rate,
            fx_date: summary.fx_date.clone(),
        },
        generated_at: generated_at(options),
        env: options.env.clone(),
        origin: options.origin.clone(),
    }
}

/// Day snapshot: trades closed on `date` (cut to `YYYY-MM-DD`), total in USD.
pub fn build_trades_share_payload(
    date: &str,
    trades: &[Trade],
    options: &ShareOptions,
) -> SharedTradesPayload {
    let date = day_key(date);
    let shared: Vec<SharedTrade> = trades
        .iter()
        .filter(|t| t.closed_at.starts_with(date))
        .map(share_trade)
        .collect();
    let total_pnl = trades_total_usd(&shared, options.cad_to_usd_rate);

    SharedTradesPayload {
        date: date.to_string(),
        trades: shared,
        total_pnl,
        generated_at: generated_at(options),
        env: options.env.clone(),
        origin: options.origin.clone(),
        cad_to_usd_rate: options.cad_to_usd_rate,
        fx_date: options.fx_date.clone(),
    }
}

/// Project a backend trade for a viewer: no ids or audit timestamps,
/// dates cut to the day, option fields only on options.
pub fn share_trade(trade: &Trade) -> SharedTrade {
    let is_option = trade.asset_type == AssetType::Option;
    SharedTrade {
        symbol: trade.symbol.clone(),
        currency: trade.currency,
        asset_type: trade.asset_type,
        direction: trade.direction,
        quantity: finite_or(trade.quantity, 0.0),
        entry_price: finite_or(trade.entry_price, 0.0),
        exit_price: finite_or(trade.exit_price, 0.0),
        fees: finite_or(trade.fees, 0.0),
        realized_pnl: finite_or(trade.realized_pnl, 0.0),
        opened_at: day_key(&trade.opened_at).to_string(),
        closed_at: day_key(&trade.closed_at).to_string(),
        notes: normalize_notes(trade.notes.as_deref()),
        option_type: trade.option_type.filter(|_| is_option),
        strike_price: trade.strike_price.filter(|_| is_option),
        expiry_date: trade
            .expiry_date
            .clone()
            .filter(|e| is_option && !e.is_empty()),
    }
}

/// Sum of realized P/L in USD, CAD scaled by `rate` (1 when absent), to cents.
pub fn trades_total_usd(trades: &[SharedTrade], cad_to_usd_rate: Option<f64>) -> f64 {
    let rate = cad_to_usd_rate.unwrap_or(1.0);
    let total: f64 = trades
        .iter()
        .map(|t| to_usd(t.realized_pnl, t.currency, rate))
        .sum();
    round2(total)
}

fn filter_buckets(buckets: &[PnlBucket], prefix: &str) -> Vec<PnlBucket> {
    buckets
        .iter()
        .filter(|b| b.period.starts_with(prefix))
        .cloned()
        .collect()
}

fn generated_at(options: &ShareOptions) -> String {
    options
        .generated_at
        .clone()
        .filter(|g| !g.is_empty())
        .unwrap_or_else(now_iso)
}
