//! Realized P/L aggregation: trade list -> daily and monthly buckets in USD.

use std::collections::BTreeMap;

use crate::types::{PnlBucket, PnlSummary, Trade};
use crate::utils::{day_key, month_key, round2, to_usd};

/// Bucket `trades` by close day and close month.
///
/// `month` restricts the input to trades closed in that `YYYY-MM`. CAD P/L
/// is converted with `cad_to_usd_rate` (1 when absent). Buckets are sorted
/// newest first.
pub fn summarize_trades(
    trades: &[Trade],
    month: Option<&str>,
    cad_to_usd_rate: Option<f64>,
    fx_date: &str,
) -> PnlSummary {
    let rate = cad_to_usd_rate.unwrap_or(1.0);
    let filtered: Vec<&Trade> = match month {
        Some(m) => {
            let m = month_key(m);
            trades.iter().filter(|t| t.closed_at.starts_with(m)).collect()
        }
        None => trades.iter().collect(),
    };

    let mut daily: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
    let mut monthly: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
    let mut total = 0.0;
    for &t in &filtered {
        let usd = to_usd(t.realized_pnl, t.currency, rate);
        total += usd;
        for (map, key) in [
            (&mut daily, day_key(&t.closed_at)),
            (&mut monthly, month_key(&t.closed_at)),
        ] {
            let e = map.entry(key).or_insert((0.0, 0));
            e.0 += usd;
            e.1 = e.1.saturating_add(1);
        }
    }

    PnlSummary {
        total_pnl: round2(total),
        trade_count: u32::try_from(filtered.len()).unwrap_or(u32::MAX),
        daily: newest_first(daily),
        monthly: newest_first(monthly),
        cad_to_usd_rate: Some(rate),
        fx_date: Some(fx_date.to_string()),
    }
}

fn newest_first(map: BTreeMap<&str, (f64, u32)>) -> Vec<PnlBucket> {
    map.into_iter()
        .rev()
        .map(|(period, (pnl, trades))| PnlBucket {
            period: period.to_string(),
            pnl: round2(pnl),
            trades,
        })
        .collect()
}
