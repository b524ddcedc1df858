//! Entry point. Trade export -> summary/trades payload -> share link, and back.

use anyhow::{bail, Context};
use chrono::Utc;
use dotenvy::dotenv;
use regex::Regex;
use std::{fs, path::Path};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use url::Url;

use trade_share_link::config::AppConfig;
use trade_share_link::{
    build_share_link, build_share_payload, build_trades_share_payload, decode_share_token,
    detect_environment, encode_share_token, summarize_trades, token_from_input, SharedPayload,
    ShareOptions, Trade,
};

const USAGE: &str = "usage:
  trade-share-link share-month <trades.json> <YYYY-MM>
  trade-share-link share-day <trades.json> <YYYY-MM-DD>
  trade-share-link decode <token-or-url>";

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let explicit = std::env::var("SHARE_CONFIG").ok();
    let cfg = AppConfig::load_or_default(&AppConfig::candidate_paths(explicit.as_deref()))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["share-month", trades, month] => share_month(&cfg, Path::new(trades), month),
        ["share-day", trades, date] => share_day(&cfg, Path::new(trades), date),
        ["decode", input] => decode(&cfg, input),
        _ => bail!("{}", USAGE),
    }
}

fn share_month(cfg: &AppConfig, trades_path: &Path, month: &str) -> anyhow::Result<()> {
    check_format(month, r"^\d{4}-(0[1-9]|1[0-2])$", "YYYY-MM")?;
    let trades = load_trades(trades_path)?;
    let fx_date = fx_date(cfg);

    let summary = summarize_trades(&trades, None, cfg.fx.cad_to_usd_rate, &fx_date);
    let payload = build_share_payload(month, &summary, &share_options(cfg));
    info!(
        "Sharing {}: {} trade(s), {} day(s), P/L {:.2}",
        payload.month,
        payload.summary.trade_count,
        payload.summary.daily.len(),
        payload.summary.total_pnl
    );

    let token = encode_share_token(&SharedPayload::Summary(payload));
    println!("{}", build_share_link(&cfg.share, &token)?);
    Ok(())
}

fn share_day(cfg: &AppConfig, trades_path: &Path, date: &str) -> anyhow::Result<()> {
    check_format(
        date,
        r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$",
        "YYYY-MM-DD",
    )?;
    let trades = load_trades(trades_path)?;

    let options = ShareOptions {
        cad_to_usd_rate: cfg.fx.cad_to_usd_rate,
        fx_date: cfg.fx.cad_to_usd_rate.map(|_| fx_date(cfg)),
        ..share_options(cfg)
    };
    let payload = build_trades_share_payload(date, &trades, &options);
    if payload.trades.is_empty() {
        bail!("No trades found for {}", payload.date);
    }
    info!(
        "Sharing {}: {} trade(s), P/L {:.2} USD",
        payload.date,
        payload.trades.len(),
        payload.total_pnl
    );

    let token = encode_share_token(&SharedPayload::Trades(payload));
    println!("{}", build_share_link(&cfg.share, &token)?);
    Ok(())
}

fn decode(cfg: &AppConfig, input: &str) -> anyhow::Result<()> {
    let Some(token) = token_from_input(input, &cfg.share.query_param) else {
        bail!("No shared data found in the link");
    };
    let Some(payload) = decode_share_token(&token) else {
        bail!("Invalid share link: cannot display this link");
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn load_trades(path: &Path) -> anyhow::Result<Vec<Trade>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let trades: Vec<Trade> =
        serde_json::from_str(&s).with_context(|| format!("parse trades in {}", path.display()))?;
    info!("Loaded {} trade(s) from {}", trades.len(), path.display());
    Ok(trades)
}

fn share_options(cfg: &AppConfig) -> ShareOptions {
    let app_env = std::env::var("APP_ENV").ok();
    let host = Url::parse(&cfg.share.origin)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string));
    ShareOptions {
        env: Some(detect_environment(
            app_env.as_deref().or(cfg.share.env.as_deref()),
            host.as_deref(),
        )),
        origin: Some(cfg.share.origin.clone()),
        ..ShareOptions::default()
    }
}

fn fx_date(cfg: &AppConfig) -> String {
    cfg.fx
        .fx_date
        .clone()
        .unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string())
}

fn check_format(value: &str, pattern: &str, expected: &str) -> anyhow::Result<()> {
    let re = Regex::new(pattern)?;
    if !re.is_match(value) {
        bail!("expected {}, got {:?}", expected, value);
    }
    Ok(())
}
