//! Share token transport: compact token -> JSON -> URL-safe Base64, and back.
//!
//! Decoding never fails loudly: any bad token yields `None`.

use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde_json::Value;
use tracing::debug;

use crate::builder::now_iso;
use crate::compact::compact_payload;
use crate::expand::{expand_summary, expand_trades};
use crate::types::SharedPayload;

/// Query-string parameter carrying the token on the share route.
pub const SHARE_QUERY_PARAM: &str = "data";

// Standard alphabet; tolerant of non-zero trailing bits like browser `atob`.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

pub fn encode_share_token(payload: &SharedPayload) -> String {
    let json = Value::from(compact_payload(payload)).to_string();
    to_base64_url(json.as_bytes())
}

/// Decode with the current time as the fallback `generatedAt`.
pub fn decode_share_token(token: &str) -> Option<SharedPayload> {
    decode_share_token_at(token, &now_iso())
}

/// Decode a token. `fallback_generated_at` fills in a token without `g`.
///
/// The payload kind is sniffed from the keys: `t` means trades, otherwise
/// `s` means summary.
pub fn decode_share_token_at(token: &str, fallback_generated_at: &str) -> Option<SharedPayload> {
    let token = token.trim();
    if token.is_empty() {
        debug!("share token rejected: empty");
        return None;
    }
    let bytes = match from_base64_url(token) {
        Some(b) => b,
        None => {
            debug!("share token rejected: bad base64 ({} chars)", token.len());
            return None;
        }
    };
    let parsed: Value = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => {
            debug!("share token rejected: bad json: {}", e);
            return None;
        }
    };
    let Value::Object(map) = parsed else {
        debug!("share token rejected: not an object");
        return None;
    };

    if map.contains_key("t") {
        expand_trades(&map, fallback_generated_at).map(SharedPayload::Trades)
    } else if map.contains_key("s") {
        expand_summary(&map, fallback_generated_at).map(SharedPayload::Summary)
    } else {
        debug!("share token rejected: neither summary nor trades");
        None
    }
}

/// Base64 with `+`->`-`, `/`->`_` and no `=` padding.
pub fn to_base64_url(bytes: &[u8]) -> String {
    BASE64
        .encode(bytes)
        .replace('+', "-")
        .replace('/', "_")
        .trim_end_matches('=')
        .to_string()
}

/// Reverse of [`to_base64_url`]. Padding is restored before decoding, so
/// padded and unpadded input are both accepted.
pub fn from_base64_url(value: &str) -> Option<Vec<u8>> {
    let mut normalized = value
        .trim_end_matches('=')
        .replace('-', "+")
        .replace('_', "/");
    let rem = normalized.len() % 4;
    if rem != 0 {
        normalized.push_str(&"=".repeat(4 - rem));
    }
    BASE64.decode(normalized).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PnlBucket, PnlSummary, SharedSummaryPayload};

    fn b64(json: &str) -> String {
        to_base64_url(json.as_bytes())
    }

    fn summary_payload() -> SharedPayload {
        SharedPayload::Summary(SharedSummaryPayload {
            month: "2024-02".into(),
            summary: PnlSummary {
                total_pnl: 200.0,
                trade_count: 2,
                daily: vec![PnlBucket {
                    period: "2024-02-02".into(),
                    pnl: 200.0,
                    trades: 2,
                }],
                monthly: vec![PnlBucket {
                    period: "2024-02".into(),
                    pnl: 200.0,
                    trades: 2,
                }],
                cad_to_usd_rate: None,
                fx_date: None,
            },
            generated_at: "2024-02-10T00:00:00Z".into(),
            env: Some("dev".into()),
            origin: Some("http://localhost:5173".into()),
        })
    }

    // ---------- transport ----------

    #[test]
    fn base64_url_has_no_unsafe_chars() {
        // "+//+" in the standard alphabet
        let s = to_base64_url(&[0xfb, 0xff, 0xfe]);
        assert_eq!(s, "-__-");
        assert_eq!(to_base64_url(b"a"), "YQ");
        assert_eq!(from_base64_url("YQ"), Some(b"a".to_vec()));
        assert_eq!(from_base64_url("YQ=="), Some(b"a".to_vec()));
        assert_eq!(from_base64_url("-__-"), Some(vec![0xfb, 0xff, 0xfe]));
    }

    #[test]
    fn bad_base64_is_none() {
        assert_eq!(from_base64_url("not-base64!!!"), None);
        assert_eq!(from_base64_url("abcde"), None);
    }

    // ---------- decode ----------

    #[test]
    fn summary_round_trip() {
        let token = encode_share_token(&summary_payload());
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        let decoded = decode_share_token(&token).expect("should decode");
        assert_eq!(decoded, summary_payload());
    }

    #[test]
    fn invalid_tokens_are_none() {
        assert!(decode_share_token("").is_none());
        assert!(decode_share_token("   ").is_none());
        assert!(decode_share_token("not-base64").is_none());
        assert!(decode_share_token("not-base64!!!").is_none());
        assert!(decode_share_token(&b64("not json")).is_none());
        assert!(decode_share_token(&b64("[1,2,3]")).is_none());
        assert!(decode_share_token(&b64("null")).is_none());
        assert!(decode_share_token(&b64(r#"{"m":"2024-02","g":"x"}"#)).is_none());
        assert!(decode_share_token_at(&to_base64_url(&[0xff, 0xfe, 0x7b]), "x").is_none());
    }

    #[test]
    fn trades_key_wins_over_summary_key() {
        let json = r#"{"d":"2024-02-10","g":"x","t":[],"s":[1,1,[]],"m":"2024-02"}"#;
        match decode_share_token_at(&b64(json), "now") {
            Some(SharedPayload::Trades(p)) => assert_eq!(p.date, "2024-02-10"),
            other => panic!("expected trades payload, got {other:?}"),
        }
    }

    #[test]
    fn hand_written_token_decodes() {
        let json = r#"{"m":"2024-02","g":"2024-02-10T00:00:00Z","s":[200,2,[[2,200,2]]]}"#;
        let Some(SharedPayload::Summary(p)) = decode_share_token_at(&b64(json), "now") else {
            panic!("expected summary payload");
        };
        assert_eq!(p.summary.daily.len(), 1);
        assert_eq!(p.summary.daily[0].period, "2024-02-02");
    }
}
