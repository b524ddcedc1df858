//! Share links for a trading journal.
//!
//! A month's P/L summary or a day's trades is compacted into a short-key,
//! positional JSON token, Base64URL-encoded and carried in a single query
//! parameter. Decoding is defensive: malformed or tampered tokens come back
//! as `None`, never as a panic or error.

pub mod builder;
pub mod codec;
pub mod compact;
pub mod config;
pub mod expand;
pub mod link;
pub mod summary;
pub mod types;
pub mod utils;

pub use builder::{build_share_payload, build_trades_share_payload, now_iso, ShareOptions};
pub use codec::{decode_share_token, decode_share_token_at, encode_share_token, SHARE_QUERY_PARAM};
pub use link::{build_share_link, detect_environment, share_url, token_from_input, LinkError};
pub use summary::summarize_trades;
pub use types::{
    AssetType, Currency, Direction, OptionType, PnlBucket, PnlSummary, SharedPayload,
    SharedSummaryPayload, SharedTrade, SharedTradesPayload, Trade,
};
