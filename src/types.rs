//! Core domain types for trades, P/L buckets and shared payloads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetType {
    Stock,
    Option,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Cad,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl AssetType {
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Stock => "STOCK",
            AssetType::Option => "OPTION",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "STOCK" => Some(AssetType::Stock),
            "OPTION" => Some(AssetType::Option),
            _ => None,
        }
    }
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "LONG" => Some(Direction::Long),
            "SHORT" => Some(Direction::Short),
            _ => None,
        }
    }
}

impl Currency {
    pub fn as_str(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cad => "CAD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "USD" => Some(Currency::Usd),
            "CAD" => Some(Currency::Cad),
            _ => None,
        }
    }
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Call => "CALL",
            OptionType::Put => "PUT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CALL" => Some(OptionType::Call),
            "PUT" => Some(OptionType::Put),
            _ => None,
        }
    }
}

/// A closed trade as the backend returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub symbol: String,
    #[serde(default)]
    pub currency: Currency,
    pub asset_type: AssetType,
    pub direction: Direction,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    #[serde(default)]
    pub fees: f64,
    #[serde(default)]
    pub option_type: Option<OptionType>,
    #[serde(default)]
    pub strike_price: Option<f64>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    pub opened_at: String,
    pub closed_at: String,
    pub realized_pnl: f64, // native currency, before FX
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Read-only projection of [`Trade`] for a share link viewer.
///
/// The option fields are `Some` only for `AssetType::Option`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedTrade {
    pub symbol: String,
    pub currency: Currency,
    pub asset_type: AssetType,
    pub direction: Direction,
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub fees: f64,
    pub realized_pnl: f64,
    pub opened_at: String, // YYYY-MM-DD
    pub closed_at: String, // YYYY-MM-DD
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_type: Option<OptionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PnlBucket {
    /// "YYYY-MM-DD" for a day, "YYYY-MM" for a month.
    pub period: String,
    pub pnl: f64,
    pub trades: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PnlSummary {
    #[serde(default)]
    pub total_pnl: f64,
    #[serde(default)]
    pub trade_count: u32,
    #[serde(default)]
    pub daily: Vec<PnlBucket>,
    #[serde(default)]
    pub monthly: Vec<PnlBucket>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cad_to_usd_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedSummaryPayload {
    pub month: String, // YYYY-MM
    pub summary: PnlSummary,
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SharedTradesPayload {
    pub date: String, // YYYY-MM-DD
    pub trades: Vec<SharedTrade>,
    pub total_pnl: f64, // USD
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cad_to_usd_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx_date: Option<String>,
}

/// Either kind of shared snapshot.
///
/// In memory the kind is explicit; on the wire it is only implied by which
/// key the compact token carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SharedPayload {
    Summary(SharedSummaryPayload),
    Trades(SharedTradesPayload),
}

impl SharedPayload {
    pub fn generated_at(&self) -> &str {
        match self {
            SharedPayload::Summary(p) => &p.generated_at,
            SharedPayload::Trades(p) => &p.generated_at,
        }
    }

    pub fn env(&self) -> Option<&str> {
        match self {
            SharedPayload::Summary(p) => p.env.as_deref(),
            SharedPayload::Trades(p) => p.env.as_deref(),
        }
    }

    pub fn origin(&self) -> Option<&str> {
        match self {
            SharedPayload::Summary(p) => p.origin.as_deref(),
            SharedPayload::Trades(p) => p.origin.as_deref(),
        }
    }
}

impl From<SharedSummaryPayload> for SharedPayload {
    fn from(p: SharedSummaryPayload) -> Self {
        SharedPayload::Summary(p)
    }
}

impl From<SharedTradesPayload> for SharedPayload {
    fn from(p: SharedTradesPayload) -> Self {
        SharedPayload::Trades(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_reads_backend_json() {
        let raw = r#"{
            "id": "t1", "symbol": "AAPL", "currency": "CAD", "assetType": "OPTION",
            "direction": "SHORT", "quantity": 2, "entryPrice": 1.5, "exitPrice": 0.5,
            "fees": 1.3, "optionType": "PUT", "strikePrice": 150, "expiryDate": "2024-03-15",
            "openedAt": "2024-02-01T14:30:00Z", "closedAt": "2024-02-10T15:00:00Z",
            "realizedPnl": 198.7, "notes": null,
            "createdAt": "2024-02-10T15:00:00Z", "updatedAt": "2024-02-10T15:00:00Z"
        }"#;
        let t: Trade = serde_json::from_str(raw).unwrap();
        assert_eq!(t.currency, Currency::Cad);
        assert_eq!(t.asset_type, AssetType::Option);
        assert_eq!(t.direction, Direction::Short);
        assert_eq!(t.option_type, Some(OptionType::Put));
        assert_eq!(t.notes, None);
    }

    #[test]
    fn currency_defaults_to_usd() {
        let raw = r#"{
            "id": "t1", "symbol": "MSFT", "assetType": "STOCK", "direction": "LONG",
            "quantity": 10, "entryPrice": 400, "exitPrice": 410,
            "openedAt": "2024-02-01", "closedAt": "2024-02-02", "realizedPnl": 100
        }"#;
        let t: Trade = serde_json::from_str(raw).unwrap();
        assert_eq!(t.currency, Currency::Usd);
        assert_eq!(t.fees, 0.0);
    }

    #[test]
    fn shared_payload_is_tagged_by_kind() {
        let p = SharedPayload::Summary(SharedSummaryPayload {
            month: "2024-02".into(),
            summary: PnlSummary::default(),
            generated_at: "2024-02-10T00:00:00Z".into(),
            env: None,
            origin: None,
        });
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["kind"], "summary");
        assert_eq!(v["month"], "2024-02");
        assert!(v.get("env").is_none());
    }

    #[test]
    fn enum_strings_round_trip() {
        for a in [AssetType::Stock, AssetType::Option] {
            assert_eq!(AssetType::parse(a.as_str()), Some(a));
        }
        for d in [Direction::Long, Direction::Short] {
            assert_eq!(Direction::parse(d.as_str()), Some(d));
        }
        for c in [Currency::Usd, Currency::Cad] {
            assert_eq!(Currency::parse(c.as_str()), Some(c));
        }
        for o in [OptionType::Call, OptionType::Put] {
            assert_eq!(OptionType::parse(o.as_str()), Some(o));
        }
        assert_eq!(AssetType::parse("stock"), None);
    }
}
