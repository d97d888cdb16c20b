use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::decode;

/// Raw event as returned by the Gamma `/events` endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "decode::lenient_markets")]
    pub markets: Vec<Market>,
}

/// Raw market inside an event. The list fields arrive either as native
/// arrays or as JSON-encoded strings, so they stay untyped until decoded.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub volume: Option<Value>,
    #[serde(default)]
    pub outcomes: Option<Value>,
    #[serde(default)]
    pub outcome_prices: Option<Value>,
    #[serde(default)]
    pub clob_token_ids: Option<Value>,
}

impl Market {
    pub fn labels(&self) -> Vec<String> {
        decode::decode_labels(self.outcomes.as_ref())
    }

    pub fn prices(&self) -> Vec<Option<f64>> {
        decode::decode_prices(self.outcome_prices.as_ref())
    }

    pub fn token_ids(&self) -> Vec<Option<String>> {
        decode::decode_token_ids(self.clob_token_ids.as_ref())
    }

    pub fn volume(&self) -> f64 {
        decode::decode_number(self.volume.as_ref())
    }
}

/// How an event lays out its choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Shape {
    /// One market whose outcome list holds every choice, one token each.
    #[serde(rename = "single-market-multi-outcome")]
    SingleMarketMultiOutcome,
    /// Every market is one yes/no option.
    #[serde(rename = "market-per-option")]
    MarketPerOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutcomeKind {
    #[serde(rename = "multi-outcome")]
    MultiOutcome,
    #[serde(rename = "binary")]
    Binary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub index: usize,
    pub name: String,
    /// Outcome price for multi-outcome events, yes price for binary ones.
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yes_token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_token_id: Option<String>,
    pub volume: f64,
    #[serde(rename = "type")]
    pub kind: OutcomeKind,
}

impl Outcome {
    pub fn holds_token(&self, token_id: &str) -> bool {
        [&self.token_id, &self.yes_token_id, &self.no_token_id]
            .iter()
            .any(|t| t.as_deref() == Some(token_id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub slug: String,
    pub title: String,
    pub total_volume: f64,
    pub mid_price: f64,
    pub shape: Shape,
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Orderbook,
    Fallback,
}

/// Top of book for one token. Either side may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookTop {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome_index: Option<usize>,
    pub side: Side,
    pub bid: f64,
    pub ask: f64,
    pub spread: f64,
    pub volume: f64,
    pub source: PriceSource,
}
