//! Lenient decoding for Gamma's loosely typed fields.
//!
//! `outcomes`, `outcomePrices` and `clobTokenIds` show up as native arrays,
//! as JSON-encoded strings like `"[\"Yes\", \"No\"]"`, or not at all. None of
//! these helpers fail: anything unreadable decodes to an empty list or a
//! missing element.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::data::types::Market;

/// Decode a list that may be a native array or a JSON-encoded array string.
pub fn decode_list(raw: Option<&Value>) -> Vec<Value> {
    match raw {
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

pub fn decode_labels(raw: Option<&Value>) -> Vec<String> {
    decode_list(raw).iter().map(value_to_string).collect()
}

/// Prices stay positional: an unreadable entry is `None`, not dropped.
pub fn decode_prices(raw: Option<&Value>) -> Vec<Option<f64>> {
    decode_list(raw).iter().map(value_to_f64).collect()
}

pub fn decode_token_ids(raw: Option<&Value>) -> Vec<Option<String>> {
    decode_list(raw)
        .iter()
        .map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect()
}

/// Volume-style number: numeric or numeric string, otherwise 0.
pub fn decode_number(raw: Option<&Value>) -> f64 {
    raw.and_then(value_to_f64)
        .filter(|v| *v >= 0.0)
        .unwrap_or(0.0)
}

pub fn value_to_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Markets that fail to deserialize are dropped instead of failing the event.
pub(crate) fn lenient_markets<'de, D>(deserializer: D) -> Result<Vec<Market>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    let markets = decode_list(raw.as_ref())
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Market>(item) {
            Ok(market) => Some(market),
            Err(e) => {
                debug!("Skipping unreadable market: {}", e);
                None
            }
        })
        .collect();

    Ok(markets)
}
