use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::api::AppState;
use crate::error::ProxyError;
use crate::outcomes::pricing::Selector;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub slug: Option<String>,
    pub token_id: Option<String>,
    pub outcome_index: Option<String>,
    pub side: Option<String>,
}

/// GET: route on `type`. Without a recognised `type` and a `slug`, answer
/// with the status payload.
pub async fn dispatch(
    State(state): State<AppState>,
    query: Result<Query<ProxyQuery>, QueryRejection>,
) -> Result<Json<Value>, ProxyError> {
    let Query(query) = query.map_err(|e| ProxyError::BadRequest(e.body_text()))?;
    let kind = query.kind.as_deref().map(str::trim);
    let slug = query.slug.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let data = match (kind, slug) {
        (Some("market-data"), Some(slug)) => {
            info!("market-data request for {}", slug);
            let summary = state.resolver.market_data(slug).await?;
            serde_json::to_value(summary)
        }
        (Some("prices"), Some(slug)) => {
            info!("prices request for {}", slug);
            let selector = Selector::from_params(
                query.token_id.as_deref(),
                query.outcome_index.as_deref(),
                query.side.as_deref(),
            );
            let quote = state.resolver.quote(slug, &selector).await?;
            serde_json::to_value(quote)
        }
        _ => return Ok(Json(status_payload())),
    }
    .map_err(|e| ProxyError::Internal(format!("Failed to encode response: {}", e)))?;

    Ok(Json(json!({
        "success": true,
        "data": data,
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed(method: Method) -> ProxyError {
    ProxyError::MethodNotAllowed(method.to_string())
}

fn status_payload() -> Value {
    json!({
        "success": true,
        "status": "ok",
        "service": "polymarket-proxy",
        "endpoints": [
            {
                "type": "market-data",
                "params": ["slug"],
                "description": "Event title, total volume, mid price, shape and outcomes",
            },
            {
                "type": "prices",
                "params": ["slug", "tokenId", "outcomeIndex", "side"],
                "description": "Bid, ask, spread and volume for one outcome",
            },
        ],
        "timestamp": Utc::now().to_rfc3339(),
    })
}
