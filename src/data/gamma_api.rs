use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::data::types::Event;
use crate::data::EventSource;
use crate::error::ProxyError;

pub struct GammaApiClient {
    client: Client,
    base_url: String,
}

impl GammaApiClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the event for a slug. Gamma answers with an array; the first
    /// element wins.
    pub async fn fetch_event_by_slug(&self, slug: &str) -> Result<Event, ProxyError> {
        let url = format!("{}/events", self.base_url);
        debug!("Fetching event {} from {}", slug, url);

        let response = self.client
            .get(&url)
            .query(&[("slug", slug)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Gamma API returned {} for slug {}", status, slug);
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message: format!("Gamma API returned {}", status),
            });
        }

        let body: Value = response.json().await?;
        let events = match body {
            Value::Array(events) => events,
            _ => {
                return Err(ProxyError::Internal(
                    "Gamma API response is not an array".to_string(),
                ))
            }
        };

        let first = events
            .into_iter()
            .next()
            .ok_or_else(|| ProxyError::NotFound(format!("No event found for slug: {}", slug)))?;

        let event: Event = serde_json::from_value(first)
            .map_err(|e| ProxyError::Internal(format!("Failed to parse event: {}", e)))?;

        if event.markets.is_empty() {
            return Err(ProxyError::NotFound(format!("Event {} has no markets", slug)));
        }

        Ok(event)
    }
}

#[async_trait]
impl EventSource for GammaApiClient {
    async fn fetch_event(&self, slug: &str) -> Result<Event, ProxyError> {
        self.fetch_event_by_slug(slug).await
    }
}
