pub mod clob_api;
pub mod decode;
pub mod gamma_api;
pub mod types;

use async_trait::async_trait;

use crate::error::ProxyError;
use types::{BookTop, Event};

/// Where event metadata comes from.
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    async fn fetch_event(&self, slug: &str) -> Result<Event, ProxyError>;
}

/// Where top-of-book prices come from.
#[async_trait]
pub trait OrderBookSource: Send + Sync + 'static {
    async fn best_prices(&self, token_id: &str) -> Result<BookTop, ProxyError>;
}
