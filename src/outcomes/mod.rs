pub mod builder;
pub mod pricing;
pub mod shape;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::data::types::{Event, MarketSummary, Quote};
use crate::data::{EventSource, OrderBookSource};
use crate::error::ProxyError;
use builder::{build_outcomes, summarize};
use pricing::{build_quote, select, Selector};

/// Price used when upstream gives nothing readable.
pub const DEFAULT_PRICE: f64 = 0.5;

pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Fetches an event, normalizes its outcomes and prices one of them.
///
/// Stateless: every call fetches fresh upstream data. Both upstream calls of
/// one request share a single deadline.
#[derive(Clone)]
pub struct Resolver {
    events: Arc<dyn EventSource>,
    books: Arc<dyn OrderBookSource>,
    timeout: Duration,
}

impl Resolver {
    pub fn new(
        events: Arc<dyn EventSource>,
        books: Arc<dyn OrderBookSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            events,
            books,
            timeout,
        }
    }

    pub async fn market_data(&self, slug: &str) -> Result<MarketSummary, ProxyError> {
        let deadline = Instant::now() + self.timeout;
        let event = self.fetch_event(slug, deadline).await?;
        let (shape, outcomes) = build_outcomes(&event)?;

        info!("market-data {}: {:?} with {} outcomes", slug, shape, outcomes.len());
        Ok(summarize(slug, &event, shape, outcomes))
    }

    pub async fn quote(&self, slug: &str, selector: &Selector) -> Result<Quote, ProxyError> {
        let deadline = Instant::now() + self.timeout;
        let event = self.fetch_event(slug, deadline).await?;
        let (_, outcomes) = build_outcomes(&event)?;

        let selection = select(&outcomes, selector);
        let top = match &selection.token_id {
            Some(token_id) => match timeout_at(deadline, self.books.best_prices(token_id)).await {
                Ok(Ok(top)) => Some(top),
                Ok(Err(e)) => {
                    warn!("Order book unavailable for {}: {}", token_id, e);
                    None
                }
                Err(_) => {
                    warn!("Order book timed out for {}", token_id);
                    None
                }
            },
            None => {
                debug!("No token resolved for {}, using fallback prices", slug);
                None
            }
        };

        let quote = build_quote(slug, &outcomes, &selection, top);
        info!(
            "prices {}: index={:?} bid={} ask={} ({:?})",
            slug, quote.outcome_index, quote.bid, quote.ask, quote.source
        );
        Ok(quote)
    }

    async fn fetch_event(
        &self,
        slug: &str,
        deadline: Instant,
    ) -> Result<Event, ProxyError> {
        match timeout_at(deadline, self.events.fetch_event(slug)).await {
            Ok(result) => result,
            Err(_) => Err(ProxyError::Timeout(format!(
                "Event fetch for {} exceeded {:?}",
                slug, self.timeout
            ))),
        }
    }
}
