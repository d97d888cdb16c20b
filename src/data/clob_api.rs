use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::data::decode::value_to_f64;
use crate::data::types::BookTop;
use crate::data::OrderBookSource;
use crate::error::ProxyError;

pub struct ClobApiClient {
    client: Client,
    base_url: String,
    book_path: String,
}

/// Order book payload. Some deployments answer with flat best-price fields,
/// the public `/book` endpoint with full level arrays; both are accepted.
#[derive(Debug, Default, Deserialize)]
struct BookResponse {
    #[serde(default)]
    best_bid: Option<Value>,
    #[serde(default)]
    best_ask: Option<Value>,
    #[serde(default)]
    bids: Vec<BookLevel>,
    #[serde(default)]
    asks: Vec<BookLevel>,
}

#[derive(Debug, Deserialize)]
struct BookLevel {
    price: Value,
}

impl BookResponse {
    fn top(&self) -> BookTop {
        let best_bid = self.best_bid.as_ref().and_then(value_to_f64).or_else(|| {
            self.bids
                .iter()
                .filter_map(|l| value_to_f64(&l.price))
                .reduce(f64::max)
        });
        let best_ask = self.best_ask.as_ref().and_then(value_to_f64).or_else(|| {
            self.asks
                .iter()
                .filter_map(|l| value_to_f64(&l.price))
                .reduce(f64::min)
        });

        BookTop {
            bid: best_bid,
            ask: best_ask,
        }
    }
}

impl ClobApiClient {
    pub fn new(client: Client, base_url: String, book_path: String) -> Self {
        let book_path = if book_path.starts_with('/') {
            book_path
        } else {
            format!("/{}", book_path)
        };

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            book_path,
        }
    }

    /// Fetch best bid/ask for one token. One attempt, no retry.
    pub async fn fetch_book_top(&self, token_id: &str) -> Result<BookTop, ProxyError> {
        let url = format!("{}{}", self.base_url, self.book_path);

        let response = self.client
            .get(&url)
            .query(&[("token_id", token_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::Upstream {
                status: status.as_u16(),
                message: format!("CLOB API returned {}", status),
            });
        }

        let book: BookResponse = response.json().await?;
        let top = book.top();
        debug!("Book top for {}: bid={:?} ask={:?}", token_id, top.bid, top.ask);

        Ok(top)
    }
}

#[async_trait]
impl OrderBookSource for ClobApiClient {
    async fn best_prices(&self, token_id: &str) -> Result<BookTop, ProxyError> {
        self.fetch_book_top(token_id).await
    }
}
