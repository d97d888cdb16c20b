mod api;
mod config;
mod data;
mod error;
mod outcomes;

use std::sync::Arc;

use anyhow::{Context, Result};
use config::Config;
use data::clob_api::ClobApiClient;
use data::gamma_api::GammaApiClient;
use outcomes::Resolver;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Polymarket proxy starting...");

    // Load configuration
    let config_path = std::env::var("PROXY_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    let config = Config::load(&config_path)?.apply_env()?;

    tracing::info!("Gamma API: {}", config.upstream.gamma_url);
    tracing::info!("CLOB API: {}{}", config.upstream.clob_url, config.upstream.order_book_path);
    tracing::info!("Upstream timeout: {:?}", config.timeout());

    let client = reqwest::Client::builder()
        .timeout(config.timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let resolver = Resolver::new(
        Arc::new(GammaApiClient::new(client.clone(), config.upstream.gamma_url.clone())),
        Arc::new(ClobApiClient::new(
            client,
            config.upstream.clob_url.clone(),
            config.upstream.order_book_path.clone(),
        )),
        config.timeout(),
    );

    let state = api::AppState {
        resolver,
        allow_origin: Arc::from(config.cors.allow_origin.as_str()),
    };
    let app = api::router(state, &config.server.route);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("✅ Listening on {} (route {})", addr, config.server.route);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down...");
        })
        .await
        .context("Server error")?;

    Ok(())
}
