use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_route")]
    pub route: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_gamma_url")]
    pub gamma_url: String,
    #[serde(default = "default_clob_url")]
    pub clob_url: String,
    #[serde(default = "default_order_book_path")]
    pub order_book_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_route() -> String { "/api/polymarket".to_string() }
fn default_gamma_url() -> String { "https://gamma-api.polymarket.com".to_string() }
fn default_clob_url() -> String { "https://clob.polymarket.com".to_string() }
fn default_order_book_path() -> String { "/book".to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_allow_origin() -> String { "*".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            route: default_route(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            gamma_url: default_gamma_url(),
            clob_url: default_clob_url(),
            order_book_path: default_order_book_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
        }
    }
}

impl Config {
    /// Load from a TOML file. A missing file means defaults.
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            tracing::info!("No config file at {}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply overrides from the environment (and `.env`).
    pub fn apply_env(self) -> Result<Self> {
        dotenv::dotenv().ok();
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {}", port))?;
        }
        if let Some(url) = var("POLYMARKET_GAMMA_URL") {
            self.upstream.gamma_url = url;
        }
        if let Some(url) = var("POLYMARKET_CLOB_URL") {
            self.upstream.clob_url = url;
        }
        if let Some(secs) = var("UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = secs
                .parse()
                .with_context(|| format!("UPSTREAM_TIMEOUT_SECS is not a number: {}", secs))?;
        }
        if let Some(origin) = var("CORS_ALLOW_ORIGIN") {
            self.cors.allow_origin = origin;
        }

        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.upstream.timeout_secs)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
