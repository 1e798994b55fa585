mod coingecko;

pub use coingecko::CoinGeckoClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::Coin;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to reach CoinGecko API: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Status {
        status: reqwest::StatusCode,
        message: &'static str,
    },

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Where market snapshots and price history come from.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Top coins by market cap, one page.
    async fn fetch_markets(&self) -> Result<Vec<Coin>>;

    /// Prices (oldest first) covering the last `days` days.
    async fn fetch_market_chart(&self, coin_id: &str, days: u32) -> Result<Vec<f64>>;
}
