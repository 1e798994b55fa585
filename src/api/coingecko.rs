use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{ApiError, MarketSource, Result};
use crate::types::Coin;

const BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PRO_BASE_URL: &str = "https://pro-api.coingecko.com/api/v3";

const PER_PAGE: u32 = 20;
const CURRENCY: &str = "usd";
const CHANGE_WINDOWS: &str = "24h,7d,30d,1y";

pub struct CoinGeckoClient {
    client: Client,
    api_key: String,
}

#[derive(Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Option<Vec<(f64, Option<f64>)>>,
}

impl CoinGeckoClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("viewcoin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
        })
    }

    fn base_url(&self) -> &str {
        if self.api_key.is_empty() {
            BASE_URL
        } else {
            PRO_BASE_URL
        }
    }

    fn apply_key(&self, url: &str) -> String {
        if self.api_key.is_empty() {
            url.to_string()
        } else {
            let sep = if url.contains('?') { "&" } else { "?" };
            format!("{}{}x_cg_pro_api_key={}", url, sep, self.api_key)
        }
    }

    pub fn markets_url(&self) -> String {
        let url = format!(
            "{}/coins/markets?vs_currency={}&order=market_cap_desc&per_page={}&page=1&sparkline=true&price_change_percentage={}",
            self.base_url(),
            CURRENCY,
            PER_PAGE,
            CHANGE_WINDOWS
        );
        self.apply_key(&url)
    }

    pub fn market_chart_url(&self, coin_id: &str, days: u32) -> String {
        let url = format!(
            "{}/coins/{}/market_chart?vs_currency={}&days={}",
            self.base_url(),
            coin_id,
            CURRENCY,
            days
        );
        self.apply_key(&url)
    }

    async fn get_text(&self, url: &str, failure: &'static str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            tracing::warn!(%status, "CoinGecko request rejected");
            return Err(ApiError::Status {
                status,
                message: failure,
            });
        }

        Ok(resp.text().await?)
    }
}

pub fn parse_markets(body: &str) -> Result<Vec<Coin>> {
    serde_json::from_str(body).map_err(|source| ApiError::Parse {
        what: "market data",
        source,
    })
}

/// Keeps the price half of each `[timestamp, price]` pair, in order.
pub fn parse_market_chart(body: &str) -> Result<Vec<f64>> {
    let chart: MarketChart = serde_json::from_str(body).map_err(|source| ApiError::Parse {
        what: "chart data",
        source,
    })?;
    Ok(chart
        .prices
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(_, price)| price)
        .collect())
}

#[async_trait]
impl MarketSource for CoinGeckoClient {
    async fn fetch_markets(&self) -> Result<Vec<Coin>> {
        let url = self.markets_url();
        tracing::debug!("Fetching market list");
        let body = self.get_text(&url, "Failed to fetch market data").await?;
        let coins = parse_markets(&body)?;
        tracing::info!(count = coins.len(), "Market list loaded");
        Ok(coins)
    }

    async fn fetch_market_chart(&self, coin_id: &str, days: u32) -> Result<Vec<f64>> {
        let url = self.market_chart_url(coin_id, days);
        tracing::debug!(coin_id, days, "Fetching market chart");
        let body = self.get_text(&url, "Failed to fetch chart data").await?;
        parse_market_chart(&body)
    }
}
