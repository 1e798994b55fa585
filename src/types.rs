use serde::{Deserialize, Deserializer};

fn f64_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Option::<f64>::deserialize(d).map(|v| v.unwrap_or(0.0))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Coin {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub market_cap: f64,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub total_volume: f64,
    pub market_cap_rank: Option<u32>,
    pub price_change_percentage_24h: Option<f64>,
    pub price_change_percentage_7d_in_currency: Option<f64>,
    pub price_change_percentage_30d_in_currency: Option<f64>,
    pub price_change_percentage_1y_in_currency: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub sparkline_in_7d: Option<SparklineIn7d>,
}

impl Coin {
    /// Percentage change for the window a chart range covers.
    pub fn change_for(&self, range: ChartRange) -> Option<f64> {
        match range {
            ChartRange::Day1 => self.price_change_percentage_24h,
            ChartRange::Day7 => self.price_change_percentage_7d_in_currency,
            ChartRange::Day30 => self.price_change_percentage_30d_in_currency,
            ChartRange::Year1 => self.price_change_percentage_1y_in_currency,
        }
    }

    pub fn sparkline_7d(&self) -> &[f64] {
        self.sparkline_in_7d
            .as_ref()
            .map(|s| s.price.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SparklineIn7d {
    #[serde(default)]
    pub price: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChartRange {
    Day1,
    #[default]
    Day7,
    Day30,
    Year1,
}

impl ChartRange {
    pub const ALL: [ChartRange; 4] = [
        ChartRange::Day1,
        ChartRange::Day7,
        ChartRange::Day30,
        ChartRange::Year1,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartRange::Day1 => "1D",
            ChartRange::Day7 => "7D",
            ChartRange::Day30 => "30D",
            ChartRange::Year1 => "1Y",
        }
    }

    /// Label of the matching price-change window in the detail panel.
    pub fn change_label(self) -> &'static str {
        match self {
            ChartRange::Day1 => "24h",
            ChartRange::Day7 => "7d",
            ChartRange::Day30 => "30d",
            ChartRange::Year1 => "1y",
        }
    }

    pub fn days(self) -> u32 {
        match self {
            ChartRange::Day1 => 1,
            ChartRange::Day7 => 7,
            ChartRange::Day30 => 30,
            ChartRange::Year1 => 365,
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartRange::Day1 => ChartRange::Day7,
            ChartRange::Day7 => ChartRange::Day30,
            ChartRange::Day30 => ChartRange::Year1,
            ChartRange::Year1 => ChartRange::Day1,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ChartRange::Day1 => ChartRange::Year1,
            ChartRange::Day7 => ChartRange::Day1,
            ChartRange::Day30 => ChartRange::Day7,
            ChartRange::Year1 => ChartRange::Day30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartState {
    pub prices: Vec<f64>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_market_record_with_nulls() {
        let json = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://assets.coingecko.com/coins/images/1/large/bitcoin.png",
            "current_price": 67000.5,
            "market_cap": null,
            "total_volume": 21000000000,
            "market_cap_rank": 1,
            "high_24h": null,
            "low_24h": 65000,
            "price_change_percentage_24h": -1.25,
            "price_change_percentage_7d_in_currency": 3.5,
            "price_change_percentage_30d_in_currency": null,
            "price_change_percentage_1y_in_currency": 120.0,
            "sparkline_in_7d": { "price": [1.0, 2.0, 3.0] }
        }"#;
        let coin: Coin = serde_json::from_str(json).unwrap();
        assert_eq!(coin.id, "bitcoin");
        assert_eq!(coin.market_cap, 0.0);
        assert_eq!(coin.high_24h, None);
        assert_eq!(coin.low_24h, Some(65000.0));
        assert_eq!(coin.market_cap_rank, Some(1));
        assert_eq!(coin.change_for(ChartRange::Day1), Some(-1.25));
        assert_eq!(coin.change_for(ChartRange::Day30), None);
        assert_eq!(coin.sparkline_7d(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_sparkline_is_empty() {
        let coin: Coin = serde_json::from_str(r#"{"id":"x","market_cap_rank":null}"#).unwrap();
        assert!(coin.sparkline_7d().is_empty());
    }

    #[test]
    fn chart_range_days_and_cycle() {
        let days: Vec<u32> = ChartRange::ALL.iter().map(|r| r.days()).collect();
        assert_eq!(days, vec![1, 7, 30, 365]);
        assert_eq!(ChartRange::default(), ChartRange::Day7);
        for r in ChartRange::ALL {
            assert_eq!(r.next().prev(), r);
        }
        assert_eq!(ChartRange::Year1.next(), ChartRange::Day1);
    }
}
