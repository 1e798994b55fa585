use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::api::{ApiError, MarketSource};
use crate::types::Coin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketFetch {
    Initial,
    Refresh,
}

/// Completion of a background request, delivered to the UI loop.
#[derive(Debug)]
pub enum FetchEvent {
    Markets {
        kind: MarketFetch,
        result: Result<Vec<Coin>, ApiError>,
    },
    Chart {
        generation: u64,
        coin_id: String,
        days: u32,
        result: Result<Vec<f64>, ApiError>,
    },
}

/// Spawns requests against a [`MarketSource`]. At most one chart request is
/// live; issuing a new one aborts the previous task and bumps the generation
/// so a result that was already queued is recognised as stale.
pub struct Fetcher {
    source: Arc<dyn MarketSource>,
    tx: UnboundedSender<FetchEvent>,
    chart_task: Option<JoinHandle<()>>,
    chart_generation: u64,
}

impl Fetcher {
    pub fn new(source: Arc<dyn MarketSource>, tx: UnboundedSender<FetchEvent>) -> Self {
        Self {
            source,
            tx,
            chart_task: None,
            chart_generation: 0,
        }
    }

    pub fn fetch_markets(&self, kind: MarketFetch) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source.fetch_markets().await;
            let _ = tx.send(FetchEvent::Markets { kind, result });
        });
    }

    /// Starts a chart request and returns its generation token.
    pub fn fetch_chart(&mut self, coin_id: String, days: u32) -> u64 {
        let generation = self.cancel_chart();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        tracing::debug!(coin_id = %coin_id, days, generation, "Issuing chart request");
        self.chart_task = Some(tokio::spawn(async move {
            let result = source.fetch_market_chart(&coin_id, days).await;
            let _ = tx.send(FetchEvent::Chart {
                generation,
                coin_id,
                days,
                result,
            });
        }));
        generation
    }

    /// Aborts any live chart request. Returns the new current generation.
    pub fn cancel_chart(&mut self) -> u64 {
        if let Some(task) = self.chart_task.take() {
            if !task.is_finished() {
                tracing::debug!(generation = self.chart_generation, "Cancelling chart request");
            }
            task.abort();
        }
        self.chart_generation += 1;
        self.chart_generation
    }

    pub fn is_current_chart(&self, generation: u64) -> bool {
        generation == self.chart_generation
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    use crate::api::{self, ApiError, MarketSource};
    use crate::types::Coin;

    pub(crate) type ChartReply = api::Result<Vec<f64>>;

    /// Test source: market replies are queued up front; chart requests are
    /// recorded and either answered at once (`[days]`) or held until the test
    /// releases the matching gate.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        markets: Mutex<VecDeque<api::Result<Vec<Coin>>>>,
        chart_calls: Mutex<Vec<(String, u32)>>,
        gates: Mutex<HashMap<(String, u32), oneshot::Receiver<ChartReply>>>,
    }

    impl ScriptedSource {
        pub(crate) fn push_markets(&self, reply: api::Result<Vec<Coin>>) {
            self.markets.lock().unwrap().push_back(reply);
        }

        pub(crate) fn gate(&self, coin_id: &str, days: u32) -> oneshot::Sender<ChartReply> {
            let (tx, rx) = oneshot::channel();
            self.gates
                .lock()
                .unwrap()
                .insert((coin_id.to_string(), days), rx);
            tx
        }

        pub(crate) fn chart_calls(&self) -> Vec<(String, u32)> {
            self.chart_calls.lock().unwrap().clone()
        }
    }

    pub(crate) fn status_error(message: &'static str) -> ApiError {
        ApiError::Status {
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            message,
        }
    }

    #[async_trait]
    impl MarketSource for ScriptedSource {
        async fn fetch_markets(&self) -> api::Result<Vec<Coin>> {
            let next = self.markets.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(Vec::new()))
        }

        async fn fetch_market_chart(&self, coin_id: &str, days: u32) -> api::Result<Vec<f64>> {
            self.chart_calls
                .lock()
                .unwrap()
                .push((coin_id.to_string(), days));
            let gate = self
                .gates
                .lock()
                .unwrap()
                .remove(&(coin_id.to_string(), days));
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(status_error("Failed to fetch chart data"))),
                None => Ok(vec![days as f64, days as f64 + 1.0]),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedSource;
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<FetchEvent>) -> Option<FetchEvent> {
        tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn chart_result_carries_generation() {
        let source = Arc::new(ScriptedSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut fetcher = Fetcher::new(source.clone(), tx);

        let generation = fetcher.fetch_chart("bitcoin".into(), 30);
        match next_event(&mut rx).await {
            Some(FetchEvent::Chart { generation: g, days, result, .. }) => {
                assert_eq!(g, generation);
                assert_eq!(days, 30);
                assert_eq!(result.unwrap(), vec![30.0, 31.0]);
                assert!(fetcher.is_current_chart(g));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn superseded_chart_request_never_reports() {
        let source = Arc::new(ScriptedSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut fetcher = Fetcher::new(source.clone(), tx);

        let release_first = source.gate("bitcoin", 7);
        let first = fetcher.fetch_chart("bitcoin".into(), 7);
        tokio::task::yield_now().await;
        let second = fetcher.fetch_chart("bitcoin".into(), 1);
        assert!(!fetcher.is_current_chart(first));
        assert!(fetcher.is_current_chart(second));

        // The aborted task is gone, so releasing its gate delivers nothing.
        let _ = release_first.send(Ok(vec![99.0]));

        match next_event(&mut rx).await {
            Some(FetchEvent::Chart { generation, days, .. }) => {
                assert_eq!(generation, second);
                assert_eq!(days, 1);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(next_event(&mut rx).await.is_none());
    }

    #[tokio::test]
    async fn cancel_invalidates_without_new_request() {
        let source = Arc::new(ScriptedSource::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut fetcher = Fetcher::new(source, tx);
        let g = fetcher.fetch_chart("solana".into(), 365);
        let after = fetcher.cancel_chart();
        assert!(!fetcher.is_current_chart(g));
        assert!(fetcher.is_current_chart(after));
    }

    #[tokio::test]
    async fn market_fetch_reports_kind() {
        let source = Arc::new(ScriptedSource::default());
        source.push_markets(Err(testing::status_error("Failed to fetch market data")));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let fetcher = Fetcher::new(source, tx);

        fetcher.fetch_markets(MarketFetch::Refresh);
        match next_event(&mut rx).await {
            Some(FetchEvent::Markets { kind, result }) => {
                assert_eq!(kind, MarketFetch::Refresh);
                assert!(result.is_err());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
