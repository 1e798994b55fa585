use chrono::{DateTime, Local};

use crate::fetch::{FetchEvent, Fetcher, MarketFetch};
use crate::filter::{filter_coins, repair_selection};
use crate::format::format_time;
use crate::prefs::{BackgroundStyle, Preferences, ThemeMode};
use crate::store::Store;
use crate::theme::{self, Theme};
use crate::types::*;

#[derive(Debug, Clone, Default)]
pub struct MarketState {
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<String>,
    pub refresh_error: Option<String>,
    pub last_updated: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChartKey {
    coin_id: String,
    range: ChartRange,
    refresh: u64,
}

/// Root owner of all dashboard state. Every command ends with
/// [`App::recompute`], which derives the visible list, repairs the selection
/// and keeps the chart request in step with (selection, range, refresh).
pub struct App {
    pub coins: Vec<Coin>,
    pub selected: Option<String>,
    pub query: String,
    pub favorites_only: bool,
    pub prefs: Preferences,
    pub theme: Theme,
    pub market: MarketState,
    pub chart_range: ChartRange,
    pub chart: ChartState,
    pub chart_visible: bool,
    pub input_mode: InputMode,
    pub scroll_offset: usize,
    pub page_height: usize,
    pub quit: bool,
    visible: Vec<String>,
    detail_coin: Option<String>,
    chart_refresh: u64,
    chart_key: Option<ChartKey>,
    store: Store,
    fetcher: Fetcher,
}

impl App {
    pub fn new(store: Store, fetcher: Fetcher) -> Self {
        let prefs = Preferences::load(&store);
        let theme = theme::for_prefs(prefs.theme, prefs.background);
        tracing::info!(
            favorites = prefs.favorites.len(),
            theme = prefs.theme.as_str(),
            background = prefs.background.as_str(),
            "Preferences loaded"
        );
        Self {
            coins: Vec::new(),
            selected: None,
            query: String::new(),
            favorites_only: false,
            prefs,
            theme,
            market: MarketState::default(),
            chart_range: ChartRange::default(),
            chart: ChartState::default(),
            chart_visible: false,
            input_mode: InputMode::Normal,
            scroll_offset: 0,
            page_height: 20,
            quit: false,
            visible: Vec::new(),
            detail_coin: None,
            chart_refresh: 0,
            chart_key: None,
            store,
            fetcher,
        }
    }

    // -- Derived state --

    pub fn visible_coins(&self) -> Vec<&Coin> {
        self.visible.iter().filter_map(|id| self.coin(id)).collect()
    }

    pub fn coin(&self, id: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| c.id == id)
    }

    pub fn selected_coin(&self) -> Option<&Coin> {
        self.selected.as_deref().and_then(|id| self.coin(id))
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_deref()?;
        self.visible.iter().position(|v| v == id)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.prefs.favorites.contains(id)
    }

    pub fn last_updated_label(&self) -> String {
        self.market
            .last_updated
            .map(|t| format_time(&t))
            .unwrap_or_else(|| "\u{2014}".to_string())
    }

    /// Single pass: filter, repair selection, reset the detail panel on a new
    /// coin, then issue or clear the chart request if its key changed.
    pub fn recompute(&mut self) {
        let filtered = filter_coins(
            &self.coins,
            &self.query,
            self.favorites_only,
            &self.prefs.favorites,
        );
        let selected = repair_selection(&filtered, self.selected.as_deref());
        self.visible = filtered.iter().map(|c| c.id.clone()).collect();
        self.selected = selected;

        if self.selected != self.detail_coin {
            self.chart_visible = false;
            self.detail_coin = self.selected.clone();
        }

        self.sync_chart();
        self.adjust_scroll();
    }

    fn sync_chart(&mut self) {
        let key = self.selected.as_ref().map(|id| ChartKey {
            coin_id: id.clone(),
            range: self.chart_range,
            refresh: self.chart_refresh,
        });
        if key == self.chart_key {
            return;
        }

        match &key {
            Some(k) => {
                self.fetcher.fetch_chart(k.coin_id.clone(), k.range.days());
                self.chart.loading = true;
                self.chart.error = None;
            }
            None => {
                self.fetcher.cancel_chart();
                self.chart = ChartState::default();
            }
        }
        self.chart_key = key;
    }

    // -- Market data --

    pub fn load_markets(&mut self) {
        self.market.loading = true;
        self.market.error = None;
        self.fetcher.fetch_markets(MarketFetch::Initial);
    }

    /// Manual refresh of both the list and the chart. Ignored while a market
    /// fetch is still pending.
    pub fn refresh(&mut self) {
        if self.market.loading || self.market.refreshing {
            tracing::debug!("Refresh ignored, market fetch in flight");
            return;
        }
        self.market.refreshing = true;
        self.market.refresh_error = None;
        self.fetcher.fetch_markets(MarketFetch::Refresh);
        self.chart_refresh += 1;
        self.recompute();
    }

    pub fn apply(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Markets { kind, result } => {
                match kind {
                    MarketFetch::Initial => self.market.loading = false,
                    MarketFetch::Refresh => self.market.refreshing = false,
                }
                match result {
                    Ok(coins) => {
                        tracing::info!(count = coins.len(), ?kind, "Market data updated");
                        let keep = self
                            .selected
                            .as_ref()
                            .is_some_and(|id| coins.iter().any(|c| &c.id == id));
                        if !keep {
                            self.selected = coins.first().map(|c| c.id.clone());
                        }
                        self.coins = coins;
                        self.market.last_updated = Some(Local::now());
                    }
                    Err(e) => {
                        let msg = e.to_string();
                        tracing::error!(error = %msg, ?kind, "Market fetch failed");
                        match kind {
                            MarketFetch::Initial => self.market.error = Some(msg),
                            MarketFetch::Refresh => self.market.refresh_error = Some(msg),
                        }
                    }
                }
                self.recompute();
            }
            FetchEvent::Chart {
                generation,
                coin_id,
                days,
                result,
            } => {
                if !self.fetcher.is_current_chart(generation) {
                    tracing::debug!(coin_id = %coin_id, days, generation, "Discarding stale chart result");
                    return;
                }
                self.chart.loading = false;
                match result {
                    Ok(prices) => {
                        self.chart.prices = prices;
                        self.chart.error = None;
                    }
                    Err(e) => {
                        tracing::error!(coin_id = %coin_id, days, error = %e, "Chart fetch failed");
                        self.chart.error = Some(e.to_string());
                    }
                }
            }
        }
    }

    // -- Selection --

    pub fn select(&mut self, id: &str) {
        if self.visible.iter().any(|v| v == id) {
            self.selected = Some(id.to_string());
        }
        self.recompute();
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let current = self.selected_index().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        let id = self.visible[next].clone();
        self.select(&id);
    }

    pub fn select_first(&mut self) {
        if let Some(id) = self.visible.first().cloned() {
            self.select(&id);
        }
    }

    pub fn select_last(&mut self) {
        if let Some(id) = self.visible.last().cloned() {
            self.select(&id);
        }
    }

    pub fn adjust_scroll(&mut self) {
        if self.page_height == 0 {
            return;
        }
        let selected = self.selected_index().unwrap_or(0);
        let len = self.visible.len();
        if selected < self.scroll_offset {
            self.scroll_offset = selected;
        } else if selected >= self.scroll_offset + self.page_height {
            self.scroll_offset = selected + 1 - self.page_height;
        }
        let max_offset = len.saturating_sub(self.page_height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    // -- Filter --

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.recompute();
    }

    pub fn push_query_char(&mut self, c: char) {
        self.query.push(c);
        self.recompute();
    }

    pub fn pop_query_char(&mut self) {
        self.query.pop();
        self.recompute();
    }

    pub fn toggle_favorites_only(&mut self) {
        self.favorites_only = !self.favorites_only;
        self.recompute();
    }

    // -- Preferences --

    pub fn toggle_favorite(&mut self, id: &str) {
        let now_favorite = self.prefs.favorites.toggle(id);
        tracing::debug!(coin_id = id, now_favorite, "Favorite toggled");
        self.prefs.save_favorites(&self.store);
        self.recompute();
    }

    pub fn toggle_favorite_selected(&mut self) {
        if let Some(id) = self.selected.clone() {
            self.toggle_favorite(&id);
        }
    }

    pub fn toggle_theme(&mut self) {
        self.prefs.theme = self.prefs.theme.toggled();
        self.prefs.save_theme(&self.store);
        self.apply_theme();
    }

    /// Cycles the light-mode backdrop. Has no effect in dark mode, where the
    /// backdrop is not shown.
    pub fn cycle_background(&mut self) {
        if self.prefs.theme != ThemeMode::Light {
            return;
        }
        self.set_background(self.prefs.background.next());
    }

    pub fn set_background(&mut self, background: BackgroundStyle) {
        self.prefs.background = background;
        self.prefs.save_background(&self.store);
        self.apply_theme();
    }

    fn apply_theme(&mut self) {
        self.theme = theme::for_prefs(self.prefs.theme, self.prefs.background);
    }

    // -- Chart --

    /// Picks a range from the detail panel, which also reveals the chart.
    pub fn set_chart_range(&mut self, range: ChartRange) {
        self.chart_range = range;
        self.chart_visible = true;
        self.recompute();
    }

    pub fn cycle_chart_range(&mut self, forward: bool) {
        self.chart_range = if forward {
            self.chart_range.next()
        } else {
            self.chart_range.prev()
        };
        self.recompute();
    }

    pub fn toggle_chart(&mut self) {
        if self.selected.is_some() {
            self.chart_visible = !self.chart_visible;
        }
    }
}
