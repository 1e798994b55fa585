use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Block, Borders, Cell, Paragraph, Row, Sparkline, Table,
    },
    Frame,
};

use super::sparkline::{self, SparkShape, Trend};
use crate::app::App;
use crate::format::{format_compact, format_currency, format_pct};
use crate::prefs::ThemeMode;
use crate::theme::{self, Theme};
use crate::types::*;

pub fn draw(f: &mut Frame, app: &mut App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.bg).fg(app.theme.fg));
    f.render_widget(bg_block, f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // search bar
            Constraint::Min(8),    // list + details
            Constraint::Length(1), // hints
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    draw_search_bar(f, app, chunks[1]);
    draw_main(f, app, chunks[2]);
    draw_bottom_bar(f, app, chunks[3]);
}

// -- Header --

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;

    let title = Line::from(vec![
        Span::styled(" ViewCoin ", Style::default().fg(t.title).add_modifier(Modifier::BOLD)),
        Span::styled("Top 20 coins \u{2022} Live from CoinGecko", Style::default().fg(t.dim)),
    ]);

    let mut prefs = vec![Span::styled(
        if app.prefs.theme == ThemeMode::Dark { "t Light mode " } else { "t Dark mode " },
        Style::default().fg(t.accent),
    )];
    if app.prefs.theme == ThemeMode::Light {
        prefs.push(Span::styled("\u{2502} b Background: ", Style::default().fg(t.dim)));
        prefs.push(Span::styled(
            format!("{} ", app.prefs.background.as_str()),
            Style::default().fg(t.fg).add_modifier(Modifier::BOLD),
        ));
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(34)])
        .split(area);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(t.border));
    f.render_widget(Paragraph::new(title).block(block.clone()), cols[0]);
    f.render_widget(
        Paragraph::new(Line::from(prefs)).alignment(Alignment::Right).block(block),
        cols[1],
    );
}

// -- Search bar --

fn draw_search_bar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let editing = app.input_mode == InputMode::Search;

    let block = Block::default()
        .title(" Search ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { t.input_accent } else { t.border }))
        .style(Style::default().bg(t.panel_bg));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(22)])
        .split(inner);

    let input = if app.query.is_empty() && !editing {
        Span::styled(" Search by name or symbol  (/)", Style::default().fg(t.dim))
    } else if editing {
        Span::styled(format!(" {}_", app.query), Style::default().fg(t.fg))
    } else {
        Span::styled(format!(" {}", app.query), Style::default().fg(t.fg))
    };
    f.render_widget(Paragraph::new(Line::from(input)), cols[0]);

    let toggle = if app.favorites_only {
        Span::styled(
            format!("\u{2605} Favorites on ({}) ", app.prefs.favorites.len()),
            Style::default().fg(t.favorite).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled("\u{2606} Show favorites (F) ", Style::default().fg(t.dim))
    };
    f.render_widget(Paragraph::new(Line::from(toggle)).alignment(Alignment::Right), cols[1]);
}

// -- Main --

fn draw_main(f: &mut Frame, app: &mut App, area: Rect) {
    let t = app.theme.clone();

    if app.market.loading {
        let msg = Paragraph::new("Loading market data...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(t.dim))
            .block(panel(&t, ""));
        f.render_widget(msg, area);
        return;
    }

    if let Some(ref err) = app.market.error {
        let msg = Paragraph::new(err.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(t.error))
            .block(panel(&t, "").border_style(Style::default().fg(t.error)));
        f.render_widget(msg, area);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(area);

    draw_coin_list(f, app, cols[0]);
    draw_details(f, app, cols[1]);
}

fn panel<'a>(t: &Theme, title: &'a str) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border))
        .style(Style::default().bg(t.panel_bg))
}

// -- Coin list --

fn draw_coin_list(f: &mut Frame, app: &mut App, area: Rect) {
    let t = app.theme.clone();

    let status = if app.market.refresh_error.is_some() {
        Span::styled(" Unable to refresh. ", Style::default().fg(t.error))
    } else {
        Span::styled(
            format!(" Updated {} ", app.last_updated_label()),
            Style::default().fg(t.dim),
        )
    };
    let refresh = if app.market.refreshing {
        Span::styled(" Refreshing... ", Style::default().fg(t.dim))
    } else {
        Span::styled(" r Refresh ", Style::default().fg(t.accent))
    };

    let block = panel(&t, " Top coins ")
        .title(Line::from(status))
        .title_bottom(Line::from(refresh).right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);

    // header row + one spacer
    app.page_height = (inner.height.saturating_sub(2) as usize).max(1);
    app.adjust_scroll();

    let visible = app.visible_coins();
    if visible.is_empty() {
        let msg = Paragraph::new("No coins match your search.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(t.dim));
        f.render_widget(msg, inner);
        return;
    }

    let header = Row::new(
        ["#", "Coin", "Price", "24h", "7d", "Fav"]
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(t.dim))),
    )
    .height(1)
    .bottom_margin(1);

    let rows: Vec<Row> = visible
        .iter()
        .skip(app.scroll_offset)
        .take(app.page_height)
        .map(|coin| {
            let is_selected = app.selected.as_deref() == Some(coin.id.as_str());
            let change = coin.price_change_percentage_24h.unwrap_or(0.0);
            let change_color = if change >= 0.0 { t.positive } else { t.negative };
            let (name_fg, sub_fg) = if is_selected {
                (t.highlight_fg, t.highlight_fg)
            } else {
                (t.fg, t.dim)
            };
            let trend = coin.sparkline_7d();
            let trend_color = match Trend::of(trend) {
                Some(Trend::Up) => t.positive,
                Some(Trend::Down) => t.negative,
                None => t.dim,
            };
            let fav = if app.is_favorite(&coin.id) {
                Cell::from("\u{2605}").style(Style::default().fg(t.favorite))
            } else {
                Cell::from("\u{2606}").style(Style::default().fg(sub_fg))
            };

            let cells = vec![
                Cell::from(coin.market_cap_rank.map(|r| r.to_string()).unwrap_or_default())
                    .style(Style::default().fg(sub_fg)),
                Cell::from(Line::from(vec![
                    Span::styled(coin.name.clone(), Style::default().fg(name_fg).add_modifier(Modifier::BOLD)),
                    Span::styled(format!(" {}", coin.symbol.to_uppercase()), Style::default().fg(sub_fg)),
                ])),
                Cell::from(format_currency(coin.current_price)).style(Style::default().fg(name_fg)),
                Cell::from(format!("{:.2}%", change))
                    .style(Style::default().fg(change_color).add_modifier(Modifier::BOLD)),
                Cell::from(sparkline::glyphs(trend, 12)).style(Style::default().fg(trend_color)),
                fav,
            ];

            let style = if is_selected {
                Style::default()
                    .bg(theme::selected_row_bg(&t, app.prefs.theme, &coin.symbol))
                    .fg(t.highlight_fg)
            } else {
                Style::default().bg(t.panel_bg)
            };
            Row::new(cells).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(3),
    ];

    let table = Table::new(rows, widths).header(header).column_spacing(1);
    f.render_widget(table, inner);
}

// -- Detail panel --

fn draw_details(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;

    let coin = match app.selected_coin() {
        Some(c) => c,
        None => {
            let msg = Paragraph::new("Select a coin to see details.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(t.dim))
                .block(panel(t, "").border_style(Style::default().fg(t.dim)));
            f.render_widget(msg, area);
            return;
        }
    };

    let block = panel(t, "");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chart_height = if app.chart_visible { 8 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),            // identity
            Constraint::Length(1),            // blank
            Constraint::Length(4),            // stats
            Constraint::Length(1),            // chart header
            Constraint::Length(chart_height), // chart
            Constraint::Length(1),            // blank
            Constraint::Length(3),            // price change
            Constraint::Min(0),
        ])
        .split(inner);

    // Identity
    let rank = coin.market_cap_rank.map(|r| format!("#{} ", r)).unwrap_or_default();
    let identity = vec![
        Line::from(vec![
            Span::styled(rank, Style::default().fg(t.dim)),
            Span::styled(coin.name.clone(), Style::default().fg(t.title).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", coin.symbol.to_uppercase()), Style::default().fg(t.dim)),
        ]),
        Line::from(vec![
            Span::styled("LIVE ", Style::default().fg(t.dim)),
            Span::styled("\u{25cf}", Style::default().fg(t.positive)),
        ]),
    ];
    f.render_widget(Paragraph::new(identity), chunks[0]);

    // Stats
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<16}", label), Style::default().fg(t.dim)),
            Span::styled(value, Style::default().fg(t.fg).add_modifier(Modifier::BOLD)),
        ])
    };
    let stats = vec![
        stat("Current price", format_currency(coin.current_price)),
        stat("Market cap", format_compact(coin.market_cap)),
        stat("24h volume", format_compact(coin.total_volume)),
        stat(
            "24h high / low",
            format!(
                "{} / {}",
                format_currency(coin.high_24h.unwrap_or(0.0)),
                format_currency(coin.low_24h.unwrap_or(0.0))
            ),
        ),
    ];
    f.render_widget(Paragraph::new(stats), chunks[2]);

    // Chart header
    let toggle = if app.chart_visible { "c Hide chart" } else { "c Show chart" };
    let chart_header = Line::from(vec![
        Span::styled(
            format!("PRICE TREND \u{b7} {}", app.chart_range.label()),
            Style::default().fg(t.dim).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(toggle, Style::default().fg(t.accent)),
    ]);
    f.render_widget(Paragraph::new(chart_header), chunks[3]);

    if app.chart_visible {
        draw_chart(f, app, chunks[4]);
    }

    draw_changes(f, app, coin, chunks[6]);
}

fn draw_chart(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let message = |text: &'static str, color: Color| {
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(t.border)))
    };

    if app.chart.loading {
        f.render_widget(message("Loading chart data...", t.dim), area);
        return;
    }
    if app.chart.error.is_some() {
        f.render_widget(message("Unable to load chart data.", t.error), area);
        return;
    }
    if app.chart.prices.is_empty() {
        f.render_widget(message("No chart data available.", t.dim), area);
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border))
        .title(format!(" {} price trend ", app.chart_range.label()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Fewer than two samples draws nothing.
    let shape = match SparkShape::new(&app.chart.prices) {
        Some(s) => s,
        None => return,
    };
    let color = match shape.trend {
        Trend::Up => t.positive,
        Trend::Down => t.negative,
    };

    // Area fill underneath, then the line on top.
    let resolution = inner.height.max(1) as u64 * 8;
    let fill = sparkline::bars(&app.chart.prices, inner.width as usize, resolution);
    f.render_widget(
        Sparkline::default()
            .data(&fill)
            .max(resolution)
            .style(Style::default().fg(color).add_modifier(Modifier::DIM)),
        inner,
    );

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, sparkline::WIDTH])
        .y_bounds([0.0, sparkline::HEIGHT])
        .paint(|ctx| {
            for ((x1, y1), (x2, y2)) in shape.segments() {
                ctx.draw(&CanvasLine::new(x1, y1, x2, y2, color));
            }
        });
    f.render_widget(canvas, inner);
}

fn draw_changes(f: &mut Frame, app: &App, coin: &Coin, area: Rect) {
    let t = &app.theme;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(2)])
        .split(area);
    f.render_widget(
        Paragraph::new(Span::styled(
            "PRICE CHANGE",
            Style::default().fg(t.dim).add_modifier(Modifier::BOLD),
        )),
        rows[0],
    );

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[1]);

    for (i, range) in ChartRange::ALL.iter().enumerate() {
        let value = coin.change_for(*range);
        let color = if value.unwrap_or(0.0) >= 0.0 { t.positive } else { t.negative };
        let active = *range == app.chart_range;
        let label_style = if active {
            Style::default().fg(t.fg).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(t.dim)
        };
        let cell = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("{} {}", i + 1, range.change_label()),
                label_style,
            )),
            Line::from(Span::styled(format_pct(value), Style::default().fg(color))),
        ])
        .alignment(Alignment::Center);
        f.render_widget(cell, cols[i]);
    }
}

// -- Bottom bar --

fn draw_bottom_bar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;

    if app.input_mode == InputMode::Search {
        let n = app.visible_coins().len();
        let text = format!(" type to filter ({} results) | Enter keep | Esc clear ", n);
        f.render_widget(
            Paragraph::new(text).style(Style::default().fg(t.input_accent)),
            area,
        );
        return;
    }

    let hints = " j/k \u{2195} | / search | f fav | F favorites | c chart | 1-4 h/l range | r refresh | t theme | b bg | q quit ";
    let mut spans = vec![Span::styled(hints, Style::default().fg(t.dim))];
    if !app.query.is_empty() {
        spans.push(Span::styled(
            format!(" [/{}]", app.query),
            Style::default().fg(t.accent),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::ScriptedSource;
    use crate::fetch::{FetchEvent, Fetcher, MarketFetch};
    use crate::filter::tests::coin;
    use crate::store::Store;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let fetcher = Fetcher::new(Arc::new(ScriptedSource::default()), tx);
        App::new(Store::open_in_memory().unwrap(), fetcher)
    }

    #[tokio::test]
    async fn shows_loading_then_list_and_details() {
        let mut app = app();
        app.load_markets();
        assert!(screen(&mut app).contains("Loading market data..."));

        app.apply(FetchEvent::Markets {
            kind: MarketFetch::Initial,
            result: Ok(vec![coin("bitcoin", "Bitcoin", "btc"), coin("ethereum", "Ethereum", "eth")]),
        });
        let text = screen(&mut app);
        assert!(text.contains("Top coins"));
        assert!(text.contains("Ethereum"));
        assert!(text.contains("Current price"));
        assert!(text.contains("c Show chart"));
    }

    #[tokio::test]
    async fn empty_filter_shows_placeholders() {
        let mut app = app();
        app.apply(FetchEvent::Markets {
            kind: MarketFetch::Initial,
            result: Ok(vec![coin("bitcoin", "Bitcoin", "btc")]),
        });
        app.set_query("zzz");
        let text = screen(&mut app);
        assert!(text.contains("No coins match your search."));
        assert!(text.contains("Select a coin to see details."));
    }
}
