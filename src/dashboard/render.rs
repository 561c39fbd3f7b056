use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Gauge, Paragraph, Sparkline, Widget};
use serde_json::Value;
use std::io::{self, Write};

use super::catalog::{Category, PHASES, QUICK_PICKS};
use super::chart::heat_chart;
use super::state::{CurrentCompare, CurrentReport, Dashboard, View};
use crate::report::display::{
    confidence_tone, edge_tone, format_score, format_shift, heat_tone, lag_confidence_tone,
    lag_signal_tone, regime_tone, sentiment_tone, shift_tone, Tone,
};
use crate::report::{Dimension, Report, WatchEntry, WatchHeat};

pub const PRICE_LAG_TITLE: &str = "Narrative → Price Lag";
const RECENT_LIMIT: usize = 8;
const DISCLAIMER: &str = "NARRIV — NOT FINANCIAL ADVICE";
const LABEL_WIDTH: u16 = 12;
const SPARK_HEIGHT: u16 = 3;
const TRACK: Color = Color::Rgb(30, 30, 40);

/// What a row draws next to its text.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Text,
    /// 0..=100 gauge in the row tone.
    Gauge(f64),
    /// Two gauges side by side, each in its own tone.
    Versus { left: (f64, Tone), right: (f64, Tone) },
    Spark(Vec<u64>),
}

/// One row of a panel; `tone` overrides the default text colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub text: String,
    pub tone: Option<Tone>,
    pub shape: Shape,
}

impl Row {
    fn style(&self) -> Style {
        self.tone
            .map_or_else(Style::default, |tone| Style::default().fg(tone.color()))
    }

    fn height(&self, width: u16) -> u16 {
        match self.shape {
            Shape::Text => u16::try_from(wrap(&self.text, width).len()).unwrap_or(u16::MAX),
            Shape::Spark(_) => SPARK_HEIGHT,
            Shape::Gauge(_) | Shape::Versus { .. } => 1,
        }
    }

    fn draw(&self, area: Rect, buf: &mut Buffer) {
        match &self.shape {
            Shape::Text => {
                let lines: Vec<_> = wrap(&self.text, area.width)
                    .into_iter()
                    .map(ratatui::text::Line::from)
                    .collect();
                Paragraph::new(lines).style(self.style()).render(area, buf);
            }
            Shape::Gauge(value) => {
                let bar = self.label(area, buf);
                gauge(*value, self.tone.unwrap_or(Tone::Muted)).render(bar, buf);
            }
            Shape::Versus { left, right } => {
                let bar = self.label(area, buf);
                let [a, _, b] = Layout::horizontal([
                    Constraint::Fill(1),
                    Constraint::Length(1),
                    Constraint::Fill(1),
                ])
                .areas(bar);
                gauge(left.0, left.1).render(a, buf);
                gauge(right.0, right.1).render(b, buf);
            }
            Shape::Spark(values) => {
                Sparkline::default()
                    .data(values)
                    .max(100)
                    .style(self.style())
                    .render(area, buf);
            }
        }
    }

    /// Draws the text in a fixed label column and returns the space left.
    fn label(&self, area: Rect, buf: &mut Buffer) -> Rect {
        if self.text.is_empty() {
            return area;
        }
        let [label, rest] =
            Layout::horizontal([Constraint::Length(LABEL_WIDTH), Constraint::Fill(1)]).areas(area);
        Paragraph::new(self.text.as_str())
            .style(self.style())
            .render(label, buf);
        rest
    }
}

fn gauge(value: f64, tone: Tone) -> Gauge<'static> {
    Gauge::default()
        .gauge_style(Style::default().fg(tone.color()).bg(TRACK))
        .ratio(value.clamp(0.0, 100.0) / 100.0)
        .label(format_score(value))
}

/// Hard-wraps on character count so row heights are known before drawing.
fn wrap(text: &str, width: u16) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars
        .chunks(usize::from(width.max(1)))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub tone: Tone,
    pub rows: Vec<Row>,
}

impl Panel {
    fn new(title: impl Into<String>, tone: Tone) -> Self {
        Self {
            title: title.into(),
            tone,
            rows: Vec::new(),
        }
    }

    fn line(mut self, text: impl Into<String>) -> Self {
        self.push(text);
        self
    }

    fn add(&mut self, text: impl Into<String>, tone: Option<Tone>, shape: Shape) {
        self.rows.push(Row {
            text: text.into(),
            tone,
            shape,
        });
    }

    fn push(&mut self, text: impl Into<String>) {
        self.add(text, None, Shape::Text);
    }

    fn push_toned(&mut self, text: impl Into<String>, tone: Tone) {
        self.add(text, Some(tone), Shape::Text);
    }

    fn push_gauge(&mut self, label: impl Into<String>, value: f64, tone: Tone) {
        self.add(label, Some(tone), Shape::Gauge(value));
    }

    pub fn texts(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.text.as_str()).collect()
    }

    /// Rows needed at `width` columns, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let inner = width.saturating_sub(2);
        self.rows
            .iter()
            .fold(2u16, |total, row| total.saturating_add(row.height(inner)))
    }
}

impl Widget for &Panel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colour = Style::default().fg(self.tone.color());
        let mut block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(colour);
        if !self.title.is_empty() {
            block = block.title(Span::styled(
                format!(" {} ", self.title),
                colour.add_modifier(Modifier::BOLD),
            ));
        }
        let inner = block.inner(area);
        block.render(area, buf);

        let mut y = inner.y;
        for row in &self.rows {
            if y >= inner.bottom() {
                break;
            }
            let height = row.height(inner.width).min(inner.bottom() - y);
            row.draw(Rect::new(inner.x, y, inner.width, height), buf);
            y += height;
        }
    }
}

pub fn render(dashboard: &Dashboard) -> Vec<Panel> {
    match dashboard.view() {
        View::Home => render_home(dashboard),
        View::Scanning => render_scanning(dashboard),
        View::Results => match dashboard.current() {
            Some(current) => render_results(dashboard, current),
            None => render_home(dashboard),
        },
        View::Compare => match dashboard.current_compare() {
            Some(compare) => render_compare(compare),
            None => render_home(dashboard),
        },
    }
}

/// Draw each panel at `width` columns and write the cells out, with
/// 24-bit colour when `color` is set.
pub fn write_panels<W: Write>(out: &mut W, panels: &[Panel], width: u16, color: bool) -> io::Result<()> {
    for panel in panels {
        let area = Rect::new(0, 0, width, panel.height(width));
        let mut buf = Buffer::empty(area);
        panel.render(area, &mut buf);
        write_buffer(out, &buf, color)?;
    }
    out.flush()
}

fn write_buffer<W: Write>(out: &mut W, buf: &Buffer, color: bool) -> io::Result<()> {
    use crossterm::queue;
    use crossterm::style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor};

    let area = buf.area;
    for y in area.top()..area.bottom() {
        if color {
            for x in area.left()..area.right() {
                let cell = &buf[(x, y)];
                queue!(
                    out,
                    SetForegroundColor(term_color(cell.fg)),
                    SetBackgroundColor(term_color(cell.bg)),
                    Print(cell.symbol())
                )?;
            }
            queue!(out, ResetColor, Print("\n"))?;
        } else {
            let line: String = (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect();
            queue!(out, Print(line.trim_end()), Print("\n"))?;
        }
    }
    Ok(())
}

fn term_color(color: Color) -> crossterm::style::Color {
    match color {
        Color::Rgb(r, g, b) => crossterm::style::Color::Rgb { r, g, b },
        _ => crossterm::style::Color::Reset,
    }
}

fn heat_text(heat: Option<f64>) -> String {
    heat.map(format_score).unwrap_or_else(|| "--".to_string())
}

fn render_home(dashboard: &Dashboard) -> Vec<Panel> {
    let mut panels = Vec::new();

    if let Some(error) = dashboard.error() {
        panels.push(Panel::new("Error", Tone::Hot).line(error));
    }

    if dashboard.show_watchlist() && !dashboard.watchlist().is_empty() {
        panels.push(render_watchlist(dashboard));
    }

    let selected = dashboard.category();
    let pills = Category::ALL
        .iter()
        .map(|c| {
            if *c == selected {
                format!("[{}]", c.label())
            } else {
                c.label().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    panels.push(
        Panel::new("Asset class", Tone::Muted)
            .line(pills)
            .line(format!("e.g. {}  ·  type \"A vs B\" to compare", selected.examples())),
    );

    if dashboard.history().is_empty() {
        let mut picks = Panel::new("Trending narratives", Tone::Accent);
        for pick in QUICK_PICKS.iter() {
            picks.push(format!("{}  {}", pick.asset, pick.hook));
        }
        panels.push(picks);
    } else {
        let mut recent = Panel::new("Recent scans", Tone::Muted);
        for (i, entry) in dashboard.history().recent(RECENT_LIMIT).enumerate() {
            let report = &entry.report;
            let summary: String = report
                .one_liner
                .clone()
                .or_else(|| {
                    report
                        .narrative_summary
                        .as_deref()
                        .map(|s| s.chars().take(60).collect())
                })
                .unwrap_or_default();
            recent.push_toned(
                format!(
                    "{}. {}  {}  {}",
                    i,
                    report.asset.as_deref().unwrap_or("?"),
                    heat_text(report.heat_index),
                    summary
                ),
                heat_tone(report.heat_index.unwrap_or(0.0)),
            );
        }
        panels.push(recent);
    }

    panels
}

fn watch_row(entry: &WatchEntry) -> String {
    let heat = match entry.heat {
        WatchHeat::Reading(v) => format_score(v),
        WatchHeat::Failed => "x".to_string(),
        WatchHeat::Unscanned => String::new(),
    };
    let mut row = format!("● {}", entry.asset);
    for part in [Some(&heat).filter(|h| !h.is_empty()), entry.label.as_ref(), entry.trend.as_ref()]
        .into_iter()
        .flatten()
    {
        row.push_str("  ");
        row.push_str(part);
    }
    if let Some(summary) = &entry.summary {
        row.push_str(" · ");
        row.push_str(summary);
    }
    row
}

fn render_watchlist(dashboard: &Dashboard) -> Panel {
    let watchlist = dashboard.watchlist();
    let mut panel = Panel::new(format!("Watchlist ({})", watchlist.len()), Tone::Purple);
    if dashboard.is_refreshing() {
        panel.push("Scanning...");
    }
    for entry in watchlist.entries() {
        match entry.heat.reading() {
            Some(heat) => panel.push_toned(watch_row(entry), heat_tone(heat)),
            None => panel.push(watch_row(entry)),
        }
    }
    panel
}

fn render_scanning(dashboard: &Dashboard) -> Vec<Panel> {
    let phase = dashboard.progress().map(|p| p.phase).unwrap_or(0);
    let mut panel = Panel::new(dashboard.query().to_uppercase(), Tone::Accent);
    for (i, caption) in PHASES.iter().enumerate() {
        if i < phase {
            panel.push_toned(format!("✓ {}", caption), Tone::Accent);
        } else if i == phase {
            panel.push(format!("› {}", caption));
        } else {
            panel.push_toned(format!("· {}", caption), Tone::Muted);
        }
    }
    vec![panel]
}

fn render_results(dashboard: &Dashboard, current: &CurrentReport) -> Vec<Panel> {
    let r = &current.report;
    let category = r
        .category
        .clone()
        .unwrap_or_else(|| dashboard.category().id().to_string());
    let mut panels = vec![hero(dashboard, r, &category)];

    if let Some(driver) = &r.primary_driver {
        panels.push(Panel::new("Primary Driver", Tone::Gold).line(driver));
    }

    for (title, tone, items) in [
        ("Supporting Signals", Tone::Accent, &r.supporting_signals),
        ("Contradictions", Tone::Hot, &r.contradictions),
    ] {
        if items.is_empty() {
            continue;
        }
        let mut panel = Panel::new(title, tone);
        for item in items {
            panel.push(item.signal.clone().unwrap_or_default());
            if let Some(evidence) = &item.evidence {
                panel.push(format!("  {}", evidence));
            }
        }
        panels.push(panel);
    }

    if let Some(lag) = &r.price_lag {
        let confidence = lag.confidence.as_deref();
        let mut panel = Panel::new(PRICE_LAG_TITLE, Tone::Purple);
        panel.push_toned(
            format!(
                "Avg: {}h · {}",
                lag.avg_lag_hours.as_deref().unwrap_or("?"),
                confidence.unwrap_or("")
            ),
            lag_confidence_tone(confidence),
        );
        if let Some(pattern) = &lag.pattern {
            panel.push(pattern);
        }
        let signal = lag.current_signal.as_deref();
        panel.push_toned(
            format!("CURRENT SIGNAL {}", signal.unwrap_or("")),
            lag_signal_tone(signal),
        );
        panels.push(panel);
    }

    if let Some(arc) = narrative_arc(r) {
        panels.push(arc);
    }

    let mut breakdown = Panel::new("Signal Breakdown", Tone::Muted);
    for dim in Dimension::ALL {
        let value = r.signal(dim);
        breakdown.push_gauge(dim.label(), value, heat_tone(value));
    }
    panels.push(breakdown);

    if let Some(intel) = &r.twitter_intel {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "—".to_string());
        panels.push(Panel::new("Social Intel", Tone::Blue).line(format!(
            "Vol: {} · 24h: {} · Mood: {}",
            field(&intel.volume_level),
            field(&intel.estimated_mentions_24h),
            field(&intel.platform_sentiment)
        )));
    }

    if let Some(edge) = &r.betting_edge {
        let mut panel = Panel::new("Narrative Edge", edge_tone(edge.edge_rating));
        if let Some(reasoning) = &edge.reasoning {
            panel.push(reasoning);
        }
        panels.push(panel);
    }

    if let Some(debug) = &current.debug {
        panels.push(raw_intel(debug, &current.raw, dashboard.show_debug()));
    }

    let mut footer = DISCLAIMER.to_string();
    if category == Category::Predictions.id() {
        footer.push_str(" — ENTERTAINMENT ONLY");
    }
    panels.push(Panel::new("", Tone::Muted).line(footer));

    panels
}

fn hero(dashboard: &Dashboard, r: &Report, category: &str) -> Panel {
    let tone = heat_tone(r.heat_index.unwrap_or(0.0));
    let asset = r.asset.as_deref().unwrap_or("");
    let mut panel = Panel::new(category.to_uppercase(), tone);

    let watched = if dashboard.is_watched(asset) {
        "◉ Watching"
    } else {
        "+ Watch"
    };
    panel.push(format!("{}  [{}]", asset, watched));
    panel.push(format!(
        "{}  NARRATIVE SCORE  {}",
        heat_text(r.heat_index),
        r.heat_label.as_deref().unwrap_or("")
    ));
    panel.push_gauge("", r.heat_index.unwrap_or(0.0), tone);

    if let Some(summary) = r.summary() {
        panel.push(summary);
    }

    for tag in [r.sentiment.as_deref(), r.trend_direction.as_deref()]
        .into_iter()
        .flatten()
    {
        panel.push_toned(tag, sentiment_tone(Some(tag)));
    }
    if let Some(regime) = &r.regime {
        let trend = regime.trend.as_deref();
        panel.push_toned(
            format!(
                "↕ {}  vol: {}",
                trend.unwrap_or(""),
                regime.volatility.as_deref().unwrap_or("")
            ),
            regime_tone(trend),
        );
    }

    let score = r.confidence_score();
    if score > 0.0 {
        panel.push_gauge("CONFIDENCE", score, confidence_tone(score));
        if let Some(reasoning) = r.confidence.as_ref().and_then(|c| c.reasoning.as_ref()) {
            panel.push(reasoning);
        }
    }

    panel
}

fn narrative_arc(r: &Report) -> Option<Panel> {
    let chart = heat_chart(&r.timeline, r.heat_index.unwrap_or(0.0), &r.narrative_arc);
    if chart.is_none() && r.narrative_arc.is_empty() {
        return None;
    }

    let mut panel = Panel::new("Narrative Arc", chart.as_ref().map(|c| c.tone).unwrap_or(Tone::Muted));
    if let Some(chart) = &chart {
        panel.add("", Some(chart.tone), Shape::Spark(chart.sparkline_data()));
        panel.push(chart.periods().join(" "));
        panel.push(chart.line_path());
    }
    for event in &r.narrative_arc {
        let shift = event.heat_shift.unwrap_or(0.0);
        panel.push_toned(
            format!(
                "{} {} [{}] {}",
                event.date.as_deref().unwrap_or(""),
                format_shift(shift),
                event.source.as_deref().unwrap_or(""),
                event.event.as_deref().unwrap_or("")
            ),
            shift_tone(shift),
        );
    }
    Some(panel)
}

fn raw_intel(debug: &Value, raw: &Value, expanded: bool) -> Panel {
    let turns = debug
        .get("api_turns")
        .and_then(Value::as_u64)
        .filter(|n| *n > 0)
        .unwrap_or(1);
    let count = |key: &str| debug.get(key).and_then(Value::as_array).map_or(0, Vec::len);

    let mut panel = Panel::new("Raw Intel", Tone::Muted).line(format!(
        "{}t · {}s · {}src",
        turns,
        count("searches"),
        count("sources")
    ));

    if expanded {
        if let Some(snapshot) = debug.get("snapshot") {
            panel.push("DATA SNAPSHOT");
            for line in pretty(snapshot).lines() {
                panel.push(line);
            }
        }
        panel.push("RAW JSON");
        for line in pretty(raw).lines() {
            panel.push(line);
        }
    }
    panel
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

fn render_compare(compare: &CurrentCompare) -> Vec<Panel> {
    let c = &compare.report;
    let empty = Report::default();
    let a = c.asset_a.as_ref().unwrap_or(&empty);
    let b = c.asset_b.as_ref().unwrap_or(&empty);
    let name = |r: &Report| r.display_name().unwrap_or("?").to_string();
    let side_tone = |r: &Report| heat_tone(r.heat_index.unwrap_or(0.0));
    let side = |r: &Report| {
        format!(
            "{}  {}  {}",
            heat_text(r.heat_index),
            name(r),
            r.sentiment.as_deref().unwrap_or("")
        )
    };

    let mut panels = vec![Panel::new(format!("{} VS {}", name(a), name(b)), Tone::Muted)
        .line(side(a))
        .line(side(b))];

    let mut signals = Panel::new("Signal Comparison", Tone::Muted);
    for dim in Dimension::ALL {
        signals.add(
            dim.label(),
            None,
            Shape::Versus {
                left: (a.signal(dim), side_tone(a)),
                right: (b.signal(dim), side_tone(b)),
            },
        );
    }
    panels.push(signals);

    if let Some(flow) = &c.narrative_flow {
        panels.push(Panel::new("Narrative Flow", Tone::Accent).line(flow));
    }
    if let Some(alpha) = &c.alpha_signal {
        panels.push(Panel::new("Alpha Signal", Tone::Accent).line(alpha));
    }

    for r in [a, b] {
        if let Some(key) = &r.key_narrative {
            panels.push(Panel::new(name(r), side_tone(r)).line(key));
        }
    }

    panels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::client::ApiReply;
    use chrono::Utc;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;

    fn results(result: Value, debug: Option<Value>) -> Dashboard {
        let mut d = Dashboard::new();
        let ticket = d.submit("BTC").unwrap();
        assert!(d.scan_succeeded(ticket.id, ApiReply { result, debug }, Utc::now()));
        d
    }

    fn titles(panels: &[Panel]) -> Vec<&str> {
        panels.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_minimal_report_renders_hot_without_price_lag() {
        let d = results(json!({"asset": "BTC", "heat_index": 91, "heat_label": "EUPHORIC"}), None);
        let panels = render(&d);

        let hero = &panels[0];
        assert_eq!(hero.tone, Tone::Hot);
        assert!(hero.texts().iter().any(|l| l.starts_with("91  NARRATIVE SCORE  EUPHORIC")));
        assert!(!titles(&panels).contains(&PRICE_LAG_TITLE));
        assert!(!titles(&panels).contains(&"Narrative Arc"));
        assert!(!titles(&panels).contains(&"Raw Intel"));

        let breakdown = panels.iter().find(|p| p.title == "Signal Breakdown").unwrap();
        assert_eq!(breakdown.rows.len(), 6);
        assert!(breakdown.rows.iter().all(|r| r.shape == Shape::Gauge(0.0)));
        assert!(breakdown.rows.iter().all(|r| r.tone == Some(Tone::Cool)));
        assert!(hero.rows.contains(&Row {
            text: String::new(),
            tone: Some(Tone::Hot),
            shape: Shape::Gauge(91.0),
        }));
    }

    #[test]
    fn test_full_report_panels_in_order() {
        let d = results(
            json!({
                "asset": "NVDA",
                "category": "predictions",
                "heat_index": 72,
                "primary_driver": "Blackwell ramp",
                "supporting_signals": [{"signal": "Search", "evidence": "up 40%"}],
                "price_lag": {"avg_lag_hours": "36", "confidence": "MODERATE", "current_signal": "LEADING UP"},
                "timeline": [{"period": "W1", "heat": 40}, {"period": "W2", "heat": 72}],
                "twitter_intel": {"volume_level": "HIGH"},
                "betting_edge": {"edge_rating": 0, "reasoning": "Priced in"}
            }),
            Some(json!({"api": "openai", "searches": ["a", "b"]})),
        );
        let panels = render(&d);

        assert_eq!(
            titles(&panels),
            [
                "PREDICTIONS",
                "Primary Driver",
                "Supporting Signals",
                PRICE_LAG_TITLE,
                "Narrative Arc",
                "Signal Breakdown",
                "Social Intel",
                "Narrative Edge",
                "Raw Intel",
                "",
            ]
        );
        let edge = panels.iter().find(|p| p.title == "Narrative Edge").unwrap();
        assert_eq!(edge.tone, Tone::Lime);
        let social = panels.iter().find(|p| p.title == "Social Intel").unwrap();
        assert_eq!(social.texts(), ["Vol: HIGH · 24h: — · Mood: —"]);
        let raw = panels.iter().find(|p| p.title == "Raw Intel").unwrap();
        assert_eq!(raw.texts(), ["1t · 2s · 0src"]);
        assert_eq!(
            panels.last().unwrap().texts(),
            ["NARRIV — NOT FINANCIAL ADVICE — ENTERTAINMENT ONLY"]
        );
        let lag = panels.iter().find(|p| p.title == PRICE_LAG_TITLE).unwrap();
        assert_eq!(lag.rows[0].text, "Avg: 36h · MODERATE");
        assert_eq!(lag.rows[0].tone, Some(Tone::Warm));
        assert_eq!(lag.rows.last().unwrap().tone, Some(Tone::Accent));
        let arc = panels.iter().find(|p| p.title == "Narrative Arc").unwrap();
        assert_eq!(arc.rows[0].shape, Shape::Spark(vec![40, 72]));
    }

    #[test]
    fn test_debug_toggle_shows_raw_json() {
        let mut d = results(json!({"asset": "BTC"}), Some(json!({"api_turns": 3})));
        d.toggle_debug();
        let panels = render(&d);
        let raw = panels.iter().find(|p| p.title == "Raw Intel").unwrap();

        let texts = raw.texts();
        assert_eq!(texts[0], "3t · 0s · 0src");
        assert!(texts.contains(&"RAW JSON"));
        assert!(texts.iter().any(|l| l.contains("\"asset\": \"BTC\"")));
    }

    #[test]
    fn test_home_shows_quick_picks_then_history() {
        let mut d = Dashboard::new();
        let panels = render(&d);
        let picks = panels.iter().find(|p| p.title == "Trending narratives").unwrap();
        assert_eq!(picks.rows.len(), 5);
        assert_eq!(picks.texts()[0], "NVDA  AI chip narrative at fever pitch");

        let ticket = d.submit("SOL").unwrap();
        d.scan_succeeded(
            ticket.id,
            ApiReply { result: json!({"asset": "SOL", "heat_index": 45}), debug: None },
            Utc::now(),
        );
        d.back();
        let panels = render(&d);
        assert!(!titles(&panels).contains(&"Trending narratives"));
        let recent = panels.iter().find(|p| p.title == "Recent scans").unwrap();
        assert_eq!(recent.texts(), ["0. SOL  45  "]);
    }

    #[test]
    fn test_home_error_banner_and_watchlist() {
        let mut d = Dashboard::new();
        d.add_watch("BTC", "crypto");
        d.begin_refresh();
        d.refresh_row(
            "BTC",
            Ok(ApiReply { result: json!({"heat_index": 91, "heat_label": "EUPHORIC"}), debug: None }),
        );
        let ticket = d.submit("ETH").unwrap();
        d.request_failed(ticket.id, &crate::dashboard::client::ClientError::Transport("offline".into()));
        d.toggle_watchlist();

        let panels = render(&d);
        assert_eq!(panels[0].title, "Error");
        assert_eq!(panels[0].texts(), ["offline"]);
        assert_eq!(panels[1].title, "Watchlist (1)");
        assert_eq!(panels[1].texts(), ["Scanning...", "● BTC  91  EUPHORIC"]);
        assert_eq!(panels[1].rows[1].tone, Some(Tone::Hot));
    }

    #[test]
    fn test_watchlist_panel_follows_toggle() {
        let mut d = Dashboard::new();
        d.toggle_watchlist();
        assert!(!titles(&render(&d)).iter().any(|t| t.starts_with("Watchlist")));

        d.toggle_watchlist();
        d.add_watch("SOL", "crypto");
        assert!(!titles(&render(&d)).contains(&"Watchlist (1)"));

        d.toggle_watchlist();
        assert!(titles(&render(&d)).contains(&"Watchlist (1)"));
        d.toggle_watchlist();
        assert!(!titles(&render(&d)).contains(&"Watchlist (1)"));
    }

    #[test]
    fn test_scanning_markers() {
        let mut d = Dashboard::new();
        let ticket = d.submit("wemby rc").unwrap();
        d.advance_phase(ticket.id);
        d.advance_phase(ticket.id);

        let panels = render(&d);
        assert_eq!(panels[0].title, "WEMBY RC");
        let texts = panels[0].texts();
        assert_eq!(texts[1], "✓ Scanning social layer");
        assert_eq!(texts[2], "› Analyzing search velocity");
        assert_eq!(texts[3], "· Mapping influence networks");
    }

    #[test]
    fn test_compare_view() {
        let mut d = Dashboard::new();
        let ticket = d.submit("NVDA vs TSLA").unwrap();
        d.compare_succeeded(
            ticket.id,
            ApiReply {
                result: json!({
                    "asset_a": {"name": "NVIDIA", "heat_index": 88, "signals": {"social": 90}, "key_narrative": "AI capex"},
                    "asset_b": {"name": "Tesla", "heat_index": 60},
                    "alpha_signal": "Rotate into NVDA"
                }),
                debug: None,
            },
        );

        let panels = render(&d);
        assert_eq!(
            titles(&panels),
            ["NVIDIA VS Tesla", "Signal Comparison", "Alpha Signal", "NVIDIA"]
        );
        assert_eq!(panels[3].tone, Tone::Hot);
        assert_eq!(panels[1].texts()[0], "Social");
        assert_eq!(
            panels[1].rows[0].shape,
            Shape::Versus {
                left: (90.0, Tone::Hot),
                right: (0.0, Tone::Warm),
            }
        );
    }

    fn draw(panel: &Panel, width: u16) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(width, panel.height(width))).unwrap();
        terminal.draw(|f| f.render_widget(panel, f.area())).unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    #[test]
    fn test_panel_draws_bordered_block() {
        let panel = Panel::new("Primary Driver", Tone::Gold).line("Halving supply shock");
        assert_eq!(panel.height(30), 3);

        let buf = draw(&panel, 30);
        assert_eq!(row_text(&buf, 0), "╭ Primary Driver ────────────╮");
        assert_eq!(row_text(&buf, 1), "│Halving supply shock        │");
        assert_eq!(row_text(&buf, 2), "╰────────────────────────────╯");
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(232, 224, 199));
    }

    #[test]
    fn test_long_text_wraps_into_extra_rows() {
        let panel = Panel::new("", Tone::Muted).line("abcdefghij");
        assert_eq!(panel.height(6), 5);

        let buf = draw(&panel, 6);
        assert_eq!(row_text(&buf, 1), "│abcd│");
        assert_eq!(row_text(&buf, 3), "│ij  │");
    }

    #[test]
    fn test_gauge_fills_in_row_tone() {
        let mut panel = Panel::new("Signal Breakdown", Tone::Muted);
        panel.push_gauge("Social", 100.0, Tone::Hot);

        let buf = draw(&panel, 24);
        assert!(row_text(&buf, 1).starts_with("│Social      "));
        let cell = &buf[(LABEL_WIDTH + 1, 1)];
        assert_eq!(cell.fg, Tone::Hot.color());
    }

    #[test]
    fn test_write_panels_plain() {
        let mut toned = Panel::new("", Tone::Muted);
        toned.push_toned("LEADING UP", Tone::Accent);

        let mut out = Vec::new();
        write_panels(&mut out, &[toned.clone()], 14, false).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "╭────────────╮\n│LEADING UP  │\n╰────────────╯\n"
        );

        let mut out = Vec::new();
        write_panels(&mut out, &[toned], 14, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\x1b[38;2;0;229;199m") || std::env::var_os("NO_COLOR").is_some());
    }
}
