//! Text rendering of the dashboard panels.

use std::fmt::Write as _;

use client_core::{ApiStatus, JsonFetcher, ViewController, ViewState};
use shared::{
    dates::parse_api_date,
    domain::{Event, QueryParameters},
    protocol::ChangePointEstimate,
};

/// Everything one frame needs, borrowed from the controller.
pub struct Screen<'a> {
    pub params: &'a QueryParameters,
    pub view: &'a ViewState,
    pub sorted_events: Vec<Event>,
    pub selected: Option<&'a Event>,
    /// Position of the selection within `sorted_events`.
    pub selected_index: Option<usize>,
    pub selected_in_view: bool,
    pub loading: bool,
    pub status: ApiStatus,
}

impl<'a> Screen<'a> {
    pub fn from_controller<F>(ctl: &'a ViewController<F>) -> Self
    where
        F: JsonFetcher + 'static,
    {
        let sorted_events = ctl.sorted_events();
        let selected_index = sorted_events.iter().position(|e| ctl.is_selected(e));
        Self {
            params: ctl.params(),
            view: ctl.view(),
            sorted_events,
            selected: ctl.selected_event(),
            selected_index,
            selected_in_view: ctl.selected_event_in_view(),
            loading: ctl.is_loading(),
            status: ctl.status(),
        }
    }
}

/// en-US grouping with at most two fraction digits.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac_part.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}

/// `Jan 1, 2013` when the date parses, the raw text otherwise.
pub fn format_date(raw: &str) -> String {
    match parse_api_date(raw) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => raw.to_string(),
    }
}

pub fn render(screen: &Screen<'_>) -> String {
    let mut out = String::new();
    render_header(&mut out, screen);
    render_controls(&mut out, screen);
    render_prices(&mut out, screen);
    render_returns(&mut out, screen);
    render_events_table(&mut out, screen);
    let _ = writeln!(out, "API status: {}", screen.status.label());
    out
}

fn render_header(out: &mut String, screen: &Screen<'_>) {
    let _ = writeln!(out, "Brent Crude Market Signals");
    let _ = writeln!(out, "Change Point Intelligence Dashboard");
    match &screen.view.summary {
        Some(summary) => {
            let _ = writeln!(
                out,
                "Coverage: {} - {} | Records: {} | Events: {}",
                summary.start_date,
                summary.end_date,
                format_number(summary.total_records as f64),
                format_number(summary.event_count as f64),
            );
        }
        None => {
            let _ = writeln!(out, "Coverage: Loading | Records: Loading | Events: Loading");
        }
    }
    out.push('\n');
}

fn render_controls(out: &mut String, screen: &Screen<'_>) {
    let params = screen.params;
    let _ = write!(
        out,
        "Range: {} .. {} | Change window: {} days",
        params.start, params.end, params.window
    );
    if screen.loading {
        out.push_str(" | loading...");
    }
    out.push('\n');
    if let Some(error) = &screen.view.error {
        let _ = writeln!(out, "! {error}");
    }
    out.push('\n');
}

fn render_prices(out: &mut String, screen: &Screen<'_>) {
    let prices = &screen.view.prices;
    let _ = writeln!(out, "== Price Trajectory ({} points)", prices.len());
    if let (Some(first), Some(last)) = (prices.first(), prices.last()) {
        let (low, high) = prices.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
            (lo.min(p.price), hi.max(p.price))
        });
        let _ = writeln!(
            out,
            "   {} {} -> {} {} | low {} | high {}",
            format_date(&first.date),
            format_number(first.price),
            format_date(&last.date),
            format_number(last.price),
            format_number(low),
            format_number(high),
        );
    }
    if let Some(selected) = screen.selected {
        let _ = writeln!(
            out,
            "   marker: {} ({}){}",
            format_date(&selected.date),
            selected.event_name,
            if screen.selected_in_view {
                ""
            } else {
                " [outside current events]"
            },
        );
    }

    for (i, event) in screen.sorted_events.iter().enumerate() {
        let active = if screen.selected_index == Some(i) {
            '*'
        } else {
            ' '
        };
        let _ = writeln!(
            out,
            "  {active}[{}] {} {}",
            i + 1,
            event.date,
            event.event_name
        );
    }
    out.push('\n');
}

fn render_returns(out: &mut String, screen: &Screen<'_>) {
    let returns = &screen.view.returns;
    let _ = writeln!(out, "== Volatility Pulse ({} log returns)", returns.len());
    if !returns.is_empty() {
        let (low, high) = returns.iter().fold((f64::MAX, f64::MIN), |(lo, hi), r| {
            (lo.min(r.log_return), hi.max(r.log_return))
        });
        let _ = writeln!(out, "   range {low:.3} .. {high:.3}");
    }

    let estimate = screen
        .view
        .change_point
        .as_ref()
        .and_then(ChangePointEstimate::estimate);
    match estimate {
        Some(cp) => {
            let _ = writeln!(out, "   marker: {}", format_date(&cp.change_point_date));
            let _ = writeln!(out, "   Change Point Estimate");
            let _ = writeln!(out, "     Date        {}", cp.change_point_date);
            let _ = writeln!(out, "     Mean shift  {:.5}", cp.mean_shift);
            if let (Some(before), Some(after)) = (cp.mean_before, cp.mean_after) {
                let _ = writeln!(out, "     Mean        {before:.5} -> {after:.5}");
            }
            let _ = writeln!(out, "     Window      {} days", cp.window);
        }
        None => {
            let _ = writeln!(out, "   Change Point Estimate");
            let _ = writeln!(out, "     Insufficient data for the selected window.");
        }
    }
    out.push('\n');
}

fn render_events_table(out: &mut String, screen: &Screen<'_>) {
    let events = &screen.view.events;
    let _ = writeln!(out, "== Event Correlations ({})", events.len());
    let name_width = events
        .iter()
        .map(|e| e.event_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Event".len());
    let category_width = events
        .iter()
        .map(|e| e.category.chars().count())
        .max()
        .unwrap_or(0)
        .max("Category".len());

    let _ = writeln!(
        out,
        "   {:<10}  {:<name_width$}  {:<category_width$}  Description",
        "Date", "Event", "Category"
    );
    for event in events {
        let _ = writeln!(
            out,
            "   {:<10}  {:<name_width$}  {:<category_width$}  {}",
            event.date, event.event_name, event.category, event.description
        );
    }
    out.push('\n');
}
