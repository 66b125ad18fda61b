use serde::{Deserialize, Serialize};

use crate::dates::parse_api_date;

pub const DEFAULT_START: &str = "2013-01-01";
pub const DEFAULT_END: &str = "2022-12-31";
pub const DEFAULT_WINDOW: u32 = 30;

/// Smallest and largest window the input surface accepts, in days.
pub const WINDOW_MIN: u32 = 14;
pub const WINDOW_MAX: u32 = 90;

/// User-editable query state. Dates are passed to the backend verbatim;
/// `start <= end` is left for the backend to judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParameters {
    pub start: String,
    pub end: String,
    pub window: u32,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            start: DEFAULT_START.to_string(),
            end: DEFAULT_END.to_string(),
            window: DEFAULT_WINDOW,
        }
    }
}

impl QueryParameters {
    pub fn new(start: impl Into<String>, end: impl Into<String>, window: u32) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            window,
        }
    }
}

pub fn clamp_window(window: i64) -> u32 {
    window.clamp(WINDOW_MIN as i64, WINDOW_MAX as i64) as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub start_date: String,
    pub end_date: String,
    pub total_records: u64,
    pub event_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: String,
    pub log_return: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub date: String,
    pub event_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl Event {
    /// Identity used by the event strip and table rows.
    pub fn key(&self) -> (&str, &str) {
        (&self.date, &self.event_name)
    }

    pub fn same_key(&self, other: &Event) -> bool {
        self.key() == other.key()
    }
}

/// Orders events ascending by date. The sort is stable, so events sharing a
/// date keep their server order; dates that do not parse go last.
pub fn sort_events_by_date(events: &[Event]) -> Vec<Event> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|event| match parse_api_date(&event.date) {
        Some(date) => (0u8, Some(date)),
        None => (1u8, None),
    });
    sorted
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

impl Health {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
