//! View controller: query parameters, coordinated reloads, and the view
//! state the renderer reads.
//!
//! Every parameter change dispatches one reload. A reload runs as its own
//! task and reports back over a channel; nothing touches [`ViewState`] until
//! the owner commits the outcome through [`ViewController::next_outcome`],
//! so all mutation stays on the owner's task.

use std::{collections::HashSet, sync::Arc};

use shared::{
    domain::{sort_events_by_date, Event, PricePoint, QueryParameters, ReturnPoint, Summary},
    protocol::ChangePointEstimate,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    api::{load_snapshot, DashboardApi, Snapshot},
    error::ReloadError,
    http::JsonFetcher,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Only the most recently dispatched reload may commit.
    #[default]
    LatestOnly,
    /// Whichever reload finishes last overwrites the view, even if a newer
    /// one was dispatched after it.
    LastWriteWins,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Connected,
    Offline,
}

impl ApiStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApiStatus::Connected => "connected",
            ApiStatus::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub summary: Option<Summary>,
    pub prices: Vec<PricePoint>,
    pub returns: Vec<ReturnPoint>,
    pub events: Vec<Event>,
    pub change_point: Option<ChangePointEstimate>,
    pub error: Option<String>,
}

impl ViewState {
    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.summary = Some(snapshot.summary);
        self.prices = snapshot.prices;
        self.returns = snapshot.returns;
        self.events = snapshot.events;
        self.change_point = Some(snapshot.change_point);
        self.error = None;
    }
}

#[derive(Debug)]
pub struct ReloadOutcome {
    pub generation: u64,
    pub params: QueryParameters,
    pub result: Result<Snapshot, ReloadError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    Applied { generation: u64 },
    Failed { generation: u64 },
    Superseded { generation: u64, latest: u64 },
}

pub struct ViewController<F> {
    api: Arc<DashboardApi<F>>,
    policy: CommitPolicy,
    params: QueryParameters,
    view: ViewState,
    selected_event: Option<Event>,
    latest_generation: u64,
    in_flight: usize,
    outcome_tx: mpsc::UnboundedSender<ReloadOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<ReloadOutcome>,
}

impl<F> ViewController<F>
where
    F: JsonFetcher + 'static,
{
    pub fn new(api: DashboardApi<F>, params: QueryParameters, policy: CommitPolicy) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            api: Arc::new(api),
            policy,
            params,
            view: ViewState::default(),
            selected_event: None,
            latest_generation: 0,
            in_flight: 0,
            outcome_tx,
            outcome_rx,
        }
    }

    /// Initial load.
    pub fn mount(&mut self) -> u64 {
        self.reload()
    }

    pub fn api(&self) -> &DashboardApi<F> {
        &self.api
    }

    pub fn params(&self) -> &QueryParameters {
        &self.params
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Number of reloads dispatched so far, including the initial mount.
    pub fn generation(&self) -> u64 {
        self.latest_generation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Returns the dispatched generation, or `None` when the range is
    /// unchanged.
    pub fn update_date_range(
        &mut self,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Option<u64> {
        let (start, end) = (start.into(), end.into());
        if self.params.start == start && self.params.end == end {
            return None;
        }
        self.params.start = start;
        self.params.end = end;
        Some(self.reload())
    }

    pub fn update_window(&mut self, window: u32) -> Option<u64> {
        if self.params.window == window {
            return None;
        }
        self.params.window = window;
        Some(self.reload())
    }

    pub fn select_event(&mut self, event: Option<Event>) {
        self.selected_event = event;
    }

    pub fn selected_event(&self) -> Option<&Event> {
        self.selected_event.as_ref()
    }

    pub fn reload(&mut self) -> u64 {
        self.latest_generation += 1;
        let generation = self.latest_generation;
        let params = self.params.clone();
        let api = Arc::clone(&self.api);
        let outcome_tx = self.outcome_tx.clone();
        self.in_flight += 1;

        info!(
            generation,
            start = %params.start,
            end = %params.end,
            window = params.window,
            "dispatching reload"
        );
        tokio::spawn(async move {
            let result = load_snapshot(&*api, &params).await;
            // The receiver lives as long as the controller.
            let _ = outcome_tx.send(ReloadOutcome {
                generation,
                params,
                result,
            });
        });
        generation
    }

    /// Waits for the next reload to finish and commits it. Returns `None`
    /// when nothing is in flight. Cancel-safe: an outcome is only consumed
    /// once it has been received.
    pub async fn next_outcome(&mut self) -> Option<Commit> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.outcome_rx.recv().await?;
        Some(self.commit(outcome))
    }

    /// Commits every in-flight reload in completion order.
    pub async fn settle(&mut self) -> Vec<Commit> {
        let mut commits = Vec::new();
        while let Some(commit) = self.next_outcome().await {
            commits.push(commit);
        }
        commits
    }

    fn commit(&mut self, outcome: ReloadOutcome) -> Commit {
        self.in_flight = self.in_flight.saturating_sub(1);
        let generation = outcome.generation;

        if self.policy == CommitPolicy::LatestOnly && generation < self.latest_generation {
            debug!(
                generation,
                latest = self.latest_generation,
                "discarding superseded reload"
            );
            return Commit::Superseded {
                generation,
                latest: self.latest_generation,
            };
        }
        let stale = generation < self.latest_generation;

        match outcome.result {
            Ok(snapshot) => {
                if stale {
                    warn!(
                        generation,
                        latest = self.latest_generation,
                        window = outcome.params.window,
                        "stale reload overwrote newer parameters"
                    );
                }
                self.view.apply_snapshot(snapshot);
                info!(
                    generation,
                    prices = self.view.prices.len(),
                    events = self.view.events.len(),
                    "reload committed"
                );
                Commit::Applied { generation }
            }
            Err(err) => {
                warn!(generation, endpoint = %err.endpoint, error = %err.source, "reload failed");
                self.view.error = Some(err.user_message());
                Commit::Failed { generation }
            }
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.view.error.as_deref()
    }

    pub fn status(&self) -> ApiStatus {
        if self.view.error.is_some() {
            ApiStatus::Offline
        } else {
            ApiStatus::Connected
        }
    }

    pub fn sorted_events(&self) -> Vec<Event> {
        sort_events_by_date(&self.view.events)
    }

    pub fn event_dates(&self) -> HashSet<&str> {
        self.view.events.iter().map(|e| e.date.as_str()).collect()
    }

    /// Date at which the price panel draws the selection marker. The
    /// selected event need not be part of the current events.
    pub fn selected_marker(&self) -> Option<&str> {
        self.selected_event.as_ref().map(|e| e.date.as_str())
    }

    pub fn is_selected(&self, event: &Event) -> bool {
        self.selected_event
            .as_ref()
            .is_some_and(|selected| selected.same_key(event))
    }

    pub fn selected_event_in_view(&self) -> bool {
        self.selected_event
            .as_ref()
            .is_some_and(|selected| self.view.events.iter().any(|e| e.same_key(selected)))
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
