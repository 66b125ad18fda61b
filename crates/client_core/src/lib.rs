//! Client for the change-point analytics API: a single-shot JSON fetch
//! helper, typed endpoints, and the view controller that keeps the
//! dashboard's datasets consistent with its query parameters.

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;

pub use api::{load_snapshot, DashboardApi, Snapshot};
pub use config::{load_settings, Settings};
pub use controller::{ApiStatus, Commit, CommitPolicy, ViewController, ViewState};
pub use error::{FetchError, ReloadError};
pub use http::{ApiBase, HttpFetcher, JsonFetcher};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
