//! Scripted `JsonFetcher` for exercising the API client and controller
//! without a network.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::{error::FetchError, http::JsonFetcher};

#[derive(Clone)]
struct Route {
    response: Result<Value, FetchError>,
    gate: Option<Arc<Notify>>,
}

/// Routes are matched on the full path first, then on the path without its
/// query string.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All five reload endpoints answer with small, valid payloads.
    pub fn healthy() -> Self {
        let fetcher = Self::new();
        fetcher.respond("/api/summary", sample_summary());
        fetcher.respond("/api/prices", sample_prices());
        fetcher.respond("/api/log-returns", sample_returns());
        fetcher.respond("/api/events", sample_events());
        fetcher.respond("/api/change-point", change_point_ok(30));
        fetcher.respond("/api/health", json!({"status": "ok", "service": "change-point-api"}));
        fetcher
    }

    pub fn respond(&self, path: &str, value: Value) {
        self.insert(path, Ok(value));
    }

    pub fn fail(&self, path: &str, err: FetchError) {
        self.insert(path, Err(err));
    }

    fn insert(&self, path: &str, response: Result<Value, FetchError>) {
        self.routes.lock().expect("routes").insert(
            path.to_string(),
            Route {
                response,
                gate: None,
            },
        );
    }

    /// Holds requests to `path` until the returned handle is notified.
    pub fn gate(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        let mut routes = self.routes.lock().expect("routes");
        let route = routes.get_mut(path).expect("gate requires a scripted route");
        route.gate = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split('?').next() == Some(path))
            .count()
    }
}

#[async_trait]
impl JsonFetcher for ScriptedFetcher {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        self.calls.lock().expect("calls").push(path.to_string());
        let route = {
            let routes = self.routes.lock().expect("routes");
            let bare = path.split('?').next().unwrap_or(path);
            routes.get(path).or_else(|| routes.get(bare)).cloned()
        };
        let Some(route) = route else {
            return Err(FetchError::Request {
                status: 404,
                message: format!("no scripted route for {path}"),
            });
        };
        if let Some(gate) = route.gate {
            gate.notified().await;
        }
        route.response
    }
}

pub fn sample_summary() -> Value {
    json!({
        "start_date": "1987-05-20",
        "end_date": "2022-11-14",
        "total_records": 9011,
        "event_count": 15
    })
}

pub fn sample_prices() -> Value {
    json!([
        {"date": "Wed, 02 Jan 2013 00:00:00 GMT", "price": 112.98},
        {"date": "Tue, 01 Jan 2013 00:00:00 GMT", "price": 111.11},
        {"date": "Thu, 03 Jan 2013 00:00:00 GMT", "price": 112.14}
    ])
}

pub fn sample_returns() -> Value {
    json!([
        {"date": "Wed, 02 Jan 2013 00:00:00 GMT", "log_return": 0.0167},
        {"date": "Thu, 03 Jan 2013 00:00:00 GMT", "log_return": -0.0074}
    ])
}

pub fn sample_events() -> Value {
    json!([
        {"date": "2020-03-08", "event_name": "Saudi-Russia price war", "category": "OPEC+",
         "description": "Production dispute after failed OPEC+ talks"},
        {"date": "2014-11-27", "event_name": "OPEC holds output", "category": "OPEC",
         "description": "OPEC declines to cut production"},
        {"date": "2016-11-30", "event_name": "OPEC Vienna agreement", "category": "OPEC",
         "description": "First coordinated cut since 2008"}
    ])
}

pub fn change_point_ok(window: u32) -> Value {
    json!({
        "status": "ok",
        "change_point_date": "2014-11-28",
        "window": window,
        "mean_before": 0.0004,
        "mean_after": -0.0061,
        "mean_shift": -0.0065
    })
}
