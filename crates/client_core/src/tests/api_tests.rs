use std::{sync::Arc, time::Duration};

use super::*;
use crate::test_support::{sample_events, ScriptedFetcher};
use serde_json::json;

fn api(fetcher: &Arc<ScriptedFetcher>) -> DashboardApi<Arc<ScriptedFetcher>> {
    DashboardApi::new(fetcher.clone())
}

#[tokio::test]
async fn requests_carry_range_and_window_queries() {
    let fetcher = Arc::new(ScriptedFetcher::healthy());
    let params = QueryParameters::default();

    load_snapshot(&api(&fetcher), &params).await.expect("snapshot");

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 5);
    for expected in [
        "/api/summary",
        "/api/prices?start=2013-01-01&end=2022-12-31",
        "/api/log-returns?start=2013-01-01&end=2022-12-31",
        "/api/events?start=2013-01-01&end=2022-12-31",
        "/api/change-point?window=30",
    ] {
        assert!(calls.iter().any(|c| c == expected), "missing {expected}: {calls:?}");
    }
}

#[tokio::test]
async fn snapshot_keeps_series_in_server_order() {
    let fetcher = Arc::new(ScriptedFetcher::healthy());

    let snapshot = load_snapshot(&api(&fetcher), &QueryParameters::default())
        .await
        .expect("snapshot");

    let prices: Vec<_> = snapshot.prices.iter().map(|p| p.price).collect();
    assert_eq!(prices, [112.98, 111.11, 112.14]);
    assert_eq!(snapshot.events.len(), 3);
    assert_eq!(snapshot.events[0].event_name, "Saudi-Russia price war");
    assert_eq!(snapshot.summary.total_records, 9011);
    assert!(snapshot.change_point.is_ok());
}

#[tokio::test]
async fn one_failing_endpoint_fails_the_batch() {
    let fetcher = Arc::new(ScriptedFetcher::healthy());
    fetcher.fail(
        "/api/events",
        FetchError::Request {
            status: 500,
            message: "db unavailable".into(),
        },
    );

    let err = load_snapshot(&api(&fetcher), &QueryParameters::default())
        .await
        .expect_err("should fail");
    assert_eq!(err.endpoint, Endpoint::Events);
    assert_eq!(err.user_message(), "db unavailable");
}

#[tokio::test]
async fn shape_mismatch_is_a_decode_error() {
    let fetcher = Arc::new(ScriptedFetcher::healthy());
    fetcher.respond("/api/prices", json!({"rows": []}));

    let err = load_snapshot(&api(&fetcher), &QueryParameters::default())
        .await
        .expect_err("should fail");
    assert_eq!(err.endpoint, Endpoint::Prices);
    assert!(matches!(err.source, FetchError::Decode { .. }), "got {err:?}");
}

#[tokio::test]
async fn all_five_requests_are_in_flight_together() {
    let fetcher = Arc::new(ScriptedFetcher::healthy());
    let gate = fetcher.gate("/api/summary");

    let task = {
        let fetcher = fetcher.clone();
        tokio::spawn(async move {
            load_snapshot(&DashboardApi::new(fetcher), &QueryParameters::default()).await
        })
    };

    tokio::time::timeout(Duration::from_secs(2), async {
        while fetcher.calls().len() < 5 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("other requests issued while summary is pending");
    assert!(!task.is_finished());

    gate.notify_one();
    task.await.expect("join").expect("snapshot");
}

#[tokio::test]
async fn change_point_insufficient_status_decodes() {
    let fetcher = Arc::new(ScriptedFetcher::healthy());
    fetcher.respond("/api/change-point", json!({"status": "insufficient"}));

    let estimate = api(&fetcher).change_point(90).await.expect("estimate");
    assert_eq!(estimate.status(), "insufficient");
    assert!(estimate.estimate().is_none());
    assert_eq!(fetcher.calls(), ["/api/change-point?window=90"]);
}

#[tokio::test]
async fn health_endpoint_decodes() {
    let fetcher = Arc::new(ScriptedFetcher::healthy());

    let health = api(&fetcher).health().await.expect("health");
    assert!(health.is_ok());
    assert_eq!(health.service, "change-point-api");
}

#[tokio::test]
async fn range_values_are_url_encoded() {
    let fetcher = Arc::new(ScriptedFetcher::new());
    fetcher.respond("/api/events", sample_events());

    api(&fetcher)
        .events("2013-01-01", "2022-12-31 & more")
        .await
        .expect("events");
    assert_eq!(
        fetcher.calls(),
        ["/api/events?start=2013-01-01&end=2022-12-31+%26+more"]
    );
}
