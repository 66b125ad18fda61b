//! Typed endpoints of the analytics API and the five-way reload batch.

use serde::de::DeserializeOwned;
use shared::{
    domain::{Event, Health, PricePoint, QueryParameters, ReturnPoint, Summary},
    protocol::{ChangePointEstimate, Endpoint},
};
use tracing::debug;
use url::form_urlencoded;

use crate::{
    error::{FetchError, ReloadError},
    http::JsonFetcher,
};

pub struct DashboardApi<F> {
    fetcher: F,
}

impl<F: JsonFetcher> DashboardApi<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    async fn get<T: DeserializeOwned>(&self, path: String) -> Result<T, FetchError> {
        let value = self.fetcher.get_json(&path).await?;
        serde_json::from_value(value).map_err(|err| FetchError::Decode {
            path,
            message: err.to_string(),
        })
    }

    pub async fn summary(&self) -> Result<Summary, FetchError> {
        self.get(Endpoint::Summary.path().to_string()).await
    }

    pub async fn prices(&self, start: &str, end: &str) -> Result<Vec<PricePoint>, FetchError> {
        self.get(range_path(Endpoint::Prices, start, end)).await
    }

    pub async fn log_returns(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<ReturnPoint>, FetchError> {
        self.get(range_path(Endpoint::LogReturns, start, end)).await
    }

    pub async fn events(&self, start: &str, end: &str) -> Result<Vec<Event>, FetchError> {
        self.get(range_path(Endpoint::Events, start, end)).await
    }

    pub async fn change_point(&self, window: u32) -> Result<ChangePointEstimate, FetchError> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("window", &window.to_string())
            .finish();
        self.get(format!("{}?{query}", Endpoint::ChangePoint.path()))
            .await
    }

    pub async fn health(&self) -> Result<Health, FetchError> {
        self.get(Endpoint::Health.path().to_string()).await
    }
}

fn range_path(endpoint: Endpoint, start: &str, end: &str) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("start", start)
        .append_pair("end", end)
        .finish();
    format!("{}?{query}", endpoint.path())
}

/// Everything one reload commits into the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub summary: Summary,
    pub prices: Vec<PricePoint>,
    pub returns: Vec<ReturnPoint>,
    pub events: Vec<Event>,
    pub change_point: ChangePointEstimate,
}

fn at(endpoint: Endpoint) -> impl FnOnce(FetchError) -> ReloadError {
    move |source| ReloadError::new(endpoint, source)
}

/// Issues the five requests concurrently. The first failure ends the batch
/// and is returned; partial results are dropped.
pub async fn load_snapshot<F: JsonFetcher>(
    api: &DashboardApi<F>,
    params: &QueryParameters,
) -> Result<Snapshot, ReloadError> {
    let (summary, prices, returns, events, change_point) = futures::try_join!(
        async { api.summary().await.map_err(at(Endpoint::Summary)) },
        async {
            api.prices(&params.start, &params.end)
                .await
                .map_err(at(Endpoint::Prices))
        },
        async {
            api.log_returns(&params.start, &params.end)
                .await
                .map_err(at(Endpoint::LogReturns))
        },
        async {
            api.events(&params.start, &params.end)
                .await
                .map_err(at(Endpoint::Events))
        },
        async {
            api.change_point(params.window)
                .await
                .map_err(at(Endpoint::ChangePoint))
        },
    )?;

    debug!(
        prices = prices.len(),
        returns = returns.len(),
        events = events.len(),
        change_point = change_point.status(),
        "snapshot loaded"
    );

    Ok(Snapshot {
        summary,
        prices,
        returns,
        events,
        change_point,
    })
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
