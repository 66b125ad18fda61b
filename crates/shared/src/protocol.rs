use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Endpoint {
    Summary,
    Prices,
    LogReturns,
    Events,
    ChangePoint,
    Health,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Summary => "/api/summary",
            Endpoint::Prices => "/api/prices",
            Endpoint::LogReturns => "/api/log-returns",
            Endpoint::Events => "/api/events",
            Endpoint::ChangePoint => "/api/change-point",
            Endpoint::Health => "/api/health",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

pub const CHANGE_POINT_OK: &str = "ok";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePoint {
    pub change_point_date: String,
    pub mean_shift: f64,
    pub window: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_after: Option<f64>,
}

/// Result of `/api/change-point`. Only an `ok` status carries an estimate;
/// any other status means the backend had too little data for the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawChangePoint", into = "RawChangePoint")]
pub enum ChangePointEstimate {
    Ok(ChangePoint),
    Unavailable { status: String, window: Option<u32> },
}

impl ChangePointEstimate {
    pub fn status(&self) -> &str {
        match self {
            ChangePointEstimate::Ok(_) => CHANGE_POINT_OK,
            ChangePointEstimate::Unavailable { status, .. } => status,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ChangePointEstimate::Ok(_))
    }

    pub fn estimate(&self) -> Option<&ChangePoint> {
        match self {
            ChangePointEstimate::Ok(cp) => Some(cp),
            ChangePointEstimate::Unavailable { .. } => None,
        }
    }

    pub fn window(&self) -> Option<u32> {
        match self {
            ChangePointEstimate::Ok(cp) => Some(cp.window),
            ChangePointEstimate::Unavailable { window, .. } => *window,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawChangePoint {
    status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    change_point_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mean_shift: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    window: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mean_before: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mean_after: Option<f64>,
}

impl TryFrom<RawChangePoint> for ChangePointEstimate {
    type Error = String;

    fn try_from(raw: RawChangePoint) -> Result<Self, Self::Error> {
        if raw.status != CHANGE_POINT_OK {
            return Ok(ChangePointEstimate::Unavailable {
                status: raw.status,
                window: raw.window,
            });
        }

        let missing = |field: &str| format!("change point status ok but `{field}` is missing");
        Ok(ChangePointEstimate::Ok(ChangePoint {
            change_point_date: raw
                .change_point_date
                .ok_or_else(|| missing("change_point_date"))?,
            mean_shift: raw.mean_shift.ok_or_else(|| missing("mean_shift"))?,
            window: raw.window.ok_or_else(|| missing("window"))?,
            mean_before: raw.mean_before,
            mean_after: raw.mean_after,
        }))
    }
}

impl From<ChangePointEstimate> for RawChangePoint {
    fn from(value: ChangePointEstimate) -> Self {
        match value {
            ChangePointEstimate::Ok(cp) => RawChangePoint {
                status: CHANGE_POINT_OK.to_string(),
                change_point_date: Some(cp.change_point_date),
                mean_shift: Some(cp.mean_shift),
                window: Some(cp.window),
                mean_before: cp.mean_before,
                mean_after: cp.mean_after,
            },
            ChangePointEstimate::Unavailable { status, window } => RawChangePoint {
                status,
                change_point_date: None,
                mean_shift: None,
                window,
                mean_before: None,
                mean_after: None,
            },
        }
    }
}
