//! Request/response types for the remote options screener.
//!
//! The screener is an external service; these types only forward parameters
//! and decode whatever subset of row fields comes back.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SCREEN_LIMIT: u32 = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct ScreenRequest {
    pub csv_path: String,
    pub save: bool,
    pub limit: u32,
    pub min_volume: Option<u64>,
    pub min_oi: Option<u64>,
    pub max_spread: Option<f64>,
    pub dte_min: Option<i64>,
    pub dte_max: Option<i64>,
    pub delta_min: Option<f64>,
    pub delta_max: Option<f64>,
}

impl ScreenRequest {
    pub fn new(csv_path: impl Into<String>) -> Self {
        Self {
            csv_path: csv_path.into(),
            save: false,
            limit: DEFAULT_SCREEN_LIMIT,
            min_volume: None,
            min_oi: None,
            max_spread: None,
            dte_min: None,
            dte_max: None,
            delta_min: None,
            delta_max: None,
        }
    }

    /// Query string pairs. Unset filters are omitted entirely.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("csv", self.csv_path.replace('\\', "/")),
            ("save", self.save.to_string()),
            ("limit", self.limit.to_string()),
        ];
        let optional = [
            ("minVolume", self.min_volume.map(|v| v.to_string())),
            ("minOi", self.min_oi.map(|v| v.to_string())),
            ("maxSpread", self.max_spread.map(|v| v.to_string())),
            ("dteMin", self.dte_min.map(|v| v.to_string())),
            ("dteMax", self.dte_max.map(|v| v.to_string())),
            ("deltaMin", self.delta_min.map(|v| v.to_string())),
            ("deltaMax", self.delta_max.map(|v| v.to_string())),
        ];
        pairs.extend(
            optional
                .into_iter()
                .filter_map(|(k, v)| v.map(|v| (k, v))),
        );
        pairs
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_interest: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ScreenRow {
    /// Present fields in display order, for one-line console output.
    pub fn compact_fields(&self) -> Vec<(&'static str, String)> {
        let fields = [
            ("symbol", self.symbol.clone()),
            ("type", self.kind.clone()),
            ("strike", self.strike.map(|v| v.to_string())),
            ("dte", self.dte.map(|v| v.to_string())),
            ("mid", self.mid.map(|v| v.to_string())),
            ("spread", self.spread.map(|v| v.to_string())),
            ("volume", self.volume.map(|v| v.to_string())),
            ("openInterest", self.open_interest.map(|v| v.to_string())),
            ("delta", self.delta.map(|v| v.to_string())),
            ("score", self.score.map(|v| v.to_string())),
        ];
        fields
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenResponse {
    pub count: Option<usize>,
    pub results: Vec<ScreenRow>,
}

impl ScreenResponse {
    pub fn effective_count(&self) -> usize {
        self.count.unwrap_or(self.results.len())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    pub status_code: u16,
    pub body: String,
}
