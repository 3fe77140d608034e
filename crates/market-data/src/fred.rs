use analysis_core::{AnalysisError, MacroDataProvider, Observation};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

use crate::http::{HttpClient, DEFAULT_RATE_LIMIT};

const BASE_URL: &str = "https://api.stlouisfed.org";

/// FRED (Federal Reserve Economic Data) series client
#[derive(Clone)]
pub struct FredClient {
    api_key: String,
    base_url: String,
    http: HttpClient,
}

impl FredClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: BASE_URL.to_string(),
            http: HttpClient::new(DEFAULT_RATE_LIMIT),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_rate_limit(mut self, requests_per_minute: usize) -> Self {
        self.http = self.http.with_rate_limit(requests_per_minute);
        self
    }

    pub fn with_retry_wait(mut self, retry_wait: Duration) -> Self {
        self.http = self.http.with_retry_wait(retry_wait);
        self
    }

    /// All observations of `series_id`, oldest first. Missing values (".") are skipped.
    pub async fn get_series(&self, series_id: &str) -> Result<Vec<Observation>, AnalysisError> {
        if self.api_key.is_empty() {
            return Err(AnalysisError::MissingData("FRED API key is not configured".to_string()));
        }

        let url = format!("{}/fred/series/observations", self.base_url);
        let response: ObservationsResponse = self
            .http
            .get_json(
                &url,
                &[
                    ("series_id", series_id),
                    ("api_key", self.api_key.as_str()),
                    ("file_type", "json"),
                    ("sort_order", "asc"),
                ],
            )
            .await?;

        let observations: Vec<Observation> = response
            .observations
            .into_iter()
            .filter_map(|o| {
                let date = NaiveDate::parse_from_str(&o.date, "%Y-%m-%d").ok()?;
                let value = o.value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
                Some(Observation { date, value })
            })
            .collect();

        tracing::debug!("FRED {}: {} observations", series_id, observations.len());
        Ok(observations)
    }
}

#[async_trait]
impl MacroDataProvider for FredClient {
    async fn series(&self, series_id: &str) -> Result<Vec<Observation>, AnalysisError> {
        self.get_series(series_id).await
    }
}

// Response structures
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}
