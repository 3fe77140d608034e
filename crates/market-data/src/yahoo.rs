use analysis_core::{
    AnalysisError, MarketDataProvider, PricePoint, RawFundamentals, SymbolSearch, SymbolSuggestion,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::http::{HttpClient, DEFAULT_RATE_LIMIT};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
/// Sets the session cookie that `getcrumb` and `quoteSummary` require.
const COOKIE_URL: &str = "https://fc.yahoo.com";

/// Shorter queries return no suggestions and make no request.
pub const MIN_QUERY_LEN: usize = 2;

/// Yahoo Finance client: daily closes, fundamentals snapshot and ticker search
#[derive(Clone)]
pub struct YahooClient {
    base_url: String,
    cookie_url: String,
    http: HttpClient,
    crumb: Arc<Mutex<Option<String>>>,
}

impl Default for YahooClient {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooClient {
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            cookie_url: COOKIE_URL.to_string(),
            http: HttpClient::new(DEFAULT_RATE_LIMIT),
            crumb: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_cookie_url(mut self, cookie_url: impl Into<String>) -> Self {
        self.cookie_url = cookie_url.into();
        self
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

    /// Daily closes for the last `days` calendar days, oldest first.
    ///
    /// Rows without a finite close are dropped.
    pub async fn get_daily_closes(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>, AnalysisError> {
        let to = Utc::now();
        let from = to - ChronoDuration::days(days as i64);
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let period1 = from.timestamp().to_string();
        let period2 = to.timestamp().to_string();

        let response: ChartResponse = self
            .http
            .get_json(
                &url,
                &[
                    ("period1", period1.as_str()),
                    ("period2", period2.as_str()),
                    ("interval", "1d"),
                ],
            )
            .await?;

        let result = response
            .chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
            .ok_or_else(|| {
                let reason = response
                    .chart
                    .error
                    .and_then(|e| e.description)
                    .unwrap_or_else(|| "no chart data".to_string());
                AnalysisError::MissingData(format!("{}: {}", symbol, reason))
            })?;

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        let points: Vec<PricePoint> = result
            .timestamp
            .iter()
            .zip(closes)
            .filter_map(|(&ts, close)| {
                let close = close.filter(|c| c.is_finite())?;
                let date = DateTime::from_timestamp(ts, 0)?.date_naive();
                Some(PricePoint { date, close })
            })
            .collect();

        tracing::debug!("Yahoo chart {}: {} closes", symbol, points.len());
        Ok(points)
    }

    /// Session crumb for `quoteSummary`, fetched once and shared by clones of this client.
    async fn crumb(&self) -> Result<String, AnalysisError> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        self.http.visit(&self.cookie_url).await;
        let crumb = self
            .http
            .get_text(&format!("{}/v1/test/getcrumb", self.base_url))
            .await?
            .trim()
            .to_string();
        if crumb.is_empty() || crumb.contains(['<', '{', ' ']) {
            return Err(AnalysisError::ApiError(format!("unusable crumb: {:.40}", crumb)));
        }

        tracing::debug!("Yahoo crumb acquired");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummaryResponse, AnalysisError> {
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);
        let modules = "financialData,defaultKeyStatistics,summaryDetail";

        let crumb = self.crumb().await?;
        match self.http.get_json(&url, &[("modules", modules), ("crumb", crumb.as_str())]).await {
            // Expired session: drop the crumb and try once with a fresh one
            Err(AnalysisError::ApiError(msg)) if msg.starts_with("HTTP 401") => {
                tracing::warn!("Yahoo rejected crumb for {}, refreshing session", symbol);
                self.crumb.lock().await.take();
                let crumb = self.crumb().await?;
                self.http
                    .get_json(&url, &[("modules", modules), ("crumb", crumb.as_str())])
                    .await
            }
            other => other,
        }
    }

    /// Fundamentals snapshot; absent fields fall back to their neutral defaults.
    pub async fn get_fundamentals(&self, symbol: &str) -> Result<RawFundamentals, AnalysisError> {
        let response = self.quote_summary(symbol).await?;

        let summary = response
            .quote_summary
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
            .ok_or_else(|| AnalysisError::MissingData(format!("{}: no fundamentals", symbol)))?;

        let financial = summary.financial_data.unwrap_or_default();
        let stats = summary.default_key_statistics.unwrap_or_default();
        let detail = summary.summary_detail.unwrap_or_default();

        Ok(RawFundamentals::from_partial(
            raw(&financial.return_on_equity),
            raw(&financial.operating_margins),
            raw(&stats.trailing_eps),
            raw(&financial.current_price),
            raw(&financial.quick_ratio),
            raw(&financial.free_cashflow),
            raw(&detail.trailing_pe),
        ))
    }

    /// Ticker suggestions for a free-text query.
    pub async fn search_symbols(&self, query: &str) -> Result<Vec<SymbolSuggestion>, AnalysisError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/finance/search", self.base_url);
        let response: SearchResponse = self
            .http
            .get_json(
                &url,
                &[
                    ("q", query),
                    ("quotesCount", "20"),
                    ("newsCount", "0"),
                    ("enableFuzzyQuery", "false"),
                ],
            )
            .await?;

        Ok(filter_quotes(response.quotes))
    }
}

/// Keep plain equity tickers that carry a long name.
///
/// Symbols containing `-`, `^` or `=` (share classes, indices, currencies) are dropped.
pub fn filter_quotes(quotes: Vec<SearchQuote>) -> Vec<SymbolSuggestion> {
    quotes
        .into_iter()
        .filter_map(|q| {
            let symbol = q.symbol?;
            let name = q.longname?;
            if symbol.contains(['-', '^', '=']) {
                return None;
            }
            Some(SymbolSuggestion { symbol, name })
        })
        .collect()
}

fn raw(value: &Option<YahooValue>) -> Option<f64> {
    value.as_ref().and_then(|v| v.raw).filter(|v| v.is_finite())
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fundamentals(&self, symbol: &str) -> Result<RawFundamentals, AnalysisError> {
        self.get_fundamentals(symbol).await
    }

    async fn price_history(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>, AnalysisError> {
        self.get_daily_closes(symbol, days).await
    }
}

#[async_trait]
impl SymbolSearch for YahooClient {
    async fn search(&self, query: &str) -> Result<Vec<SymbolSuggestion>, AnalysisError> {
        self.search_symbols(query).await
    }
}

// Chart response structures
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: Option<String>,
}

// Quote summary response structures
#[derive(Debug, Deserialize)]
struct QuoteSummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: QuoteSummaryEnvelope,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryEnvelope {
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
struct QuoteSummaryResult {
    #[serde(rename = "financialData")]
    financial_data: Option<FinancialData>,
    #[serde(rename = "defaultKeyStatistics")]
    default_key_statistics: Option<KeyStatistics>,
    #[serde(rename = "summaryDetail")]
    summary_detail: Option<SummaryDetail>,
}

/// Yahoo wraps numbers as `{"raw": 0.18, "fmt": "18.00%"}`; empty objects mean missing.
#[derive(Debug, Clone, Deserialize)]
struct YahooValue {
    raw: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialData {
    current_price: Option<YahooValue>,
    return_on_equity: Option<YahooValue>,
    operating_margins: Option<YahooValue>,
    quick_ratio: Option<YahooValue>,
    free_cashflow: Option<YahooValue>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatistics {
    trailing_eps: Option<YahooValue>,
}

#[derive(Debug, Default, Deserialize)]
struct SummaryDetail {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<YahooValue>,
}

// Search response structures
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuote {
    pub symbol: Option<String>,
    pub longname: Option<String>,
}
