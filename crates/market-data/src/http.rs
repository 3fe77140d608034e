use analysis_core::AnalysisError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Requests per minute when the caller does not configure one.
pub const DEFAULT_RATE_LIMIT: usize = 120;

const MAX_ATTEMPTS: u32 = 3;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Request slots handed out over a rolling one-minute window.
#[derive(Clone)]
struct RateLimiter {
    sent: Arc<Mutex<VecDeque<Instant>>>,
    per_window: usize,
    window: Duration,
}

impl RateLimiter {
    fn new(per_window: usize, window: Duration) -> Self {
        Self {
            sent: Arc::new(Mutex::new(VecDeque::with_capacity(per_window))),
            per_window: per_window.max(1),
            window,
        }
    }

    /// How long a caller arriving at `now` must wait; `None` means a slot is free.
    fn delay_at(&self, sent: &mut VecDeque<Instant>, now: Instant) -> Option<Duration> {
        sent.retain(|&at| now.saturating_duration_since(at) < self.window);
        if sent.len() < self.per_window {
            return None;
        }
        sent.front().map(|&first| (first + self.window).saturating_duration_since(now))
    }

    async fn acquire(&self) {
        loop {
            let delay = {
                let mut sent = self.sent.lock().await;
                let now = Instant::now();
                match self.delay_at(&mut sent, now) {
                    None => {
                        sent.push_back(now);
                        return;
                    }
                    Some(delay) => delay,
                }
            };
            tracing::debug!("{} requests in the last minute, pausing {:?}", self.per_window, delay);
            tokio::time::sleep(delay.max(Duration::from_millis(10))).await;
        }
    }
}

/// Shared transport: rate limiting, browser user agent and 429 retry.
#[derive(Clone)]
pub(crate) struct HttpClient {
    client: Client,
    rate_limiter: RateLimiter,
    retry_wait: Duration,
}

impl HttpClient {
    pub(crate) fn new(rate_limit: usize) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            rate_limiter: RateLimiter::new(rate_limit, Duration::from_secs(60)),
            retry_wait: Duration::from_secs(15),
        }
    }

    pub(crate) fn with_rate_limit(mut self, rate_limit: usize) -> Self {
        self.rate_limiter = RateLimiter::new(rate_limit, Duration::from_secs(60));
        self
    }

    pub(crate) fn with_retry_wait(mut self, retry_wait: Duration) -> Self {
        self.retry_wait = retry_wait;
        self
    }

    /// Send a request with rate limiting and automatic 429 retry.
    async fn send_request(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, AnalysisError> {
        let request = builder.build().map_err(|e| AnalysisError::ApiError(e.to_string()))?;
        tracing::debug!("GET {}", request.url().path());

        for attempt in 0..MAX_ATTEMPTS {
            self.rate_limiter.acquire().await;
            let req_clone = request
                .try_clone()
                .ok_or_else(|| AnalysisError::ApiError("Cannot clone request".to_string()))?;
            let response = self
                .client
                .execute(req_clone)
                .await
                .map_err(|e| AnalysisError::ApiError(e.to_string()))?;

            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            tracing::warn!(
                "429 rate limited, waiting {:.1}s before retry {}/{}",
                self.retry_wait.as_secs_f64(),
                attempt + 1,
                MAX_ATTEMPTS
            );
            tokio::time::sleep(self.retry_wait).await;
        }

        Err(AnalysisError::ApiError(format!(
            "Rate limited after {} retries",
            MAX_ATTEMPTS
        )))
    }

    /// GET `url` with `query` and decode a JSON body; non-2xx statuses become `ApiError`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AnalysisError> {
        let response = self.send_request(self.client.get(url).query(query)).await?;

        if !response.status().is_success() {
            return Err(AnalysisError::ApiError(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AnalysisError::ApiError(e.to_string()))
    }

    /// GET `url` and return the body as text; non-2xx statuses become `ApiError`.
    pub(crate) async fn get_text(&self, url: &str) -> Result<String, AnalysisError> {
        let response = self.send_request(self.client.get(url)).await?;
        let status = response.status();
        let body = response.text().await.map_err(|e| AnalysisError::ApiError(e.to_string()))?;
        if !status.is_success() {
            return Err(AnalysisError::ApiError(format!("HTTP {}: {}", status, body)));
        }
        Ok(body)
    }

    /// GET `url` only for the cookies it sets; the status and body are ignored.
    pub(crate) async fn visit(&self, url: &str) {
        match self.send_request(self.client.get(url)).await {
            Ok(response) => tracing::debug!("Visited {} ({})", url, response.status()),
            Err(e) => tracing::debug!("Visiting {} failed: {}", url, e),
        }
    }
}
