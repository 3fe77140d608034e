use async_trait::async_trait;
use crate::{AnalysisError, Observation, PricePoint, RawFundamentals, SymbolSuggestion};

/// Source of per-symbol fundamentals and daily closes
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fundamentals(&self, symbol: &str) -> Result<RawFundamentals, AnalysisError>;

    /// Daily closes covering roughly the last `days` calendar days, oldest first.
    async fn price_history(&self, symbol: &str, days: u32) -> Result<Vec<PricePoint>, AnalysisError>;
}

/// Source of named macroeconomic time series (FRED series ids)
#[async_trait]
pub trait MacroDataProvider: Send + Sync {
    /// Observations for `series_id`, oldest first.
    async fn series(&self, series_id: &str) -> Result<Vec<Observation>, AnalysisError>;
}

/// Free-text ticker lookup
#[async_trait]
pub trait SymbolSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SymbolSuggestion>, AnalysisError>;
}
