use analysis_core::{
    AnalysisError, IndicatorPoint, MacroDataProvider, MacroMetrics, MarketDataProvider, PricePoint, StockMetrics,
};
use fundamental_analysis::score_stock;
use macro_analysis::{
    derive_raw_macro, indicator_notes, score_macro, IndicatorNote, MacroSeries, CPI_SERIES, FED_FUNDS_SERIES,
    GDP_SERIES, MANUFACTURING_SERIES,
};
use serde::Serialize;
use std::sync::Arc;
use stock_pool::StockPool;
use technical_analysis::{moving_average, rsi, DEFAULT_RSI_PERIOD};

mod document;
pub mod export;
mod workbook;

pub use export::{
    build_time_series, export_csv, export_report, CsvPaths, ExportPaths, ExportSummary, TimeSeriesRow,
};

/// One year of daily closes
pub const PRICE_HISTORY_DAYS: u32 = 365;
pub const SHORT_MA_PERIOD: usize = 20;
pub const LONG_MA_PERIOD: usize = 50;

/// Everything the stock analysis view shows for one symbol
#[derive(Debug, Clone, Serialize)]
pub struct StockReport {
    pub symbol: String,
    pub metrics: StockMetrics,
    pub prices: Vec<PricePoint>,
    pub ma_20: Vec<IndicatorPoint>,
    pub ma_50: Vec<IndicatorPoint>,
    pub rsi: Vec<IndicatorPoint>,
}

impl StockReport {
    /// MA20, MA50 and RSI all have at least one value; the technical view and
    /// exports need every one of them.
    pub fn has_full_technicals(&self) -> bool {
        !self.ma_20.is_empty() && !self.ma_50.is_empty() && !self.rsi.is_empty()
    }
}

/// A scored row of the stock pool table
#[derive(Debug, Clone, Serialize)]
pub struct PoolRow {
    pub symbol: String,
    pub company: String,
    pub metrics: StockMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct MacroReport {
    pub metrics: MacroMetrics,
    pub notes: Vec<IndicatorNote>,
}

/// Assembles raw data from the providers and hands complete records to the scorers.
///
/// A request is either fully answered or reported unavailable; scorers never see partial input.
pub struct AnalysisOrchestrator {
    market_data: Arc<dyn MarketDataProvider>,
    macro_data: Arc<dyn MacroDataProvider>,
}

fn unavailable(what: &str, err: AnalysisError) -> AnalysisError {
    tracing::warn!("{} unavailable: {}", what, err);
    match err {
        AnalysisError::MissingData(_) => err,
        other => AnalysisError::MissingData(format!("{} unavailable: {}", what, other)),
    }
}

impl AnalysisOrchestrator {
    pub fn new(market_data: Arc<dyn MarketDataProvider>, macro_data: Arc<dyn MacroDataProvider>) -> Self {
        Self { market_data, macro_data }
    }

    pub async fn stock_metrics(&self, symbol: &str) -> Result<StockMetrics, AnalysisError> {
        let raw = self
            .market_data
            .fundamentals(symbol)
            .await
            .map_err(|e| unavailable(&format!("{} fundamentals", symbol), e))?;

        Ok(score_stock(&raw))
    }

    /// Score, one year of closes, MA20, MA50 and RSI(14) for `symbol`.
    pub async fn analyze_stock(&self, symbol: &str) -> Result<StockReport, AnalysisError> {
        let (raw, prices) = tokio::try_join!(
            self.market_data.fundamentals(symbol),
            self.market_data.price_history(symbol, PRICE_HISTORY_DAYS),
        )
        .map_err(|e| unavailable(symbol, e))?;

        if prices.is_empty() {
            return Err(unavailable(
                symbol,
                AnalysisError::InsufficientData("no price history".to_string()),
            ));
        }

        let report = StockReport {
            symbol: symbol.to_string(),
            metrics: score_stock(&raw),
            ma_20: moving_average(&prices, SHORT_MA_PERIOD),
            ma_50: moving_average(&prices, LONG_MA_PERIOD),
            rsi: rsi(&prices, DEFAULT_RSI_PERIOD),
            prices,
        };

        if !report.has_full_technicals() {
            tracing::warn!(
                "{}: only {} closes, technical indicators incomplete",
                symbol,
                report.prices.len()
            );
        }
        tracing::debug!(
            "{}: score {} ({}), {} closes",
            symbol,
            report.metrics.score,
            report.metrics.recommendation,
            report.prices.len()
        );
        Ok(report)
    }

    /// Score every pool symbol in turn; symbols without data are left out.
    pub async fn score_pool(&self, pool: &StockPool) -> Vec<PoolRow> {
        let mut rows = Vec::with_capacity(pool.len());

        for (symbol, company) in pool.iter() {
            match self.stock_metrics(symbol).await {
                Ok(metrics) => rows.push(PoolRow {
                    symbol: symbol.to_string(),
                    company: company.to_string(),
                    metrics,
                }),
                Err(e) => tracing::warn!("Skipping {} in pool table: {}", symbol, e),
            }
        }

        rows
    }

    /// Fetch the four FRED series and score them; fails as a whole if any is missing.
    pub async fn macro_metrics(&self) -> Result<MacroMetrics, AnalysisError> {
        let (federal_funds_rate, gdp, cpi, manufacturing) = tokio::try_join!(
            self.macro_data.series(FED_FUNDS_SERIES),
            self.macro_data.series(GDP_SERIES),
            self.macro_data.series(CPI_SERIES),
            self.macro_data.series(MANUFACTURING_SERIES),
        )
        .map_err(|e| unavailable("macro data", e))?;

        let series = MacroSeries { federal_funds_rate, gdp, cpi, manufacturing };
        let raw = derive_raw_macro(&series).map_err(|e| unavailable("macro data", e))?;

        Ok(score_macro(&raw))
    }

    pub async fn macro_report(&self) -> Result<MacroReport, AnalysisError> {
        let metrics = self.macro_metrics().await?;
        let notes = indicator_notes(&metrics);
        Ok(MacroReport { metrics, notes })
    }
}
