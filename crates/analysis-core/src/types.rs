use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// One value of a derived indicator series, aligned to the input's dates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// One observation of a macroeconomic series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

/// Fundamentals snapshot for one symbol, fully populated.
///
/// Ratios (`return_on_equity`, `operating_margin`) are fractions, e.g. 0.18 for 18%.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFundamentals {
    pub return_on_equity: f64,
    pub operating_margin: f64,
    pub trailing_eps: f64,
    pub current_price: f64,
    pub quick_ratio: f64,
    pub free_cashflow: f64,
    pub trailing_pe: f64,
}

impl RawFundamentals {
    /// Fill absent fields with their neutral defaults: 0 everywhere, 1 for the price.
    #[allow(clippy::too_many_arguments)]
    pub fn from_partial(
        return_on_equity: Option<f64>,
        operating_margin: Option<f64>,
        trailing_eps: Option<f64>,
        current_price: Option<f64>,
        quick_ratio: Option<f64>,
        free_cashflow: Option<f64>,
        trailing_pe: Option<f64>,
    ) -> Self {
        Self {
            return_on_equity: return_on_equity.unwrap_or(0.0),
            operating_margin: operating_margin.unwrap_or(0.0),
            trailing_eps: trailing_eps.unwrap_or(0.0),
            current_price: current_price.unwrap_or(1.0),
            quick_ratio: quick_ratio.unwrap_or(0.0),
            free_cashflow: free_cashflow.unwrap_or(0.0),
            trailing_pe: trailing_pe.unwrap_or(0.0),
        }
    }
}

/// Buy/sell label derived from a stock score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Recommendation {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 80 => Recommendation::StrongBuy,
            s if s >= 60 => Recommendation::Buy,
            s if s >= 40 => Recommendation::Hold,
            s if s >= 20 => Recommendation::Sell,
            _ => Recommendation::StrongSell,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Sell => "Sell",
            Recommendation::StrongSell => "Strong Sell",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.to_label())
    }
}

/// Market sentiment label derived from a macro score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    VeryBullish,
    Bullish,
    Neutral,
    Bearish,
    VeryBearish,
}

impl Sentiment {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 80 => Sentiment::VeryBullish,
            s if s >= 60 => Sentiment::Bullish,
            s if s >= 40 => Sentiment::Neutral,
            s if s >= 20 => Sentiment::Bearish,
            _ => Sentiment::VeryBearish,
        }
    }

    pub fn to_label(&self) -> &'static str {
        match self {
            Sentiment::VeryBullish => "Very Bullish",
            Sentiment::Bullish => "Bullish",
            Sentiment::Neutral => "Neutral",
            Sentiment::Bearish => "Bearish",
            Sentiment::VeryBearish => "Very Bearish",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.to_label())
    }
}

/// Scored fundamentals for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    /// 0 to 100
    pub score: i32,
    pub roe_pct: f64,
    pub operating_margin_pct: f64,
    pub eps_price_pct: f64,
    pub quick_ratio: f64,
    /// Free cash flow in millions
    pub free_cash_flow_m: f64,
    pub pe_ratio: f64,
    pub recommendation: Recommendation,
}

/// Macro inputs, already derived from their source series
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawMacro {
    pub federal_funds_rate: f64,
    /// Quarter-over-quarter GDP growth, percent
    pub gdp_growth: f64,
    /// Year-over-year CPI change, percent
    pub cpi_yoy: f64,
    /// Neutral at 50
    pub manufacturing_pmi: f64,
}

/// Scored macro environment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroMetrics {
    pub federal_funds_rate: f64,
    pub gdp_growth: f64,
    pub cpi_yoy: f64,
    pub manufacturing_pmi: f64,
    /// 0 to 100
    pub score: i32,
    pub sentiment: Sentiment,
}

/// Ticker search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSuggestion {
    pub symbol: String,
    pub name: String,
}

impl SymbolSuggestion {
    pub fn label(&self) -> String {
        format!("{} - {}", self.symbol, self.name)
    }
}

/// Longest ticker accepted from user input
pub const MAX_SYMBOL_LEN: usize = 20;

/// Ticker shape check for user input: ASCII letters, digits and `.`, `-`, `^`, `=`.
///
/// Symbols end up in URLs and export file names, so path separators and
/// leading dots are rejected.
pub fn is_valid_symbol(symbol: &str) -> bool {
    !symbol.is_empty()
        && symbol.len() <= MAX_SYMBOL_LEN
        && !symbol.starts_with('.')
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_boundaries() {
        let cases = [
            (0, Recommendation::StrongSell),
            (19, Recommendation::StrongSell),
            (20, Recommendation::Sell),
            (39, Recommendation::Sell),
            (40, Recommendation::Hold),
            (59, Recommendation::Hold),
            (60, Recommendation::Buy),
            (79, Recommendation::Buy),
            (80, Recommendation::StrongBuy),
            (100, Recommendation::StrongBuy),
        ];
        for (score, expected) in cases {
            assert_eq!(Recommendation::from_score(score), expected, "score {}", score);
        }
    }

    #[test]
    fn test_recommendation_labels() {
        assert_eq!(Recommendation::StrongBuy.to_label(), "Strong Buy");
        assert_eq!(Recommendation::StrongSell.to_string(), "Strong Sell");
        assert_eq!(Recommendation::from_score(79).to_label(), "Buy");
    }

    #[test]
    fn test_sentiment_boundaries() {
        assert_eq!(Sentiment::from_score(100), Sentiment::VeryBullish);
        assert_eq!(Sentiment::from_score(80), Sentiment::VeryBullish);
        assert_eq!(Sentiment::from_score(79), Sentiment::Bullish);
        assert_eq!(Sentiment::from_score(60), Sentiment::Bullish);
        assert_eq!(Sentiment::from_score(59), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(40), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(39), Sentiment::Bearish);
        assert_eq!(Sentiment::from_score(20), Sentiment::Bearish);
        assert_eq!(Sentiment::from_score(19), Sentiment::VeryBearish);
        assert_eq!(Sentiment::from_score(0), Sentiment::VeryBearish);
        assert_eq!(Sentiment::VeryBearish.to_string(), "Very Bearish");
    }

    #[test]
    fn test_from_partial_defaults() {
        let raw = RawFundamentals::from_partial(Some(0.2), None, None, None, None, None, Some(18.0));
        assert_eq!(raw.return_on_equity, 0.2);
        assert_eq!(raw.operating_margin, 0.0);
        assert_eq!(raw.trailing_eps, 0.0);
        assert_eq!(raw.current_price, 1.0);
        assert_eq!(raw.free_cashflow, 0.0);
        assert_eq!(raw.trailing_pe, 18.0);
    }

    #[test]
    fn test_suggestion_label() {
        let s = SymbolSuggestion { symbol: "AAPL".to_string(), name: "Apple Inc.".to_string() };
        assert_eq!(s.label(), "AAPL - Apple Inc.");
    }

    #[test]
    fn test_metrics_serialize_recommendation_variant() {
        let m = StockMetrics {
            score: 64,
            roe_pct: 18.0,
            operating_margin_pct: 22.0,
            eps_price_pct: 4.0,
            quick_ratio: 1.2,
            free_cash_flow_m: 2500.0,
            pe_ratio: 21.0,
            recommendation: Recommendation::Buy,
        };
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["score"], 64);
        assert_eq!(json["recommendation"], "Buy");
    }

    #[test]
    fn test_symbol_validation() {
        for ok in ["AAPL", "BRK-B", "^GSPC", "EURUSD=X", "0700.HK"] {
            assert!(is_valid_symbol(ok), "{ok}");
        }
        for bad in ["", "../x", "..", ".hidden", "AA/PL", "A\\B", "AAPL ", "ÄPFEL", "ABCDEFGHIJKLMNOPQRSTU"] {
            assert!(!is_valid_symbol(bad), "{bad}");
        }
    }
}
