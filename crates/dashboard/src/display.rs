//! Plain-text rendering of reports for the terminal.

use analysis_orchestrator::{MacroReport, PoolRow, StockReport};
use analysis_core::SymbolSuggestion;
use stock_pool::Favorites;
use std::fmt::Write;

use crate::config::DashboardConfig;

pub fn pool_table(rows: &[PoolRow], favorites: &Favorites) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<2}{:<8} {:<32} {:>5}  {:<12} {:>8} {:>8} {:>8} {:>6} {:>10} {:>7}",
        "", "Symbol", "Company", "Score", "Rating", "ROE %", "OpM %", "E/P %", "Quick", "FCF $M", "P/E"
    );
    for row in rows {
        let m = &row.metrics;
        let star = if favorites.contains(&row.symbol) { "*" } else { "" };
        let _ = writeln!(
            out,
            "{:<2}{:<8} {:<32} {:>5}  {:<12} {:>8.2} {:>8.2} {:>8.2} {:>6.2} {:>10.1} {:>7.2}",
            star,
            row.symbol,
            truncate(&row.company, 32),
            m.score,
            m.recommendation,
            m.roe_pct,
            m.operating_margin_pct,
            m.eps_price_pct,
            m.quick_ratio,
            m.free_cash_flow_m,
            m.pe_ratio,
        );
    }
    out
}

pub fn stock_summary(report: &StockReport) -> String {
    let m = &report.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "{}  score {}/100  {}", report.symbol, m.score, m.recommendation);
    let _ = writeln!(out, "  ROE               {:>10.2}%", m.roe_pct);
    let _ = writeln!(out, "  Operating margin  {:>10.2}%", m.operating_margin_pct);
    let _ = writeln!(out, "  EPS / price       {:>10.2}%", m.eps_price_pct);
    let _ = writeln!(out, "  Quick ratio       {:>10.2}", m.quick_ratio);
    let _ = writeln!(out, "  Free cash flow    {:>10.1} $M", m.free_cash_flow_m);
    let _ = writeln!(out, "  P/E               {:>10.2}", m.pe_ratio);

    let Some(last) = report.prices.last() else {
        return out;
    };
    if report.has_full_technicals() {
        let latest = |series: &[analysis_core::IndicatorPoint]| {
            series.last().map(|p| format!("{:.2}", p.value)).unwrap_or_default()
        };
        let _ = writeln!(
            out,
            "  Last close {:.2} on {}  MA20 {}  MA50 {}  RSI {}",
            last.close,
            last.date,
            latest(&report.ma_20),
            latest(&report.ma_50),
            latest(&report.rsi),
        );
    } else {
        let _ = writeln!(
            out,
            "  Last close {:.2} on {}  (technical indicators need more than {} closes)",
            last.close,
            last.date,
            report.prices.len()
        );
    }
    out
}

pub fn macro_summary(report: &MacroReport) -> String {
    let m = &report.metrics;
    let mut out = String::new();
    let _ = writeln!(out, "Market sentiment: {} ({}/100)", m.sentiment, m.score);
    for note in &report.notes {
        let _ = writeln!(out, "\n{}: {:.2}", note.name, note.value);
        let _ = writeln!(out, "  {}", note.impact);
        let _ = writeln!(out, "  {}", note.threshold);
    }
    out
}

pub fn suggestions(list: &[SymbolSuggestion]) -> String {
    if list.is_empty() {
        return "No matching symbols\n".to_string();
    }
    list.iter().map(|s| format!("{}\n", s.label())).collect()
}

/// Effective settings with keys masked down to their last four characters.
pub fn config_summary(config: &DashboardConfig) -> String {
    let on_off = |b: bool| if b { "enabled" } else { "disabled" };
    let mut out = String::new();
    let _ = writeln!(out, "Settings directory  {}", config.config_dir.display());
    let _ = writeln!(out, "FRED API key        {}", mask_key(&config.fred_api_key));
    let _ = writeln!(
        out,
        "Alpha Vantage key   {}",
        mask_key(config.alpha_vantage_key.as_deref().unwrap_or_default())
    );
    let _ = writeln!(out, "Macro analysis      {}", on_off(config.enable_macro_analysis));
    let _ = writeln!(out, "Stock analysis      {}", on_off(config.enable_stock_analysis));
    if !config.missing_api_keys().is_empty() {
        let _ = writeln!(out, "\nPlease configure your API keys: dashboard config set-key <fred|alpha-vantage> KEY");
    }
    out
}

fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    if count == 0 {
        return "not set".to_string();
    }
    let shown: String = key.chars().skip(count.saturating_sub(4)).collect();
    format!("{}{}", "*".repeat(count - shown.chars().count()), shown)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{}...", cut)
    }
}
