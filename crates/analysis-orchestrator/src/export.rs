//! Export of a stock report: one summary row plus the joined price/indicator
//! time series, as a two-sheet workbook with a PDF report, or as CSV files.

use analysis_core::{is_valid_symbol, AnalysisError, IndicatorPoint};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{document, workbook, StockReport};

pub const SUMMARY_HEADERS: [&str; 10] = [
    "Analysis Date",
    "Symbol",
    "Analysis Score",
    "Recommendation",
    "ROE (%)",
    "Operating Margin (%)",
    "EPS/Price (%)",
    "Quick Ratio",
    "Free Cash Flow ($M)",
    "P/E Ratio",
];

pub const TIME_SERIES_HEADERS: [&str; 5] = ["Date", "Stock Price", "20-Day MA", "50-Day MA", "RSI"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportSummary {
    #[serde(rename = "Analysis Date")]
    pub analysis_date: String,
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Analysis Score")]
    pub score: i32,
    #[serde(rename = "Recommendation")]
    pub recommendation: String,
    #[serde(rename = "ROE (%)")]
    pub roe_pct: f64,
    #[serde(rename = "Operating Margin (%)")]
    pub operating_margin_pct: f64,
    #[serde(rename = "EPS/Price (%)")]
    pub eps_price_pct: f64,
    #[serde(rename = "Quick Ratio")]
    pub quick_ratio: f64,
    #[serde(rename = "Free Cash Flow ($M)")]
    pub free_cash_flow_m: f64,
    #[serde(rename = "P/E Ratio")]
    pub pe_ratio: f64,
}

impl ExportSummary {
    pub fn from_report(report: &StockReport, analysis_date: NaiveDate) -> Self {
        let m = &report.metrics;
        Self {
            analysis_date: analysis_date.format("%Y-%m-%d").to_string(),
            symbol: report.symbol.clone(),
            score: m.score,
            recommendation: m.recommendation.to_label().to_string(),
            roe_pct: m.roe_pct,
            operating_margin_pct: m.operating_margin_pct,
            eps_price_pct: m.eps_price_pct,
            quick_ratio: m.quick_ratio,
            free_cash_flow_m: m.free_cash_flow_m,
            pe_ratio: m.pe_ratio,
        }
    }
}

/// One date of the joined series; indicators are empty before their window fills.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Stock Price")]
    pub stock_price: Option<f64>,
    #[serde(rename = "20-Day MA")]
    pub ma_20: Option<f64>,
    #[serde(rename = "50-Day MA")]
    pub ma_50: Option<f64>,
    #[serde(rename = "RSI")]
    pub rsi: Option<f64>,
}

/// Outer join of closes, MA20, MA50 and RSI on date, oldest first.
pub fn build_time_series(report: &StockReport) -> Vec<TimeSeriesRow> {
    let mut rows: BTreeMap<NaiveDate, TimeSeriesRow> = BTreeMap::new();

    fn row(rows: &mut BTreeMap<NaiveDate, TimeSeriesRow>, date: NaiveDate) -> &mut TimeSeriesRow {
        rows.entry(date).or_insert_with(|| TimeSeriesRow {
            date: date.format("%Y-%m-%d").to_string(),
            ..Default::default()
        })
    }

    for p in &report.prices {
        row(&mut rows, p.date).stock_price = Some(p.close);
    }

    let columns: [(&[IndicatorPoint], fn(&mut TimeSeriesRow, f64)); 3] = [
        (report.ma_20.as_slice(), |r, v| r.ma_20 = Some(v)),
        (report.ma_50.as_slice(), |r, v| r.ma_50 = Some(v)),
        (report.rsi.as_slice(), |r, v| r.rsi = Some(v)),
    ];
    for (series, set) in columns {
        for point in series {
            set(row(&mut rows, point.date), point.value);
        }
    }

    rows.into_values().collect()
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<(), AnalysisError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for r in rows {
        csv_writer
            .serialize(r)
            .map_err(|e| AnalysisError::ExportError(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| AnalysisError::ExportError(e.to_string()))
}

pub fn write_summary_csv<W: Write>(writer: W, summary: &ExportSummary) -> Result<(), AnalysisError> {
    write_rows(writer, std::slice::from_ref(summary))
}

pub fn write_time_series_csv<W: Write>(writer: W, rows: &[TimeSeriesRow]) -> Result<(), AnalysisError> {
    write_rows(writer, rows)
}

/// Files written by [`export_report`]
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub workbook: PathBuf,
    pub document: PathBuf,
}

/// Files written by [`export_csv`]
#[derive(Debug, Clone, PartialEq)]
pub struct CsvPaths {
    pub summary: PathBuf,
    pub time_series: PathBuf,
}

fn export_error(context: &str, path: &Path, err: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::ExportError(format!("{} {}: {}", context, path.display(), err))
}

/// Refuse reports that cannot be exported and make sure `dir` exists.
fn prepare(dir: &Path, report: &StockReport) -> Result<(), AnalysisError> {
    if !is_valid_symbol(&report.symbol) {
        return Err(AnalysisError::ExportError(format!("invalid symbol {:?}", report.symbol)));
    }
    if !report.has_full_technicals() {
        return Err(AnalysisError::InsufficientData(format!(
            "{}: not enough price history for MA20, MA50 and RSI",
            report.symbol
        )));
    }
    std::fs::create_dir_all(dir).map_err(|e| export_error("cannot create", dir, e))
}

/// Write `<SYMBOL>_analysis_<YYYYMMDD>.xlsx` (sheets "Summary" and "Time Series Data")
/// and the matching `.pdf` report into `dir`.
pub fn export_report(dir: &Path, report: &StockReport, analysis_date: NaiveDate) -> Result<ExportPaths, AnalysisError> {
    prepare(dir, report)?;

    let stem = format!("{}_analysis_{}", report.symbol, analysis_date.format("%Y%m%d"));
    let paths = ExportPaths {
        workbook: dir.join(format!("{}.xlsx", stem)),
        document: dir.join(format!("{}.pdf", stem)),
    };

    let summary = ExportSummary::from_report(report, analysis_date);
    workbook::write_workbook(&paths.workbook, &summary, &build_time_series(report))?;
    document::write_document(&paths.document, report, analysis_date)?;

    tracing::info!("Exported {} report to {}", report.symbol, dir.display());
    Ok(paths)
}

/// Write `<SYMBOL>_summary.csv` and `<SYMBOL>_time_series.csv` into `dir`.
pub fn export_csv(dir: &Path, report: &StockReport, analysis_date: NaiveDate) -> Result<CsvPaths, AnalysisError> {
    prepare(dir, report)?;

    let paths = CsvPaths {
        summary: dir.join(format!("{}_summary.csv", report.symbol)),
        time_series: dir.join(format!("{}_time_series.csv", report.symbol)),
    };

    let open = |path: &Path| std::fs::File::create(path).map_err(|e| export_error("cannot write", path, e));

    write_summary_csv(open(&paths.summary)?, &ExportSummary::from_report(report, analysis_date))?;
    write_time_series_csv(open(&paths.time_series)?, &build_time_series(report))?;

    tracing::info!("Exported {} CSV files to {}", report.symbol, dir.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{PricePoint, Recommendation, StockMetrics};
    use chrono::Duration;

    fn day(i: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(i)
    }

    fn report() -> StockReport {
        StockReport {
            symbol: "AAPL".to_string(),
            metrics: StockMetrics {
                score: 72,
                roe_pct: 147.25,
                operating_margin_pct: 30.1,
                eps_price_pct: 3.4,
                quick_ratio: 0.83,
                free_cash_flow_m: 99_584.0,
                pe_ratio: 29.6,
                recommendation: Recommendation::Buy,
            },
            prices: (0..3).map(|i| PricePoint { date: day(i), close: 170.0 + i as f64 }).collect(),
            ma_20: vec![IndicatorPoint { date: day(2), value: 171.0 }],
            ma_50: vec![],
            rsi: vec![
                IndicatorPoint { date: day(1), value: 100.0 },
                IndicatorPoint { date: day(2), value: 100.0 },
            ],
        }
    }

    #[test]
    fn test_time_series_outer_join() {
        let rows = build_time_series(&report());

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, "2024-03-01");
        assert_eq!(rows[0].stock_price, Some(170.0));
        assert_eq!(rows[0].ma_20, None);
        assert_eq!(rows[0].rsi, None);
        assert_eq!(rows[1].rsi, Some(100.0));
        assert_eq!(rows[2].ma_20, Some(171.0));
        assert!(rows.iter().all(|r| r.ma_50.is_none()));
    }

    #[test]
    fn test_summary_csv_headers() {
        let summary = ExportSummary::from_report(&report(), day(10));
        let mut out = Vec::new();
        write_summary_csv(&mut out, &summary).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Analysis Date,Symbol,Analysis Score,Recommendation,ROE (%),Operating Margin (%),EPS/Price (%),Quick Ratio,Free Cash Flow ($M),P/E Ratio"
        );
        assert!(lines.next().unwrap().starts_with("2024-03-11,AAPL,72,Buy,147.25,"));
    }

    #[test]
    fn test_time_series_csv_leaves_gaps_empty() {
        let mut out = Vec::new();
        write_time_series_csv(&mut out, &build_time_series(&report())).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Stock Price,20-Day MA,50-Day MA,RSI");
        assert_eq!(lines[1], "2024-03-01,170.0,,,");
        assert_eq!(lines[3], "2024-03-03,172.0,171.0,,100.0");
    }

    fn full_report() -> StockReport {
        let mut report = report();
        report.ma_50 = vec![IndicatorPoint { date: day(2), value: 170.5 }];
        report
    }

    #[test]
    fn test_csv_headers_match_sheet_headers() {
        let mut out = Vec::new();
        write_summary_csv(&mut out, &ExportSummary::from_report(&report(), day(0))).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next().unwrap(), SUMMARY_HEADERS.join(","));

        let mut out = Vec::new();
        write_time_series_csv(&mut out, &build_time_series(&report())).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next().unwrap(), TIME_SERIES_HEADERS.join(","));
    }

    #[test]
    fn test_export_csv_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let paths = export_csv(&dir.path().join("exports"), &full_report(), day(0)).unwrap();

        assert!(paths.summary.ends_with("AAPL_summary.csv"));
        let series = std::fs::read_to_string(&paths.time_series).unwrap();
        assert_eq!(series.lines().count(), 4);
    }

    #[test]
    fn test_export_report_writes_workbook_and_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let paths = export_report(dir.path(), &full_report(), day(14)).unwrap();

        assert!(paths.workbook.ends_with("AAPL_analysis_20240315.xlsx"));
        assert!(paths.document.ends_with("AAPL_analysis_20240315.pdf"));
        let xlsx = std::fs::read(&paths.workbook).unwrap();
        assert!(xlsx.starts_with(b"PK"));
        let pdf = std::fs::read(&paths.document).unwrap();
        assert!(pdf.starts_with(b"%PDF"));
    }

    #[test]
    fn test_export_requires_every_indicator() {
        let dir = tempfile::tempdir().unwrap();
        // report() has no 50-day values
        let err = export_report(dir.path(), &report(), day(0)).unwrap_err();
        assert!(matches!(err, AnalysisError::InsufficientData(_)));
        assert!(export_csv(dir.path(), &report(), day(0)).is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_export_rejects_path_like_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        for symbol in ["../x", "a/b", ".."] {
            let mut report = full_report();
            report.symbol = symbol.to_string();

            let err = export_report(&target, &report, day(0)).unwrap_err();
            assert!(matches!(err, AnalysisError::ExportError(_)));
            assert!(export_csv(&target, &report, day(0)).is_err());
        }
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
