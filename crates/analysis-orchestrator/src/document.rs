//! PDF "Stock Analysis Report": summary metrics table on the first page, one
//! line chart per indicator on the second.

use analysis_core::{AnalysisError, IndicatorPoint};
use chrono::NaiveDate;
use printpdf::{BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::StockReport;

// US letter, one inch margins
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 25.4;

const ROW_HEIGHT: f32 = 9.0;
const LABEL_WIDTH: f32 = 90.0;
const VALUE_WIDTH: f32 = 60.0;
const CHART_HEIGHT: f32 = 48.0;

fn pdf_error(path: &Path, err: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::ExportError(format!("cannot write {}: {}", path.display(), err))
}

/// Metric/value rows of the summary table, header first.
pub(crate) fn summary_rows(report: &StockReport) -> Vec<(String, String)> {
    let m = &report.metrics;
    [
        ("Metric", "Value".to_string()),
        ("Analysis Score", format!("{:.2}", f64::from(m.score))),
        ("Recommendation", m.recommendation.to_label().to_string()),
        ("ROE (%)", format!("{:.2}%", m.roe_pct)),
        ("Operating Margin (%)", format!("{:.2}%", m.operating_margin_pct)),
        ("EPS/Price (%)", format!("{:.2}%", m.eps_price_pct)),
        ("Quick Ratio", format!("{:.2}", m.quick_ratio)),
        ("Free Cash Flow ($M)", format!("${:.0}M", m.free_cash_flow_m)),
        ("P/E Ratio", format!("{:.2}", m.pe_ratio)),
    ]
    .into_iter()
    .map(|(label, value)| (label.to_string(), value))
    .collect()
}

/// Map values onto `[0, 1]`; a flat series sits in the middle.
pub(crate) fn normalize(values: &[f64]) -> Vec<f32> {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;
    values
        .iter()
        .map(|v| if span > 0.0 { ((v - lo) / span) as f32 } else { 0.5 })
        .collect()
}

fn segment(points: &[(f32, f32)], closed: bool) -> Line {
    Line {
        points: points.iter().map(|&(x, y)| (Point::new(Mm(x), Mm(y)), false)).collect(),
        is_closed: closed,
    }
}

fn draw_table(layer: &PdfLayerReference, rows: &[(String, String)], top: f32, regular: &IndirectFontRef, bold: &IndirectFontRef) -> f32 {
    let left = MARGIN;
    let middle = left + LABEL_WIDTH;
    let right = middle + VALUE_WIDTH;
    let bottom = top - ROW_HEIGHT * rows.len() as f32;

    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(0.75);
    for i in 0..=rows.len() {
        let y = top - ROW_HEIGHT * i as f32;
        layer.add_line(segment(&[(left, y), (right, y)], false));
    }
    for x in [left, middle, right] {
        layer.add_line(segment(&[(x, top), (x, bottom)], false));
    }

    for (i, (label, value)) in rows.iter().enumerate() {
        let (font, size) = if i == 0 { (bold, 13.0) } else { (regular, 11.0) };
        let baseline = top - ROW_HEIGHT * (i as f32 + 1.0) + 2.8;
        layer.use_text(label.as_str(), size, Mm(left + 3.0), Mm(baseline), font);
        layer.use_text(value.as_str(), size, Mm(middle + 3.0), Mm(baseline), font);
    }
    bottom
}

fn draw_chart(layer: &PdfLayerReference, series: &[IndicatorPoint], top: f32, font: &IndirectFontRef) {
    let left = MARGIN;
    let right = PAGE_WIDTH - MARGIN;
    let bottom = top - CHART_HEIGHT;

    layer.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
    layer.set_outline_thickness(0.5);
    layer.add_line(segment(&[(left, bottom), (right, bottom), (right, top), (left, top)], true));

    if series.len() < 2 {
        layer.use_text("Not enough data", 10.0, Mm(left + 4.0), Mm(bottom + CHART_HEIGHT / 2.0), font);
        return;
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let step = (right - left - 4.0) / (values.len() - 1) as f32;
    let points: Vec<(f32, f32)> = normalize(&values)
        .into_iter()
        .enumerate()
        .map(|(i, y)| (left + 2.0 + step * i as f32, bottom + 2.0 + y * (CHART_HEIGHT - 4.0)))
        .collect();

    layer.set_outline_color(Color::Rgb(Rgb::new(0.12, 0.47, 0.71, None)));
    layer.set_outline_thickness(0.8);
    layer.add_line(segment(&points, false));

    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (first, last) = (&series[0], &series[series.len() - 1]);
    layer.use_text(format!("{:.2}", hi), 8.0, Mm(right + 1.5), Mm(top - 3.0), font);
    layer.use_text(format!("{:.2}", lo), 8.0, Mm(right + 1.5), Mm(bottom), font);
    layer.use_text(first.date.to_string(), 8.0, Mm(left), Mm(bottom - 4.0), font);
    layer.use_text(last.date.to_string(), 8.0, Mm(right - 17.0), Mm(bottom - 4.0), font);
}

pub(crate) fn write_document(path: &Path, report: &StockReport, analysis_date: NaiveDate) -> Result<(), AnalysisError> {
    let title = format!("Stock Analysis Report - {}", report.symbol);
    let (doc, page, layer) = PdfDocument::new(title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Summary");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(|e| pdf_error(path, e))?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(|e| pdf_error(path, e))?;

    let summary = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN;
    summary.use_text(title.as_str(), 20.0, Mm(MARGIN), Mm(y), &bold);
    y -= 12.0;
    summary.use_text(format!("Analysis Date: {}", analysis_date.format("%Y-%m-%d")), 11.0, Mm(MARGIN), Mm(y), &regular);
    y -= 14.0;
    summary.use_text("Summary Metrics", 16.0, Mm(MARGIN), Mm(y), &bold);
    y -= 6.0;
    draw_table(&summary, &summary_rows(report), y, &regular, &bold);

    let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Technical Analysis");
    let charts = doc.get_page(page).get_layer(layer);
    let mut y = PAGE_HEIGHT - MARGIN;
    charts.use_text("Technical Analysis Charts", 16.0, Mm(MARGIN), Mm(y), &bold);
    y -= 12.0;
    for (heading, series) in [
        ("20-Day Moving Average", &report.ma_20),
        ("50-Day Moving Average", &report.ma_50),
        ("Relative Strength Index (RSI)", &report.rsi),
    ] {
        charts.use_text(heading, 12.0, Mm(MARGIN), Mm(y), &bold);
        y -= 4.0;
        draw_chart(&charts, series, y, &regular);
        y -= CHART_HEIGHT + 12.0;
    }

    let file = File::create(path).map_err(|e| pdf_error(path, e))?;
    doc.save(&mut BufWriter::new(file)).map_err(|e| pdf_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Recommendation, StockMetrics};

    fn report() -> StockReport {
        StockReport {
            symbol: "MSFT".to_string(),
            metrics: StockMetrics {
                score: 64,
                roe_pct: 35.6,
                operating_margin_pct: 44.6,
                eps_price_pct: 2.81,
                quick_ratio: 1.1,
                free_cash_flow_m: 56_213.4,
                pe_ratio: 35.2,
                recommendation: Recommendation::Buy,
            },
            prices: vec![],
            ma_20: vec![],
            ma_50: vec![],
            rsi: vec![],
        }
    }

    #[test]
    fn test_summary_rows_format() {
        let rows = summary_rows(&report());

        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0], ("Metric".to_string(), "Value".to_string()));
        assert_eq!(rows[1].1, "64.00");
        assert_eq!(rows[2].1, "Buy");
        assert_eq!(rows[3].1, "35.60%");
        assert_eq!(rows[7].1, "$56213M");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&[10.0, 20.0, 15.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(normalize(&[3.0, 3.0]), vec![0.5, 0.5]);
    }

    #[test]
    fn test_document_without_chart_data_still_renders() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msft.pdf");
        write_document(&path, &report(), NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
