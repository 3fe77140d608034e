use analysis_core::AnalysisError;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use std::path::Path;

use crate::export::{ExportSummary, TimeSeriesRow, SUMMARY_HEADERS, TIME_SERIES_HEADERS};

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_text_wrap()
        .set_align(FormatAlign::Top)
        .set_background_color(Color::RGB(0xD7E4BC))
        .set_border(FormatBorder::Thin)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], width: f64) -> Result<(), XlsxError> {
    let format = header_format();
    for (col, title) in headers.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &format)?;
        sheet.set_column_width(col, width)?;
    }
    Ok(())
}

fn write_optional(sheet: &mut Worksheet, row: u32, col: u16, value: Option<f64>) -> Result<(), XlsxError> {
    if let Some(v) = value {
        sheet.write_number(row, col, v)?;
    }
    Ok(())
}

fn build(summary: &ExportSummary, rows: &[TimeSeriesRow]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name("Summary")?;
    write_headers(sheet, &SUMMARY_HEADERS, 15.0)?;
    sheet.write_string(1, 0, summary.analysis_date.as_str())?;
    sheet.write_string(1, 1, summary.symbol.as_str())?;
    sheet.write_number(1, 2, f64::from(summary.score))?;
    sheet.write_string(1, 3, summary.recommendation.as_str())?;
    let figures = [
        summary.roe_pct,
        summary.operating_margin_pct,
        summary.eps_price_pct,
        summary.quick_ratio,
        summary.free_cash_flow_m,
        summary.pe_ratio,
    ];
    for (offset, value) in figures.into_iter().enumerate() {
        sheet.write_number(1, 4 + offset as u16, value)?;
    }

    let sheet = workbook.add_worksheet().set_name("Time Series Data")?;
    write_headers(sheet, &TIME_SERIES_HEADERS, 12.0)?;
    for (i, r) in rows.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, r.date.as_str())?;
        write_optional(sheet, row, 1, r.stock_price)?;
        write_optional(sheet, row, 2, r.ma_20)?;
        write_optional(sheet, row, 3, r.ma_50)?;
        write_optional(sheet, row, 4, r.rsi)?;
    }

    Ok(workbook)
}

/// Two-sheet workbook: "Summary" (one row) and "Time Series Data".
pub(crate) fn write_workbook(path: &Path, summary: &ExportSummary, rows: &[TimeSeriesRow]) -> Result<(), AnalysisError> {
    build(summary, rows)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|e| AnalysisError::ExportError(format!("cannot write {}: {}", path.display(), e)))
}
