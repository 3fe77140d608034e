//! Turns raw FRED series into a [`RawMacro`] record.
//!
//! Derivation is all-or-nothing: if any series is missing or too short the
//! whole record is unavailable.

use analysis_core::{AnalysisError, Observation, RawMacro};

pub const FED_FUNDS_SERIES: &str = "FEDFUNDS";
pub const GDP_SERIES: &str = "GDP";
pub const CPI_SERIES: &str = "CPIAUCSL";
/// Manufacturing employment, used as the PMI proxy.
pub const MANUFACTURING_SERIES: &str = "MANEMP";

/// CPI is monthly; the year-ago observation sits 12 places before the latest.
const CPI_YEAR_OFFSET: usize = 12;

/// The four source series, each ordered oldest first
#[derive(Debug, Clone, Default)]
pub struct MacroSeries {
    pub federal_funds_rate: Vec<Observation>,
    pub gdp: Vec<Observation>,
    pub cpi: Vec<Observation>,
    pub manufacturing: Vec<Observation>,
}

fn latest(series: &[Observation], name: &str) -> Result<f64, AnalysisError> {
    series
        .last()
        .map(|o| o.value)
        .ok_or_else(|| AnalysisError::MissingData(format!("{} series is empty", name)))
}

/// Percent change between the latest observation and the one `lag` places earlier.
fn pct_change(series: &[Observation], lag: usize, name: &str) -> Result<f64, AnalysisError> {
    if series.len() < lag + 1 {
        return Err(AnalysisError::MissingData(format!(
            "{} needs {} observations, got {}",
            name,
            lag + 1,
            series.len()
        )));
    }

    let current = series[series.len() - 1].value;
    let base = series[series.len() - 1 - lag].value;
    if base == 0.0 {
        return Err(AnalysisError::MissingData(format!("{} base observation is zero", name)));
    }

    Ok((current - base) / base * 100.0)
}

/// Quarter-over-quarter growth of the GDP level series, percent.
pub fn gdp_growth(gdp: &[Observation]) -> Result<f64, AnalysisError> {
    pct_change(gdp, 1, GDP_SERIES)
}

/// Year-over-year change of the monthly CPI index, percent.
pub fn cpi_yoy(cpi: &[Observation]) -> Result<f64, AnalysisError> {
    pct_change(cpi, CPI_YEAR_OFFSET, CPI_SERIES)
}

pub fn derive_raw_macro(series: &MacroSeries) -> Result<RawMacro, AnalysisError> {
    Ok(RawMacro {
        federal_funds_rate: latest(&series.federal_funds_rate, FED_FUNDS_SERIES)?,
        gdp_growth: gdp_growth(&series.gdp)?,
        cpi_yoy: cpi_yoy(&series.cpi)?,
        manufacturing_pmi: latest(&series.manufacturing, MANUFACTURING_SERIES)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};

    fn monthly(values: &[f64]) -> Vec<Observation> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| Observation {
                date: start + Months::new(i as u32),
                value,
            })
            .collect()
    }

    fn full_series() -> MacroSeries {
        // 13 CPI points: 300.0 a year ago, 309.0 now
        let mut cpi: Vec<f64> = (0..12).map(|i| 300.0 + i as f64 * 0.5).collect();
        cpi.push(309.0);

        MacroSeries {
            federal_funds_rate: monthly(&[5.25, 5.33]),
            gdp: monthly(&[27_000.0, 27_540.0]),
            cpi: monthly(&cpi),
            manufacturing: monthly(&[12_950.0, 12_980.0]),
        }
    }

    #[test]
    fn test_derive_full_record() {
        let raw = derive_raw_macro(&full_series()).unwrap();
        assert_eq!(raw.federal_funds_rate, 5.33);
        assert!((raw.gdp_growth - 2.0).abs() < 1e-9);
        assert!((raw.cpi_yoy - 3.0).abs() < 1e-9);
        assert_eq!(raw.manufacturing_pmi, 12_980.0);
    }

    #[test]
    fn test_cpi_uses_twelve_month_lag() {
        let mut values = vec![100.0; 20];
        values[7] = 80.0; // 12 before the last of 20
        *values.last_mut().unwrap() = 100.0;
        let yoy = cpi_yoy(&monthly(&values)).unwrap();
        assert!((yoy - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_cpi_is_missing() {
        let mut series = full_series();
        series.cpi.remove(0);
        let err = derive_raw_macro(&series).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingData(_)));
    }

    #[test]
    fn test_any_empty_series_fails_whole_record() {
        for i in 0..4 {
            let mut series = full_series();
            match i {
                0 => series.federal_funds_rate.clear(),
                1 => series.gdp.clear(),
                2 => series.cpi.clear(),
                _ => series.manufacturing.clear(),
            }
            assert!(derive_raw_macro(&series).is_err(), "series {} cleared", i);
        }
    }

    #[test]
    fn test_single_gdp_point_is_missing() {
        let gdp = monthly(&[27_000.0]);
        assert!(matches!(gdp_growth(&gdp), Err(AnalysisError::MissingData(_))));
    }

    #[test]
    fn test_zero_base_is_missing() {
        let gdp = monthly(&[0.0, 100.0]);
        assert!(gdp_growth(&gdp).is_err());
    }

    #[test]
    fn test_gdp_contraction_is_negative() {
        let growth = gdp_growth(&monthly(&[200.0, 198.0])).unwrap();
        assert!((growth + 1.0).abs() < 1e-9);
    }
}
