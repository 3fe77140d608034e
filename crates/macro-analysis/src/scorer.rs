use analysis_core::{Bound, MacroMetrics, RawMacro, Sentiment, ThresholdTable};

/// Macro scoring starts from neutral, unlike stock scoring which starts at zero.
pub const MACRO_BASELINE: i32 = 50;

pub const GDP_GROWTH_POINTS: ThresholdTable = ThresholdTable::new(
    "gdp_growth",
    &[(Bound::Above(2.0), 10), (Bound::Below(0.0), -15)],
    0,
);

pub const CPI_YOY_POINTS: ThresholdTable = ThresholdTable::new(
    "cpi_yoy",
    &[(Bound::Below(2.0), 10), (Bound::Above(5.0), -15)],
    0,
);

/// Contraction (50 or below) always costs points.
pub const PMI_POINTS: ThresholdTable = ThresholdTable::new(
    "manufacturing_pmi",
    &[(Bound::Above(50.0), 10)],
    -10,
);

/// Market sentiment score, 0 to 100.
pub fn market_score(metrics: &RawMacro) -> i32 {
    let score = MACRO_BASELINE
        + GDP_GROWTH_POINTS.points(metrics.gdp_growth)
        + CPI_YOY_POINTS.points(metrics.cpi_yoy)
        + PMI_POINTS.points(metrics.manufacturing_pmi);

    score.clamp(0, 100)
}

pub fn score_macro(metrics: &RawMacro) -> MacroMetrics {
    let score = market_score(metrics);

    MacroMetrics {
        federal_funds_rate: metrics.federal_funds_rate,
        gdp_growth: metrics.gdp_growth,
        cpi_yoy: metrics.cpi_yoy,
        manufacturing_pmi: metrics.manufacturing_pmi,
        score,
        sentiment: Sentiment::from_score(score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(gdp_growth: f64, cpi_yoy: f64, manufacturing_pmi: f64) -> RawMacro {
        RawMacro { federal_funds_rate: 5.33, gdp_growth, cpi_yoy, manufacturing_pmi }
    }

    #[test]
    fn test_all_favourable() {
        let m = score_macro(&raw(3.0, 1.0, 55.0));
        assert_eq!(m.score, 80);
        assert_eq!(m.sentiment, Sentiment::VeryBullish);
    }

    #[test]
    fn test_all_unfavourable() {
        let m = score_macro(&raw(-1.0, 6.0, 45.0));
        assert_eq!(m.score, 10);
        assert_eq!(m.sentiment, Sentiment::VeryBearish);
    }

    #[test]
    fn test_neutral_band_values_only_pmi_counts() {
        // GDP in [0, 2] and CPI in [2, 5] leave the baseline untouched
        assert_eq!(market_score(&raw(2.0, 2.0, 50.0)), 40);
        assert_eq!(market_score(&raw(0.0, 5.0, 50.1)), 60);
    }

    #[test]
    fn test_pmi_at_50_is_contraction() {
        assert_eq!(PMI_POINTS.points(50.0), -10);
        assert_eq!(PMI_POINTS.points(50.01), 10);
    }

    #[test]
    fn test_edges_are_strict() {
        assert_eq!(GDP_GROWTH_POINTS.points(2.0), 0);
        assert_eq!(GDP_GROWTH_POINTS.points(2.01), 10);
        assert_eq!(GDP_GROWTH_POINTS.points(0.0), 0);
        assert_eq!(GDP_GROWTH_POINTS.points(-0.01), -15);
        assert_eq!(CPI_YOY_POINTS.points(2.0), 0);
        assert_eq!(CPI_YOY_POINTS.points(1.99), 10);
        assert_eq!(CPI_YOY_POINTS.points(5.0), 0);
        assert_eq!(CPI_YOY_POINTS.points(5.01), -15);
    }

    #[test]
    fn test_metrics_carry_raw_fields() {
        let input = raw(1.2, 3.4, 48.0);
        let m = score_macro(&input);
        assert_eq!(m.federal_funds_rate, 5.33);
        assert_eq!(m.gdp_growth, 1.2);
        assert_eq!(m.cpi_yoy, 3.4);
        assert_eq!(m.manufacturing_pmi, 48.0);
        assert_eq!(m.score, 40);
        assert_eq!(m.sentiment, Sentiment::Neutral);
    }

    #[test]
    fn test_score_stays_in_range() {
        for &gdp in &[-10.0, 0.0, 1.0, 3.0] {
            for &cpi in &[-1.0, 3.0, 9.0] {
                for &pmi in &[0.0, 50.0, 12_000.0] {
                    let s = market_score(&raw(gdp, cpi, pmi));
                    assert!((0..=100).contains(&s));
                }
            }
        }
    }
}
