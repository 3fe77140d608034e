//! Fundamentals scoring.
//!
//! Five profitability/liquidity buckets plus a P/E valuation band, summed from a
//! zero baseline and clamped to 0-100:
//!
//! | Bucket            | Max |
//! |-------------------|-----|
//! | ROE               | 15  |
//! | Operating margin  | 15  |
//! | EPS / price       | 10  |
//! | Quick ratio       | 15  |
//! | Free cash flow    | 15  |
//! | P/E valuation     | 30  |

use analysis_core::{Band, BandTable, Bound, RawFundamentals, Recommendation, StockMetrics, ThresholdTable};

pub const ROE_POINTS: ThresholdTable = ThresholdTable::new(
    "roe_pct",
    &[
        (Bound::Above(20.0), 15),
        (Bound::Above(15.0), 12),
        (Bound::Above(10.0), 8),
        (Bound::Above(5.0), 4),
    ],
    0,
);

pub const OPERATING_MARGIN_POINTS: ThresholdTable = ThresholdTable::new(
    "operating_margin_pct",
    &[
        (Bound::Above(25.0), 15),
        (Bound::Above(20.0), 12),
        (Bound::Above(15.0), 8),
        (Bound::Above(10.0), 4),
    ],
    0,
);

pub const EPS_PRICE_POINTS: ThresholdTable = ThresholdTable::new(
    "eps_price_pct",
    &[
        (Bound::Above(5.0), 10),
        (Bound::Above(3.0), 8),
        (Bound::Above(2.0), 5),
        (Bound::Above(1.0), 2),
    ],
    0,
);

pub const QUICK_RATIO_POINTS: ThresholdTable = ThresholdTable::new(
    "quick_ratio",
    &[
        (Bound::Above(2.0), 15),
        (Bound::Above(1.5), 12),
        (Bound::Above(1.0), 8),
        (Bound::Above(0.5), 4),
    ],
    0,
);

/// Thresholds are in millions.
pub const FREE_CASH_FLOW_POINTS: ThresholdTable = ThresholdTable::new(
    "free_cash_flow_m",
    &[
        (Bound::Above(10_000.0), 15),
        (Bound::Above(5_000.0), 12),
        (Bound::Above(1_000.0), 8),
        (Bound::Above(0.0), 4),
    ],
    0,
);

/// Zero and negative P/E (loss-making firms) score nothing, as does P/E >= 50.
pub const PE_POINTS: BandTable = BandTable::new(
    "pe_ratio",
    &[
        Band { lower: 0.0, upper: 15.0, lower_inclusive: false, points: 30 },
        Band { lower: 15.0, upper: 20.0, lower_inclusive: true, points: 25 },
        Band { lower: 20.0, upper: 25.0, lower_inclusive: true, points: 20 },
        Band { lower: 25.0, upper: 30.0, lower_inclusive: true, points: 15 },
        Band { lower: 30.0, upper: 40.0, lower_inclusive: true, points: 10 },
        Band { lower: 40.0, upper: 50.0, lower_inclusive: true, points: 5 },
    ],
);

/// Percent-scaled ratios, computed before any scoring
#[derive(Debug, Clone, Copy, PartialEq)]
struct DerivedRatios {
    roe_pct: f64,
    operating_margin_pct: f64,
    eps_price_pct: f64,
    quick_ratio: f64,
    free_cash_flow_m: f64,
    pe_ratio: f64,
}

impl DerivedRatios {
    fn from_raw(info: &RawFundamentals) -> Self {
        // A zero price would divide by zero; callers already default a missing price to 1.
        let price = if info.current_price == 0.0 { 1.0 } else { info.current_price };

        Self {
            roe_pct: info.return_on_equity * 100.0,
            operating_margin_pct: info.operating_margin * 100.0,
            eps_price_pct: (info.trailing_eps / price) * 100.0,
            quick_ratio: info.quick_ratio,
            free_cash_flow_m: info.free_cashflow / 1_000_000.0,
            pe_ratio: info.trailing_pe,
        }
    }

    fn score(&self) -> i32 {
        let total = ROE_POINTS.points(self.roe_pct)
            + OPERATING_MARGIN_POINTS.points(self.operating_margin_pct)
            + EPS_PRICE_POINTS.points(self.eps_price_pct)
            + QUICK_RATIO_POINTS.points(self.quick_ratio)
            + FREE_CASH_FLOW_POINTS.points(self.free_cash_flow_m)
            + PE_POINTS.points(self.pe_ratio);

        total.clamp(0, 100)
    }
}

/// Score a fundamentals snapshot and attach its recommendation.
pub fn score_stock(info: &RawFundamentals) -> StockMetrics {
    let ratios = DerivedRatios::from_raw(info);
    let score = ratios.score();

    StockMetrics {
        score,
        roe_pct: ratios.roe_pct,
        operating_margin_pct: ratios.operating_margin_pct,
        eps_price_pct: ratios.eps_price_pct,
        quick_ratio: ratios.quick_ratio,
        free_cash_flow_m: ratios.free_cash_flow_m,
        pe_ratio: ratios.pe_ratio,
        recommendation: Recommendation::from_score(score),
    }
}
