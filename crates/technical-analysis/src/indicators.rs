use analysis_core::{IndicatorPoint, PricePoint};

pub const DEFAULT_RSI_PERIOD: usize = 14;

/// Simple Moving Average
///
/// One value per complete window; the first `period - 1` positions are skipped.
/// A window holding a non-finite close yields NaN, and later windows recover
/// once that close has left them.
pub fn sma(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() < period {
        return vec![];
    }

    let mut result = Vec::with_capacity(data.len() - period + 1);
    let mut sum = 0.0;
    let mut gaps = 0usize;
    for (i, &value) in data.iter().enumerate() {
        if value.is_finite() {
            sum += value;
        } else {
            gaps += 1;
        }

        if i + 1 < period {
            continue;
        }
        result.push(if gaps > 0 { f64::NAN } else { sum / period as f64 });

        let out = data[i + 1 - period];
        if out.is_finite() {
            sum -= out;
        } else {
            gaps -= 1;
        }
    }
    result
}

/// Rolling mean of the close, dated at the last observation of each window.
pub fn moving_average(series: &[PricePoint], period: usize) -> Vec<IndicatorPoint> {
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
    let values = sma(&closes, period);

    // sma drops exactly period - 1 leading positions
    dated(series, values)
}

/// Date each value by the close that ends its window; NaN windows are left out.
fn dated(series: &[PricePoint], values: Vec<f64>) -> Vec<IndicatorPoint> {
    series
        .iter()
        .skip(series.len() - values.len())
        .zip(values)
        .filter(|(_, value)| value.is_finite())
        .map(|(p, value)| IndicatorPoint { date: p.date, value })
        .collect()
}

/// Relative Strength Index using simple rolling means of gains and losses.
///
/// Returns one value per close from index `period` onwards. A window with no
/// losses yields exactly 100; a window touching a non-finite close yields NaN.
pub fn rsi_values(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.len() <= period {
        return vec![];
    }

    let mut gains = Vec::with_capacity(data.len() - 1);
    let mut losses = Vec::with_capacity(data.len() - 1);
    let mut broken = Vec::with_capacity(data.len() - 1);

    for pair in data.windows(2) {
        let change = pair[1] - pair[0];
        if change.is_finite() {
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
            broken.push(false);
        } else {
            gains.push(0.0);
            losses.push(0.0);
            broken.push(true);
        }
    }

    let mut rsi_values = Vec::with_capacity(data.len() - period);

    // Running sums drift; the non-zero counters keep an all-zero window exactly zero.
    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut gain_count = 0usize;
    let mut loss_count = 0usize;
    let mut broken_count = 0usize;

    for i in 0..gains.len() {
        gain_sum += gains[i];
        loss_sum += losses[i];
        gain_count += (gains[i] > 0.0) as usize;
        loss_count += (losses[i] > 0.0) as usize;
        broken_count += broken[i] as usize;

        if i + 1 < period {
            continue;
        }

        let avg_gain = if gain_count == 0 { 0.0 } else { gain_sum / period as f64 };
        let avg_loss = if loss_count == 0 { 0.0 } else { loss_sum / period as f64 };

        let rsi = if broken_count > 0 {
            f64::NAN
        } else if avg_loss == 0.0 {
            100.0
        } else {
            let rs = avg_gain / avg_loss;
            100.0 - (100.0 / (1.0 + rs))
        };
        rsi_values.push(rsi);

        let out = i + 1 - period;
        gain_sum -= gains[out];
        loss_sum -= losses[out];
        gain_count -= (gains[out] > 0.0) as usize;
        loss_count -= (losses[out] > 0.0) as usize;
        broken_count -= broken[out] as usize;
    }

    rsi_values
}

/// RSI over a dated close series, dated at the last close of each window.
pub fn rsi(series: &[PricePoint], period: usize) -> Vec<IndicatorPoint> {
    let closes: Vec<f64> = series.iter().map(|p| p.close).collect();
    let values = rsi_values(&closes, period);

    dated(series, values)
}
