// Technical indicators module

pub mod moving_average;

pub use moving_average::calculate_ema_series;

use crate::models::{CandleSeries, IndicatorCandle};

/// Attach the EMA of closing prices to every candle in the series
pub fn with_ema(series: &CandleSeries, period: usize) -> Vec<IndicatorCandle> {
    let ema = calculate_ema_series(&series.closes(), period);

    series
        .candles()
        .iter()
        .cloned()
        .zip(ema)
        .map(|(candle, ema)| IndicatorCandle { candle, ema })
        .collect()
}
