/// Calculate Exponential Moving Average (EMA) for every price in the series
///
/// Recursive smoothing with factor `2 / (period + 1)`, seeded with the first
/// price. The first `period - 1` values are still warming up and come back as
/// `None`, so the output always has one entry per input price.
pub fn calculate_ema_series(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; prices.len()];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = None;

    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| {
            let next = match ema {
                None => price,
                Some(prev) => (price - prev) * multiplier + prev,
            };
            ema = Some(next);

            if i + 1 >= period {
                Some(next)
            } else {
                None
            }
        })
        .collect()
}
