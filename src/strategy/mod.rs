// Trading strategy module
pub mod orb;

use crate::models::{CandleSeries, Signal};
use crate::Result;

/// Base trait for trading strategies evaluated once per run
pub trait Strategy {
    /// Evaluate the latest market state and produce a signal
    fn evaluate(&self, series: &CandleSeries) -> Result<Signal>;

    /// Get strategy name
    fn name(&self) -> &str;

    /// Minimum candles required before the strategy's indicators are defined
    fn min_candles_required(&self) -> usize;
}
