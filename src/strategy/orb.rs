use super::Strategy;
use crate::config::BotConfig;
use crate::error::OrbError;
use crate::indicators::with_ema;
use crate::models::{
    CandleSeries, IndicatorCandle, NoBreakout, NoBreakoutReason, OpeningRange, Signal,
    TradeSignal,
};
use crate::Result;
use chrono::{NaiveDateTime, NaiveTime};

/// Settings for the opening range breakout strategy
#[derive(Debug, Clone)]
pub struct OrbConfig {
    /// Opening window start (inclusive)
    pub range_start: NaiveTime,
    /// Opening window end (exclusive)
    pub range_end: NaiveTime,
    pub ema_period: usize,
    pub risk_amount: f64,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self::from(&BotConfig::default())
    }
}

impl From<&BotConfig> for OrbConfig {
    fn from(cfg: &BotConfig) -> Self {
        Self {
            range_start: cfg.range_start,
            range_end: cfg.range_end,
            ema_period: cfg.ema_period,
            risk_amount: cfg.risk_amount,
        }
    }
}

/// Opening Range Breakout strategy
///
/// The first candle inside the opening window defines the range. The most
/// recent candle after it is a breakout (BUY) when it closes above the range
/// high and its EMA, a breakdown (SELL) when it closes below the range low and
/// its EMA, and nothing otherwise.
#[derive(Debug, Clone, Default)]
pub struct OrbStrategy {
    config: OrbConfig,
}

impl OrbStrategy {
    pub fn new(config: OrbConfig) -> Self {
        Self { config }
    }

    /// Find the opening range candle: first candle in [range_start, range_end)
    pub fn opening_range(&self, series: &CandleSeries) -> Result<OpeningRange> {
        series
            .candles()
            .iter()
            .find(|c| {
                let time = c.timestamp.time();
                time >= self.config.range_start && time < self.config.range_end
            })
            .map(OpeningRange::from_candle)
            .ok_or_else(|| OrbError::MissingOpeningRange {
                start: self.config.range_start.format("%H:%M").to_string(),
                end: self.config.range_end.format("%H:%M").to_string(),
            })
    }

    /// Most recent candle strictly after the opening range candle
    fn latest_after<'a>(
        candles: &'a [IndicatorCandle],
        range: &OpeningRange,
    ) -> Option<&'a IndicatorCandle> {
        candles
            .iter()
            .rev()
            .find(|c| c.candle.timestamp > range.timestamp)
    }
}

impl Strategy for OrbStrategy {
    fn evaluate(&self, series: &CandleSeries) -> Result<Signal> {
        let range = self.opening_range(series)?;
        tracing::debug!(
            "Opening range at {}: {:.2} - {:.2} (width {:.2})",
            range.timestamp.format("%H:%M"),
            range.low,
            range.high,
            range.range()
        );

        let enriched = with_ema(series, self.config.ema_period);
        let latest =
            Self::latest_after(&enriched, &range).ok_or(OrbError::NoPostRangeData)?;

        tracing::debug!(
            "Latest candle {}: close {:.2}, EMA{} {:?}",
            latest.candle.timestamp.format("%H:%M"),
            latest.candle.close,
            self.config.ema_period,
            latest.ema
        );

        Ok(classify(
            latest.candle.close,
            latest.ema,
            latest.candle.timestamp,
            &range,
            self.config.risk_amount,
        ))
    }

    fn name(&self) -> &str {
        "OrbStrategy"
    }

    fn min_candles_required(&self) -> usize {
        self.config.ema_period
    }
}

/// Decide BUY / SELL / NONE for a close price against the opening range.
///
/// Breakout is checked before breakdown; the first rule that matches wins.
pub fn classify(
    close: f64,
    ema: Option<f64>,
    timestamp: NaiveDateTime,
    range: &OpeningRange,
    risk_amount: f64,
) -> Signal {
    let none = |reason| {
        Signal::None(NoBreakout {
            price: close,
            timestamp,
            range: *range,
            reason,
        })
    };

    let Some(ema) = ema else {
        return none(NoBreakoutReason::EmaUnavailable);
    };

    let breakout = close > range.high && close > ema;
    let breakdown = close < range.low && close < ema;
    if !breakout && !breakdown {
        return none(NoBreakoutReason::InsideRange);
    }

    let Some(quantity) = position_size(risk_amount, range.range()) else {
        tracing::warn!(
            "Opening range width is {:.2}, cannot size position",
            range.range()
        );
        return none(NoBreakoutReason::ZeroRange);
    };

    if quantity == 0 {
        tracing::warn!(
            "Range {:.2} exceeds risk amount {:.2}, quantity rounds to 0",
            range.range(),
            risk_amount
        );
    }

    let trade = TradeSignal {
        price: close,
        quantity,
        timestamp,
        range: *range,
    };

    if breakout {
        Signal::Buy(trade)
    } else {
        Signal::Sell(trade)
    }
}

/// floor(risk_amount / range), or None when the range cannot size a trade
pub fn position_size(risk_amount: f64, range: f64) -> Option<u64> {
    if !range.is_finite() || range <= 0.0 {
        return None;
    }

    let quantity = (risk_amount / range).floor();
    if quantity.is_finite() && quantity >= 0.0 {
        Some(quantity as u64)
    } else {
        None
    }
}
