use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OHLCV candlestick, timestamped in exchange-local time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One trading day of candles, ascending and unique by timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Build a series from candles in any order.
    /// Duplicate timestamps keep the last candle seen.
    pub fn new(mut candles: Vec<Candle>) -> Self {
        // Stable sort keeps arrival order among equal timestamps
        candles.sort_by_key(|c| c.timestamp);

        let mut unique: Vec<Candle> = Vec::with_capacity(candles.len());
        for candle in candles {
            match unique.last_mut() {
                Some(last) if last.timestamp == candle.timestamp => *last = candle,
                _ => unique.push(candle),
            }
        }

        Self { candles: unique }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Candle with its EMA attached (None during the warm-up window)
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorCandle {
    pub candle: Candle,
    pub ema: Option<f64>,
}

/// High/low of the first candle in the opening window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpeningRange {
    pub timestamp: NaiveDateTime,
    pub high: f64,
    pub low: f64,
}

impl OpeningRange {
    pub fn from_candle(candle: &Candle) -> Self {
        Self {
            timestamp: candle.timestamp,
            high: candle.high,
            low: candle.low,
        }
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "BUY",
            TradeSide::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Details of a breakout or breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct TradeSignal {
    pub price: f64,
    pub quantity: u64,
    pub timestamp: NaiveDateTime,
    pub range: OpeningRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoBreakoutReason {
    /// Close stayed inside the range, or broke out against the EMA
    InsideRange,
    /// Not enough candles for the EMA to be defined yet
    EmaUnavailable,
    /// Opening range has zero (or invalid) width, so no quantity can be sized
    ZeroRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NoBreakout {
    pub price: f64,
    pub timestamp: NaiveDateTime,
    pub range: OpeningRange,
    pub reason: NoBreakoutReason,
}

/// Outcome of evaluating the latest candle against the opening range
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Buy(TradeSignal),
    Sell(TradeSignal),
    None(NoBreakout),
}

impl Signal {
    pub fn side(&self) -> Option<TradeSide> {
        match self {
            Signal::Buy(_) => Some(TradeSide::Buy),
            Signal::Sell(_) => Some(TradeSide::Sell),
            Signal::None(_) => None,
        }
    }

    pub fn trade(&self) -> Option<&TradeSignal> {
        match self {
            Signal::Buy(t) | Signal::Sell(t) => Some(t),
            Signal::None(_) => None,
        }
    }
}

/// Order the bot would have sent. Nothing is executed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderIntent {
    pub id: Uuid,
    pub symbol: String,
    pub exchange: String,
    pub side: TradeSide,
    pub quantity: u64,
    pub price: f64,
    pub timestamp: NaiveDateTime,
}
