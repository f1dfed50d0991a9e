use thiserror::Error;

/// Conditions a single ORB run can hit.
///
/// None of these are fatal to the process: the pipeline logs them and exits
/// cleanly so the next scheduled invocation can try again.
#[derive(Debug, Error)]
pub enum OrbError {
    #[error("no candle data returned for {symbol}")]
    EmptyData { symbol: String },

    #[error("opening range candle not found between {start} and {end}")]
    MissingOpeningRange { start: String, end: String },

    #[error("no candles after the opening range yet")]
    NoPostRangeData,

    #[error("notification delivery failed ({status}): {body}")]
    NotificationDelivery { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<config::ConfigError> for OrbError {
    fn from(err: config::ConfigError) -> Self {
        OrbError::Config(err.to_string())
    }
}
