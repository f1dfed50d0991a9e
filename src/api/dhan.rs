use crate::config::BotConfig;
use crate::models::{Candle, CandleSeries};
use crate::Result;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const HISTORICAL_PATH: &str = "/market/v1/instruments/historical/daily";

/// Client for the Dhan market data API
#[derive(Clone)]
pub struct DhanClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
    client_id: Option<String>,
    offset: FixedOffset,
}

/// Parameters for one intraday candle request
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalQuery {
    pub symbol: String,
    pub exchange: String,
    pub security_id: String,
    pub interval: String,
    pub date: NaiveDate,
}

impl HistoricalQuery {
    pub fn from_config(cfg: &BotConfig, date: NaiveDate) -> Self {
        Self {
            symbol: cfg.symbol.clone(),
            exchange: cfg.exchange.clone(),
            security_id: cfg.security_id.clone(),
            interval: cfg.interval.clone(),
            date,
        }
    }
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandleRaw {
    start_time: RawTime,
    open: RawNumber,
    high: RawNumber,
    low: RawNumber,
    close: RawNumber,
    #[serde(default)]
    volume: Option<RawNumber>,
}

/// Prices arrive as numbers or numeric strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    fn value(&self) -> Option<f64> {
        let v = match self {
            RawNumber::Number(n) => *n,
            RawNumber::Text(s) => s.trim().parse().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTime {
    Epoch(i64),
    EpochFloat(f64),
    Text(String),
}

impl CandleRaw {
    fn into_candle(self, offset: FixedOffset) -> Option<Candle> {
        Some(Candle {
            timestamp: self.start_time.to_local(offset)?,
            open: self.open.value()?,
            high: self.high.value()?,
            low: self.low.value()?,
            close: self.close.value()?,
            volume: self.volume.and_then(|v| v.value()).unwrap_or(0.0),
        })
    }
}

impl RawTime {
    /// Convert to exchange-local time. Zoned timestamps are shifted into the
    /// exchange offset; naive ones are taken as already local.
    fn to_local(&self, offset: FixedOffset) -> Option<NaiveDateTime> {
        match self {
            RawTime::Epoch(secs) => epoch_to_local(*secs, offset),
            RawTime::EpochFloat(secs) => float_epoch_to_local(*secs, offset),
            RawTime::Text(s) => parse_time_text(s.trim(), offset),
        }
    }
}

fn epoch_to_local(value: i64, offset: FixedOffset) -> Option<NaiveDateTime> {
    // Anything past year 5138 in seconds is really milliseconds
    let utc = if value.abs() >= 100_000_000_000 {
        DateTime::from_timestamp_millis(value)?
    } else {
        DateTime::from_timestamp(value, 0)?
    };
    Some(utc.with_timezone(&offset).naive_local())
}

fn float_epoch_to_local(value: f64, offset: FixedOffset) -> Option<NaiveDateTime> {
    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return None;
    }
    epoch_to_local(value.trunc() as i64, offset)
}

fn parse_time_text(s: &str, offset: FixedOffset) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&offset).naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%z") {
        return Some(dt.with_timezone(&offset).naive_local());
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    if let Ok(v) = s.parse::<i64>() {
        return epoch_to_local(v, offset);
    }
    s.parse::<f64>()
        .ok()
        .and_then(|v| float_epoch_to_local(v, offset))
}

/// Parse a historical-data response body into candles.
///
/// A body that is not JSON or has no `data` array is an error. Rows that
/// fail to parse are skipped with a warning.
pub fn parse_historical(body: &str, offset: FixedOffset) -> anyhow::Result<Vec<Candle>> {
    let response: HistoricalResponse = serde_json::from_str(body)?;
    let rows = response
        .data
        .ok_or_else(|| anyhow::anyhow!("response has no data array"))?;

    let mut candles = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        let candle = serde_json::from_value::<CandleRaw>(row)
            .ok()
            .and_then(|raw| raw.into_candle(offset));

        match candle {
            Some(c) => candles.push(c),
            None => tracing::warn!("Skipping malformed candle row {}", i),
        }
    }

    Ok(candles)
}

// ============== Implementation ==============

impl DhanClient {
    pub fn new(cfg: &BotConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: cfg.market_data_url.trim_end_matches('/').to_string(),
            access_token: cfg.credentials.access_token.clone(),
            client_id: cfg.credentials.client_id.clone(),
            offset: cfg.exchange_offset()?,
        })
    }

    /// Fetch one day of intraday candles
    /// Endpoint: GET /market/v1/instruments/historical/daily
    ///
    /// Never fails: transport errors, bad status codes and malformed bodies are
    /// logged and reported as an empty series, which callers treat as "no
    /// signal yet".
    pub async fn fetch_intraday(&self, query: &HistoricalQuery) -> CandleSeries {
        match self.fetch_once(query).await {
            Ok(candles) => {
                tracing::info!(
                    "Fetched {} {} candles for {} on {}",
                    candles.len(),
                    query.interval,
                    query.symbol,
                    query.date
                );
                CandleSeries::new(candles)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch candles for {}: {}", query.symbol, e);
                CandleSeries::empty()
            }
        }
    }

    async fn fetch_once(&self, query: &HistoricalQuery) -> anyhow::Result<Vec<Candle>> {
        let url = format!("{}{}", self.base_url, HISTORICAL_PATH);
        let date = query.date.format("%Y-%m-%d").to_string();

        let mut request = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .query(&[
                ("symbol", query.symbol.as_str()),
                ("exchange", query.exchange.as_str()),
                ("securityId", query.security_id.as_str()),
                ("interval", query.interval.as_str()),
                ("from_date", date.as_str()),
                ("to_date", date.as_str()),
            ]);

        if let Some(token) = &self.access_token {
            request = request.header("access-token", token);
        } else {
            tracing::warn!("ACCESS_TOKEN not set, market data request is unauthenticated");
        }
        if let Some(client_id) = &self.client_id {
            request = request.header("client-id", client_id);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            anyhow::bail!("Dhan API error ({}): {}", status, body);
        }

        parse_historical(&body, self.offset)
    }
}
