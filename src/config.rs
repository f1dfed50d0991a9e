use crate::error::OrbError;
use crate::Result;
use chrono::{FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;

pub const DHAN_API_BASE: &str = "https://api.dhan.co";
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Runtime configuration for one ORB run.
///
/// Strategy settings come from an optional `orbbot.toml` (or the file named by
/// `ORB_CONFIG`) and `ORB__*` environment variables. Credentials always come
/// from the plain environment variables the broker and Telegram docs use.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    pub symbol: String,
    pub exchange: String,
    pub security_id: String,
    /// Candle interval as the market-data API spells it (e.g. "5minute")
    pub interval: String,
    /// Amount risked per trade; quantity = floor(risk_amount / range)
    pub risk_amount: f64,
    pub ema_period: usize,
    /// Opening range window, inclusive start
    #[serde(deserialize_with = "hhmm::deserialize")]
    pub range_start: NaiveTime,
    /// Opening range window, exclusive end
    #[serde(deserialize_with = "hhmm::deserialize")]
    pub range_end: NaiveTime,
    /// Exchange time zone as an offset from UTC (IST = +330)
    pub utc_offset_minutes: i32,
    pub market_data_url: String,
    pub telegram_url: String,
    pub http_timeout_secs: u64,
    #[serde(skip)]
    pub credentials: Credentials,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: "RELIANCE".to_string(),
            exchange: "NSE_EQ".to_string(),
            security_id: String::new(),
            interval: "5minute".to_string(),
            risk_amount: 100.0,
            ema_period: 20,
            range_start: NaiveTime::from_hms_opt(9, 15, 0).unwrap_or_default(),
            range_end: NaiveTime::from_hms_opt(9, 20, 0).unwrap_or_default(),
            utc_offset_minutes: 330,
            market_data_url: DHAN_API_BASE.to_string(),
            telegram_url: TELEGRAM_API_BASE.to_string(),
            http_timeout_secs: 30,
            credentials: Credentials::default(),
        }
    }
}

impl BotConfig {
    /// Load configuration from files and the environment, then validate it
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("orbbot").required(false))
            .add_source(config::Environment::with_prefix("ORB").separator("__"));

        if let Ok(path) = std::env::var("ORB_CONFIG") {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }

        let mut cfg: BotConfig = builder.build()?.try_deserialize()?;
        cfg.credentials = Credentials::from_env();
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(OrbError::Config("symbol must not be empty".to_string()));
        }
        if !self.risk_amount.is_finite() || self.risk_amount <= 0.0 {
            return Err(OrbError::Config(format!(
                "risk_amount must be positive, got {}",
                self.risk_amount
            )));
        }
        if self.ema_period == 0 {
            return Err(OrbError::Config("ema_period must be at least 1".to_string()));
        }
        if self.range_start >= self.range_end {
            return Err(OrbError::Config(format!(
                "range_start {} must be before range_end {}",
                self.range_start.format("%H:%M"),
                self.range_end.format("%H:%M")
            )));
        }
        self.exchange_offset()?;

        Ok(())
    }

    pub fn exchange_offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            OrbError::Config(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            ))
        })
    }

    /// Current trading date in the exchange time zone
    pub fn trading_date(&self) -> Result<NaiveDate> {
        let offset = self.exchange_offset()?;
        Ok(Utc::now().with_timezone(&offset).date_naive())
    }
}

/// API credentials, read straight from the environment
#[derive(Clone, Default)]
pub struct Credentials {
    pub client_id: Option<String>,
    pub access_token: Option<String>,
    pub api_key: Option<String>,
    pub telegram_token: Option<String>,
    pub telegram_chat_id: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            client_id: env_var("CLIENT_ID"),
            access_token: env_var("ACCESS_TOKEN"),
            api_key: env_var("API_KEY"),
            telegram_token: env_var("TELEGRAM_TOKEN"),
            telegram_chat_id: env_var("TELEGRAM_CHAT_ID"),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("client_id", &mask(&self.client_id))
            .field("access_token", &mask(&self.access_token))
            .field("api_key", &mask(&self.api_key))
            .field("telegram_token", &mask(&self.telegram_token))
            .field("telegram_chat_id", &mask(&self.telegram_chat_id))
            .finish()
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// "HH:MM" (or "HH:MM:SS") session times
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}
