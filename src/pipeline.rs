// One run of the bot: fetch -> indicators -> signal -> notify/order

use crate::api::{DhanClient, HistoricalQuery, TelegramClient};
use crate::config::BotConfig;
use crate::error::OrbError;
use crate::execution::OrderPlacer;
use crate::models::{CandleSeries, OrderIntent, Signal};
use crate::notify::{format_message, Delivery, Notifier};
use crate::strategy::orb::{OrbConfig, OrbStrategy};
use crate::strategy::Strategy;
use crate::Result;
use chrono::NaiveDate;

/// What a single run ended with
#[derive(Debug)]
pub enum RunOutcome {
    /// Nothing to decide on yet; the next scheduled run will retry
    Skipped(OrbError),
    Evaluated {
        signal: Signal,
        delivery: Delivery,
        order: Option<OrderIntent>,
    },
}

pub struct OrbBot {
    config: BotConfig,
    market_data: DhanClient,
    strategy: OrbStrategy,
    notifier: Notifier,
    orders: OrderPlacer,
}

impl OrbBot {
    pub fn new(config: BotConfig) -> Result<Self> {
        let market_data = DhanClient::new(&config)?;
        let notifier = Notifier::new(TelegramClient::from_config(&config)?);

        Ok(Self {
            strategy: OrbStrategy::new(OrbConfig::from(&config)),
            orders: OrderPlacer::from_config(&config),
            market_data,
            notifier,
            config,
        })
    }

    /// Run the pipeline for today's session in the exchange time zone
    pub async fn run(&self) -> Result<RunOutcome> {
        let date = self.config.trading_date()?;
        Ok(self.run_for_date(date).await)
    }

    /// Run the pipeline for one trading date. Never fails: every condition is
    /// logged and reported in the outcome.
    pub async fn run_for_date(&self, date: NaiveDate) -> RunOutcome {
        let query = HistoricalQuery::from_config(&self.config, date);
        let series = self.market_data.fetch_intraday(&query).await;

        match self.decide(&series) {
            Ok(signal) => self.act(signal).await,
            Err(e) => {
                tracing::info!("⏸  {} ({}): {}", self.config.symbol, date, e);
                RunOutcome::Skipped(e)
            }
        }
    }

    fn decide(&self, series: &CandleSeries) -> Result<Signal> {
        if series.is_empty() {
            return Err(OrbError::EmptyData {
                symbol: self.config.symbol.clone(),
            });
        }

        if series.len() < self.strategy.min_candles_required() {
            tracing::debug!(
                "{} has {} candles, {} needs {} for its EMA",
                self.config.symbol,
                series.len(),
                self.strategy.name(),
                self.strategy.min_candles_required()
            );
        }

        self.strategy.evaluate(series)
    }

    async fn act(&self, signal: Signal) -> RunOutcome {
        match &signal {
            Signal::Buy(trade) | Signal::Sell(trade) => tracing::info!(
                "🚨 {} signal for {}: close {:.2}, qty {}",
                signal.side().map(|s| s.as_str()).unwrap_or_default(),
                self.config.symbol,
                trade.price,
                trade.quantity
            ),
            Signal::None(status) => tracing::info!(
                "No breakout yet. ({:?}, close {:.2} at {})",
                status.reason,
                status.price,
                status.timestamp.format("%H:%M")
            ),
        }

        let delivery = self
            .notifier
            .notify(&format_message(&self.config.symbol, &signal))
            .await;

        let order = signal
            .side()
            .zip(signal.trade())
            .map(|(side, trade)| self.orders.place(side, trade));

        RunOutcome::Evaluated {
            signal,
            delivery,
            order,
        }
    }
}
