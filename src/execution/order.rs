use crate::config::BotConfig;
use crate::models::{OrderIntent, TradeSide, TradeSignal};
use uuid::Uuid;

/// Records the order the strategy would place.
///
/// No broker order API is called; the intent is logged and returned so the
/// caller can report it.
#[derive(Debug, Clone)]
pub struct OrderPlacer {
    symbol: String,
    exchange: String,
}

impl OrderPlacer {
    pub fn new(symbol: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            exchange: exchange.into(),
        }
    }

    pub fn from_config(cfg: &BotConfig) -> Self {
        Self::new(cfg.symbol.clone(), cfg.exchange.clone())
    }

    pub fn place(&self, side: TradeSide, trade: &TradeSignal) -> OrderIntent {
        let intent = OrderIntent {
            id: Uuid::new_v4(),
            symbol: self.symbol.clone(),
            exchange: self.exchange.clone(),
            side,
            quantity: trade.quantity,
            price: trade.price,
            timestamp: trade.timestamp,
        };

        tracing::info!(
            "Order to {} {} units sent. ({} {} @ {:.2}, id {})",
            side,
            intent.quantity,
            intent.exchange,
            intent.symbol,
            intent.price,
            intent.id
        );

        intent
    }
}
