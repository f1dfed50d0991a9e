// Alert formatting and delivery

use crate::api::TelegramClient;
use crate::models::Signal;

/// Render the Telegram Markdown message for a signal
pub fn format_message(symbol: &str, signal: &Signal) -> String {
    match signal {
        Signal::Buy(trade) | Signal::Sell(trade) => {
            let (title, side) = match signal {
                Signal::Buy(_) => ("ORB Breakout Alert", "BUY"),
                _ => ("ORB Breakdown Alert", "SELL"),
            };
            format!(
                "📢 *{}* {}\n\n💹 *Side:* {}\n💰 *Price:* {:.2}\n📏 *Range:* {:.2} - {:.2}\n🕒 *Time:* {}",
                symbol,
                title,
                side,
                trade.price,
                trade.range.low,
                trade.range.high,
                trade.timestamp.format("%H:%M")
            )
        }
        Signal::None(status) => format!(
            "📊 *{}* Update: No breakout yet as of {}.",
            symbol,
            status.timestamp.format("%H:%M")
        ),
    }
}

/// Whether a notification reached the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed,
    /// No channel configured; the message was only logged
    Disabled,
}

/// Best-effort notifier: delivery failures are logged, never returned
pub struct Notifier {
    telegram: Option<TelegramClient>,
}

impl Notifier {
    pub fn new(telegram: Option<TelegramClient>) -> Self {
        if telegram.is_none() {
            tracing::warn!("TELEGRAM_TOKEN/TELEGRAM_CHAT_ID not set, alerts will only be logged");
        }
        Self { telegram }
    }

    pub async fn notify(&self, message: &str) -> Delivery {
        let Some(telegram) = &self.telegram else {
            tracing::info!("Alert (not sent):\n{}", message);
            return Delivery::Disabled;
        };

        match telegram.send_message(message).await {
            Ok(()) => {
                tracing::info!("📨 Alert delivered");
                Delivery::Sent
            }
            Err(e) => {
                tracing::error!("Telegram error: {}", e);
                Delivery::Failed
            }
        }
    }
}
