use crate::config::BotConfig;
use crate::error::OrbError;
use crate::Result;
use reqwest::Client;
use std::time::Duration;

/// Client for the Telegram Bot API (sendMessage only)
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(base_url: &str, token: String, chat_id: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            chat_id,
        })
    }

    /// Build a client from config, or None when the bot token or chat id is missing
    pub fn from_config(cfg: &BotConfig) -> Result<Option<Self>> {
        let (Some(token), Some(chat_id)) = (
            cfg.credentials.telegram_token.clone(),
            cfg.credentials.telegram_chat_id.clone(),
        ) else {
            return Ok(None);
        };

        Self::new(
            &cfg.telegram_url,
            token,
            chat_id,
            Duration::from_secs(cfg.http_timeout_secs),
        )
        .map(Some)
    }

    /// Send a Markdown message to the configured chat
    /// Endpoint: POST /bot{token}/sendMessage
    ///
    /// Only HTTP 200 counts as delivered. The bot token is part of the URL, so
    /// it is stripped from transport errors before they can reach the logs.
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("chat_id", self.chat_id.as_str()),
                ("text", text),
                ("parse_mode", "Markdown"),
            ])
            .send()
            .await
            .map_err(|e| OrbError::Http(e.without_url()))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => e.without_url().to_string(),
            };
            return Err(OrbError::NotificationDelivery {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
