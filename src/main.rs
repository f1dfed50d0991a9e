use orbbot::{BotConfig, OrbBot, RunOutcome};
use tracing_subscriber::EnvFilter;

// Runs the ORB pipeline once. Meant to be triggered by an external scheduler
// (cron, systemd timer) every candle interval; always exits 0.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let config = match BotConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return Ok(());
        }
    };

    tracing::info!(
        "🚀 ORB bot run: {} on {} ({} candles, window {}-{}, risk {:.2})",
        config.symbol,
        config.exchange,
        config.interval,
        config.range_start.format("%H:%M"),
        config.range_end.format("%H:%M"),
        config.risk_amount
    );
    tracing::debug!("Credentials: {:?}", config.credentials);

    let bot = match OrbBot::new(config) {
        Ok(bot) => bot,
        Err(e) => {
            tracing::error!("Failed to initialize: {}", e);
            return Ok(());
        }
    };

    match bot.run().await {
        Ok(RunOutcome::Evaluated {
            signal,
            delivery,
            order,
        }) => {
            tracing::info!(
                "✅ Run complete: {} signal, alert {:?}, order {}",
                signal.side().map_or("NONE", |s| s.as_str()),
                delivery,
                order.map_or("none".to_string(), |o| o.id.to_string())
            );
        }
        Ok(RunOutcome::Skipped(reason)) => {
            tracing::info!("Run complete, no decision: {}", reason);
        }
        Err(e) => tracing::error!("Run failed: {}", e),
    }

    Ok(())
}

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("orbbot=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
