use chrono::{Duration, NaiveDate, NaiveDateTime};
use mockito::{Matcher, Mock, ServerGuard};
use orbbot::notify::Delivery;
use orbbot::*;

const HISTORICAL_PATH: &str = "/market/v1/instruments/historical/daily";
const SEND_PATH: &str = "/botTEST_TOKEN/sendMessage";

fn trading_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    trading_day().and_hms_opt(h, m, 0).unwrap()
}

/// JSON row in the market-data payload format
fn row(ts: NaiveDateTime, high: f64, low: f64, close: f64) -> serde_json::Value {
    serde_json::json!({
        "startTime": ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "open": close,
        "high": high,
        "low": low,
        "close": close,
        "volume": 5000,
    })
}

/// Opening candle at 09:15 with the given range, then one candle per close
fn session_body(or_high: f64, or_low: f64, closes: &[f64]) -> String {
    let mut rows = vec![row(at(9, 15), or_high, or_low, (or_high + or_low) / 2.0)];
    for (i, &close) in closes.iter().enumerate() {
        let ts = at(9, 20) + Duration::minutes(5 * i as i64);
        rows.push(row(ts, close + 0.5, close - 0.5, close));
    }
    serde_json::json!({ "data": rows }).to_string()
}

fn bot_config(market: &ServerGuard, telegram: &ServerGuard) -> BotConfig {
    let mut cfg = BotConfig {
        market_data_url: market.url(),
        telegram_url: telegram.url(),
        http_timeout_secs: 5,
        ..BotConfig::default()
    };
    cfg.credentials.access_token = Some("TEST_ACCESS".to_string());
    cfg.credentials.client_id = Some("1000".to_string());
    cfg.credentials.telegram_token = Some("TEST_TOKEN".to_string());
    cfg.credentials.telegram_chat_id = Some("42".to_string());
    cfg
}

async fn market_mock(server: &mut ServerGuard, body: String) -> Mock {
    server
        .mock("GET", HISTORICAL_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn telegram_mock(server: &mut ServerGuard, status: usize, hits: usize) -> Mock {
    server
        .mock("POST", SEND_PATH)
        .match_body(Matcher::UrlEncoded("chat_id".into(), "42".into()))
        .with_status(status)
        .with_body(r#"{"ok": true}"#)
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_breakout_alerts_and_places_buy() {
    let _ = tracing_subscriber::fmt::try_init();

    let mut market = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    let mut closes = vec![100.0; 20];
    closes.push(120.0);
    let _data = market_mock(&mut market, session_body(105.0, 95.0, &closes)).await;
    let alert = telegram
        .mock("POST", SEND_PATH)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("chat_id".into(), "42".into()),
            Matcher::UrlEncoded("parse_mode".into(), "Markdown".into()),
            Matcher::UrlEncoded(
                "text".into(),
                "📢 *RELIANCE* ORB Breakout Alert\n\n💹 *Side:* BUY\n💰 *Price:* 120.00\n📏 *Range:* 95.00 - 105.00\n🕒 *Time:* 11:00"
                    .into(),
            ),
        ]))
        .with_status(200)
        .create_async()
        .await;

    let bot = OrbBot::new(bot_config(&market, &telegram)).unwrap();
    let outcome = bot.run_for_date(trading_day()).await;

    alert.assert_async().await;
    match outcome {
        RunOutcome::Evaluated {
            signal: Signal::Buy(trade),
            delivery,
            order: Some(order),
        } => {
            assert_eq!(trade.price, 120.0);
            assert_eq!(trade.quantity, 10);
            assert_eq!(delivery, Delivery::Sent);
            assert_eq!(order.side, TradeSide::Buy);
            assert_eq!(order.quantity, 10);
            assert_eq!(order.symbol, "RELIANCE");
        }
        other => panic!("expected BUY with order, got {:?}", other),
    }
}

#[tokio::test]
async fn test_breakdown_places_sell() {
    let mut market = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    let mut closes = vec![100.0; 20];
    closes.push(80.0);
    let _data = market_mock(&mut market, session_body(105.0, 95.0, &closes)).await;
    let alert = telegram_mock(&mut telegram, 200, 1).await;

    let bot = OrbBot::new(bot_config(&market, &telegram)).unwrap();
    let outcome = bot.run_for_date(trading_day()).await;

    alert.assert_async().await;
    match outcome {
        RunOutcome::Evaluated {
            signal: Signal::Sell(_),
            order: Some(order),
            ..
        } => assert_eq!(order.side, TradeSide::Sell),
        other => panic!("expected SELL with order, got {:?}", other),
    }
}

#[tokio::test]
async fn test_inside_range_sends_status_without_order() {
    let mut market = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    let closes = vec![100.0; 21];
    let _data = market_mock(&mut market, session_body(105.0, 95.0, &closes)).await;
    let status = telegram
        .mock("POST", SEND_PATH)
        .match_body(Matcher::UrlEncoded(
            "text".into(),
            "📊 *RELIANCE* Update: No breakout yet as of 11:00.".into(),
        ))
        .with_status(200)
        .create_async()
        .await;

    let bot = OrbBot::new(bot_config(&market, &telegram)).unwrap();
    let outcome = bot.run_for_date(trading_day()).await;

    status.assert_async().await;
    assert!(matches!(
        outcome,
        RunOutcome::Evaluated {
            signal: Signal::None(_),
            delivery: Delivery::Sent,
            order: None,
        }
    ));
}

#[tokio::test]
async fn test_zero_range_resolves_to_none() {
    let mut market = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    let mut closes = vec![100.0; 20];
    closes.push(120.0);
    let _data = market_mock(&mut market, session_body(100.0, 100.0, &closes)).await;
    let _alert = telegram_mock(&mut telegram, 200, 1).await;

    let bot = OrbBot::new(bot_config(&market, &telegram)).unwrap();
    match bot.run_for_date(trading_day()).await {
        RunOutcome::Evaluated {
            signal: Signal::None(status),
            order: None,
            ..
        } => assert_eq!(status.reason, NoBreakoutReason::ZeroRange),
        other => panic!("expected NONE, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_opening_range_skips_quietly() {
    let mut market = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    // Session data starting after the opening window
    let body = serde_json::json!({
        "data": [
            row(at(9, 30), 101.0, 99.0, 100.0),
            row(at(9, 35), 101.0, 99.0, 100.0),
        ]
    })
    .to_string();
    let _data = market_mock(&mut market, body).await;
    let alert = telegram_mock(&mut telegram, 200, 0).await;

    let bot = OrbBot::new(bot_config(&market, &telegram)).unwrap();
    let outcome = bot.run_for_date(trading_day()).await;

    alert.assert_async().await;
    assert!(matches!(
        outcome,
        RunOutcome::Skipped(OrbError::MissingOpeningRange { .. })
    ));
}

#[tokio::test]
async fn test_waiting_for_post_range_candles() {
    let mut market = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    let _data = market_mock(&mut market, session_body(105.0, 95.0, &[])).await;
    let alert = telegram_mock(&mut telegram, 200, 0).await;

    let bot = OrbBot::new(bot_config(&market, &telegram)).unwrap();
    let outcome = bot.run_for_date(trading_day()).await;

    alert.assert_async().await;
    assert!(matches!(
        outcome,
        RunOutcome::Skipped(OrbError::NoPostRangeData)
    ));
}

#[tokio::test]
async fn test_empty_or_failed_market_data_skips() {
    let mut market = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    let _data = market
        .mock("GET", HISTORICAL_PATH)
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;
    let alert = telegram_mock(&mut telegram, 200, 0).await;

    let bot = OrbBot::new(bot_config(&market, &telegram)).unwrap();
    let outcome = bot.run_for_date(trading_day()).await;

    alert.assert_async().await;
    assert!(matches!(
        outcome,
        RunOutcome::Skipped(OrbError::EmptyData { .. })
    ));
}

#[tokio::test]
async fn test_failed_alert_still_places_order() {
    let mut market = mockito::Server::new_async().await;
    let mut telegram = mockito::Server::new_async().await;

    let mut closes = vec![100.0; 20];
    closes.push(120.0);
    let _data = market_mock(&mut market, session_body(105.0, 95.0, &closes)).await;
    let _alert = telegram_mock(&mut telegram, 502, 1).await;

    let bot = OrbBot::new(bot_config(&market, &telegram)).unwrap();
    match bot.run_for_date(trading_day()).await {
        RunOutcome::Evaluated {
            signal: Signal::Buy(_),
            delivery,
            order,
        } => {
            assert_eq!(delivery, Delivery::Failed);
            assert!(order.is_some());
        }
        other => panic!("expected BUY, got {:?}", other),
    }
}
