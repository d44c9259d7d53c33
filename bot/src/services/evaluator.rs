//! Periodic alert sweep: checks every trigger against the price feed and
//! pushes notifications through the sink, with a hysteresis band so one
//! crossing does not spam a message every minute.

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use tracing::{info, warn};

use crate::i18n;
use crate::services::alerts::AlertService;
use crate::services::market::MarketService;
use crate::services::notifier::{AlertSink, TelegramSink};
use crate::services::prefs::PreferenceService;
use crate::state::AppState;

/// Minimum distance (in quote currency) between the current price and the
/// last notified price before a trigger may fire again.
pub const HYSTERESIS_BAND: f64 = 1.0;

/// A trigger fires when the price is at or above the target and has moved
/// out of the band around the last notified price. A fresh trigger carries
/// a zero watermark, so any realistic crossing fires immediately.
pub fn should_fire(price: f64, target: f64, last_notified: f64) -> bool {
    price >= target && (price - last_notified).abs() > HYSTERESIS_BAND
}

#[derive(Debug, Default, PartialEq)]
pub struct SweepOutcome {
    pub evaluated: usize,
    pub fired: usize,
    pub skipped_no_price: usize,
}

/// One pass over all triggers. A trigger whose coin has no price this
/// round is skipped and retried next sweep. The watermark advances after
/// every delivery attempt, failed sends included, so a flaky sink does
/// not turn into a message flood once it recovers.
pub async fn run_sweep(
    market: &MarketService,
    alerts: &AlertService,
    prefs: &PreferenceService,
    sink: &dyn AlertSink,
) -> SweepOutcome {
    let mut outcome = SweepOutcome::default();

    for trigger in alerts.snapshot().await {
        outcome.evaluated += 1;

        let price = match market.get_price(trigger.coin).await {
            Some(price) => price,
            None => {
                outcome.skipped_no_price += 1;
                continue;
            }
        };

        if !should_fire(price, trigger.target_price, trigger.last_notified_price) {
            continue;
        }

        let locale = prefs.get_language(trigger.chat_id).await;
        let text = i18n::translate(
            &locale,
            "alert_fired",
            Some(&[
                ("coin", trigger.coin.as_str()),
                ("price", &i18n::format_price(price)),
            ]),
        );

        info!(
            "🚀 alert fired: chat {} {} at {} (target {})",
            trigger.chat_id, trigger.coin, price, trigger.target_price
        );
        if let Err(err) = sink.deliver(trigger.chat_id, &text).await {
            warn!("alert delivery to chat {} failed: {:#}", trigger.chat_id, err);
        }
        alerts.mark_notified(trigger.id, price).await;
        outcome.fired += 1;
    }

    outcome
}

/// Background loop driving [`run_sweep`] on the configured cadence.
pub fn spawn_alert_evaluator(bot: Bot, state: Arc<AppState>) {
    tokio::spawn(async move {
        let sink = TelegramSink::new(bot);
        tokio::time::sleep(Duration::from_secs(state.config.sweep_initial_delay_secs)).await;
        let mut sweep = tokio::time::interval(Duration::from_secs(state.config.sweep_interval_secs));
        info!("⏰ Alert evaluator started");
        loop {
            sweep.tick().await;
            let outcome = run_sweep(&state.market, &state.alerts, &state.prefs, &sink).await;
            if outcome.fired > 0 {
                info!("✅ sweep delivered {} notification(s)", outcome.fired);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::market::PriceProvider;
    use crate::services::testkit::{FailingSink, RecordingSink, ScriptedProvider};
    use shared::Coin;

    #[test]
    fn test_fresh_trigger_fires_on_crossing() {
        assert!(should_fire(105.0, 100.0, 0.0));
        assert!(should_fire(100.0, 100.0, 0.0));
    }

    #[test]
    fn test_below_target_never_fires() {
        assert!(!should_fire(99.9, 100.0, 0.0));
        assert!(!should_fire(99.9, 100.0, 200.0));
    }

    #[test]
    fn test_band_suppresses_even_above_target() {
        assert!(!should_fire(105.0, 100.0, 105.0));
        assert!(!should_fire(105.5, 100.0, 105.0));
        // Exactly at the band edge still counts as inside.
        assert!(!should_fire(106.0, 100.0, 105.0));
    }

    #[test]
    fn test_move_beyond_band_refires() {
        assert!(should_fire(106.1, 100.0, 105.0));
        // A drop back toward the target also re-arms, as long as the
        // price still clears it.
        assert!(should_fire(101.0, 100.0, 105.0));
    }

    fn market_at(quotes: &[(Coin, f64, f64)]) -> MarketService {
        let provider = Arc::new(ScriptedProvider::new("scripted", quotes));
        MarketService::with_providers(vec![provider as Arc<dyn PriceProvider>], 0)
    }

    #[tokio::test]
    async fn test_crossing_fires_once_then_suppresses() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());
        let prefs = PreferenceService::load(dir.path(), "USD", "en");
        let sink = RecordingSink::default();
        alerts.add(1, Coin::Btc, 100.0).await.unwrap();

        let market = market_at(&[(Coin::Btc, 105.0, 0.0)]);
        let first = run_sweep(&market, &alerts, &prefs, &sink).await;
        assert_eq!(first.fired, 1);
        assert_eq!(alerts.list_for(1).await[0].last_notified_price, 105.0);

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, 1);
        assert!(sent[0].1.contains("BTC"));
        assert!(sent[0].1.contains("105.00"));

        // Price unchanged on the next sweep: inside the band, no repeat.
        let second = run_sweep(&market, &alerts, &prefs, &sink).await;
        assert_eq!(second.fired, 0);
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_move_beyond_band_notifies_again() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());
        let prefs = PreferenceService::load(dir.path(), "USD", "en");
        let sink = RecordingSink::default();
        alerts.add(1, Coin::Eth, 100.0).await.unwrap();

        run_sweep(&market_at(&[(Coin::Eth, 105.0, 0.0)]), &alerts, &prefs, &sink).await;
        let again = run_sweep(&market_at(&[(Coin::Eth, 107.0, 0.0)]), &alerts, &prefs, &sink).await;

        assert_eq!(again.fired, 1);
        assert_eq!(sink.sent().len(), 2);
        assert_eq!(alerts.list_for(1).await[0].last_notified_price, 107.0);
    }

    #[tokio::test]
    async fn test_missing_price_skips_only_that_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());
        let prefs = PreferenceService::load(dir.path(), "USD", "en");
        let sink = RecordingSink::default();
        alerts.add(1, Coin::Btc, 1.0).await.unwrap();
        alerts.add(2, Coin::Eth, 1.0).await.unwrap();

        // Only ETH is quoted this round.
        let market = market_at(&[(Coin::Eth, 3000.0, 0.0)]);
        let outcome = run_sweep(&market, &alerts, &prefs, &sink).await;

        assert_eq!(outcome.evaluated, 2);
        assert_eq!(outcome.skipped_no_price, 1);
        assert_eq!(outcome.fired, 1);
        assert_eq!(alerts.list_for(1).await[0].last_notified_price, 0.0);
        assert_eq!(alerts.list_for(2).await[0].last_notified_price, 3000.0);
    }

    #[tokio::test]
    async fn test_failed_delivery_still_advances_watermark() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());
        let prefs = PreferenceService::load(dir.path(), "USD", "en");
        alerts.add(1, Coin::Sol, 100.0).await.unwrap();

        let market = market_at(&[(Coin::Sol, 150.0, 0.0)]);
        let outcome = run_sweep(&market, &alerts, &prefs, &FailingSink).await;

        assert_eq!(outcome.fired, 1);
        assert_eq!(alerts.list_for(1).await[0].last_notified_price, 150.0);
    }

    #[tokio::test]
    async fn test_trigger_is_never_removed_by_the_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());
        let prefs = PreferenceService::load(dir.path(), "USD", "en");
        let sink = RecordingSink::default();
        alerts.add(1, Coin::Btc, 100.0).await.unwrap();

        let market = market_at(&[(Coin::Btc, 500.0, 0.0)]);
        run_sweep(&market, &alerts, &prefs, &sink).await;
        run_sweep(&market, &alerts, &prefs, &sink).await;

        assert_eq!(alerts.list_for(1).await.len(), 1);
    }
}
