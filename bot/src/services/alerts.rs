use std::path::{Path, PathBuf};

use shared::models::{AlertTrigger, Coin, MAX_ALERTS_PER_USER};
use shared::storage;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

const ALERTS_FILE: &str = "alerts.json";

#[derive(Debug, Error, PartialEq)]
pub enum AlertError {
    #[error("alert limit reached: at most {0} active alerts per user")]
    CapacityExceeded(usize),
}

/// Authoritative in-memory trigger list, mirrored to alerts.json on every
/// mutation. The file write happens inside the lock with no await in
/// between, so a user mutation and an evaluator update cannot interleave
/// a lost update.
pub struct AlertService {
    path: PathBuf,
    triggers: RwLock<Vec<AlertTrigger>>,
}

impl AlertService {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(ALERTS_FILE);
        let triggers: Vec<AlertTrigger> = storage::load_or_default(&path);
        info!("loaded {} alert trigger(s) from {}", triggers.len(), path.display());
        AlertService {
            path,
            triggers: RwLock::new(triggers),
        }
    }

    pub async fn add(
        &self,
        chat_id: i64,
        coin: Coin,
        target_price: f64,
    ) -> Result<AlertTrigger, AlertError> {
        let mut triggers = self.triggers.write().await;
        let held = triggers.iter().filter(|t| t.chat_id == chat_id).count();
        if held >= MAX_ALERTS_PER_USER {
            return Err(AlertError::CapacityExceeded(MAX_ALERTS_PER_USER));
        }
        let trigger = AlertTrigger::new(chat_id, coin, target_price);
        triggers.push(trigger.clone());
        self.persist(&triggers);
        Ok(trigger)
    }

    /// Insertion order.
    pub async fn list_for(&self, chat_id: i64) -> Vec<AlertTrigger> {
        self.triggers
            .read()
            .await
            .iter()
            .filter(|t| t.chat_id == chat_id)
            .cloned()
            .collect()
    }

    /// Bulk delete. Removing zero triggers is a successful no-op.
    pub async fn remove_all_for(&self, chat_id: i64) -> usize {
        let mut triggers = self.triggers.write().await;
        let before = triggers.len();
        triggers.retain(|t| t.chat_id != chat_id);
        let removed = before - triggers.len();
        if removed > 0 {
            self.persist(&triggers);
        }
        removed
    }

    /// Evaluator only: move the suppression watermark after a notification.
    pub async fn mark_notified(&self, id: Uuid, price: f64) {
        let mut triggers = self.triggers.write().await;
        if let Some(trigger) = triggers.iter_mut().find(|t| t.id == id) {
            trigger.last_notified_price = price;
            self.persist(&triggers);
        }
    }

    /// Point-in-time copy for the sweep.
    pub async fn snapshot(&self) -> Vec<AlertTrigger> {
        self.triggers.read().await.clone()
    }

    fn persist(&self, triggers: &[AlertTrigger]) {
        if let Err(err) = storage::save(&self.path, &triggers) {
            warn!("failed to persist alerts: {:#}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capacity_cap_rejects_sixth_alert() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());

        for i in 0..MAX_ALERTS_PER_USER {
            alerts.add(1, Coin::Btc, 1000.0 + i as f64).await.unwrap();
        }
        let err = alerts.add(1, Coin::Eth, 9999.0).await.unwrap_err();
        assert_eq!(err, AlertError::CapacityExceeded(MAX_ALERTS_PER_USER));
        assert_eq!(alerts.list_for(1).await.len(), MAX_ALERTS_PER_USER);
    }

    #[tokio::test]
    async fn test_cap_is_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());

        for i in 0..MAX_ALERTS_PER_USER {
            alerts.add(1, Coin::Btc, 1000.0 + i as f64).await.unwrap();
        }
        // A different user still has room.
        assert!(alerts.add(2, Coin::Btc, 500.0).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());

        alerts.add(1, Coin::Btc, 1.0).await.unwrap();
        alerts.add(1, Coin::Eth, 2.0).await.unwrap();
        alerts.add(2, Coin::Sol, 9.0).await.unwrap();
        alerts.add(1, Coin::Ton, 3.0).await.unwrap();

        let targets: Vec<f64> = alerts.list_for(1).await.iter().map(|t| t.target_price).collect();
        assert_eq!(targets, vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_remove_all_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());

        alerts.add(1, Coin::Btc, 1.0).await.unwrap();
        alerts.add(2, Coin::Eth, 2.0).await.unwrap();

        assert_eq!(alerts.remove_all_for(1).await, 1);
        assert_eq!(alerts.remove_all_for(1).await, 0);
        assert_eq!(alerts.remove_all_for(99).await, 0);
        assert_eq!(alerts.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_mutations_survive_reload() {
        let dir = tempfile::tempdir().unwrap();

        let trigger = {
            let alerts = AlertService::load(dir.path());
            let trigger = alerts.add(7, Coin::Xrp, 2.5).await.unwrap();
            alerts.mark_notified(trigger.id, 2.61).await;
            trigger
        };

        let reloaded = AlertService::load(dir.path());
        let listed = reloaded.list_for(7).await;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, trigger.id);
        assert_eq!(listed[0].last_notified_price, 2.61);
    }

    #[tokio::test]
    async fn test_mark_notified_on_unknown_id_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let alerts = AlertService::load(dir.path());
        alerts.add(1, Coin::Btc, 1.0).await.unwrap();

        alerts.mark_notified(Uuid::new_v4(), 123.0).await;
        assert_eq!(alerts.list_for(1).await[0].last_notified_price, 0.0);
    }
}
