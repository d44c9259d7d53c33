use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use shared::models::{Coin, PortfolioBook, Position};
use shared::storage;
use tokio::sync::RwLock;
use tracing::{info, warn};

const PORTFOLIO_FILE: &str = "portfolio.json";

/// Per-user holdings, mirrored to portfolio.json on every mutation.
pub struct PortfolioService {
    path: PathBuf,
    book: RwLock<PortfolioBook>,
}

impl PortfolioService {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(PORTFOLIO_FILE);
        let book: PortfolioBook = storage::load_or_default(&path);
        info!("loaded portfolios for {} user(s) from {}", book.len(), path.display());
        PortfolioService {
            path,
            book: RwLock::new(book),
        }
    }

    /// Insert or replace the position for one coin. A repeated add
    /// overwrites the amount and entry price rather than stacking.
    pub async fn upsert(&self, chat_id: i64, coin: Coin, amount: f64, entry_price: f64) {
        let mut book = self.book.write().await;
        book.entry(chat_id)
            .or_default()
            .insert(coin, Position { amount, entry_price });
        self.persist(&book);
    }

    pub async fn positions_for(&self, chat_id: i64) -> BTreeMap<Coin, Position> {
        self.book
            .read()
            .await
            .get(&chat_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Returns whether a position was actually removed.
    pub async fn remove(&self, chat_id: i64, coin: Coin) -> bool {
        let mut book = self.book.write().await;
        let removed = match book.get_mut(&chat_id) {
            Some(positions) => {
                let removed = positions.remove(&coin).is_some();
                if positions.is_empty() {
                    book.remove(&chat_id);
                }
                removed
            }
            None => false,
        };
        if removed {
            self.persist(&book);
        }
        removed
    }

    fn persist(&self, book: &PortfolioBook) {
        if let Err(err) = storage::save(&self.path, book) {
            warn!("failed to persist portfolio: {:#}", err);
        }
    }
}
