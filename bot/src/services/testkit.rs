//! Hand-rolled doubles for provider and sink seams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::Coin;

use crate::services::market::{Mover, PriceProvider, Ticker};
use crate::services::notifier::AlertSink;

/// Provider that answers from a fixed table and counts ticker calls.
pub struct ScriptedProvider {
    tag: &'static str,
    tickers: HashMap<Coin, Ticker>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(tag: &'static str, quotes: &[(Coin, f64, f64)]) -> Self {
        let tickers = quotes
            .iter()
            .map(|&(coin, price, change24)| (coin, Ticker { price, change24 }))
            .collect();
        ScriptedProvider {
            tag,
            tickers,
            calls: AtomicUsize::new(0),
        }
    }

    /// Provider with nothing scripted; every call fails.
    pub fn empty(tag: &'static str) -> Self {
        Self::new(tag, &[])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        self.tag
    }

    async fn ticker(&self, coin: Coin) -> Result<Ticker> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tickers
            .get(&coin)
            .copied()
            .ok_or_else(|| anyhow!("{}: no quote scripted for {}", self.tag, coin))
    }

    async fn closes(&self, coin: Coin, _hours: u32) -> Result<Vec<f64>> {
        Err(anyhow!("{}: no closes scripted for {}", self.tag, coin))
    }

    async fn movers(&self, _gainers: bool, _n: usize) -> Result<Vec<Mover>> {
        Err(anyhow!("{}: no movers scripted", self.tag))
    }
}

/// Sink that records every delivered message.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingSink {
    pub fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn deliver(&self, chat_id: i64, text: &str) -> Result<(), anyhow::Error> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Sink whose every delivery fails.
pub struct FailingSink;

#[async_trait]
impl AlertSink for FailingSink {
    async fn deliver(&self, _chat_id: i64, _text: &str) -> Result<(), anyhow::Error> {
        Err(anyhow!("delivery refused"))
    }
}
