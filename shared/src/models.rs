use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on concurrent triggers per user.
pub const MAX_ALERTS_PER_USER: usize = 5;

/// Assets the bot tracks. Provider symbol mappings live here so nothing else
/// string-matches on tickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Coin {
    Btc,
    Eth,
    Sol,
    Bnb,
    Xrp,
    Ton,
}

impl Coin {
    pub const ALL: [Coin; 6] = [
        Coin::Btc,
        Coin::Eth,
        Coin::Sol,
        Coin::Bnb,
        Coin::Xrp,
        Coin::Ton,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Coin::Btc => "BTC",
            Coin::Eth => "ETH",
            Coin::Sol => "SOL",
            Coin::Bnb => "BNB",
            Coin::Xrp => "XRP",
            Coin::Ton => "TON",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Coin> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BTC" => Some(Coin::Btc),
            "ETH" => Some(Coin::Eth),
            "SOL" => Some(Coin::Sol),
            "BNB" => Some(Coin::Bnb),
            "XRP" => Some(Coin::Xrp),
            "TON" => Some(Coin::Ton),
            _ => None,
        }
    }

    /// Spot pair on the exchange API, e.g. "BTCUSDT".
    pub fn binance_pair(&self) -> String {
        format!("{}USDT", self.as_str())
    }

    /// Asset id on the aggregator API.
    pub fn coingecko_id(&self) -> &'static str {
        match self {
            Coin::Btc => "bitcoin",
            Coin::Eth => "ethereum",
            Coin::Sol => "solana",
            Coin::Bnb => "binancecoin",
            Coin::Xrp => "ripple",
            Coin::Ton => "the-open-network",
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered price watch. `last_notified_price` is the suppression
/// watermark, 0 until the first notification fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertTrigger {
    pub id: Uuid,
    pub chat_id: i64,
    pub coin: Coin,
    pub target_price: f64,
    #[serde(default)]
    pub last_notified_price: f64,
    pub created_at: DateTime<Utc>,
}

impl AlertTrigger {
    pub fn new(chat_id: i64, coin: Coin, target_price: f64) -> Self {
        AlertTrigger {
            id: Uuid::new_v4(),
            chat_id,
            coin,
            target_price,
            last_notified_price: 0.0,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub amount: f64,
    /// USD price at the moment the position was recorded, 0 when no price
    /// was available.
    pub entry_price: f64,
}

/// Stored per-user settings. Fields stay `None` until the user picks a value
/// so deployment defaults apply on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// On-disk shape of portfolio.json: chat id to coin to position. BTreeMap
/// keeps listing order stable.
pub type PortfolioBook = HashMap<i64, BTreeMap<Coin, Position>>;

/// On-disk shape of settings.json.
pub type PreferenceMap = HashMap<i64, UserPreference>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_symbol_accepts_any_case() {
        assert_eq!(Coin::from_symbol("BTC"), Some(Coin::Btc));
        assert_eq!(Coin::from_symbol("eth"), Some(Coin::Eth));
        assert_eq!(Coin::from_symbol(" ton "), Some(Coin::Ton));
        assert_eq!(Coin::from_symbol("DOGE"), None);
        assert_eq!(Coin::from_symbol(""), None);
    }

    #[test]
    fn test_pair_and_id_mappings() {
        assert_eq!(Coin::Btc.binance_pair(), "BTCUSDT");
        assert_eq!(Coin::Ton.binance_pair(), "TONUSDT");
        assert_eq!(Coin::Bnb.coingecko_id(), "binancecoin");
        assert_eq!(Coin::Xrp.coingecko_id(), "ripple");
    }

    #[test]
    fn test_new_trigger_starts_unfired() {
        let trigger = AlertTrigger::new(42, Coin::Btc, 65000.0);
        assert_eq!(trigger.chat_id, 42);
        assert_eq!(trigger.coin, Coin::Btc);
        assert_eq!(trigger.last_notified_price, 0.0);
    }
}
