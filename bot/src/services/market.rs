//! Market data feed: provider chain with fallback plus a short-lived
//! ticker cache so evaluator sweeps and user lookups share fetches.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use shared::Coin;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Spot snapshot for one coin, USD denominated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker {
    pub price: f64,
    pub change24: f64,
}

/// One row of the gainers/losers ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    pub symbol: String,
    pub change24: f64,
}

/// A single upstream market-data source. Implementations shape the HTTP
/// requests; fallback and caching belong to [`MarketService`].
#[async_trait]
pub trait PriceProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn ticker(&self, coin: Coin) -> Result<Ticker>;

    /// Hourly close series, oldest first.
    async fn closes(&self, coin: Coin, hours: u32) -> Result<Vec<f64>>;

    /// Top `n` market-wide gainers (or losers) by 24h change.
    async fn movers(&self, gainers: bool, n: usize) -> Result<Vec<Mover>>;
}

const BINANCE_BASE_URL: &str = "https://api.binance.com";

pub struct BinanceProvider {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Binance24h {
    last_price: String,
    price_change_percent: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceTickerRow {
    symbol: String,
    price_change_percent: String,
}

impl BinanceProvider {
    pub fn new(http: reqwest::Client) -> Self {
        BinanceProvider {
            http,
            base_url: BINANCE_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl PriceProvider for BinanceProvider {
    fn name(&self) -> &'static str {
        "binance"
    }

    async fn ticker(&self, coin: Coin) -> Result<Ticker> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("symbol", coin.binance_pair())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("ticker request for {} returned {}", coin, resp.status()));
        }
        let body: Binance24h = resp.json().await?;
        Ok(Ticker {
            price: body.last_price.parse()?,
            change24: body.price_change_percent.parse()?,
        })
    }

    async fn closes(&self, coin: Coin, hours: u32) -> Result<Vec<f64>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("symbol", coin.binance_pair()),
                ("interval", "1h".to_string()),
                ("limit", hours.to_string()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("klines request for {} returned {}", coin, resp.status()));
        }
        // Klines come as positional arrays; index 4 is the close price.
        let rows: Vec<Vec<serde_json::Value>> = resp.json().await?;
        let mut closes = Vec::with_capacity(rows.len());
        for row in rows {
            let close = row
                .get(4)
                .and_then(|v| v.as_str())
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| anyhow!("malformed kline row for {}", coin))?;
            closes.push(close);
        }
        Ok(closes)
    }

    async fn movers(&self, gainers: bool, n: usize) -> Result<Vec<Mover>> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let resp = self.http.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("movers request returned {}", resp.status()));
        }
        let rows: Vec<BinanceTickerRow> = resp.json().await?;
        // Plain USDT pairs only; the length guard drops leveraged tokens and
        // other exotics with long symbols.
        let mut movers: Vec<Mover> = rows
            .into_iter()
            .filter(|row| row.symbol.ends_with("USDT") && row.symbol.len() < 12)
            .filter_map(|row| {
                let change24 = row.price_change_percent.parse().ok()?;
                Some(Mover {
                    symbol: row.symbol.trim_end_matches("USDT").to_string(),
                    change24,
                })
            })
            .collect();
        movers.sort_by(|a, b| {
            b.change24
                .partial_cmp(&a.change24)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if !gainers {
            movers.reverse();
        }
        movers.truncate(n);
        Ok(movers)
    }
}

const COINGECKO_BASE_URL: &str = "https://api.coingecko.com";

pub struct CoinGeckoProvider {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct GeckoSimplePrice {
    usd: f64,
    #[serde(default)]
    usd_24h_change: Option<f64>,
}

#[derive(Deserialize)]
struct GeckoMarketChart {
    prices: Vec<(i64, f64)>,
}

#[derive(Deserialize)]
struct GeckoMarketRow {
    symbol: String,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
}

impl CoinGeckoProvider {
    pub fn new(http: reqwest::Client) -> Self {
        CoinGeckoProvider {
            http,
            base_url: COINGECKO_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoProvider {
    fn name(&self) -> &'static str {
        "coingecko"
    }

    async fn ticker(&self, coin: Coin) -> Result<Ticker> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("ids", coin.coingecko_id()),
                ("vs_currencies", "usd"),
                ("include_24hr_change", "true"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("simple/price for {} returned {}", coin, resp.status()));
        }
        let body: HashMap<String, GeckoSimplePrice> = resp.json().await?;
        let entry = body
            .get(coin.coingecko_id())
            .ok_or_else(|| anyhow!("no aggregator data for {}", coin))?;
        Ok(Ticker {
            price: entry.usd,
            change24: entry.usd_24h_change.unwrap_or(0.0),
        })
    }

    async fn closes(&self, coin: Coin, hours: u32) -> Result<Vec<f64>> {
        let url = format!(
            "{}/api/v3/coins/{}/market_chart",
            self.base_url,
            coin.coingecko_id()
        );
        // 1-90 day windows come back with hourly granularity.
        let days = hours.div_ceil(24).max(1);
        let resp = self
            .http
            .get(&url)
            .query(&[("vs_currency", "usd".to_string()), ("days", days.to_string())])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("market_chart for {} returned {}", coin, resp.status()));
        }
        let body: GeckoMarketChart = resp.json().await?;
        let mut closes: Vec<f64> = body.prices.into_iter().map(|(_, price)| price).collect();
        if closes.len() > hours as usize {
            closes = closes.split_off(closes.len() - hours as usize);
        }
        Ok(closes)
    }

    async fn movers(&self, gainers: bool, n: usize) -> Result<Vec<Mover>> {
        let url = format!("{}/api/v3/coins/markets", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", "100"),
                ("page", "1"),
                ("price_change_percentage", "24h"),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(anyhow!("coins/markets returned {}", resp.status()));
        }
        let rows: Vec<GeckoMarketRow> = resp.json().await?;
        let mut movers: Vec<Mover> = rows
            .into_iter()
            .filter_map(|row| {
                Some(Mover {
                    symbol: row.symbol.to_uppercase(),
                    change24: row.price_change_percentage_24h?,
                })
            })
            .collect();
        movers.sort_by(|a, b| {
            b.change24
                .partial_cmp(&a.change24)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if !gainers {
            movers.reverse();
        }
        movers.truncate(n);
        Ok(movers)
    }
}

struct CachedTicker {
    ticker: Ticker,
    cached_at: Instant,
}

impl CachedTicker {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.cached_at.elapsed() > ttl
    }
}

/// Best-effort price feed over an ordered provider chain. Callers get
/// `None` only after every provider has failed for the request.
pub struct MarketService {
    providers: Vec<Arc<dyn PriceProvider>>,
    cache: RwLock<HashMap<Coin, CachedTicker>>,
    cache_ttl: Duration,
}

impl MarketService {
    pub fn new(http: reqwest::Client, cache_ttl_secs: u64) -> Self {
        let providers: Vec<Arc<dyn PriceProvider>> = vec![
            Arc::new(BinanceProvider::new(http.clone())),
            Arc::new(CoinGeckoProvider::new(http)),
        ];
        Self::with_providers(providers, cache_ttl_secs)
    }

    pub fn with_providers(providers: Vec<Arc<dyn PriceProvider>>, cache_ttl_secs: u64) -> Self {
        MarketService {
            providers,
            cache: RwLock::new(HashMap::new()),
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        }
    }

    /// Cached spot snapshot, walking the provider chain on a miss.
    pub async fn get_ticker(&self, coin: Coin) -> Option<Ticker> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&coin) {
                if !entry.is_expired(self.cache_ttl) {
                    debug!("ticker cache hit for {}", coin);
                    return Some(entry.ticker);
                }
            }
        }
        let ticker = self.fetch_ticker(coin).await?;
        let mut cache = self.cache.write().await;
        cache.insert(
            coin,
            CachedTicker {
                ticker,
                cached_at: Instant::now(),
            },
        );
        Some(ticker)
    }

    pub async fn get_price(&self, coin: Coin) -> Option<f64> {
        self.get_ticker(coin).await.map(|t| t.price)
    }

    /// 24h percentage change, 0 when no provider answers.
    pub async fn get_change24(&self, coin: Coin) -> f64 {
        self.get_ticker(coin).await.map(|t| t.change24).unwrap_or(0.0)
    }

    pub async fn get_closes(&self, coin: Coin, hours: u32) -> Option<Vec<f64>> {
        for provider in &self.providers {
            match provider.closes(coin, hours).await {
                Ok(closes) if !closes.is_empty() => return Some(closes),
                Ok(_) => warn!("{} returned an empty series for {}", provider.name(), coin),
                Err(err) => warn!("{} closes for {} failed: {:#}", provider.name(), coin, err),
            }
        }
        None
    }

    pub async fn top_movers(&self, gainers: bool) -> Option<Vec<Mover>> {
        for provider in &self.providers {
            match provider.movers(gainers, 5).await {
                Ok(movers) if !movers.is_empty() => return Some(movers),
                Ok(_) => warn!("{} returned an empty ranking", provider.name()),
                Err(err) => warn!("{} movers failed: {:#}", provider.name(), err),
            }
        }
        None
    }

    async fn fetch_ticker(&self, coin: Coin) -> Option<Ticker> {
        for provider in &self.providers {
            match provider.ticker(coin).await {
                Ok(ticker) => return Some(ticker),
                Err(err) => warn!("{} ticker for {} failed: {:#}", provider.name(), coin, err),
            }
        }
        None
    }
}
