use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::warn;

const RATES_URL: &str = "https://open.er-api.com/v6/latest/USD";
const RATES_TTL: Duration = Duration::from_secs(600);

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// USD conversion rates for display. Lookups degrade to 1.0 so price output
/// falls back to USD numbers instead of erroring.
pub struct RateService {
    http: reqwest::Client,
    cache: RwLock<Option<(Instant, HashMap<String, f64>)>>,
}

impl RateService {
    pub fn new(http: reqwest::Client) -> Self {
        RateService {
            http,
            cache: RwLock::new(None),
        }
    }

    pub async fn usd_rate(&self, currency: &str) -> f64 {
        if currency.eq_ignore_ascii_case("USD") {
            return 1.0;
        }
        {
            let cache = self.cache.read().await;
            if let Some((fetched_at, rates)) = cache.as_ref() {
                if fetched_at.elapsed() < RATES_TTL {
                    return rates.get(currency).copied().unwrap_or(1.0);
                }
            }
        }
        match self.fetch_rates().await {
            Ok(rates) => {
                let rate = rates.get(currency).copied().unwrap_or(1.0);
                *self.cache.write().await = Some((Instant::now(), rates));
                rate
            }
            Err(err) => {
                warn!("rate lookup for {} failed, using 1.0: {:#}", currency, err);
                1.0
            }
        }
    }

    async fn fetch_rates(&self) -> Result<HashMap<String, f64>, anyhow::Error> {
        let resp = self.http.get(RATES_URL).send().await?;
        if !resp.status().is_success() {
            anyhow::bail!("rates request returned {}", resp.status());
        }
        let body: RatesResponse = resp.json().await?;
        Ok(body.rates)
    }
}
