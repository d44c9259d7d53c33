use std::path::PathBuf;

use anyhow::Context;
use dotenv::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub bot_name: String,
    pub data_dir: PathBuf,
    pub default_currency: String,
    pub default_language: String,
    pub sweep_interval_secs: u64,
    pub sweep_initial_delay_secs: u64,
    pub price_cache_ttl_secs: u64,
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        Ok(Config {
            // The only variable without a default. Startup must fail loudly
            // when the transport credential is absent.
            bot_token: std::env::var("BOT_TOKEN").context("BOT_TOKEN must be set")?,
            bot_name: std::env::var("BOT_NAME").unwrap_or_else(|_| "CoinSentry".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            default_currency: std::env::var("DEFAULT_CURRENCY")
                .unwrap_or_else(|_| "USD".to_string()),
            default_language: std::env::var("DEFAULT_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
            sweep_interval_secs: std::env::var("ALERT_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            sweep_initial_delay_secs: std::env::var("ALERT_SWEEP_INITIAL_DELAY_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            price_cache_ttl_secs: std::env::var("PRICE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| "45".to_string())
                .parse()
                .unwrap_or(45),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap_or(8),
        })
    }
}
