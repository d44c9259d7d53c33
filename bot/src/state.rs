use std::sync::Arc;

use shared::{Coin, Config};
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

use crate::services::alerts::AlertService;
use crate::services::charts::ChartService;
use crate::services::market::MarketService;
use crate::services::portfolio::PortfolioService;
use crate::services::prefs::PreferenceService;
use crate::services::rates::RateService;

pub type MyDialogue = Dialogue<BotState, InMemStorage<BotState>>;
pub type HandlerResult = Result<(), anyhow::Error>;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub market: Arc<MarketService>,
    pub rates: Arc<RateService>,
    pub charts: Arc<ChartService>,
    pub alerts: Arc<AlertService>,
    pub portfolio: Arc<PortfolioService>,
    pub prefs: Arc<PreferenceService>,
}

impl AppState {
    pub fn new() -> Result<Self, anyhow::Error> {
        let config = Config::from_env()?;
        std::fs::create_dir_all(&config.data_dir)?;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let market = Arc::new(MarketService::new(http.clone(), config.price_cache_ttl_secs));
        let rates = Arc::new(RateService::new(http.clone()));
        let charts = Arc::new(ChartService::new(http));
        let alerts = Arc::new(AlertService::load(&config.data_dir));
        let portfolio = Arc::new(PortfolioService::load(&config.data_dir));
        let prefs = Arc::new(PreferenceService::load(
            &config.data_dir,
            &config.default_currency,
            &config.default_language,
        ));
        tracing::info!("State loaded from {}", config.data_dir.display());

        Ok(AppState {
            config,
            market,
            rates,
            charts,
            alerts,
            portfolio,
            prefs,
        })
    }
}

/// Where each chat currently is. Everything outside [`BotState::Idle`]
/// is one step of a short flow; /back escapes from any of them.
#[derive(Clone, Default, Debug)]
pub enum BotState {
    #[default]
    Idle,
    AwaitingLanguage,
    AwaitingCurrency {
        onboarding: bool,
    },
    AwaitingAlertCoin,
    AwaitingAlertPrice {
        coin: Coin,
    },
    AwaitingPortfolioCoin,
    AwaitingPortfolioAmount {
        coin: Coin,
    },
    AwaitingPortfolioRemove,
    AwaitingChartCoin,
}
