use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::{
    dispatching::{dialogue, UpdateHandler},
    prelude::*,
};

mod commands;
mod i18n;
mod keyboards;
mod services;
mod state;

// Initialize i18n at crate root (required by rust-i18n)
rust_i18n::i18n!("locales", fallback = "en");

use crate::commands::{
    alerts, chart, handle_back, handle_help, handle_menu, handle_version, portfolio, start,
    Command,
};
use crate::services::evaluator::spawn_alert_evaluator;
use crate::state::{AppState, BotState};

fn schema() -> UpdateHandler<anyhow::Error> {
    use dptree::case;
    // /start and /back escape from any state; the informational commands
    // only answer at idle so they cannot hijack a numeric prompt.
    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start].endpoint(start::handle_start))
        .branch(case![Command::Back].endpoint(handle_back))
        .branch(
            case![BotState::Idle]
                .branch(case![Command::Help].endpoint(handle_help))
                .branch(case![Command::Version].endpoint(handle_version)),
        );

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .branch(case![BotState::AwaitingLanguage].endpoint(start::handle_language_input))
        .branch(
            case![BotState::AwaitingCurrency { onboarding }]
                .endpoint(start::handle_currency_input),
        )
        .branch(case![BotState::AwaitingAlertCoin].endpoint(alerts::handle_alert_coin_input))
        .branch(
            case![BotState::AwaitingAlertPrice { coin }]
                .endpoint(alerts::handle_alert_price_input),
        )
        .branch(
            case![BotState::AwaitingPortfolioCoin]
                .endpoint(portfolio::handle_portfolio_coin_input),
        )
        .branch(
            case![BotState::AwaitingPortfolioAmount { coin }]
                .endpoint(portfolio::handle_portfolio_amount_input),
        )
        .branch(
            case![BotState::AwaitingPortfolioRemove]
                .endpoint(portfolio::handle_position_remove_input),
        )
        .branch(case![BotState::AwaitingChartCoin].endpoint(chart::handle_chart_coin_input))
        .branch(case![BotState::Idle].endpoint(handle_menu))
        .branch(dptree::endpoint(handle_menu));

    dialogue::enter::<Update, InMemStorage<BotState>, BotState, _>().branch(message_handler)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("🚀 Starting CoinSentry bot...");

    let app_state = Arc::new(AppState::new()?);
    tracing::info!("AppState initialized");

    let bot = Bot::new(&app_state.config.bot_token);

    spawn_alert_evaluator(bot.clone(), app_state.clone());

    let mut dispatcher = Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![
            InMemStorage::<BotState>::new(),
            app_state.clone()
        ])
        .enable_ctrlc_handler()
        .build();

    tracing::info!("Bot is running and waiting for updates...");
    dispatcher.dispatch().await;

    Ok(())
}
