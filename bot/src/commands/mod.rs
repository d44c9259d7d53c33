use std::sync::Arc;

use shared::Coin;
use teloxide::{prelude::*, types::ParseMode, utils::command::BotCommands};

use crate::i18n;
use crate::keyboards;
use crate::state::{AppState, BotState, HandlerResult, MyDialogue};

pub mod alerts;
pub mod chart;
pub mod market;
pub mod portfolio;
pub mod price;
pub mod start;

/// 🤖 <b>CoinSentry</b> — crypto prices, alerts and portfolio in one place
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    /// Start the bot
    Start,
    /// Show what the bot can do
    Help,
    /// Leave the current flow and return to the menu
    Back,
    /// What is the current version ?
    Version,
}

/// Idle-state router. Menu buttons dispatch to their flows, a bare coin
/// symbol shows the price card, anything else is ignored.
pub async fn handle_menu(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text.trim().to_string(),
        None => return Ok(()),
    };
    match text.as_str() {
        keyboards::BTN_PRICE => price::prompt_coin(bot, state, msg).await,
        keyboards::BTN_MARKET => market::send_overview(bot, state, msg).await,
        keyboards::BTN_GAINERS => market::send_movers(bot, state, msg, true).await,
        keyboards::BTN_LOSERS => market::send_movers(bot, state, msg, false).await,
        keyboards::BTN_CHART => chart::start_chart_flow(bot, dialogue, state, msg).await,
        keyboards::BTN_MOOD => market::send_mood(bot, state, msg).await,
        keyboards::BTN_ALERTS => alerts::send_alerts_menu(bot, state, msg).await,
        keyboards::BTN_PORTFOLIO => portfolio::send_portfolio_menu(bot, state, msg).await,
        keyboards::BTN_CURRENCY => start::start_currency_flow(bot, dialogue, state, msg).await,
        keyboards::BTN_LANGUAGE => start::start_language_flow(bot, dialogue, state, msg).await,
        keyboards::BTN_ALERT_ADD => alerts::start_add_flow(bot, dialogue, state, msg).await,
        keyboards::BTN_ALERT_LIST => alerts::send_alert_list(bot, state, msg).await,
        keyboards::BTN_ALERT_CLEAR => alerts::clear_alerts(bot, state, msg).await,
        keyboards::BTN_POSITION_ADD => portfolio::start_add_flow(bot, dialogue, state, msg).await,
        keyboards::BTN_PORTFOLIO_SHOW => portfolio::send_positions(bot, state, msg).await,
        keyboards::BTN_POSITION_REMOVE => {
            portfolio::start_remove_flow(bot, dialogue, state, msg).await
        }
        keyboards::BTN_BACK => back_to_menu(&bot, &dialogue, &state, &msg).await,
        other => match Coin::from_symbol(other) {
            Some(coin) => price::send_price_card(bot, state, msg, coin).await,
            None => Ok(()),
        },
    }
}

/// Shared exit path: reset the dialogue and bring the main menu back.
pub async fn back_to_menu(
    bot: &Bot,
    dialogue: &MyDialogue,
    state: &AppState,
    msg: &Message,
) -> HandlerResult {
    dialogue.exit().await?;
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "back_to_menu", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

pub async fn handle_help(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    let mut text = i18n::translate(&locale, "help_title", None);
    for key in ["help_start", "help_help", "help_back", "help_version"] {
        text.push('\n');
        text.push_str(&i18n::translate(&locale, key, None));
    }
    text.push_str("\n\n");
    text.push_str(&i18n::translate(&locale, "help_footer", None));
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

pub async fn handle_back(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let key = match dialogue.get().await? {
        Some(BotState::Idle) | None => "back_already_idle",
        Some(_) => {
            dialogue.exit().await?;
            "back_to_menu"
        }
    };
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, key, None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

pub async fn handle_version(bot: Bot, msg: Message) -> HandlerResult {
    let git_hash = option_env!("GIT_HASH").unwrap_or("unknown");
    let git_branch = option_env!("GIT_BRANCH").unwrap_or("unknown");
    let target_os = option_env!("BUILD_TARGET_OS").unwrap_or("unknown");
    let build_time = option_env!("BUILD_TIME")
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::<chrono::Utc>::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let text = format!(
        "<b>CoinSentry</b> v{}\n\
         <b>Commit:</b> <code>{}</code> on <code>{}</code>\n\
         <b>Built:</b> {} ({})",
        env!("CARGO_PKG_VERSION"),
        git_hash,
        git_branch,
        build_time,
        target_os,
    );
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Lenient numeric parse for user-typed amounts: tolerates whitespace and
/// a decimal comma, rejects zero, negatives and non-finite values.
pub fn parse_positive_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', ".");
    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() && value > 0.0 {
        Some(value)
    } else {
        None
    }
}

/// What a numeric prompt should do with one incoming message.
#[derive(Debug, PartialEq)]
pub enum PriceStepAction {
    /// Back button: abandon the flow.
    Cancel,
    /// Not a usable number: ask again, keep the dialogue where it is.
    Reprompt,
    Accept(f64),
}

pub fn classify_price_input(text: &str) -> PriceStepAction {
    let trimmed = text.trim();
    if trimmed == keyboards::BTN_BACK {
        return PriceStepAction::Cancel;
    }
    match parse_positive_number(trimmed) {
        Some(value) => PriceStepAction::Accept(value),
        None => PriceStepAction::Reprompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_number_accepts_plain_and_comma_forms() {
        assert_eq!(parse_positive_number("42"), Some(42.0));
        assert_eq!(parse_positive_number("  0.5 "), Some(0.5));
        assert_eq!(parse_positive_number("1,25"), Some(1.25));
        assert_eq!(parse_positive_number("65000.75"), Some(65000.75));
    }

    #[test]
    fn test_parse_positive_number_rejects_junk() {
        assert_eq!(parse_positive_number("abc"), None);
        assert_eq!(parse_positive_number(""), None);
        assert_eq!(parse_positive_number("-5"), None);
        assert_eq!(parse_positive_number("0"), None);
        assert_eq!(parse_positive_number("NaN"), None);
        assert_eq!(parse_positive_number("inf"), None);
        assert_eq!(parse_positive_number("1.2.3"), None);
    }

    #[test]
    fn test_classify_price_input_routes_each_case() {
        assert_eq!(classify_price_input(keyboards::BTN_BACK), PriceStepAction::Cancel);
        assert_eq!(classify_price_input("oops"), PriceStepAction::Reprompt);
        assert_eq!(classify_price_input("3,5"), PriceStepAction::Accept(3.5));
    }

    #[test]
    fn test_menu_labels_do_not_collide_with_coin_symbols() {
        let labels = [
            keyboards::BTN_PRICE,
            keyboards::BTN_MARKET,
            keyboards::BTN_GAINERS,
            keyboards::BTN_LOSERS,
            keyboards::BTN_CHART,
            keyboards::BTN_MOOD,
            keyboards::BTN_ALERTS,
            keyboards::BTN_PORTFOLIO,
            keyboards::BTN_CURRENCY,
            keyboards::BTN_LANGUAGE,
            keyboards::BTN_BACK,
            keyboards::BTN_ALERT_ADD,
            keyboards::BTN_ALERT_LIST,
            keyboards::BTN_ALERT_CLEAR,
            keyboards::BTN_POSITION_ADD,
            keyboards::BTN_PORTFOLIO_SHOW,
            keyboards::BTN_POSITION_REMOVE,
        ];
        for label in labels {
            assert!(Coin::from_symbol(label).is_none(), "label {label} parses as a coin");
        }
    }
}
