use std::sync::Arc;

use shared::Coin;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::info;

use crate::commands::{back_to_menu, classify_price_input, PriceStepAction};
use crate::i18n;
use crate::keyboards;
use crate::services::alerts::AlertError;
use crate::state::{AppState, BotState, HandlerResult, MyDialogue};

pub async fn send_alerts_menu(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "alerts_menu", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::alerts_menu())
        .await?;
    Ok(())
}

pub async fn start_add_flow(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "alert_pick_coin", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::coin_menu())
        .await?;
    dialogue.update(BotState::AwaitingAlertCoin).await?;
    Ok(())
}

pub async fn handle_alert_coin_input(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text.trim().to_string(),
        None => return Ok(()),
    };
    if text == keyboards::BTN_BACK {
        return back_to_menu(&bot, &dialogue, &state, &msg).await;
    }
    let coin = match Coin::from_symbol(&text) {
        Some(coin) => coin,
        None => return Ok(()),
    };

    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(
        msg.chat.id,
        i18n::translate(&locale, "alert_enter_price", Some(&[("coin", coin.as_str())])),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    dialogue.update(BotState::AwaitingAlertPrice { coin }).await?;
    Ok(())
}

/// Target price step. Bad input re-prompts without losing the chosen coin;
/// a full registry surfaces the limit and ends the flow.
pub async fn handle_alert_price_input(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
    coin: Coin,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text.to_string(),
        None => return Ok(()),
    };
    let chat_id = msg.chat.id.0;
    let locale = state.prefs.get_language(chat_id).await;

    let target = match classify_price_input(&text) {
        PriceStepAction::Cancel => return back_to_menu(&bot, &dialogue, &state, &msg).await,
        PriceStepAction::Reprompt => {
            bot.send_message(msg.chat.id, i18n::translate(&locale, "enter_valid_number", None))
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
        PriceStepAction::Accept(value) => value,
    };

    let reply = match state.alerts.add(chat_id, coin, target).await {
        Ok(trigger) => {
            info!("chat {} set alert: {} at {}", chat_id, coin, target);
            i18n::translate(
                &locale,
                "alert_added",
                Some(&[
                    ("coin", trigger.coin.as_str()),
                    ("price", &i18n::format_price(trigger.target_price)),
                ]),
            )
        }
        Err(AlertError::CapacityExceeded(limit)) => i18n::translate(
            &locale,
            "alert_limit_reached",
            Some(&[("limit", &limit.to_string())]),
        ),
    };

    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    dialogue.exit().await?;
    Ok(())
}

pub async fn send_alert_list(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let locale = state.prefs.get_language(chat_id).await;

    let triggers = state.alerts.list_for(chat_id).await;
    let text = if triggers.is_empty() {
        i18n::translate(&locale, "alert_list_empty", None)
    } else {
        let mut text = i18n::translate(&locale, "alert_list_title", None);
        for trigger in &triggers {
            text.push('\n');
            text.push_str(&format!(
                "• {} → {}",
                trigger.coin,
                i18n::format_price(trigger.target_price)
            ));
        }
        text
    };

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::alerts_menu())
        .await?;
    Ok(())
}

pub async fn clear_alerts(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let removed = state.alerts.remove_all_for(chat_id).await;
    let locale = state.prefs.get_language(chat_id).await;
    bot.send_message(
        msg.chat.id,
        i18n::translate(&locale, "alerts_cleared", Some(&[("count", &removed.to_string())])),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::main_menu())
    .await?;
    Ok(())
}
