use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::info;

use crate::commands::back_to_menu;
use crate::i18n;
use crate::keyboards;
use crate::state::{AppState, BotState, HandlerResult, MyDialogue};

/// /start: greet a returning user, or walk a new one through language
/// and currency selection.
pub async fn handle_start(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    info!("Processing /start command from chat {}", chat_id);

    if state.prefs.is_known(chat_id).await {
        let locale = state.prefs.get_language(chat_id).await;
        bot.send_message(
            msg.chat.id,
            i18n::translate(&locale, "welcome_back", Some(&[("bot", &state.config.bot_name)])),
        )
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
        dialogue.exit().await?;
        return Ok(());
    }

    // New user: the prompt uses the deployment default language since no
    // choice exists yet.
    let locale = state.config.default_language.clone();
    bot.send_message(msg.chat.id, i18n::translate(&locale, "choose_language", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::language_menu())
        .await?;
    dialogue.update(BotState::AwaitingLanguage).await?;
    Ok(())
}

/// Language keyboard tap. During onboarding this continues straight into
/// the currency step; from the settings menu it just confirms and exits.
pub async fn handle_language_input(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text.trim().to_string(),
        None => return Ok(()),
    };
    let tag = match text.as_str() {
        keyboards::LANG_EN => "en",
        keyboards::LANG_RU => "ru",
        keyboards::LANG_UK => "uk",
        // Not one of the offered buttons: stay on this step.
        _ => return Ok(()),
    };

    let chat_id = msg.chat.id.0;
    let first_time = !state.prefs.is_known(chat_id).await;
    state.prefs.set_language(chat_id, tag).await;

    if first_time {
        bot.send_message(msg.chat.id, i18n::translate(tag, "choose_currency", None))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::currency_menu())
            .await?;
        dialogue
            .update(BotState::AwaitingCurrency { onboarding: true })
            .await?;
    } else {
        bot.send_message(msg.chat.id, i18n::translate(tag, "language_updated", None))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::main_menu())
            .await?;
        dialogue.exit().await?;
    }
    Ok(())
}

/// Currency keyboard tap, shared by onboarding and the settings menu.
pub async fn handle_currency_input(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
    onboarding: bool,
) -> HandlerResult {
    let text = match msg.text() {
        Some(text) => text.trim().to_string(),
        None => return Ok(()),
    };
    if text == keyboards::BTN_BACK {
        return back_to_menu(&bot, &dialogue, &state, &msg).await;
    }
    let code = text.to_uppercase();
    if !keyboards::CURRENCIES.contains(&code.as_str()) {
        return Ok(());
    }

    let chat_id = msg.chat.id.0;
    state.prefs.set_currency(chat_id, &code).await;
    let locale = state.prefs.get_language(chat_id).await;
    let key = if onboarding { "onboarding_done" } else { "currency_updated" };

    bot.send_message(
        msg.chat.id,
        i18n::translate(&locale, key, Some(&[("currency", &code)])),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::main_menu())
    .await?;
    dialogue.exit().await?;
    Ok(())
}

/// Settings menu entry: change display currency.
pub async fn start_currency_flow(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "choose_currency", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::currency_menu())
        .await?;
    dialogue
        .update(BotState::AwaitingCurrency { onboarding: false })
        .await?;
    Ok(())
}

/// Settings menu entry: change language.
pub async fn start_language_flow(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "choose_language", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::language_menu())
        .await?;
    dialogue.update(BotState::AwaitingLanguage).await?;
    Ok(())
}
