use std::sync::Arc;

use shared::Coin;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::commands::{back_to_menu, classify_price_input, PriceStepAction};
use crate::i18n;
use crate::keyboards;
use crate::state::{AppState, BotState, HandlerResult, MyDialogue};

pub async fn send_portfolio_menu(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "portfolio_menu", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::portfolio_menu())
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
    bot.send_message(msg.chat.id, i18n::translate(&locale, "position_pick_coin", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::coin_menu())
        .await?;
    dialogue.update(BotState::AwaitingPortfolioCoin).await?;
    Ok(())
}

pub async fn handle_portfolio_coin_input(
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
        i18n::translate(&locale, "position_enter_amount", Some(&[("coin", coin.as_str())])),
    )
    .parse_mode(ParseMode::Html)
    .await?;
    dialogue
        .update(BotState::AwaitingPortfolioAmount { coin })
        .await?;
    Ok(())
}

/// Amount step. The entry price is pinned to the current quote; without
/// one the position is stored at entry 0 and shows no profit figure.
pub async fn handle_portfolio_amount_input(
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

    let amount = match classify_price_input(&text) {
        PriceStepAction::Cancel => return back_to_menu(&bot, &dialogue, &state, &msg).await,
        PriceStepAction::Reprompt => {
            bot.send_message(msg.chat.id, i18n::translate(&locale, "enter_valid_number", None))
                .parse_mode(ParseMode::Html)
                .await?;
            return Ok(());
        }
        PriceStepAction::Accept(value) => value,
    };

    let entry_price = state.market.get_price(coin).await.unwrap_or(0.0);
    state.portfolio.upsert(chat_id, coin, amount, entry_price).await;

    bot.send_message(
        msg.chat.id,
        i18n::translate(
            &locale,
            "position_added",
            Some(&[("coin", coin.as_str()), ("amount", &amount.to_string())]),
        ),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::main_menu())
    .await?;
    dialogue.exit().await?;
    Ok(())
}

/// Holdings valued at current prices in the display currency, with profit
/// against the recorded entry where both sides are known.
pub async fn send_positions(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let locale = state.prefs.get_language(chat_id).await;

    let positions = state.portfolio.positions_for(chat_id).await;
    if positions.is_empty() {
        bot.send_message(msg.chat.id, i18n::translate(&locale, "portfolio_empty", None))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::portfolio_menu())
            .await?;
        return Ok(());
    }

    let currency = state.prefs.get_currency(chat_id).await;
    let rate = state.rates.usd_rate(&currency).await;
    let mut text = i18n::translate(&locale, "portfolio_title", None);
    let mut total = 0.0;

    for (coin, position) in &positions {
        text.push('\n');
        match state.market.get_price(*coin).await {
            Some(price) => {
                let value = price * position.amount * rate;
                total += value;
                let mut line = format!(
                    "• {}: {} ≈ {} {}",
                    coin,
                    position.amount,
                    i18n::format_price(value),
                    currency
                );
                if position.entry_price > 0.0 {
                    let pnl = (price - position.entry_price) / position.entry_price * 100.0;
                    line.push_str(&format!(" ({})", i18n::format_change(pnl)));
                }
                text.push_str(&line);
            }
            None => {
                text.push_str(&format!("• {}: {} ≈ ?", coin, position.amount));
            }
        }
    }

    text.push_str("\n\n");
    text.push_str(&i18n::translate(
        &locale,
        "portfolio_total",
        Some(&[("total", &i18n::format_price(total)), ("currency", &currency)]),
    ));

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::portfolio_menu())
        .await?;
    Ok(())
}

pub async fn start_remove_flow(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "position_pick_remove", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::coin_menu())
        .await?;
    dialogue.update(BotState::AwaitingPortfolioRemove).await?;
    Ok(())
}

pub async fn handle_position_remove_input(
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

    let chat_id = msg.chat.id.0;
    let locale = state.prefs.get_language(chat_id).await;
    let key = if state.portfolio.remove(chat_id, coin).await {
        "position_removed"
    } else {
        "position_not_found"
    };

    bot.send_message(
        msg.chat.id,
        i18n::translate(&locale, key, Some(&[("coin", coin.as_str())])),
    )
    .parse_mode(ParseMode::Html)
    .reply_markup(keyboards::main_menu())
    .await?;
    dialogue.exit().await?;
    Ok(())
}
