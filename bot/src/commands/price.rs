use std::sync::Arc;

use shared::Coin;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::i18n;
use crate::keyboards;
use crate::state::{AppState, HandlerResult};

/// Show the coin keyboard. No dialogue step: a coin tapped at idle goes
/// straight to the price card.
pub async fn prompt_coin(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "pick_coin", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::coin_menu())
        .await?;
    Ok(())
}

/// Spot price card in the user's display currency.
pub async fn send_price_card(
    bot: Bot,
    state: Arc<AppState>,
    msg: Message,
    coin: Coin,
) -> HandlerResult {
    let chat_id = msg.chat.id.0;
    let locale = state.prefs.get_language(chat_id).await;

    let text = match state.market.get_ticker(coin).await {
        Some(ticker) => {
            let currency = state.prefs.get_currency(chat_id).await;
            let rate = state.rates.usd_rate(&currency).await;
            i18n::translate(
                &locale,
                "price_card",
                Some(&[
                    ("coin", coin.as_str()),
                    ("price", &i18n::format_price(ticker.price * rate)),
                    ("currency", &currency),
                    ("change", &i18n::format_change(ticker.change24)),
                ]),
            )
        }
        None => i18n::translate(&locale, "price_unavailable", Some(&[("coin", coin.as_str())])),
    };

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}
