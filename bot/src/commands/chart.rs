use std::sync::Arc;

use shared::Coin;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::warn;

use crate::commands::back_to_menu;
use crate::i18n;
use crate::keyboards;
use crate::state::{AppState, BotState, HandlerResult, MyDialogue};

/// 48 hourly candles, two days of price action.
const CHART_HOURS: u32 = 48;

pub async fn start_chart_flow(
    bot: Bot,
    dialogue: MyDialogue,
    state: Arc<AppState>,
    msg: Message,
) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    bot.send_message(msg.chat.id, i18n::translate(&locale, "chart_pick_coin", None))
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::coin_menu())
        .await?;
    dialogue.update(BotState::AwaitingChartCoin).await?;
    Ok(())
}

/// Coin tap inside the chart flow: fetch closes, render, send as a photo.
/// Any failure degrades to a text reply; the flow ends either way.
pub async fn handle_chart_coin_input(
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
    let png = match state.market.get_closes(coin, CHART_HOURS).await {
        Some(closes) => state.charts.render_line_chart(coin, &closes).await,
        None => Err(anyhow::anyhow!("no close series for {}", coin)),
    };

    match png {
        Ok(png) => {
            let caption = i18n::translate(
                &locale,
                "chart_caption",
                Some(&[("coin", coin.as_str()), ("hours", &CHART_HOURS.to_string())]),
            );
            bot.send_photo(msg.chat.id, InputFile::memory(png))
                .caption(caption)
                .reply_markup(keyboards::main_menu())
                .await?;
        }
        Err(err) => {
            warn!("chart for {} failed: {:#}", coin, err);
            bot.send_message(
                msg.chat.id,
                i18n::translate(&locale, "chart_unavailable", Some(&[("coin", coin.as_str())])),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::main_menu())
            .await?;
        }
    }
    dialogue.exit().await?;
    Ok(())
}
