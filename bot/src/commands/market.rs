use std::sync::Arc;

use shared::Coin;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

use crate::i18n;
use crate::keyboards;
use crate::state::{AppState, HandlerResult};

/// 24h change for every tracked coin, one line each.
pub async fn send_overview(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    let mut text = i18n::translate(&locale, "market_overview_title", None);
    for coin in Coin::ALL {
        let change = state.market.get_change24(coin).await;
        text.push('\n');
        text.push_str(&format!("{} {}", coin, i18n::format_change(change)));
    }
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

/// Market-wide top five by 24h change, best or worst first.
pub async fn send_movers(
    bot: Bot,
    state: Arc<AppState>,
    msg: Message,
    gainers: bool,
) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;
    let title_key = if gainers { "top_gainers_title" } else { "top_losers_title" };

    let text = match state.market.top_movers(gainers).await {
        Some(movers) => {
            let mut text = i18n::translate(&locale, title_key, None);
            for (rank, mover) in movers.iter().enumerate() {
                text.push('\n');
                text.push_str(&format!(
                    "{}. {} {}",
                    rank + 1,
                    mover.symbol,
                    i18n::format_change(mover.change24)
                ));
            }
            text
        }
        None => i18n::translate(&locale, "movers_unavailable", None),
    };

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

/// One-line market read from the average 24h change of the top gainers.
pub async fn send_mood(bot: Bot, state: Arc<AppState>, msg: Message) -> HandlerResult {
    let locale = state.prefs.get_language(msg.chat.id.0).await;

    let text = match state.market.top_movers(true).await {
        Some(movers) if !movers.is_empty() => {
            let avg = movers.iter().map(|m| m.change24).sum::<f64>() / movers.len() as f64;
            i18n::translate(
                &locale,
                mood_bucket(avg),
                Some(&[("avg", &i18n::format_change(avg))]),
            )
        }
        _ => i18n::translate(&locale, "mood_unavailable", None),
    };

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::Html)
        .reply_markup(keyboards::main_menu())
        .await?;
    Ok(())
}

fn mood_bucket(avg: f64) -> &'static str {
    if avg > 5.0 {
        "mood_strong_growth"
    } else if avg > 1.0 {
        "mood_moderate_growth"
    } else if avg > -1.0 {
        "mood_sideways"
    } else {
        "mood_downward"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_buckets_split_at_documented_boundaries() {
        assert_eq!(mood_bucket(8.0), "mood_strong_growth");
        assert_eq!(mood_bucket(5.0), "mood_moderate_growth");
        assert_eq!(mood_bucket(1.1), "mood_moderate_growth");
        assert_eq!(mood_bucket(1.0), "mood_sideways");
        assert_eq!(mood_bucket(0.0), "mood_sideways");
        assert_eq!(mood_bucket(-1.0), "mood_downward");
        assert_eq!(mood_bucket(-7.5), "mood_downward");
    }
}
