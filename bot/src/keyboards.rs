use shared::Coin;
use teloxide::types::{KeyboardButton, KeyboardMarkup};

// Button labels double as routing tokens, so they stay fixed; message
// bodies localize, labels do not.
pub const BTN_PRICE: &str = "📈 Price";
pub const BTN_MARKET: &str = "📊 Market";
pub const BTN_GAINERS: &str = "🔥 Top gainers";
pub const BTN_LOSERS: &str = "💀 Top losers";
pub const BTN_CHART: &str = "📉 Chart";
pub const BTN_MOOD: &str = "🧠 Market mood";
pub const BTN_ALERTS: &str = "🔔 Alerts";
pub const BTN_PORTFOLIO: &str = "📦 Portfolio";
pub const BTN_CURRENCY: &str = "💱 Currency";
pub const BTN_LANGUAGE: &str = "🌐 Language";
pub const BTN_BACK: &str = "⬅️ Back";

pub const BTN_ALERT_ADD: &str = "➕ Add alert";
pub const BTN_ALERT_LIST: &str = "📋 My alerts";
pub const BTN_ALERT_CLEAR: &str = "❌ Delete alerts";

pub const BTN_POSITION_ADD: &str = "➕ Add position";
pub const BTN_PORTFOLIO_SHOW: &str = "📦 Show portfolio";
pub const BTN_POSITION_REMOVE: &str = "❌ Remove position";

pub const LANG_EN: &str = "🇬🇧 English";
pub const LANG_RU: &str = "🇷🇺 Русский";
pub const LANG_UK: &str = "🇺🇦 Українська";

pub const CURRENCIES: [&str; 3] = ["USD", "EUR", "UAH"];

fn rows(labels: &[&[&str]]) -> Vec<Vec<KeyboardButton>> {
    labels
        .iter()
        .map(|row| row.iter().map(|label| KeyboardButton::new(*label)).collect())
        .collect()
}

pub fn main_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(rows(&[
        &[BTN_PRICE, BTN_MARKET],
        &[BTN_GAINERS, BTN_LOSERS],
        &[BTN_CHART, BTN_MOOD],
        &[BTN_ALERTS, BTN_PORTFOLIO],
        &[BTN_CURRENCY, BTN_LANGUAGE],
    ]))
    .resize_keyboard()
}

pub fn coin_menu() -> KeyboardMarkup {
    let mut keyboard: Vec<Vec<KeyboardButton>> = Coin::ALL
        .chunks(3)
        .map(|chunk| chunk.iter().map(|coin| KeyboardButton::new(coin.as_str())).collect())
        .collect();
    keyboard.push(vec![KeyboardButton::new(BTN_BACK)]);
    KeyboardMarkup::new(keyboard).resize_keyboard()
}

pub fn alerts_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(rows(&[
        &[BTN_ALERT_ADD, BTN_ALERT_LIST],
        &[BTN_ALERT_CLEAR, BTN_BACK],
    ]))
    .resize_keyboard()
}

pub fn portfolio_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(rows(&[
        &[BTN_POSITION_ADD, BTN_PORTFOLIO_SHOW],
        &[BTN_POSITION_REMOVE, BTN_BACK],
    ]))
    .resize_keyboard()
}

pub fn currency_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(rows(&[&CURRENCIES, &[BTN_BACK]])).resize_keyboard()
}

pub fn language_menu() -> KeyboardMarkup {
    KeyboardMarkup::new(rows(&[&[LANG_EN], &[LANG_RU], &[LANG_UK]])).resize_keyboard()
}
