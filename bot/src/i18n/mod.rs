//! Translation helpers over the rust-i18n tables loaded at crate root.
//!
//! `rust_i18n::i18n!` is invoked in main.rs, which generates the crate-wide
//! lookup the `t!` macro resolves against. Handlers go through `translate`
//! so keys and argument names can be decided at runtime.

pub const SUPPORTED_LOCALES: [&str; 3] = ["en", "ru", "uk"];

/// Clamp an arbitrary stored tag to a locale we ship translations for.
pub fn normalize_locale(tag: &str) -> &'static str {
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|&l| l == tag)
        .unwrap_or("en")
}

/// Look up `key` in `locale` and substitute `%{name}` placeholders.
/// Argument values are HTML-escaped because messages are sent with HTML
/// parse mode.
pub fn translate(locale: &str, key: &str, args: Option<&[(&str, &str)]>) -> String {
    let locale = normalize_locale(locale);
    let mut text = rust_i18n::t!(key, locale = locale).to_string();
    if let Some(args) = args {
        for (name, value) in args {
            let escaped = value
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;");
            text = text.replace(&format!("%{{{}}}", name), &escaped);
        }
    }
    text
}

/// Prices at or above one unit read fine with cents; smaller ones need more
/// digits to stay meaningful.
pub fn format_price(value: f64) -> String {
    if value >= 1.0 {
        format!("{:.2}", value)
    } else {
        format!("{:.4}", value)
    }
}

pub fn format_change(value: f64) -> String {
    format!("{:+.2}%", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_locale_whitelists() {
        for tag in SUPPORTED_LOCALES {
            assert_eq!(normalize_locale(tag), tag);
        }
        assert_eq!(normalize_locale("xx"), "en");
        assert_eq!(normalize_locale(""), "en");
    }

    #[test]
    fn test_translate_substitutes_arguments() {
        let text = translate("en", "alert_fired", Some(&[("coin", "BTC"), ("price", "65000.00")]));
        assert!(text.contains("BTC"));
        assert!(text.contains("65000.00"));
        assert!(!text.contains("%{coin}"));
    }

    #[test]
    fn test_translate_escapes_html_in_arguments() {
        let text = translate("en", "welcome_back", Some(&[("bot", "<Coin&Sentry>")]));
        assert!(text.contains("&lt;Coin&amp;Sentry&gt;"));
    }

    #[test]
    fn test_translate_localizes_per_locale() {
        let en = translate("en", "portfolio_empty", None);
        let ru = translate("ru", "portfolio_empty", None);
        assert_ne!(en, ru);
    }

    #[test]
    fn test_format_price_scales_precision() {
        assert_eq!(format_price(65000.126), "65000.13");
        assert_eq!(format_price(65000.124), "65000.12");
        assert_eq!(format_price(1.0), "1.00");
        assert_eq!(format_price(0.5612), "0.5612");
    }

    #[test]
    fn test_format_change_keeps_sign() {
        assert_eq!(format_change(1.234), "+1.23%");
        assert_eq!(format_change(-0.5), "-0.50%");
        assert_eq!(format_change(0.0), "+0.00%");
    }
}
