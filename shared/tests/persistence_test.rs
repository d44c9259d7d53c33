//! Round-trip tests for the persisted collection shapes.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use shared::models::{AlertTrigger, Coin, Position, PortfolioBook, PreferenceMap, UserPreference};
    use shared::storage;

    #[test]
    fn test_alert_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.json");

        let mut trigger = AlertTrigger::new(1001, Coin::Btc, 65000.0);
        trigger.last_notified_price = 65120.5;
        let triggers = vec![trigger.clone(), AlertTrigger::new(1002, Coin::Ton, 9.5)];

        storage::save(&path, &triggers).unwrap();
        let loaded: Vec<AlertTrigger> = storage::load_or_default(&path);

        assert_eq!(loaded, triggers);
        assert_eq!(loaded[0].last_notified_price, 65120.5);
    }

    #[test]
    fn test_portfolio_file_round_trip_with_coin_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.json");

        let mut positions = BTreeMap::new();
        positions.insert(
            Coin::Eth,
            Position {
                amount: 2.5,
                entry_price: 3100.0,
            },
        );
        positions.insert(
            Coin::Sol,
            Position {
                amount: 40.0,
                entry_price: 0.0,
            },
        );
        let mut book = PortfolioBook::new();
        book.insert(555, positions);

        storage::save(&path, &book).unwrap();
        let loaded: PortfolioBook = storage::load_or_default(&path);

        assert_eq!(loaded, book);
        assert_eq!(loaded[&555][&Coin::Eth].amount, 2.5);
    }

    #[test]
    fn test_settings_file_tolerates_partial_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        // A record written by an older build may carry only one of the two
        // fields; the other must come back as None, not an error.
        std::fs::write(&path, r#"{"7": {"cur_ignored": true, "language": "ru"}}"#).unwrap();
        let loaded: PreferenceMap = storage::load_or_default(&path);
        assert_eq!(loaded[&7].language.as_deref(), Some("ru"));
        assert_eq!(loaded[&7].currency, None);

        let mut prefs = PreferenceMap::new();
        prefs.insert(
            7,
            UserPreference {
                currency: Some("EUR".to_string()),
                language: Some("uk".to_string()),
            },
        );
        storage::save(&path, &prefs).unwrap();
        let reloaded: PreferenceMap = storage::load_or_default(&path);
        assert_eq!(reloaded, prefs);
    }
}
