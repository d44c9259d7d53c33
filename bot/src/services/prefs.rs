use std::path::{Path, PathBuf};

use shared::models::{PreferenceMap, UserPreference};
use shared::storage;
use tokio::sync::RwLock;
use tracing::{info, warn};

const SETTINGS_FILE: &str = "settings.json";

/// Per-user currency and language choices, mirrored to settings.json.
/// Reads never create records, so an unknown user keeps getting the
/// configured defaults until they explicitly pick something.
pub struct PreferenceService {
    path: PathBuf,
    default_currency: String,
    default_language: String,
    prefs: RwLock<PreferenceMap>,
}

impl PreferenceService {
    pub fn load(data_dir: &Path, default_currency: &str, default_language: &str) -> Self {
        let path = data_dir.join(SETTINGS_FILE);
        let prefs: PreferenceMap = storage::load_or_default(&path);
        info!("loaded settings for {} user(s) from {}", prefs.len(), path.display());
        PreferenceService {
            path,
            default_currency: default_currency.to_string(),
            default_language: default_language.to_string(),
            prefs: RwLock::new(prefs),
        }
    }

    pub async fn get_currency(&self, chat_id: i64) -> String {
        self.prefs
            .read()
            .await
            .get(&chat_id)
            .and_then(|p| p.currency.clone())
            .unwrap_or_else(|| self.default_currency.clone())
    }

    pub async fn get_language(&self, chat_id: i64) -> String {
        self.prefs
            .read()
            .await
            .get(&chat_id)
            .and_then(|p| p.language.clone())
            .unwrap_or_else(|| self.default_language.clone())
    }

    /// A user counts as known once they have picked a language, which
    /// is the first step of onboarding.
    pub async fn is_known(&self, chat_id: i64) -> bool {
        self.prefs
            .read()
            .await
            .get(&chat_id)
            .map(|p| p.language.is_some())
            .unwrap_or(false)
    }

    pub async fn set_currency(&self, chat_id: i64, currency: &str) {
        let mut prefs = self.prefs.write().await;
        prefs.entry(chat_id).or_insert_with(UserPreference::default).currency =
            Some(currency.to_string());
        self.persist(&prefs);
    }

    pub async fn set_language(&self, chat_id: i64, language: &str) {
        let mut prefs = self.prefs.write().await;
        prefs.entry(chat_id).or_insert_with(UserPreference::default).language =
            Some(language.to_string());
        self.persist(&prefs);
    }

    fn persist(&self, prefs: &PreferenceMap) {
        if let Err(err) = storage::save(&self.path, prefs) {
            warn!("failed to persist settings: {:#}", err);
        }
    }
}
