use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read a whole persisted collection. Any failure, missing file, bad JSON or
/// IO error, yields the default so a damaged file never takes the bot down.
pub fn load_or_default<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("failed to read {}: {}", path.display(), err);
            }
            return T::default();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("ignoring corrupt {}: {}", path.display(), err);
            T::default()
        }
    }
}

/// Rewrite a persisted collection wholesale. Writes a sibling temp file and
/// renames it over the target so a reader never observes a partial write.
pub fn save<T>(path: &Path, value: &T) -> Result<(), anyhow::Error>
where
    T: Serialize,
{
    let raw = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, raw).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Vec<String> = load_or_default(&dir.path().join("nope.json"));
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_corrupt_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let loaded: Vec<String> = load_or_default(&path);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        let value = vec!["a".to_string(), "b".to_string()];
        save(&path, &value).unwrap();
        let loaded: Vec<String> = load_or_default(&path);
        assert_eq!(loaded, value);
    }

    #[test]
    fn test_save_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        save(&path, &vec![1u32, 2, 3]).unwrap();
        save(&path, &vec![9u32]).unwrap();
        let loaded: Vec<u32> = load_or_default(&path);
        assert_eq!(loaded, vec![9]);
        // No stray temp file left behind after the rename.
        assert!(!dir.path().join("data.tmp").exists());
    }
}
