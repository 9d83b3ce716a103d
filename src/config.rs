use anyhow::Result;
use directories::ProjectDirs;
use serde_json::Error as JsonError;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const OPENAI_KEY: &str = "OPENAI_KEY";
pub const MODEL: &str = "MODEL";
pub const SHELL: &str = "SHELL";

/// The recognized settings and their defaults. `set` rejects anything else.
pub const DEFAULTS: [(&str, &str); 3] = [(OPENAI_KEY, ""), (MODEL, "gpt-4o-mini"), (SHELL, "bash")];

pub type ConfigMap = BTreeMap<String, String>;

#[derive(Debug)]
pub enum ConfigError {
    UnknownKey(String),
    Storage(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKey(key) => write!(f, "Unknown config key: {}", key),
            Self::Storage(msg) => write!(f, "Config storage error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::Storage(error.to_string())
    }
}

impl From<JsonError> for ConfigError {
    fn from(error: JsonError) -> Self {
        ConfigError::Storage(error.to_string())
    }
}

/// Flat key-value settings persisted as `config.json`.
///
/// The whole document is read and rewritten on every mutation. There is no
/// file locking: two concurrent invocations can race and the last writer
/// wins, which is accepted for a single-user interactive tool.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("config.json"),
        }
    }

    pub fn open_default() -> Result<Self> {
        Ok(Self::new(&config_dir()?))
    }

    pub fn keys() -> impl Iterator<Item = &'static str> {
        DEFAULTS.iter().map(|(key, _)| *key)
    }

    pub fn default_map() -> ConfigMap {
        DEFAULTS
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    fn default_for(key: &str) -> Option<&'static str> {
        DEFAULTS
            .iter()
            .find(|(known, _)| *known == key)
            .map(|(_, value)| *value)
    }

    /// Reads the document. Missing or malformed content is self-healing: the
    /// defaults are rewritten and returned instead of an error. Missing keys
    /// are filled in so all three are always present.
    pub fn load(&self) -> ConfigMap {
        match fs::read_to_string(&self.path) {
            Ok(content) => match serde_json::from_str::<ConfigMap>(&content) {
                Ok(mut map) => {
                    for (key, value) in DEFAULTS {
                        map.entry(key.to_string()).or_insert_with(|| value.to_string());
                    }
                    map
                }
                Err(e) => {
                    warn!(path = ?self.path, error = %e, "malformed config, resetting to defaults");
                    self.reset()
                }
            },
            Err(_) => self.reset(),
        }
    }

    fn reset(&self) -> ConfigMap {
        let defaults = Self::default_map();
        if let Err(e) = self.save(&defaults) {
            warn!(path = ?self.path, error = %e, "could not write default config");
        }
        defaults
    }

    fn save(&self, map: &ConfigMap) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> String {
        self.get_or(key, "")
    }

    /// Stored value, else the key's default, else the caller's fallback.
    pub fn get_or(&self, key: &str, fallback: &str) -> String {
        self.load()
            .get(key)
            .cloned()
            .or_else(|| Self::default_for(key).map(str::to_string))
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Persists the full document after mutation. Unrecognized keys are
    /// rejected without touching the file.
    pub fn set(&self, key: &str, value: &str) -> Result<(), ConfigError> {
        if Self::default_for(key).is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        let mut map = self.load();
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    pub fn clear(&self) -> Result<(), ConfigError> {
        self.save(&Self::default_map())
    }

    /// Display-only rendering with the API key masked.
    pub fn show(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.load() {
            let rendered = if key == OPENAI_KEY && !value.is_empty() {
                mask_secret(value)
            } else if value.is_empty() {
                "(not set)".to_string()
            } else {
                value.clone()
            };
            out.push_str(&format!("{:<15}: {}\n", key, rendered));
        }
        out
    }
}

/// Reveal the first 7 and last 4 characters, mask the middle. Values too
/// short for those windows not to overlap are fully masked.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 11 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}{}", head, "*".repeat(chars.len() - 11), tail)
}

/// Soft validation of the secret-prefix convention. The value is stored
/// verbatim either way.
pub fn secret_key_warning(key: &str, value: &str) -> Option<String> {
    if key == OPENAI_KEY && !value.is_empty() && !value.starts_with("sk-") {
        Some("OpenAI API keys typically start with 'sk-'".to_string())
    } else {
        None
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "askcmd", "askcmd")
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        let map = store.load();
        assert_eq!(map, ConfigStore::default_map());
        assert!(dir.path().join("config.json").exists());
    }

    #[test]
    fn set_then_load_roundtrips_and_leaves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        store.set(OPENAI_KEY, "sk-proj-abcdef1234567890").unwrap();
        store.set(SHELL, "zsh").unwrap();

        let map = store.load();
        assert_eq!(map[OPENAI_KEY], "sk-proj-abcdef1234567890");
        assert_eq!(map[SHELL], "zsh");
        assert_eq!(map[MODEL], "gpt-4o-mini");
    }

    #[test]
    fn unknown_key_is_rejected_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.set(MODEL, "gpt-4o").unwrap();
        let before = fs::read_to_string(dir.path().join("config.json")).unwrap();

        let result = store.set("TEMPERATURE", "0.7");
        assert!(matches!(result, Err(ConfigError::UnknownKey(key)) if key == "TEMPERATURE"));

        let after = fs::read_to_string(dir.path().join("config.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn clear_restores_exactly_the_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.set(MODEL, "gpt-4o").unwrap();
        store.set(SHELL, "fish").unwrap();

        store.clear().unwrap();
        assert_eq!(store.load(), ConfigStore::default_map());
    }

    #[test]
    fn malformed_document_self_heals() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), "{not json").unwrap();

        let store = ConfigStore::new(dir.path());
        assert_eq!(store.load(), ConfigStore::default_map());

        // and the file on disk was repaired
        let content = fs::read_to_string(dir.path().join("config.json")).unwrap();
        let reparsed: ConfigMap = serde_json::from_str(&content).unwrap();
        assert_eq!(reparsed, ConfigStore::default_map());
    }

    #[test]
    fn missing_keys_are_filled_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.json"), r#"{"SHELL": "zsh"}"#).unwrap();

        let store = ConfigStore::new(dir.path());
        let map = store.load();
        assert_eq!(map[SHELL], "zsh");
        assert_eq!(map[MODEL], "gpt-4o-mini");
        assert_eq!(map[OPENAI_KEY], "");
    }

    #[test]
    fn get_or_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        assert_eq!(store.get(MODEL), "gpt-4o-mini");
        assert_eq!(store.get_or("NOT_A_KEY", "fallback"), "fallback");
    }

    #[test]
    fn show_masks_the_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        store.set(OPENAI_KEY, "sk-proj-abcdefgh1234").unwrap();

        let rendering = store.show();
        assert!(rendering.contains("sk-proj*********1234"));
        assert!(!rendering.contains("abcdefgh"));
    }

    #[test]
    fn mask_secret_windows() {
        assert_eq!(mask_secret("sk-proj-abcdefgh1234"), "sk-proj*********1234");
        // short values are fully masked rather than leaking overlap
        assert_eq!(mask_secret("abc123"), "******");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn secret_prefix_warning() {
        assert!(secret_key_warning(OPENAI_KEY, "abc123").is_some());
        assert!(secret_key_warning(OPENAI_KEY, "sk-proj-abcdef").is_none());
        assert!(secret_key_warning(OPENAI_KEY, "").is_none());
        assert!(secret_key_warning(MODEL, "abc123").is_none());
    }

    #[test]
    fn warned_value_is_still_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());

        assert!(secret_key_warning(OPENAI_KEY, "abc123").is_some());
        store.set(OPENAI_KEY, "abc123").unwrap();
        assert_eq!(store.get(OPENAI_KEY), "abc123");
    }
}
