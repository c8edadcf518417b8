//! Settings snapshot and the injected key-value store.
//!
//! The core does not own persistence; the host binding loads a snapshot from
//! its key-value store, hands it over, and pushes fresh snapshots whenever
//! the stored values change.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Popup density. `Full` starts the pipeline the moment a selection arrives;
/// `Compact` waits for an explicit preview or direct apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PopupMode {
    #[default]
    Full,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub translation_enabled: bool,
    pub popup_mode: PopupMode,
    /// Hostnames the popup is disabled on. The command channel stays active
    /// regardless.
    pub disabled_urls: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self { translation_enabled: true, popup_mode: PopupMode::Full, disabled_urls: Vec::new() }
    }
}

impl Settings {
    /// Whether the popup should react to selections on `host`.
    pub fn enabled_for(&self, host: &str) -> bool {
        self.translation_enabled && !self.disabled_urls.iter().any(|url| url == host)
    }

    pub fn disable_for(&mut self, host: &str) {
        if !self.disabled_urls.iter().any(|url| url == host) {
            self.disabled_urls.push(host.to_string());
        }
    }

    pub fn enable_for(&mut self, host: &str) {
        self.disabled_urls.retain(|url| url != host);
    }
}

/// Injected persistence for [`Settings`]. Backed by whatever key-value store
/// the host offers.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn load(&self) -> Result<Settings>;
    async fn save(&self, settings: &Settings) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_the_full_popup() {
        let settings = Settings::default();
        assert!(settings.translation_enabled);
        assert_eq!(settings.popup_mode, PopupMode::Full);
        assert!(settings.disabled_urls.is_empty());
    }

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());

        let settings: Settings =
            serde_json::from_str(r#"{"popupMode":"compact"}"#).unwrap();
        assert_eq!(settings.popup_mode, PopupMode::Compact);
        assert!(settings.translation_enabled);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut settings = Settings::default();
        settings.popup_mode = PopupMode::Compact;
        settings.disable_for("example.com");
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), settings);
    }

    #[test]
    fn disabled_hosts_suppress_the_popup() {
        let mut settings = Settings::default();
        settings.disable_for("docs.example.com");
        settings.disable_for("docs.example.com"); // no duplicate
        assert_eq!(settings.disabled_urls.len(), 1);
        assert!(!settings.enabled_for("docs.example.com"));
        assert!(settings.enabled_for("example.com"));

        settings.enable_for("docs.example.com");
        assert!(settings.enabled_for("docs.example.com"));

        settings.translation_enabled = false;
        assert!(!settings.enabled_for("example.com"));
    }

    struct MemoryStore {
        stored: std::sync::Mutex<Option<String>>,
    }

    #[async_trait]
    impl SettingsStore for MemoryStore {
        async fn load(&self) -> Result<Settings> {
            let stored = self.stored.lock().unwrap();
            Ok(match stored.as_deref() {
                Some(json) => serde_json::from_str(json)?,
                None => Settings::default(),
            })
        }
        async fn save(&self, settings: &Settings) -> Result<()> {
            *self.stored.lock().unwrap() = Some(serde_json::to_string(settings)?);
            Ok(())
        }
    }

    #[tokio::test]
    async fn store_round_trips_and_defaults_when_empty() {
        let store = MemoryStore { stored: std::sync::Mutex::new(None) };
        assert_eq!(store.load().await.unwrap(), Settings::default());

        let mut settings = Settings::default();
        settings.popup_mode = PopupMode::Compact;
        settings.disable_for("example.com");
        store.save(&settings).await.unwrap();
        assert_eq!(store.load().await.unwrap(), settings);
    }
}
