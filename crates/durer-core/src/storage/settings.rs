//! Application settings and their repository.
//!
//! Settings travel two ways: embedded in every saved snapshot (camelCase
//! JSON, same schema the remote store holds) and flushed standalone to
//! `settings.json` so they survive between runs. Missing fields fall back
//! to defaults, so old files keep loading as the schema grows.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Embedded-content rotation settings, absent until configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedSettings {
    pub links: Vec<String>,
    pub link_switch_duration_sec: u64,
    pub embed_fade_out_sec: u64,
}

/// User-facing application settings, persisted alongside the timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_true")]
    pub embed_overflow: bool,
    #[serde(default = "default_true")]
    pub wake_lock_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_settings: Option<EmbedSettings>,
}

fn default_true() -> bool {
    true
}
fn default_font_size() -> u32 {
    10
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            font_size: default_font_size(),
            embed_overflow: true,
            wake_lock_enabled: true,
            embed_settings: None,
        }
    }
}

impl AppSettings {
    /// Replace the embed rotation. Blank link entries are dropped.
    pub fn set_embed_settings(
        &mut self,
        links: Vec<String>,
        link_switch_duration_sec: u64,
        embed_fade_out_sec: u64,
    ) {
        let links = links
            .into_iter()
            .filter(|link| !link.trim().is_empty())
            .collect();
        self.embed_settings = Some(EmbedSettings {
            links,
            link_switch_duration_sec,
            embed_fade_out_sec,
        });
    }
}

/// Load-once, flush-on-mutation repository for [`AppSettings`].
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read settings, falling back to defaults on a missing or unreadable
    /// file. Partial files are merged over defaults by the serde field
    /// defaults above.
    pub fn load_or_default(&self) -> AppSettings {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("discarding unreadable settings file: {e}");
                AppSettings::default()
            }),
            Err(_) => AppSettings::default(),
        }
    }

    pub fn save(&self, settings: &AppSettings) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(settings)?;
        std::fs::write(&self.path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run() {
        let settings = AppSettings::default();
        assert!(settings.dark_mode);
        assert_eq!(settings.font_size, 10);
        assert!(settings.embed_overflow);
        assert!(settings.wake_lock_enabled);
        assert!(settings.embed_settings.is_none());
    }

    #[test]
    fn partial_json_merges_over_defaults() {
        let settings: AppSettings = serde_json::from_str(r#"{"darkMode": false}"#).unwrap();
        assert!(!settings.dark_mode);
        assert_eq!(settings.font_size, 10);
        assert!(settings.wake_lock_enabled);
    }

    #[test]
    fn embed_settings_drop_blank_links() {
        let mut settings = AppSettings::default();
        settings.set_embed_settings(
            vec![
                "https://example.com/a".to_string(),
                "   ".to_string(),
                String::new(),
                "https://example.com/b".to_string(),
            ],
            300,
            5,
        );
        let embed = settings.embed_settings.unwrap();
        assert_eq!(embed.links.len(), 2);
        assert_eq!(embed.link_switch_duration_sec, 300);
    }

    #[test]
    fn store_round_trips_and_survives_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::at(dir.path().join("settings.json"));

        assert_eq!(store.load_or_default(), AppSettings::default());

        let mut settings = AppSettings::default();
        settings.font_size = 6;
        store.save(&settings).unwrap();
        assert_eq!(store.load_or_default(), settings);

        std::fs::write(dir.path().join("settings.json"), "{nope").unwrap();
        assert_eq!(store.load_or_default(), AppSettings::default());
    }
}
