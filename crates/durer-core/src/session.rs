//! Session orchestration.
//!
//! One [`Session`] pairs the live countdown with the settings repository,
//! the saved-state store and the share client, and routes every mutation
//! through persistence. This replaces the original design's mutable
//! current-ID captured in closures: the pairing is an explicit object and
//! the active identifier lives in exactly one place (the store).
//!
//! Persistence order on every mutation: timer cache and settings flush
//! synchronously, then the active saved entry is upserted (which mirrors
//! remotely best-effort). Local writes complete before the call returns,
//! so a later read in the same session always sees the latest state.

use std::path::Path;

use chrono::Local;
use url::Url;
use uuid::Uuid;

use crate::error::{Result, ShareError, StoreError};
use crate::events::Event;
use crate::share::ShareClient;
use crate::storage::{
    self, AppSettings, Config, SavedState, SettingsStore, StateStore, TimerCache,
};
use crate::timer::{now_ms, CountdownTimer, TimerState};

pub struct Session {
    timer: CountdownTimer,
    settings: AppSettings,
    store: StateStore,
    settings_store: SettingsStore,
    cache: TimerCache,
    share: ShareClient,
}

impl Session {
    /// Open the session in the configured data directory.
    pub fn open(config: &Config) -> Result<Self> {
        let dir = storage::data_dir()?;
        Self::open_in(&dir, config)
    }

    /// Open the session with all files rooted at `dir`.
    ///
    /// Restores the cached live timer if one exists; otherwise builds a
    /// fresh countdown of the configured default length. No saved entry is
    /// active until one is created, loaded, or adopted.
    pub fn open_in(dir: &Path, config: &Config) -> Result<Self> {
        let api_base = Url::parse(&config.remote.api_base_url).map_err(ShareError::from)?;
        let link_base = Url::parse(&config.remote.link_base_url).map_err(ShareError::from)?;
        let share = ShareClient::new(api_base, link_base);

        let store =
            StateStore::open_at(dir.join("saved_states.json"))?.with_mirror(share.clone());
        let settings_store = SettingsStore::at(dir.join("settings.json"));
        let settings = settings_store.load_or_default();
        let cache = TimerCache::at(dir.join("timer.json"));
        let timer = match cache.load() {
            Some(state) => CountdownTimer::from_state(state),
            None => CountdownTimer::new(config.timer.default_duration_min as i64 * 60 * 1000),
        };

        Ok(Self {
            timer,
            settings,
            store,
            settings_store,
            cache,
            share,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn share(&self) -> &ShareClient {
        &self.share
    }

    pub fn active_id(&self) -> Option<&str> {
        self.store.active_id()
    }

    pub fn snapshot(&self) -> Event {
        self.timer.snapshot()
    }

    /// The snapshot a share dialog would offer: the active saved entry with
    /// its live state, or a synthesized one named after the current moment.
    pub fn share_snapshot(&self) -> SavedState {
        match self.active_id().and_then(|id| self.store.get(id)) {
            Some(entry) => {
                let mut snapshot = entry.clone();
                snapshot.timer_state = self.timer.state().clone();
                snapshot.app_settings = self.settings.clone();
                snapshot
            }
            None => SavedState {
                id: Uuid::new_v4().to_string(),
                name: format!("Timer {}", Local::now().format("%Y-%m-%d %H:%M")),
                saved_at: now_ms(),
                timer_state: self.timer.state().clone(),
                app_settings: self.settings.clone(),
            },
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn toggle(&mut self) -> Result<Event> {
        let event = self.timer.toggle();
        self.persist().await?;
        Ok(event)
    }

    pub async fn add_seconds(&mut self, delta: i64) -> Result<Event> {
        let event = self.timer.add_seconds(delta);
        self.persist().await?;
        Ok(event)
    }

    pub async fn set_settings(&mut self, settings: AppSettings) -> Result<()> {
        self.settings = settings;
        self.persist().await
    }

    pub async fn set_embed_settings(
        &mut self,
        links: Vec<String>,
        link_switch_duration_sec: u64,
        embed_fade_out_sec: u64,
    ) -> Result<()> {
        self.settings
            .set_embed_settings(links, link_switch_duration_sec, embed_fade_out_sec);
        self.persist().await
    }

    /// Begin a brand-new countdown and save it under a new entry, which
    /// becomes active (the original's setup-form submission).
    pub async fn start_new(&mut self, total_ms: i64, name: &str) -> Result<SavedState> {
        self.timer.replace(TimerState::new(total_ms, now_ms()));
        let state = self
            .store
            .create(self.timer.state().clone(), self.settings.clone(), name)
            .await?;
        self.cache.save(self.timer.state())?;
        self.settings_store.save(&self.settings)?;
        Ok(state)
    }

    /// Swap in a saved entry: timer and settings are replaced wholesale and
    /// the entry becomes active.
    pub async fn load_saved(&mut self, id: &str) -> Result<Event> {
        let state = self
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownId(id.to_string()))?;
        self.store.set_active(Some(state.id.clone()));
        self.settings = state.app_settings.clone();
        let event = self.timer.replace(state.timer_state);
        self.persist().await?;
        Ok(event)
    }

    /// Take over a snapshot resolved from a share code or deep link. The
    /// snapshot is inserted locally under its own id so subsequent updates
    /// have a target.
    pub fn adopt(&mut self, state: SavedState) -> Result<Event> {
        self.settings = state.app_settings.clone();
        let event = self.timer.replace(state.timer_state.clone());
        self.store.adopt(state)?;
        self.cache.save(self.timer.state())?;
        self.settings_store.save(&self.settings)?;
        Ok(event)
    }

    pub fn delete_saved(&mut self, id: &str) -> Result<()> {
        Ok(self.store.delete(id)?)
    }

    async fn persist(&mut self) -> Result<()> {
        self.cache.save(self.timer.state())?;
        self.settings_store.save(&self.settings)?;
        if let Some(id) = self.store.active_id().map(str::to_string) {
            self.store
                .upsert(&id, self.timer.state().clone(), self.settings.clone())
                .await?;
        }
        Ok(())
    }
}
