//! Saved-state store: named timer snapshots with expiry pruning and
//! best-effort remote mirroring.
//!
//! The whole set lives in one JSON file and is rewritten on every mutation;
//! the sets are a handful of entries, so diffing would buy nothing. Local
//! storage is authoritative for the running session -- the remote copy
//! exists for cross-device sharing and its failures are logged and
//! swallowed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::share::ShareClient;
use crate::storage::settings::AppSettings;
use crate::timer::{self, clock, TimerState};

/// Ten minutes past expiry a saved timer is still worth showing; beyond
/// that it is abandoned and pruned.
pub const GRACE_WINDOW_MS: i64 = 10 * 60 * 1000;

/// One immutable snapshot of timer + settings, stored under an opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedState {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Creation instant (epoch ms). Never updated, even when the entry's
    /// timer or settings are.
    pub saved_at: i64,
    pub timer_state: TimerState,
    pub app_settings: AppSettings,
}

/// Keep a state iff its countdown is still inside the grace window.
pub fn prune_expired(states: Vec<SavedState>, now: i64) -> Vec<SavedState> {
    states
        .into_iter()
        .filter(|state| clock::remaining_ms(&state.timer_state, now) >= -GRACE_WINDOW_MS)
        .collect()
}

/// The set of saved timers, keyed by id, insertion-ordered for display.
///
/// Also tracks which entry is *active*: the one the live timer routes its
/// updates into. `create` and `adopt` designate the new entry active.
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    states: Vec<SavedState>,
    active_id: Option<String>,
    mirror: Option<ShareClient>,
}

impl StateStore {
    /// Open the store file, dropping whatever cannot be read and pruning
    /// expired entries. Never fails on bad content: a corrupt file is an
    /// empty store. If pruning or dropping removed anything the healed set
    /// is written straight back.
    pub fn open_at(path: PathBuf) -> Result<Self, StoreError> {
        let (states, healed) = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let (parsed, raw_count) = parse_states(&content);
                let pruned = prune_expired(parsed, timer::now_ms());
                // Self-heal when parsing dropped malformed entries, pruning
                // dropped stale ones, or the file was not an array at all.
                let changed = raw_count != Some(pruned.len());
                (pruned, changed)
            }
            Err(_) => (Vec::new(), false),
        };

        let store = Self {
            path,
            states,
            active_id: None,
            mirror: None,
        };
        if healed {
            store.persist()?;
        }
        Ok(store)
    }

    /// Attach a remote mirror; `create` and `upsert` will push each change
    /// best-effort.
    pub fn with_mirror(mut self, mirror: ShareClient) -> Self {
        self.mirror = Some(mirror);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn states(&self) -> &[SavedState] {
        &self.states
    }

    pub fn get(&self, id: &str) -> Option<&SavedState> {
        self.states.iter().find(|state| state.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn set_active(&mut self, id: Option<String>) {
        self.active_id = id;
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Replace an existing entry's timer and settings in place. Name and
    /// creation stamp stay untouched. Unknown ids are a caller bug and
    /// fail loudly.
    pub async fn upsert(
        &mut self,
        id: &str,
        timer_state: TimerState,
        app_settings: AppSettings,
    ) -> Result<(), StoreError> {
        let entry = self
            .states
            .iter_mut()
            .find(|state| state.id == id)
            .ok_or_else(|| StoreError::UnknownId(id.to_string()))?;
        entry.timer_state = timer_state;
        entry.app_settings = app_settings;
        let snapshot = entry.clone();
        self.persist()?;
        self.mirror_entry(&snapshot).await;
        Ok(())
    }

    /// Append a brand-new entry under a fresh id and make it active.
    pub async fn create(
        &mut self,
        timer_state: TimerState,
        app_settings: AppSettings,
        name: &str,
    ) -> Result<SavedState, StoreError> {
        let state = SavedState {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            saved_at: timer::now_ms(),
            timer_state,
            app_settings,
        };
        self.states.push(state.clone());
        self.active_id = Some(state.id.clone());
        self.persist()?;
        self.mirror_entry(&state).await;
        Ok(state)
    }

    /// Take in a snapshot resolved from elsewhere (deep link, share code)
    /// under its own id, replacing any local entry with that id, and make
    /// it active so subsequent updates have a target.
    pub fn adopt(&mut self, state: SavedState) -> Result<(), StoreError> {
        self.active_id = Some(state.id.clone());
        match self.states.iter_mut().find(|s| s.id == state.id) {
            Some(existing) => *existing = state,
            None => self.states.push(state),
        }
        self.persist()
    }

    /// Remove an entry. Deleting the active entry is a caller bug: the live
    /// timer would keep writing into a void.
    pub fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        if self.active_id.as_deref() == Some(id) {
            return Err(StoreError::ActiveEntry(id.to_string()));
        }
        self.states.retain(|state| state.id != id);
        self.persist()
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Full rewrite of the serialized set. Completes before returning, so a
    /// later read in the same session always sees the latest mutation.
    fn persist(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&self.states)?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }

    async fn mirror_entry(&self, state: &SavedState) {
        let Some(mirror) = &self.mirror else {
            return;
        };
        if let Err(e) = mirror.put_state(state).await {
            tracing::warn!(id = %state.id, "remote mirror failed: {e}");
        }
    }
}

/// Parse the stored array, dropping malformed entries individually instead
/// of discarding valid neighbors. Anything other than an array is treated
/// as empty. Returns the parsed states plus the raw entry count (`None`
/// when the file was not an array), so the caller can tell whether a heal
/// rewrite is due.
fn parse_states(content: &str) -> (Vec<SavedState>, Option<usize>) {
    let values: Vec<serde_json::Value> = match serde_json::from_str(content) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!("discarding unreadable saved-state file: {e}");
            return (Vec::new(), None);
        }
    };
    let raw_count = values.len();
    let states = values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();
    (states, Some(raw_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::now_ms;

    fn temp_store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::open_at(dir.path().join("saved_states.json")).unwrap();
        (dir, store)
    }

    /// A paused state whose remaining time is exactly `remaining` no matter
    /// when it is observed.
    fn paused_with_remaining(remaining: i64) -> TimerState {
        let total = 60_000;
        TimerState {
            total_ms: total,
            paused: true,
            start_time: Some(0),
            pause_start: total - remaining,
            total_pause_ms: 0,
        }
    }

    fn entry(id: &str, remaining: i64) -> SavedState {
        SavedState {
            id: id.to_string(),
            name: String::new(),
            saved_at: now_ms(),
            timer_state: paused_with_remaining(remaining),
            app_settings: AppSettings::default(),
        }
    }

    #[test]
    fn prune_keeps_the_grace_window_boundary() {
        let now = now_ms();
        let states = vec![
            entry("kept", -GRACE_WINDOW_MS),
            entry("dropped", -GRACE_WINDOW_MS - 1),
            entry("fresh", 30_000),
        ];
        let pruned = prune_expired(states, now);
        let ids: Vec<_> = pruned.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["kept", "fresh"]);
    }

    #[test]
    fn open_on_missing_or_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_states.json");
        assert!(StateStore::open_at(path.clone()).unwrap().states().is_empty());

        std::fs::write(&path, "not json at all").unwrap();
        assert!(StateStore::open_at(path.clone()).unwrap().states().is_empty());

        std::fs::write(&path, r#"{"id": "object-not-array"}"#).unwrap();
        assert!(StateStore::open_at(path).unwrap().states().is_empty());
    }

    #[test]
    fn open_drops_malformed_entries_but_keeps_neighbors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_states.json");
        let good = entry("good", 30_000);
        let content = serde_json::json!([
            good,
            { "id": "no-timer-state", "name": "broken", "savedAt": 1 },
        ]);
        std::fs::write(&path, content.to_string()).unwrap();

        let store = StateStore::open_at(path.clone()).unwrap();
        assert_eq!(store.states().len(), 1);
        assert_eq!(store.states()[0].id, "good");

        // The healed set was written straight back.
        let rewritten: Vec<SavedState> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rewritten.len(), 1);
    }

    #[test]
    fn open_rewrites_after_pruning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved_states.json");
        let states = vec![entry("stale", -GRACE_WINDOW_MS - 60_000), entry("live", 30_000)];
        std::fs::write(&path, serde_json::to_string(&states).unwrap()).unwrap();

        let store = StateStore::open_at(path.clone()).unwrap();
        assert_eq!(store.states().len(), 1);

        let rewritten: Vec<SavedState> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(rewritten.len(), 1);
        assert_eq!(rewritten[0].id, "live");
    }

    #[tokio::test]
    async fn create_designates_the_new_entry_active() {
        let (_dir, mut store) = temp_store();
        let created = store
            .create(paused_with_remaining(30_000), AppSettings::default(), "mine")
            .await
            .unwrap();
        assert_eq!(store.active_id(), Some(created.id.as_str()));
        assert_eq!(store.states().len(), 1);
        assert_eq!(store.states()[0].name, "mine");
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_and_keeps_identity() {
        let (_dir, mut store) = temp_store();
        let created = store
            .create(paused_with_remaining(30_000), AppSettings::default(), "mine")
            .await
            .unwrap();

        let mut settings = AppSettings::default();
        settings.dark_mode = false;
        store
            .upsert(&created.id, paused_with_remaining(10_000), settings.clone())
            .await
            .unwrap();

        let updated = store.get(&created.id).unwrap();
        assert_eq!(updated.name, "mine");
        assert_eq!(updated.saved_at, created.saved_at);
        assert_eq!(updated.app_settings, settings);

        assert!(matches!(
            store
                .upsert("missing", paused_with_remaining(1), AppSettings::default())
                .await,
            Err(StoreError::UnknownId(_))
        ));
    }

    #[tokio::test]
    async fn delete_guards_the_active_entry() {
        let (_dir, mut store) = temp_store();
        let keeper = store
            .create(paused_with_remaining(30_000), AppSettings::default(), "a")
            .await
            .unwrap();
        let victim = store
            .create(paused_with_remaining(30_000), AppSettings::default(), "b")
            .await
            .unwrap();

        // "b" is now active; deleting it must fail and change nothing.
        assert!(matches!(
            store.delete(&victim.id),
            Err(StoreError::ActiveEntry(_))
        ));
        assert_eq!(store.states().len(), 2);

        store.delete(&keeper.id).unwrap();
        assert_eq!(store.states().len(), 1);
        assert_eq!(store.states()[0].id, victim.id);
    }

    #[tokio::test]
    async fn adopt_inserts_or_replaces_and_activates() {
        let (_dir, mut store) = temp_store();
        let shared = entry("shared-code", 30_000);
        store.adopt(shared.clone()).unwrap();
        assert_eq!(store.active_id(), Some("shared-code"));
        assert_eq!(store.states().len(), 1);

        // Adopting the same id again replaces rather than duplicates.
        let mut newer = shared;
        newer.name = "renamed".to_string();
        store.adopt(newer).unwrap();
        assert_eq!(store.states().len(), 1);
        assert_eq!(store.states()[0].name, "renamed");

        // With an entry adopted, upserts now have a target.
        store
            .upsert(
                "shared-code",
                paused_with_remaining(5_000),
                AppSettings::default(),
            )
            .await
            .unwrap();
    }

    #[test]
    fn saved_state_round_trips_field_for_field() {
        let state = entry("round-trip", 12_345);
        let json = serde_json::to_string(&state).unwrap();
        let back: SavedState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
        for key in ["savedAt", "timerState", "appSettings"] {
            assert!(json.contains(key), "missing {key}");
        }
    }
}
