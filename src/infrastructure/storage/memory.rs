//! In-memory charger state store

use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::{ChargerSnapshot, ChargerState};

/// Per-charger status records, created lazily and never deleted.
///
/// Each record is mutated under its map entry's lock, so a single
/// read-modify-write on one charger is atomic with respect to other writers.
pub struct ChargerStateStore {
    states: DashMap<String, ChargerState>,
}

pub type SharedChargerStateStore = Arc<ChargerStateStore>;

impl ChargerStateStore {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    pub fn shared() -> SharedChargerStateStore {
        Arc::new(Self::new())
    }

    /// Apply `f` to the record for `charger_id`, creating it first if needed,
    /// and return the updated copy.
    pub fn update<F>(&self, charger_id: &str, f: F) -> ChargerState
    where
        F: FnOnce(&mut ChargerState),
    {
        let mut entry = self
            .states
            .entry(charger_id.to_string())
            .or_insert_with(ChargerState::connected);
        f(entry.value_mut());
        entry.value().clone()
    }

    /// Flip `wsConnected` off. Returns `None` for unknown chargers; no
    /// record is created on disconnect.
    pub fn mark_disconnected(&self, charger_id: &str) -> Option<ChargerState> {
        self.states.get_mut(charger_id).map(|mut state| {
            state.ws_connected = false;
            state.clone()
        })
    }

    pub fn get(&self, charger_id: &str) -> Option<ChargerState> {
        self.states.get(charger_id).map(|state| state.clone())
    }

    /// The record for `charger_id`, or the "Unknown" sentinel.
    pub fn status_of(&self, charger_id: &str) -> ChargerState {
        self.get(charger_id).unwrap_or_else(ChargerState::unknown)
    }

    pub fn snapshots(&self) -> Vec<ChargerSnapshot> {
        let mut snapshots: Vec<ChargerSnapshot> = self
            .states
            .iter()
            .map(|entry| ChargerSnapshot::new(entry.key().clone(), entry.value().clone()))
            .collect();
        snapshots.sort_by(|a, b| a.charger_id.cmp(&b.charger_id));
        snapshots
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl Default for ChargerStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UNKNOWN_STATUS;

    #[test]
    fn update_creates_connected_record() {
        let store = ChargerStateStore::new();
        let state = store.update("CP1", |s| s.charger_status = Some("Available".into()));
        assert!(state.ws_connected);
        assert!(!state.charging);
        assert_eq!(state.charger_status.as_deref(), Some("Available"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_charger_reports_sentinel() {
        let store = ChargerStateStore::new();
        let state = store.status_of("ghost");
        assert!(!state.ws_connected);
        assert_eq!(state.charger_status.as_deref(), Some(UNKNOWN_STATUS));
        assert!(store.is_empty());
    }

    #[test]
    fn disconnect_keeps_record() {
        let store = ChargerStateStore::new();
        store.update("CP1", |s| s.connector_id = Some(2));

        let state = store.mark_disconnected("CP1").unwrap();
        assert!(!state.ws_connected);
        assert_eq!(store.get("CP1").unwrap().connector_id, Some(2));

        assert!(store.mark_disconnected("CP2").is_none());
        assert!(store.get("CP2").is_none());
    }

    #[test]
    fn snapshots_are_sorted_by_id() {
        let store = ChargerStateStore::new();
        store.update("CP2", |_| {});
        store.update("CP1", |_| {});
        let ids: Vec<String> = store.snapshots().into_iter().map(|s| s.charger_id).collect();
        assert_eq!(ids, vec!["CP1", "CP2"]);
    }
}
