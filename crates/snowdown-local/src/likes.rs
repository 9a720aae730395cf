//! "My events": the set of liked event ids, persisted in a [`TextStore`] as a
//! JSON array of ids.

use crate::catalog;
use serde::Serialize;
use snowdown_core::{Event, TextStore};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const LIKED_EVENTS_KEY: &str = "snowdown-liked-events";

#[derive(Debug, Clone, Serialize)]
pub struct DateGroup {
    pub date: String,
    pub label: String,
    pub events: Vec<Event>,
}

pub struct LikedEvents {
    store: Arc<dyn TextStore>,
    ids: BTreeSet<String>,
}

impl LikedEvents {
    /// Load from `store`. Missing, unreadable or malformed data loads as empty.
    pub fn load(store: Arc<dyn TextStore>) -> Self {
        let ids = match store.get(LIKED_EVENTS_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Vec<String>>(&raw)
                .map(|v| v.into_iter().collect())
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "ignoring malformed liked events");
                    BTreeSet::new()
                }),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(error = %e, "liked events unavailable");
                BTreeSet::new()
            }
        };
        Self { store, ids }
    }

    fn save(&self) {
        let ids: Vec<&String> = self.ids.iter().collect();
        let res = serde_json::to_string(&ids)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                self.store
                    .put(LIKED_EVENTS_KEY, &raw)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = res {
            tracing::warn!(error = %e, "could not persist liked events");
        }
    }

    /// Flip the liked state of `event_id`; returns the new state.
    pub fn toggle(&mut self, event_id: &str) -> bool {
        let liked = if self.ids.remove(event_id) {
            false
        } else {
            self.ids.insert(event_id.to_string());
            true
        };
        self.save();
        liked
    }

    pub fn is_liked(&self, event_id: &str) -> bool {
        self.ids.contains(event_id)
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Liked events that exist in the catalog, in catalog order.
    pub fn liked_events(&self) -> Vec<&'static Event> {
        catalog::events()
            .iter()
            .filter(|e| self.ids.contains(&e.id))
            .collect()
    }

    /// Liked events grouped by date, `all-week` first, then chronological.
    pub fn grouped_by_date(&self) -> Vec<DateGroup> {
        let mut groups: Vec<DateGroup> = Vec::new();
        for ev in self.liked_events() {
            match groups.iter_mut().find(|g| g.date == ev.date) {
                Some(g) => g.events.push(ev.clone()),
                None => groups.push(DateGroup {
                    date: ev.date.clone(),
                    label: catalog::date_label(&ev.date),
                    events: vec![ev.clone()],
                }),
            }
        }
        groups.sort_by(|a, b| catalog::date_order(&a.date, &b.date));
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ReadOnlyStore;
    use crate::{FsStore, MemoryStore};

    #[test]
    fn toggle_persists_across_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn TextStore> = Arc::new(FsStore::new(dir.path().to_path_buf()));

        let mut likes = LikedEvents::load(store.clone());
        assert!(likes.toggle("8"));
        assert!(likes.toggle("2"));
        assert!(!likes.toggle("2"));
        assert_eq!(likes.count(), 1);

        let reloaded = LikedEvents::load(store);
        assert!(reloaded.is_liked("8"));
        assert!(!reloaded.is_liked("2"));
        assert_eq!(reloaded.ids().collect::<Vec<_>>(), vec!["8"]);
    }

    #[test]
    fn malformed_storage_loads_empty() {
        let store = Arc::new(MemoryStore::new());
        store.put(LIKED_EVENTS_KEY, "{not json").unwrap();
        let likes = LikedEvents::load(store);
        assert_eq!(likes.count(), 0);
    }

    #[test]
    fn save_failure_keeps_in_memory_state() {
        let mut likes = LikedEvents::load(Arc::new(ReadOnlyStore));
        assert!(likes.toggle("1"));
        assert!(likes.is_liked("1"));
    }

    #[test]
    fn groups_are_sorted_by_date_and_skip_unknown_ids() {
        let mut likes = LikedEvents::load(Arc::new(MemoryStore::new()));
        for id in ["8", "1", "7", "999"] {
            likes.toggle(id);
        }
        let groups = likes.grouped_by_date();
        let dates: Vec<_> = groups.iter().map(|g| g.date.as_str()).collect();
        assert_eq!(dates, vec!["2026-01-22", "2026-01-26"]);
        assert_eq!(groups[0].label, "Thursday, January 22");
        assert_eq!(groups[1].events.len(), 2);
        assert_eq!(likes.liked_events().len(), 3);
    }
}
