//! Undo/redo history for landmark positions.
//!
//! One entry per completed edit. Trackers are owned per asset and template
//! by [`TrackerStore`], so undo survives switching away from an asset.

use std::collections::HashMap;

use bevy::math::Vec3;

use crate::landmark::LandmarkGroup;

/// Before/after position of one landmark.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkChange {
    pub index: usize,
    pub before: Option<Vec3>,
    pub after: Option<Vec3>,
}

impl LandmarkChange {
    pub fn new(index: usize, before: Option<Vec3>, after: Option<Vec3>) -> Self {
        Self { index, before, after }
    }

    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

/// One undo step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryEntry {
    pub changes: Vec<LandmarkChange>,
}

impl HistoryEntry {
    pub fn indices(&self) -> Vec<usize> {
        self.changes.iter().map(|c| c.index).collect()
    }
}

/// Undo and redo stacks for one landmark group.
#[derive(Debug, Clone)]
pub struct LandmarkTracker {
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    up_to_date: bool,
}

impl Default for LandmarkTracker {
    fn default() -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            up_to_date: true,
        }
    }
}

impl LandmarkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new entry. Clears the redo stack.
    pub fn record(&mut self, changes: Vec<LandmarkChange>) {
        if changes.is_empty() {
            return;
        }
        tracing::debug!("[history] record {} change(s)", changes.len());
        self.undo.push(HistoryEntry { changes });
        self.redo.clear();
        self.up_to_date = false;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Most recent entry, if any.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.undo.last()
    }

    /// Restore the `before` positions of the latest entry.
    pub fn undo(&mut self, group: &mut LandmarkGroup) -> Option<&HistoryEntry> {
        let entry = self.undo.pop()?;
        for change in entry.changes.iter().rev() {
            group.set_point(change.index, change.before);
        }
        self.redo.push(entry);
        self.up_to_date = false;
        self.redo.last()
    }

    /// Re-apply the `after` positions of the latest undone entry.
    pub fn redo(&mut self, group: &mut LandmarkGroup) -> Option<&HistoryEntry> {
        let entry = self.redo.pop()?;
        for change in &entry.changes {
            group.set_point(change.index, change.after);
        }
        self.undo.push(entry);
        self.up_to_date = false;
        self.undo.last()
    }

    /// Whether the group matches what was last saved.
    pub fn is_up_to_date(&self) -> bool {
        self.up_to_date
    }

    pub fn mark_saved(&mut self) {
        self.up_to_date = true;
    }
}

/// Identifies the tracker for one asset annotated with one template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackerKey {
    pub asset_id: String,
    pub template: String,
}

impl TrackerKey {
    pub fn new(asset_id: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            template: template.into(),
        }
    }
}

/// Trackers keyed by asset and template.
///
/// A tracker is checked out while its group is bound and checked back in
/// when the group is unbound.
#[derive(Debug, Default)]
pub struct TrackerStore {
    trackers: HashMap<TrackerKey, LandmarkTracker>,
}

impl TrackerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the tracker for `key`, creating a fresh one if none is stored.
    pub fn checkout(&mut self, key: &TrackerKey) -> LandmarkTracker {
        self.trackers.remove(key).unwrap_or_else(|| {
            tracing::debug!("[history] new tracker for {}/{}", key.asset_id, key.template);
            LandmarkTracker::new()
        })
    }

    pub fn checkin(&mut self, key: TrackerKey, tracker: LandmarkTracker) {
        self.trackers.insert(key, tracker);
    }

    pub fn contains(&self, key: &TrackerKey) -> bool {
        self.trackers.contains_key(key)
    }

    /// Drop every tracker belonging to `asset_id`.
    pub fn evict_asset(&mut self, asset_id: &str) {
        self.trackers.retain(|key, _| key.asset_id != asset_id);
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> LandmarkGroup {
        LandmarkGroup::from_template(&[("all", 2)], vec![]).unwrap()
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut group = group();
        let mut tracker = LandmarkTracker::new();
        let p = Vec3::new(1.0, 2.0, 0.0);

        group.set_point(0, Some(p));
        tracker.record(vec![LandmarkChange::new(0, None, Some(p))]);
        assert!(!tracker.is_up_to_date());

        tracker.undo(&mut group).unwrap();
        assert_eq!(group.point(0), None);
        assert!(tracker.can_redo());

        tracker.redo(&mut group).unwrap();
        assert_eq!(group.point(0), Some(p));
        assert!(!tracker.can_redo());
    }

    #[test]
    fn test_record_clears_redo() {
        let mut group = group();
        let mut tracker = LandmarkTracker::new();
        tracker.record(vec![LandmarkChange::new(0, None, Some(Vec3::ONE))]);
        tracker.undo(&mut group);
        tracker.record(vec![LandmarkChange::new(1, None, Some(Vec3::ONE))]);

        assert!(!tracker.can_redo());
        assert_eq!(tracker.undo_len(), 1);
    }

    #[test]
    fn test_empty_record_is_ignored() {
        let mut tracker = LandmarkTracker::new();
        tracker.record(Vec::new());
        assert!(!tracker.can_undo());
        assert!(tracker.is_up_to_date());
    }

    #[test]
    fn test_store_checkout_and_evict() {
        let mut store = TrackerStore::new();
        let key = TrackerKey::new("img-1", "face");

        let mut tracker = store.checkout(&key);
        tracker.record(vec![LandmarkChange::new(0, None, Some(Vec3::ONE))]);
        store.checkin(key.clone(), tracker);
        store.checkin(TrackerKey::new("img-1", "hand"), LandmarkTracker::new());
        store.checkin(TrackerKey::new("img-2", "face"), LandmarkTracker::new());

        assert_eq!(store.checkout(&key).undo_len(), 1);
        assert!(!store.contains(&key));

        store.evict_asset("img-1");
        assert_eq!(store.len(), 1);
    }
}
