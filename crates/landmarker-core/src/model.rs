//! The bound landmark group and every mutation the editor performs on it.
//!
//! [`AnnotationModel`] is the single write path for positions, selection
//! and history. Each mutation records which landmarks changed so the
//! caller can publish one change notification per operation.

use std::collections::BTreeSet;

use bevy::math::Vec3;

use crate::events::ViewportEvent;
use crate::history::{HistoryEntry, LandmarkChange, LandmarkTracker};
use crate::landmark::LandmarkGroup;
use crate::selection::SelectionModel;

#[derive(Debug, Clone)]
pub struct AnnotationModel {
    group: LandmarkGroup,
    selection: SelectionModel,
    tracker: LandmarkTracker,
    changed: BTreeSet<usize>,
    history_changed: bool,
}

impl AnnotationModel {
    pub fn new(group: LandmarkGroup, tracker: LandmarkTracker) -> Self {
        Self {
            group,
            selection: SelectionModel::new(),
            tracker,
            changed: BTreeSet::new(),
            history_changed: false,
        }
    }

    /// Hand the group and its tracker back, e.g. when the asset is unbound.
    pub fn into_parts(self) -> (LandmarkGroup, LandmarkTracker) {
        (self.group, self.tracker)
    }

    pub fn group(&self) -> &LandmarkGroup {
        &self.group
    }

    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    pub fn tracker(&self) -> &LandmarkTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut LandmarkTracker {
        &mut self.tracker
    }

    pub fn len(&self) -> usize {
        self.group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<Vec3> {
        self.group.point(index)
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.is_selected(index)
    }

    /// Every placed landmark with its point.
    pub fn non_empty_points(&self) -> Vec<(usize, Vec3)> {
        self.group
            .non_empty()
            .filter_map(|lm| lm.point.map(|p| (lm.index, p)))
            .collect()
    }

    /// Placed landmarks that are selected, ascending by index.
    pub fn selected_points(&self) -> Vec<(usize, Vec3)> {
        self.selection
            .selected()
            .into_iter()
            .filter_map(|i| self.group.point(i).map(|p| (i, p)))
            .collect()
    }

    /// The four bounding-box landmarks, when the group has at least four
    /// and all of them are placed.
    pub fn bounding_box_points(&self) -> Option<[(usize, Vec3); 4]> {
        let mut points = [(0, Vec3::ZERO); 4];
        for (i, slot) in points.iter_mut().enumerate() {
            *slot = (i, self.group.point(i)?);
        }
        Some(points)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn target(&self) -> Option<usize> {
        self.selection.target()
    }

    /// Set the snap target. Empty or unknown landmarks clear it instead.
    pub fn set_target(&mut self, target: Option<usize>) {
        let target = target.filter(|&i| self.group.point(i).is_some());
        self.selection.set_target(target);
    }

    pub fn select_landmarks(&mut self, indices: &[usize]) {
        let changed = self.selection.select(indices, self.group.len());
        self.changed.extend(changed);
    }

    pub fn deselect_landmarks(&mut self, indices: &[usize]) {
        let changed = self.selection.deselect(indices);
        self.changed.extend(changed);
    }

    pub fn deselect_all(&mut self) {
        let changed = self.selection.deselect_all();
        self.changed.extend(changed);
    }

    pub fn select_all(&mut self) {
        let all: Vec<usize> = self.group.non_empty().map(|lm| lm.index).collect();
        self.select_landmarks(&all);
    }

    pub fn select_and_deselect_rest(&mut self, index: usize) {
        let changed = self.selection.select_and_deselect_rest(index, self.group.len());
        self.changed.extend(changed);
    }

    // ========================================================================
    // Positions
    // ========================================================================

    /// Move one landmark and record the move as its own history entry.
    pub fn set_landmark_point(&mut self, index: usize, point: Vec3) {
        if index >= self.group.len() {
            return;
        }
        let before = self.group.point(index);
        self.set_landmark_point_without_history(index, point);
        self.record_history(vec![LandmarkChange::new(index, before, Some(point))]);
    }

    /// Move one landmark without touching history (used mid-drag).
    pub fn set_landmark_point_without_history(&mut self, index: usize, point: Vec3) {
        if index >= self.group.len() {
            return;
        }
        self.group.set_point(index, Some(point));
        self.changed.insert(index);
    }

    /// Place `point` into the next available landmark and select it alone.
    ///
    /// Returns the index that was filled, or `None` when the group is full.
    pub fn insert_new_landmark(&mut self, point: Vec3) -> Option<usize> {
        let index = self.group.next_available()?;
        self.group.set_point(index, Some(point));
        self.changed.insert(index);
        self.select_and_deselect_rest(index);
        self.record_history(vec![LandmarkChange::new(index, None, Some(point))]);
        self.group.reset_next_available();
        tracing::debug!("[gesture] inserted landmark {index}");
        Some(index)
    }

    /// Clear every selected landmark back to empty with one history entry.
    ///
    /// The first cleared landmark becomes the next available one.
    pub fn delete_selected(&mut self) -> Vec<usize> {
        let deleted: Vec<(usize, Vec3)> = self.selected_points();
        if deleted.is_empty() {
            return Vec::new();
        }
        let changes = deleted
            .iter()
            .map(|&(i, p)| LandmarkChange::new(i, Some(p), None))
            .collect();
        for &(i, _) in &deleted {
            self.group.set_point(i, None);
            self.selection.forget_target(i);
        }
        let indices: Vec<usize> = deleted.iter().map(|&(i, _)| i).collect();
        self.deselect_landmarks(&indices);
        self.changed.extend(indices.iter().copied());
        self.group.set_next_available(indices.first().copied());
        self.record_history(changes);
        indices
    }

    /// Forget the landmark marked for the next insertion.
    pub fn reset_next_available(&mut self) {
        self.group.reset_next_available();
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Push one history entry. No-op changes are dropped; nothing is
    /// recorded if every change is a no-op.
    pub fn record_history(&mut self, changes: Vec<LandmarkChange>) {
        let changes: Vec<LandmarkChange> = changes.into_iter().filter(|c| !c.is_noop()).collect();
        if changes.is_empty() {
            return;
        }
        self.tracker.record(changes);
        self.history_changed = true;
    }

    pub fn undo(&mut self) -> bool {
        let applied = self.tracker.undo(&mut self.group).map(HistoryEntry::indices);
        self.after_history_step(applied)
    }

    pub fn redo(&mut self) -> bool {
        let applied = self.tracker.redo(&mut self.group).map(HistoryEntry::indices);
        self.after_history_step(applied)
    }

    fn after_history_step(&mut self, applied: Option<Vec<usize>>) -> bool {
        let Some(indices) = applied else {
            return false;
        };
        if let Some(target) = self.selection.target()
            && self.group.point(target).is_none()
        {
            self.selection.set_target(None);
        }
        self.changed.extend(indices);
        self.history_changed = true;
        true
    }

    // ========================================================================
    // Change tracking
    // ========================================================================

    /// Indices touched since the last call, ascending.
    pub fn take_changed(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.changed).into_iter().collect()
    }

    /// Whether the undo/redo stacks changed since the last call.
    pub fn take_history_changed(&mut self) -> bool {
        std::mem::take(&mut self.history_changed)
    }

    /// Turn pending change tracking into viewport events.
    pub fn drain_events(&mut self, events: &mut Vec<ViewportEvent>) {
        let changed = self.take_changed();
        if !changed.is_empty() {
            events.push(ViewportEvent::LandmarksChanged(changed));
        }
        if self.take_history_changed() {
            events.push(ViewportEvent::HistoryChanged {
                can_undo: self.tracker.can_undo(),
                can_redo: self.tracker.can_redo(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(points: &[Option<Vec3>]) -> AnnotationModel {
        let group = LandmarkGroup::new(points.to_vec(), vec![], vec![]).unwrap();
        AnnotationModel::new(group, LandmarkTracker::new())
    }

    #[test]
    fn test_target_must_be_placed() {
        let mut model = model(&[Some(Vec3::ONE), None]);
        model.set_target(Some(1));
        assert_eq!(model.target(), None);
        model.set_target(Some(0));
        assert_eq!(model.target(), Some(0));
    }

    #[test]
    fn test_insert_fills_next_available_and_selects_it() {
        let mut model = model(&[Some(Vec3::ONE), None, None]);
        model.select_landmarks(&[0]);

        let inserted = model.insert_new_landmark(Vec3::new(4.0, 5.0, 0.0));
        assert_eq!(inserted, Some(1));
        assert_eq!(model.selection().selected(), vec![1]);
        assert_eq!(model.tracker().undo_len(), 1);
        assert_eq!(model.take_changed(), vec![0, 1]);
    }

    #[test]
    fn test_insert_into_full_group_is_noop() {
        let mut model = model(&[Some(Vec3::ONE)]);
        assert_eq!(model.insert_new_landmark(Vec3::ZERO), None);
        assert!(!model.tracker().can_undo());
    }

    #[test]
    fn test_delete_selected_marks_next_available() {
        let mut model = model(&[Some(Vec3::ONE), Some(Vec3::X), Some(Vec3::Y)]);
        model.select_landmarks(&[1, 2]);
        model.set_target(Some(2));

        assert_eq!(model.delete_selected(), vec![1, 2]);
        assert_eq!(model.point(1), None);
        assert_eq!(model.target(), None);
        assert!(model.selection().is_empty());
        assert_eq!(model.group().next_available(), Some(1));

        assert!(model.undo());
        assert_eq!(model.point(2), Some(Vec3::Y));
    }

    #[test]
    fn test_set_point_to_same_value_records_nothing() {
        let mut model = model(&[Some(Vec3::ONE)]);
        model.set_landmark_point(0, Vec3::ONE);
        assert!(!model.tracker().can_undo());
        assert!(!model.take_history_changed());
    }

    #[test]
    fn test_undo_clears_target_of_removed_point() {
        let mut model = model(&[None]);
        model.insert_new_landmark(Vec3::ONE);
        model.set_target(Some(0));

        assert!(model.undo());
        assert_eq!(model.point(0), None);
        assert_eq!(model.target(), None);
        assert!(model.redo());
        assert_eq!(model.point(0), Some(Vec3::ONE));
        assert!(!model.redo());
    }
}
