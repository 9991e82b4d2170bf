//! Selected landmark indices and the snap target.

use std::collections::BTreeSet;

/// Which landmarks are selected and which one is the snap target.
///
/// The two are independent: the target does not have to be selected.
/// Callers keep the selection a subset of the group's indices by passing
/// the group size to every mutator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionModel {
    selected: BTreeSet<usize>,
    target: Option<usize>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Selected indices in ascending order.
    pub fn selected(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Add indices to the selection. Returns the indices that changed.
    pub fn select(&mut self, indices: &[usize], count: usize) -> Vec<usize> {
        indices
            .iter()
            .copied()
            .filter(|&i| i < count && self.selected.insert(i))
            .collect()
    }

    /// Remove indices from the selection. Returns the indices that changed.
    pub fn deselect(&mut self, indices: &[usize]) -> Vec<usize> {
        indices
            .iter()
            .copied()
            .filter(|i| self.selected.remove(i))
            .collect()
    }

    /// Clear the selection. Returns the indices that were selected.
    pub fn deselect_all(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.selected).into_iter().collect()
    }

    /// Make `index` the only selected landmark. Returns the indices that changed.
    pub fn select_and_deselect_rest(&mut self, index: usize, count: usize) -> Vec<usize> {
        if index >= count {
            return Vec::new();
        }
        let mut changed: Vec<usize> = self
            .selected
            .iter()
            .copied()
            .filter(|&i| i != index)
            .collect();
        self.selected.retain(|&i| i == index);
        if self.selected.insert(index) {
            changed.push(index);
        }
        changed
    }

    pub fn target(&self) -> Option<usize> {
        self.target
    }

    /// Set the snap target. The caller guarantees it refers to a placed landmark.
    pub fn set_target(&mut self, target: Option<usize>) {
        self.target = target;
    }

    /// Drop the target if it is `index`.
    pub fn forget_target(&mut self, index: usize) {
        if self.target == Some(index) {
            self.target = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_ignores_out_of_range() {
        let mut selection = SelectionModel::new();
        let changed = selection.select(&[1, 7, 2], 4);

        assert_eq!(changed, vec![1, 2]);
        assert_eq!(selection.selected(), vec![1, 2]);
    }

    #[test]
    fn test_select_and_deselect_rest() {
        let mut selection = SelectionModel::new();
        selection.select(&[0, 1, 2], 4);

        let changed = selection.select_and_deselect_rest(1, 4);
        assert_eq!(changed, vec![0, 2]);
        assert_eq!(selection.selected(), vec![1]);

        let changed = selection.select_and_deselect_rest(3, 4);
        assert_eq!(changed, vec![1, 3]);
        assert_eq!(selection.selected(), vec![3]);
    }

    #[test]
    fn test_target_is_independent_of_selection() {
        let mut selection = SelectionModel::new();
        selection.set_target(Some(2));
        selection.deselect_all();
        assert_eq!(selection.target(), Some(2));

        selection.forget_target(1);
        assert_eq!(selection.target(), Some(2));
        selection.forget_target(2);
        assert_eq!(selection.target(), None);
    }
}
