#![forbid(unsafe_code)]

//! Multi-select state: ordinary selection plus always-selected (pinned) items.
//!
//! Ordinary selections are toggled by clicks. Pinned handles mark a host's
//! "current" item; they count as selected for drag snapshots but clicks never
//! remove them. The two sets are disjoint: pinning a selected handle moves it
//! out of the ordinary selection.
//!
//! Insertion order of the ordinary selection is remembered only so the first
//! selected handle can serve as the anchor. Drag snapshots do not use it;
//! they are re-sorted into source order.

use crate::registry::ItemHandle;

/// Selected and pinned handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: Vec<ItemHandle>,
    pinned: Vec<ItemHandle>,
}

impl SelectionSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Click-driven toggle. Returns whether anything changed.
    ///
    /// Non-additive toggles first clear every ordinary selection, so the
    /// handle always ends up selected. Additive toggles flip only `handle`.
    /// Pinned handles are never flipped.
    pub fn toggle(&mut self, handle: ItemHandle, additive: bool) -> bool {
        let mut changed = false;
        if !additive {
            // Keep `handle` if it is the only selection, so re-clicking it
            // does not report a spurious change.
            if self.selected != [handle] {
                changed = !self.selected.is_empty();
                self.selected.clear();
            }
        }
        if self.is_pinned(handle) {
            return changed;
        }
        if let Some(at) = self.selected.iter().position(|h| *h == handle) {
            if additive {
                self.selected.remove(at);
                changed = true;
            }
        } else {
            self.selected.push(handle);
            changed = true;
        }
        changed
    }

    /// Drop every ordinary selection. Pinned handles stay.
    pub fn clear_all(&mut self) -> bool {
        let changed = !self.selected.is_empty();
        self.selected.clear();
        changed
    }

    /// Mark `handle` as always selected.
    pub fn pin(&mut self, handle: ItemHandle) -> bool {
        if self.is_pinned(handle) {
            return false;
        }
        self.selected.retain(|h| *h != handle);
        self.pinned.push(handle);
        true
    }

    pub fn unpin(&mut self, handle: ItemHandle) -> bool {
        let before = self.pinned.len();
        self.pinned.retain(|h| *h != handle);
        self.pinned.len() != before
    }

    /// Forget `handle` entirely (unmount/disable cleanup).
    pub fn remove(&mut self, handle: ItemHandle) -> bool {
        let before = self.selected.len() + self.pinned.len();
        self.selected.retain(|h| *h != handle);
        self.pinned.retain(|h| *h != handle);
        self.selected.len() + self.pinned.len() != before
    }

    /// Keep only handles for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(ItemHandle) -> bool) -> bool {
        let before = self.selected.len() + self.pinned.len();
        self.selected.retain(|h| keep(*h));
        self.pinned.retain(|h| keep(*h));
        self.selected.len() + self.pinned.len() != before
    }

    /// Ordinarily selected (not pinned).
    #[must_use]
    pub fn is_selected(&self, handle: ItemHandle) -> bool {
        self.selected.contains(&handle)
    }

    #[must_use]
    pub fn is_pinned(&self, handle: ItemHandle) -> bool {
        self.pinned.contains(&handle)
    }

    /// Selected or pinned.
    #[must_use]
    pub fn is_marked(&self, handle: ItemHandle) -> bool {
        self.is_selected(handle) || self.is_pinned(handle)
    }

    /// Ordinary selection in insertion order.
    #[must_use]
    pub fn selected(&self) -> &[ItemHandle] {
        &self.selected
    }

    #[must_use]
    pub fn pinned(&self) -> &[ItemHandle] {
        &self.pinned
    }

    /// First ordinarily selected handle.
    #[must_use]
    pub fn anchor(&self) -> Option<ItemHandle> {
        self.selected.first().copied()
    }

    /// Selected followed by pinned handles.
    #[must_use]
    pub fn marked(&self) -> Vec<ItemHandle> {
        let mut out = Vec::with_capacity(self.selected.len() + self.pinned.len());
        out.extend_from_slice(&self.selected);
        out.extend_from_slice(&self.pinned);
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.pinned.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionId;
    use crate::registry::Registry;

    fn handles(n: usize) -> Vec<ItemHandle> {
        let mut reg = Registry::new();
        (0..n)
            .map(|i| reg.add(CollectionId::new(0), i, false, false))
            .collect()
    }

    #[test]
    fn non_additive_replaces_selection() {
        let h = handles(3);
        let mut sel = SelectionSet::new();
        assert!(sel.toggle(h[0], true));
        assert!(sel.toggle(h[1], true));
        assert!(sel.toggle(h[2], false));
        assert_eq!(sel.selected(), &[h[2]]);
    }

    #[test]
    fn non_additive_keeps_pinned() {
        let h = handles(3);
        let mut sel = SelectionSet::new();
        sel.pin(h[0]);
        sel.toggle(h[1], true);
        sel.toggle(h[2], false);
        assert_eq!(sel.selected(), &[h[2]]);
        assert_eq!(sel.pinned(), &[h[0]]);
    }

    #[test]
    fn non_additive_on_sole_selection_is_stable() {
        let h = handles(1);
        let mut sel = SelectionSet::new();
        assert!(sel.toggle(h[0], false));
        assert!(!sel.toggle(h[0], false));
        assert!(sel.is_selected(h[0]));
    }

    #[test]
    fn additive_on_selected_deselects_only_it() {
        let h = handles(3);
        let mut sel = SelectionSet::new();
        sel.toggle(h[0], true);
        sel.toggle(h[1], true);
        assert!(sel.toggle(h[0], true));
        assert_eq!(sel.selected(), &[h[1]]);
    }

    #[test]
    fn pinned_cannot_be_toggled_off() {
        let h = handles(2);
        let mut sel = SelectionSet::new();
        sel.pin(h[0]);
        assert!(!sel.toggle(h[0], true));
        assert!(sel.is_marked(h[0]));
        assert!(!sel.is_selected(h[0]));
    }

    #[test]
    fn non_additive_click_on_pinned_clears_others() {
        let h = handles(3);
        let mut sel = SelectionSet::new();
        sel.pin(h[0]);
        sel.toggle(h[1], true);
        assert!(sel.toggle(h[0], false));
        assert!(sel.selected().is_empty());
        assert!(sel.is_pinned(h[0]));
    }

    #[test]
    fn pin_moves_out_of_ordinary_selection() {
        let h = handles(1);
        let mut sel = SelectionSet::new();
        sel.toggle(h[0], true);
        assert!(sel.pin(h[0]));
        assert!(!sel.pin(h[0]));
        assert_eq!(sel.marked(), vec![h[0]]);
        assert!(sel.unpin(h[0]));
        assert!(sel.is_empty());
    }

    #[test]
    fn clear_all_leaves_pinned() {
        let h = handles(2);
        let mut sel = SelectionSet::new();
        sel.pin(h[0]);
        sel.toggle(h[1], true);
        assert!(sel.clear_all());
        assert!(!sel.clear_all());
        assert_eq!(sel.marked(), vec![h[0]]);
    }

    #[test]
    fn remove_and_retain_cleanup() {
        let h = handles(3);
        let mut sel = SelectionSet::new();
        sel.pin(h[0]);
        sel.toggle(h[1], true);
        sel.toggle(h[2], true);
        assert!(sel.remove(h[0]));
        assert!(!sel.remove(h[0]));
        assert!(sel.retain(|handle| handle != h[2]));
        assert_eq!(sel.marked(), vec![h[1]]);
        assert_eq!(sel.anchor(), Some(h[1]));
    }
}
