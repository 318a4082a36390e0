//! Manual serial-number picker state

use std::collections::HashSet;

use crate::models::SerialNumber;
use crate::types::EntityId;

/// Multi-select over the serials available at the source location.
///
/// The server's order is kept as-is; selections are reported in that order.
#[derive(Debug, Clone, Default)]
pub struct SerialPicker {
    available: Vec<SerialNumber>,
    selected: HashSet<EntityId>,
    filter: String,
}

impl SerialPicker {
    /// Open the picker with the line's current selection pre-checked
    pub fn new(available: Vec<SerialNumber>, preselected: &[EntityId]) -> Self {
        let known: HashSet<EntityId> = available.iter().map(|s| s.id).collect();
        let selected = preselected
            .iter()
            .copied()
            .filter(|id| known.contains(id))
            .collect();
        Self {
            available,
            selected,
            filter: String::new(),
        }
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Serials matching the current search by serial or batch name
    pub fn visible(&self) -> Vec<&SerialNumber> {
        self.available
            .iter()
            .filter(|s| s.matches(&self.filter))
            .collect()
    }

    pub fn is_selected(&self, id: EntityId) -> bool {
        self.selected.contains(&id)
    }

    pub fn toggle(&mut self, id: EntityId) {
        if !self.available.iter().any(|s| s.id == id) {
            return;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Select every serial matching the current search
    pub fn select_all(&mut self) {
        let ids: Vec<EntityId> = self.visible().iter().map(|s| s.id).collect();
        self.selected.extend(ids);
    }

    pub fn clear_all(&mut self) {
        self.selected.clear();
    }

    /// Select up to `count` more unselected serials among those visible.
    ///
    /// Returns how many were added.
    pub fn auto_pick_more(&mut self, count: usize) -> usize {
        let ids: Vec<EntityId> = self
            .visible()
            .iter()
            .map(|s| s.id)
            .filter(|id| !self.selected.contains(id))
            .take(count)
            .collect();
        let added = ids.len();
        self.selected.extend(ids);
        added
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in the server's order
    pub fn selection(&self) -> Vec<EntityId> {
        self.available
            .iter()
            .filter(|s| self.selected.contains(&s.id))
            .map(|s| s.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial(id: EntityId, batch: &str) -> SerialNumber {
        SerialNumber {
            id,
            serial_number: format!("SN-{:04}", id),
            batch_name: Some(batch.to_string()),
            product_id: Some(1),
            location_id: Some(1),
        }
    }

    fn picker() -> SerialPicker {
        SerialPicker::new(
            vec![
                serial(4, "MAR-A"),
                serial(2, "MAR-A"),
                serial(9, "APR-B"),
                serial(1, "APR-B"),
            ],
            &[2, 4, 77],
        )
    }

    #[test]
    fn test_preselection_ignores_unknown_ids() {
        let p = picker();
        assert_eq!(p.selection(), vec![4, 2]);
    }

    #[test]
    fn test_filter_by_batch_name() {
        let mut p = picker();
        p.set_filter("apr");
        let ids: Vec<EntityId> = p.visible().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![9, 1]);
    }

    #[test]
    fn test_auto_pick_more_follows_server_order() {
        let mut p = picker();
        assert_eq!(p.auto_pick_more(1), 1);
        assert_eq!(p.selection(), vec![4, 2, 9]);
        assert_eq!(p.auto_pick_more(5), 1);
        assert_eq!(p.selected_count(), 4);
    }

    #[test]
    fn test_swap_one_serial_keeps_count() {
        let mut p = SerialPicker::new(
            vec![serial(1, "A"), serial(2, "A"), serial(3, "A"), serial(4, "A")],
            &[1, 2, 3],
        );
        p.toggle(2);
        p.toggle(4);
        assert_eq!(p.selection(), vec![1, 3, 4]);
    }

    #[test]
    fn test_select_all_and_clear_respect_filter() {
        let mut p = picker();
        p.clear_all();
        p.set_filter("MAR");
        p.select_all();
        assert_eq!(p.selection(), vec![4, 2]);
        p.clear_all();
        assert_eq!(p.selected_count(), 0);
    }
}
