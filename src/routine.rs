use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineItem {
    pub id: u32,
    pub label: String,
    pub done: bool,
}

/// Bedtime checklist shown on the dashboard. Lives for the app session only.
#[derive(Debug, Clone, Serialize)]
pub struct BedtimeRoutine {
    items: Vec<RoutineItem>,
}

impl Default for BedtimeRoutine {
    fn default() -> Self {
        let item = |id, label: &str, done| RoutineItem {
            id,
            label: label.into(),
            done,
        };
        Self {
            items: vec![
                item(1, "Hydrate", true),
                item(2, "Journal", false),
                item(3, "Breathing", false),
                item(4, "Turn off screens", true),
            ],
        }
    }
}

impl BedtimeRoutine {
    pub fn items(&self) -> &[RoutineItem] {
        &self.items
    }

    /// Flip an item and return its new state, or `None` for an unknown id.
    pub fn toggle(&mut self, id: u32) -> Option<bool> {
        let item = self.items.iter_mut().find(|i| i.id == id)?;
        item.done = !item.done;
        Some(item.done)
    }

    pub fn completed(&self) -> usize {
        self.items.iter().filter(|i| i.done).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_two_items_done() {
        let routine = BedtimeRoutine::default();
        assert_eq!(routine.items().len(), 4);
        assert_eq!(routine.completed(), 2);
    }

    #[test]
    fn toggle_flips_one_item() {
        let mut routine = BedtimeRoutine::default();
        assert_eq!(routine.toggle(2), Some(true));
        assert_eq!(routine.toggle(1), Some(false));
        assert_eq!(routine.completed(), 2);
        assert_eq!(routine.toggle(99), None);
    }
}
