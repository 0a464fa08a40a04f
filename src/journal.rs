use chrono::Utc;
use uuid::Uuid;

use crate::models::DreamEntry;

/// In-memory dream journal, newest entry first.
#[derive(Debug, Default)]
pub struct DreamJournal {
    entries: Vec<DreamEntry>,
}

impl DreamJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store trimmed `text`. Blank notes are rejected with `None`.
    pub fn add(&mut self, text: &str) -> Option<DreamEntry> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let entry = DreamEntry {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            text: text.to_string(),
        };
        self.entries.insert(0, entry.clone());
        Some(entry)
    }

    pub fn entries(&self) -> &[DreamEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
