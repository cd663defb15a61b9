// SPDX: CC0-1.0

use crate::{session::Tab, storage::Storage};
use chrono::{DateTime, Local};
use log::warn;
use serde::{Deserialize, Serialize};

pub const STORAGE_KEY: &str = "calculatorHistory";

// older entries fall off the end
pub const CAP: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub expression: String,
    pub result: String,
    #[serde(rename = "type")]
    pub tab: Tab,
    pub timestamp: DateTime<Local>,
}

// most recent first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct History {
    entries: Vec<Entry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, expression: impl Into<String>, result: impl Into<String>, tab: Tab) {
        self.entries.insert(
            0,
            Entry {
                expression: expression.into(),
                result: result.into(),
                tab,
                timestamp: Local::now(),
            },
        );
        self.entries.truncate(CAP);
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn recent(&self, count: usize) -> &[Entry] {
        &self.entries[..count.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn load(store: &impl Storage) -> History {
        let Some(text) = store.get(STORAGE_KEY) else {
            return History::new();
        };
        match serde_json::from_str::<Vec<Entry>>(&text) {
            Ok(mut entries) => {
                entries.truncate(CAP);
                History { entries }
            }
            Err(err) => {
                warn!("could not load history: {err}");
                History::new()
            }
        }
    }

    pub fn save(&self, store: &mut impl Storage) -> bool {
        match serde_json::to_string(&self.entries) {
            Ok(text) => store.set(STORAGE_KEY, &text),
            Err(err) => {
                warn!("could not serialize history: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemStorage;

    #[test]
    fn most_recent_entry_comes_first() {
        let mut history = History::new();
        history.record("1 + 1", "2", Tab::Basic);
        history.record("2 * 3", "6", Tab::Scientific);
        assert_eq!(history.entries()[0].expression, "2 * 3");
        assert_eq!(history.entries()[1].expression, "1 + 1");
        assert_eq!(history.recent(1).len(), 1);
        assert_eq!(history.recent(10).len(), 2);
    }

    #[test]
    fn history_is_capped() {
        let mut history = History::new();
        for i in 0..(CAP + 20) {
            history.record(format!("{i} + 0"), format!("{i}"), Tab::Basic);
        }
        assert_eq!(history.len(), CAP);
        // the newest entry survived, the oldest did not
        assert_eq!(history.entries()[0].expression, format!("{} + 0", CAP + 19));
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut store = MemStorage::new();
        let mut history = History::new();
        history.record("sin(1)", "0.8414709848", Tab::Scientific);
        assert!(history.save(&mut store));
        let loaded = History::load(&store);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.entries()[0], history.entries()[0]);
    }

    #[test]
    fn entries_serialize_with_a_type_field() {
        let mut history = History::new();
        history.record("1", "1", Tab::Basic);
        let text = serde_json::to_string(history.entries()).unwrap();
        assert!(text.contains(r#""type":"basic""#));
    }

    #[test]
    fn corrupt_store_loads_empty() {
        let mut store = MemStorage::new();
        store.set(STORAGE_KEY, "[{]");
        assert!(History::load(&store).is_empty());
    }
}
