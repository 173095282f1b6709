use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryAction {
    #[serde(rename = "set")]
    Set,
    #[serde(rename = "delete")]
    Delete,
}

/// One mutation of the store. Records are never changed once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub action: MemoryAction,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub timestamp: DateTime<Utc>, // ISO 8601 datetime
}

/// Key-value state plus the ordered log of every mutation that produced it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Value>,
    history: Vec<MemoryRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        self.entries.insert(key.clone(), value.clone());
        self.history.push(MemoryRecord {
            action: MemoryAction::Set,
            key,
            value: Some(value),
            timestamp: Utc::now(),
        });
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.entries.get(key).cloned().unwrap_or(default)
    }

    /// Removes `key`. Returns false, and records nothing, when the key is absent.
    pub fn delete(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_none() {
            return false;
        }

        self.history.push(MemoryRecord {
            action: MemoryAction::Delete,
            key: key.to_string(),
            value: None,
            timestamp: Utc::now(),
        });
        true
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Currently present keys, sorted.
    pub fn list_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Copy of the mutation log, oldest first.
    pub fn history(&self) -> Vec<MemoryRecord> {
        self.history.clone()
    }

    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild key-value state by applying records in order.
    pub fn replay(records: &[MemoryRecord]) -> HashMap<String, Value> {
        let mut state = HashMap::new();
        for record in records {
            match record.action {
                MemoryAction::Set => {
                    state.insert(
                        record.key.clone(),
                        record.value.clone().unwrap_or(Value::Null),
                    );
                }
                MemoryAction::Delete => {
                    state.remove(&record.key);
                }
            }
        }
        state
    }
}
