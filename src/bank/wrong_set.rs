use anyhow::Result;
use log::debug;
use serde_json::Value;

use crate::store::kv::{self, KvStore};

/// The persisted set of question ids the user has answered incorrectly.
/// Loading repairs legacy shapes in place, so every other reader of the key
/// can assume a clean list of strings.
pub struct WrongSet {
    ids: Vec<String>,
}

impl WrongSet {
    /// Reads the stored id list, coercing legacy entries: bare numbers from
    /// before ids were namespaced become `builtin:<n>`, duplicates collapse
    /// keeping the first occurrence, everything unusable is dropped. When
    /// repair changed anything the cleaned list is written back immediately.
    pub fn load(store: &KvStore) -> Self {
        let raw = store.get_value(kv::keys::WRONG_IDS);
        let (ids, repaired) = repair(raw.as_ref());
        if repaired {
            debug!("rewrote wrong-question ids in legacy format ({} kept)", ids.len());
            let _ = store.set(kv::keys::WRONG_IDS, &ids);
        }
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|known| known == id)
    }

    /// Records a miss. Appends in answer order; already-known ids stay put.
    pub fn mark(&mut self, store: &KvStore, id: &str) -> Result<()> {
        if self.contains(id) {
            return Ok(());
        }
        self.ids.push(id.to_string());
        store.set(kv::keys::WRONG_IDS, &self.ids)
    }

    /// Removes an id once the user answers it correctly again.
    pub fn clear(&mut self, store: &KvStore, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Ok(());
        }
        self.ids.retain(|known| known != id);
        store.set(kv::keys::WRONG_IDS, &self.ids)
    }
}

/// Pure repair step over the raw stored value. Returns the cleaned list and
/// whether it differs from what was stored.
fn repair(raw: Option<&Value>) -> (Vec<String>, bool) {
    let Some(value) = raw else {
        return (Vec::new(), false);
    };
    let Some(items) = value.as_array() else {
        // Stored but not a list at all; replace with an empty set.
        return (Vec::new(), true);
    };

    let mut ids: Vec<String> = Vec::with_capacity(items.len());
    let mut repaired = false;
    for item in items {
        let coerced = match item {
            Value::String(s) => s.clone(),
            Value::Number(n) => {
                repaired = true;
                format!("builtin:{n}")
            }
            Value::Bool(b) => {
                repaired = true;
                b.to_string()
            }
            _ => {
                repaired = true;
                continue;
            }
        };
        if coerced.is_empty() {
            repaired = true;
            continue;
        }
        if ids.contains(&coerced) {
            repaired = true;
        } else {
            ids.push(coerced);
        }
    }
    (ids, repaired)
}
