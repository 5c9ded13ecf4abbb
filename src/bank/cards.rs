use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::kv::{self, KvStore};

const BUILTIN_CARDS: &str = include_str!("../../assets/builtin-cards.json");

/// A study flashcard. Independent of the question-pack model; cards and
/// questions never reference each other.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub title: String,
    pub content: String,
    pub chapter: String,
    #[serde(skip)]
    pub collected: bool,
}

/// The built-in flashcard deck plus which cards the user has collected.
/// Only the collected id list is persisted; card content ships with the
/// binary.
pub struct CardDeck {
    cards: Vec<Flashcard>,
}

impl CardDeck {
    pub fn load(store: &KvStore) -> Self {
        let mut cards: Vec<Flashcard> = serde_json::from_str(BUILTIN_CARDS).unwrap_or_default();
        let collected = collected_ids(store);
        for card in &mut cards {
            card.collected = collected.contains(&card.id);
        }
        Self { cards }
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn collected_count(&self) -> usize {
        self.cards.iter().filter(|c| c.collected).count()
    }

    /// Flips the collected flag of the card at `index` and persists the new
    /// collected id list. Out-of-range indexes are ignored.
    pub fn toggle_collected(&mut self, store: &KvStore, index: usize) -> Result<()> {
        let Some(card) = self.cards.get_mut(index) else {
            return Ok(());
        };
        card.collected = !card.collected;
        let ids: Vec<&str> = self
            .cards
            .iter()
            .filter(|c| c.collected)
            .map(|c| c.id.as_str())
            .collect();
        store.set(kv::keys::COLLECTED_CARDS, &ids)
    }
}

/// Stored collected ids, with the same tolerance as the wrong-answer set:
/// strings pass, legacy numeric ids are stringified, the rest is dropped.
/// Card ids were plain numbers in old data, so no namespace prefix here.
fn collected_ids(store: &KvStore) -> Vec<String> {
    let raw = store.get_value(kv::keys::COLLECTED_CARDS);
    let (ids, repaired) = repair(raw.as_ref());
    if repaired {
        let _ = store.set(kv::keys::COLLECTED_CARDS, &ids);
    }
    ids
}

fn repair(raw: Option<&Value>) -> (Vec<String>, bool) {
    let Some(value) = raw else {
        return (Vec::new(), false);
    };
    let Some(items) = value.as_array() else {
        return (Vec::new(), true);
    };
    let mut ids: Vec<String> = Vec::with_capacity(items.len());
    let mut repaired = false;
    for item in items {
        let coerced = match item {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => {
                repaired = true;
                n.to_string()
            }
            _ => {
                repaired = true;
                continue;
            }
        };
        if ids.contains(&coerced) {
            repaired = true;
        } else {
            ids.push(coerced);
        }
    }
    (ids, repaired)
}
