use anyhow::Result;
use serde_json::Value;

use crate::bank::normalize;
use crate::bank::pack::QuestionPack;
use crate::bank::question::Question;
use crate::bank::wrong_set::WrongSet;
use crate::store::kv::{self, KvStore};

/// The full question library: the built-in pack plus user-imported packs
/// from storage. Imported data is validated on read, not on write, so a
/// damaged storage file costs the damaged packs and nothing else.
pub struct PackLibrary {
    builtin: QuestionPack,
}

impl PackLibrary {
    pub fn new() -> Self {
        Self {
            builtin: QuestionPack::builtin(),
        }
    }

    pub fn builtin(&self) -> &QuestionPack {
        &self.builtin
    }

    /// Imported packs in storage order. Entries that no longer normalize
    /// are discarded; anything other than a stored list degrades to empty.
    pub fn custom_packs(&self, store: &KvStore) -> Vec<QuestionPack> {
        match store.get_value(kv::keys::CUSTOM_PACKS) {
            Some(Value::Array(items)) => items.iter().filter_map(normalize::normalize_pack).collect(),
            _ => Vec::new(),
        }
    }

    /// Overwrites the stored list verbatim. Validation happens on read.
    pub fn save_custom_packs(&self, store: &KvStore, packs: &[QuestionPack]) -> Result<()> {
        store.set(kv::keys::CUSTOM_PACKS, &packs)
    }

    /// Replaces the custom pack with the same id in place, or appends when
    /// the id is new, then persists the whole list.
    pub fn upsert_pack(&self, store: &KvStore, pack: QuestionPack) -> Result<()> {
        let mut packs = self.custom_packs(store);
        match packs.iter().position(|p| p.pack_id == pack.pack_id) {
            Some(i) => packs[i] = pack,
            None => packs.push(pack),
        }
        self.save_custom_packs(store, &packs)
    }

    /// Deletes a custom pack by id. Unknown ids are a no-op; the built-in
    /// pack cannot be removed this way.
    pub fn remove_pack(&self, store: &KvStore, pack_id: &str) -> Result<()> {
        let mut packs = self.custom_packs(store);
        let before = packs.len();
        packs.retain(|p| p.pack_id != pack_id);
        if packs.len() == before {
            return Ok(());
        }
        self.save_custom_packs(store, &packs)
    }

    /// Built-in pack first, then custom packs in storage order.
    pub fn all_packs(&self, store: &KvStore) -> Vec<QuestionPack> {
        let mut packs = vec![self.builtin.clone()];
        packs.extend(self.custom_packs(store));
        packs
    }

    pub fn pack(&self, store: &KvStore, pack_id: &str) -> Option<QuestionPack> {
        self.all_packs(store).into_iter().find(|p| p.pack_id == pack_id)
    }

    /// Every question across every pack, in pack order then question order,
    /// each annotated with whether it sits in the wrong-answer set. The
    /// annotation lives only on the returned values.
    pub fn all_questions(&self, store: &KvStore) -> Vec<Question> {
        let wrongs = WrongSet::load(store);
        annotate(
            self.all_packs(store).into_iter().flat_map(|p| p.questions),
            &wrongs,
        )
    }

    /// One pack's questions with the same annotation as [`Self::all_questions`].
    pub fn pack_questions(&self, store: &KvStore, pack_id: &str) -> Vec<Question> {
        let wrongs = WrongSet::load(store);
        let questions = self
            .pack(store, pack_id)
            .map(|p| p.questions)
            .unwrap_or_default();
        annotate(questions.into_iter(), &wrongs)
    }

    /// Questions currently in the wrong-answer set, for review drills.
    pub fn wrong_questions(&self, store: &KvStore) -> Vec<Question> {
        self.all_questions(store)
            .into_iter()
            .filter(|q| q.is_wrong)
            .collect()
    }
}

impl Default for PackLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn annotate(questions: impl Iterator<Item = Question>, wrongs: &WrongSet) -> Vec<Question> {
    questions
        .map(|mut q| {
            q.is_wrong = wrongs.contains(&q.id);
            q
        })
        .collect()
}
