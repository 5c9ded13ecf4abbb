use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bank::normalize;
use crate::bank::question::Question;

const BUILTIN_PACK: &str = include_str!("../../assets/builtin-pack.json");

/// A normalized question pack. Instances only exist on the far side of
/// [`normalize::normalize_pack`], so holding one means every question in it
/// already passed validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionPack {
    #[serde(rename = "packId")]
    pub pack_id: String,
    pub title: String,
    pub version: String,
    pub questions: Vec<Question>,
}

impl QuestionPack {
    /// The pack compiled into the binary. It goes through the same
    /// normalizer as imported packs, so a bad edit to the asset shows up as
    /// dropped questions rather than a parse panic.
    pub fn builtin() -> Self {
        let raw: Value = serde_json::from_str(BUILTIN_PACK).unwrap_or(Value::Null);
        normalize::normalize_pack(&raw).unwrap_or_else(|| Self {
            pack_id: "builtin".to_string(),
            title: "Built-in".to_string(),
            version: "0".to_string(),
            questions: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Chapters in first-appearance order, without duplicates.
    pub fn chapters(&self) -> Vec<&str> {
        let mut chapters: Vec<&str> = Vec::new();
        for q in &self.questions {
            if !chapters.contains(&q.chapter.as_str()) {
                chapters.push(&q.chapter);
            }
        }
        chapters
    }
}
