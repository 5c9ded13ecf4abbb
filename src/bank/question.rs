use serde::{Deserialize, Serialize};

/// One selectable answer. `label` is the short key ("A", "B", ...) that the
/// question's `answer` field refers to; `value` is the full option text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub label: String,
    pub value: String,
}

/// Supplementary media attached to a question. Only images are supported.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// A single normalized question. Ids are globally unique across packs
/// because normalization namespaces them as `<packId>:<localId>`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub options: Vec<AnswerOption>,
    pub answer: String,
    pub analysis: String,
    pub chapter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    /// Set by listing code from the wrong-answer tracker. Never persisted.
    #[serde(skip)]
    pub is_wrong: bool,
}

impl Question {
    /// Index of the option whose label matches `answer`, if any.
    pub fn correct_option_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.label == self.answer)
    }

    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.correct_option_index().map(|i| &self.options[i])
    }
}
