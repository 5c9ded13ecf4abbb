use log::warn;
use serde_json::Value;
use thiserror::Error;

use crate::bank::pack::QuestionPack;
use crate::bank::question::{AnswerOption, Attachment, Question};

/// Why a candidate pack was rejected wholesale. Per-question problems never
/// surface here; bad questions are dropped and the pack survives.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PackError {
    #[error("pack is not a JSON object")]
    NotAnObject,
    #[error("pack field `{0}` is missing or not a non-empty string")]
    MissingHeader(&'static str),
    #[error("pack field `questions` is missing or not a list")]
    QuestionsNotAList,
}

/// Validates an untrusted value into a pack, or `None` if the pack as a
/// whole is unusable. Questions that fail validation are dropped
/// individually without sinking the pack.
pub fn normalize_pack(input: &Value) -> Option<QuestionPack> {
    normalize_pack_checked(input).ok()
}

/// Like [`normalize_pack`] but reports why a pack was rejected, for callers
/// that show the reason to a person (the import command line, mainly).
pub fn normalize_pack_checked(input: &Value) -> Result<QuestionPack, PackError> {
    let obj = input.as_object().ok_or(PackError::NotAnObject)?;
    let pack_id = header_string(obj.get("packId")).ok_or(PackError::MissingHeader("packId"))?;
    let title = header_string(obj.get("title")).ok_or(PackError::MissingHeader("title"))?;
    let version = header_string(obj.get("version")).ok_or(PackError::MissingHeader("version"))?;
    let raw_questions = obj
        .get("questions")
        .and_then(Value::as_array)
        .ok_or(PackError::QuestionsNotAList)?;

    let mut questions = Vec::with_capacity(raw_questions.len());
    for raw in raw_questions {
        match normalize_question(raw, pack_id) {
            Some(q) => questions.push(q),
            None => warn!("dropping malformed question in pack `{pack_id}`"),
        }
    }

    Ok(QuestionPack {
        pack_id: pack_id.to_string(),
        title: title.to_string(),
        version: version.to_string(),
        questions,
    })
}

fn header_string(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn normalize_question(raw: &Value, pack_id: &str) -> Option<Question> {
    let obj = raw.as_object()?;
    let id = question_id(obj.get("id")?, pack_id)?;
    let title = obj.get("title")?.as_str()?;
    let answer = obj.get("answer")?.as_str()?;
    let analysis = obj.get("analysis")?.as_str()?;
    let chapter = obj.get("chapter")?.as_str()?;
    let options = obj
        .get("options")?
        .as_array()?
        .iter()
        .filter_map(normalize_option)
        .collect();

    let mut question = Question {
        id,
        title: title.to_string(),
        options,
        answer: answer.to_string(),
        analysis: analysis.to_string(),
        chapter: chapter.to_string(),
        tags: None,
        difficulty: None,
        source: None,
        attachments: None,
        is_wrong: false,
    };

    // Optional fields ride along only when individually valid; a bad one is
    // omitted without dropping the question.
    if let Some(tags) = obj.get("tags").and_then(string_list) {
        question.tags = Some(tags);
    }
    if let Some(difficulty) = obj.get("difficulty").and_then(Value::as_i64) {
        if (1..=5).contains(&difficulty) {
            question.difficulty = Some(difficulty as u8);
        }
    }
    if let Some(source) = obj.get("source").and_then(Value::as_str) {
        let trimmed = source.trim();
        if !trimmed.is_empty() {
            question.source = Some(trimmed.to_string());
        }
    }
    if let Some(attachments) = obj.get("attachments").and_then(image_attachments) {
        question.attachments = Some(attachments);
    }

    Some(question)
}

/// Coerces a raw id to a non-empty string and namespaces it under the pack.
/// Ids already containing `:` are taken verbatim so a re-import of an
/// already-normalized pack does not double-prefix.
fn question_id(raw: &Value, pack_id: &str) -> Option<String> {
    let id = match raw {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if id.contains(':') {
        Some(id)
    } else {
        Some(format!("{pack_id}:{id}"))
    }
}

fn normalize_option(raw: &Value) -> Option<AnswerOption> {
    let obj = raw.as_object()?;
    let label = obj.get("label")?.as_str()?;
    let value = obj.get("value")?.as_str()?;
    Some(AnswerOption {
        label: label.to_string(),
        value: value.to_string(),
    })
}

fn string_list(raw: &Value) -> Option<Vec<String>> {
    let items = raw.as_array()?;
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Accepts the list only if every entry is an image with a non-empty url.
/// Extra fields on entries are dropped by construction.
fn image_attachments(raw: &Value) -> Option<Vec<Attachment>> {
    let items = raw.as_array()?;
    items
        .iter()
        .map(|item| {
            let obj = item.as_object()?;
            let kind = obj.get("type")?.as_str().filter(|k| *k == "image")?;
            let url = obj.get("url")?.as_str().filter(|u| !u.is_empty())?;
            Some(Attachment {
                kind: kind.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_question(id: Value) -> Value {
        json!({
            "id": id,
            "chapter": "c",
            "title": "t",
            "answer": "A",
            "analysis": "a",
            "options": [],
        })
    }

    fn minimal_pack(questions: Value) -> Value {
        json!({
            "packId": "p",
            "title": "t",
            "version": "1",
            "questions": questions,
        })
    }

    #[test]
    fn rejects_packs_with_missing_or_empty_headers() {
        for field in ["packId", "title", "version"] {
            let mut pack = minimal_pack(json!([]));
            pack.as_object_mut().unwrap().remove(field);
            assert_eq!(normalize_pack(&pack), None, "missing {field}");

            let mut pack = minimal_pack(json!([]));
            pack[field] = json!("");
            assert_eq!(normalize_pack(&pack), None, "empty {field}");

            let mut pack = minimal_pack(json!([]));
            pack[field] = json!(3);
            assert_eq!(normalize_pack(&pack), None, "non-string {field}");
        }
    }

    #[test]
    fn rejects_non_object_and_non_list_questions() {
        assert_eq!(normalize_pack(&json!(null)), None);
        assert_eq!(normalize_pack(&json!([1, 2])), None);
        assert_eq!(normalize_pack(&minimal_pack(json!("nope"))), None);
        assert_eq!(
            normalize_pack_checked(&minimal_pack(json!({}))),
            Err(PackError::QuestionsNotAList)
        );
    }

    #[test]
    fn checked_variant_names_the_missing_header() {
        let mut pack = minimal_pack(json!([]));
        pack["version"] = json!("");
        assert_eq!(
            normalize_pack_checked(&pack),
            Err(PackError::MissingHeader("version"))
        );
    }

    #[test]
    fn keeps_well_formed_questions_and_drops_the_rest() {
        let pack = minimal_pack(json!([
            minimal_question(json!(1)),
            {"id": 2, "chapter": "c"},
            minimal_question(json!("")),
            {"id": 3, "chapter": 4, "title": "t", "answer": "A", "analysis": "a", "options": []},
        ]));
        let normalized = normalize_pack(&pack).unwrap();
        assert_eq!(normalized.questions.len(), 1);
        assert_eq!(normalized.questions[0].id, "p:1");
    }

    #[test]
    fn numeric_ids_are_coerced_and_namespaced() {
        let pack = minimal_pack(json!([minimal_question(json!(5))]));
        let normalized = normalize_pack(&pack).unwrap();
        assert_eq!(normalized.questions[0].id, "p:5");
    }

    #[test]
    fn already_namespaced_ids_pass_verbatim() {
        let pack = minimal_pack(json!([minimal_question(json!("x:7"))]));
        let normalized = normalize_pack(&pack).unwrap();
        assert_eq!(normalized.questions[0].id, "x:7");
    }

    #[test]
    fn questions_without_an_options_list_are_dropped() {
        let mut q = minimal_question(json!(1));
        q.as_object_mut().unwrap().remove("options");
        assert!(normalize_pack(&minimal_pack(json!([q]))).unwrap().is_empty());

        let mut q = minimal_question(json!(1));
        q["options"] = json!("A,B");
        assert!(normalize_pack(&minimal_pack(json!([q]))).unwrap().is_empty());
    }

    #[test]
    fn malformed_option_entries_are_silently_discarded() {
        let mut q = minimal_question(json!(1));
        q["options"] = json!([
            {"label": "A", "value": "alpha"},
            {"label": "B"},
            {"label": 2, "value": "beta"},
            "gamma",
            {"label": "C", "value": "charlie", "extra": true},
        ]);
        let normalized = normalize_pack(&minimal_pack(json!([q]))).unwrap();
        let options = &normalized.questions[0].options;
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "A");
        assert_eq!(options[1].label, "C");
    }

    #[test]
    fn empty_analysis_is_a_valid_string() {
        let mut q = minimal_question(json!(1));
        q["analysis"] = json!("");
        let normalized = normalize_pack(&minimal_pack(json!([q]))).unwrap();
        assert_eq!(normalized.questions[0].analysis, "");
    }

    #[test]
    fn tags_attach_only_when_every_element_is_a_string() {
        let mut q = minimal_question(json!(1));
        q["tags"] = json!(["a", "b"]);
        let normalized = normalize_pack(&minimal_pack(json!([q.clone()]))).unwrap();
        assert_eq!(
            normalized.questions[0].tags,
            Some(vec!["a".to_string(), "b".to_string()])
        );

        q["tags"] = json!(["a", 2]);
        let normalized = normalize_pack(&minimal_pack(json!([q.clone()]))).unwrap();
        assert_eq!(normalized.questions[0].tags, None);

        q["tags"] = json!("a");
        let normalized = normalize_pack(&minimal_pack(json!([q]))).unwrap();
        assert_eq!(normalized.questions[0].tags, None);
    }

    #[test]
    fn difficulty_attaches_only_for_integers_one_through_five() {
        for (raw, expected) in [
            (json!(1), Some(1u8)),
            (json!(5), Some(5u8)),
            (json!(0), None),
            (json!(6), None),
            (json!(3.5), None),
            (json!("3"), None),
        ] {
            let mut q = minimal_question(json!(1));
            q["difficulty"] = raw.clone();
            let normalized = normalize_pack(&minimal_pack(json!([q]))).unwrap();
            assert_eq!(normalized.questions[0].difficulty, expected, "raw {raw}");
        }
    }

    #[test]
    fn source_is_trimmed_and_dropped_when_blank() {
        let mut q = minimal_question(json!(1));
        q["source"] = json!("  PMBOK 7  ");
        let normalized = normalize_pack(&minimal_pack(json!([q.clone()]))).unwrap();
        assert_eq!(normalized.questions[0].source, Some("PMBOK 7".to_string()));

        q["source"] = json!("   ");
        let normalized = normalize_pack(&minimal_pack(json!([q]))).unwrap();
        assert_eq!(normalized.questions[0].source, None);
    }

    #[test]
    fn attachments_require_every_entry_to_be_an_image_with_url() {
        let mut q = minimal_question(json!(1));
        q["attachments"] = json!([
            {"type": "image", "url": "https://example.com/a.png", "caption": "x"},
            {"type": "image", "url": "https://example.com/b.png"},
        ]);
        let normalized = normalize_pack(&minimal_pack(json!([q.clone()]))).unwrap();
        let attachments = normalized.questions[0].attachments.as_ref().unwrap();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].kind, "image");

        q["attachments"] = json!([
            {"type": "image", "url": "https://example.com/a.png"},
            {"type": "video", "url": "https://example.com/b.mp4"},
        ]);
        let normalized = normalize_pack(&minimal_pack(json!([q.clone()]))).unwrap();
        assert_eq!(normalized.questions[0].attachments, None);

        q["attachments"] = json!([{"type": "image", "url": ""}]);
        let normalized = normalize_pack(&minimal_pack(json!([q]))).unwrap();
        assert_eq!(normalized.questions[0].attachments, None);
    }
}
