//! Whole-aggregate rewrite for backends without a nested chapter endpoint.
//!
//! The rewrite touches exactly one element of the embedded chapter list,
//! joined on the chapter id, and passes every sibling chapter and every
//! other top-level comic field through unmodified. Top-level identity
//! fields are stripped so the outgoing payload cannot conflict with the
//! aggregate's own identity.

use serde_json::{Map, Value};

use super::ChapterFields;
use crate::domain::user::identity_string;

/// Payloads produced by one aggregate rewrite.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct AggregateRewrite {
    /// Full comic document with the chapter list updated and top-level
    /// `_id`/`id` removed.
    pub(super) payload: Value,
    /// The updated chapter list alone, for the chapters-only patch.
    pub(super) chapters: Vec<Value>,
}

/// Apply `fields` to the chapter with `chapter_id` inside `comic`.
///
/// Returns `None` when the document has no chapter list or no chapter
/// matches the id.
pub(super) fn rewrite_aggregate(
    comic: &Value,
    chapter_id: &str,
    fields: &ChapterFields,
) -> Option<AggregateRewrite> {
    let Value::Object(comic_fields) = comic else {
        return None;
    };
    let chapter_list = comic_fields.get("chapters")?.as_array()?;
    let target = chapter_list
        .iter()
        .position(|chapter| chapter_matches(chapter, chapter_id))?;

    let mut chapters = chapter_list.clone();
    let entry = chapters.get_mut(target)?.as_object_mut()?;
    if let Some(title) = &fields.title {
        entry.insert("title".to_owned(), Value::String(title.clone()));
    }
    if let Some(images) = &fields.images {
        let urls = images.iter().cloned().map(Value::String).collect();
        entry.insert("images".to_owned(), Value::Array(urls));
    }

    let mut payload_fields: Map<String, Value> = comic_fields.clone();
    payload_fields.remove("_id");
    payload_fields.remove("id");
    payload_fields.insert("chapters".to_owned(), Value::Array(chapters.clone()));

    Some(AggregateRewrite {
        payload: Value::Object(payload_fields),
        chapters,
    })
}

fn chapter_matches(chapter: &Value, chapter_id: &str) -> bool {
    let Value::Object(fields) = chapter else {
        return false;
    };
    ["_id", "id"].iter().any(|key| {
        fields
            .get(*key)
            .and_then(identity_string)
            .is_some_and(|id| id == chapter_id)
    })
}
