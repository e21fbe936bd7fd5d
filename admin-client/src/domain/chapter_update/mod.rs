//! Resilient chapter update service.
//!
//! The backend's nested mutation surface is not reliably known at call
//! time: deployments disagree on the verb, on whether the nested route
//! exists at all, and on whether the Authorization header value carries a
//! `Bearer` prefix. The updater walks an ordered attempt ladder over those
//! variants, and rewrites the whole comic aggregate when the nested
//! endpoint turns out to be unsupported.
//!
//! The updater never re-checks authorization; callers gate on
//! [`can_manage_comic`](crate::domain::authorization::can_manage_comic)
//! before constructing a mutation.

use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::domain::error::UpdateError;
use crate::domain::ports::{BackendMethod, BackendRequest, BackendResponse, ComicsGateway};

mod aggregate;
mod ladder;

use aggregate::rewrite_aggregate;
use ladder::{AuthVariant, NestedAttempt, NestedLadder, Transition};

const BODY_PREVIEW_LIMIT: usize = 160;

/// Desired change for one chapter; absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChapterFields {
    /// Replacement chapter title.
    pub title: Option<String>,
    /// Replacement ordered image URL list.
    pub images: Option<Vec<String>>,
}

impl ChapterFields {
    fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(title) = &self.title {
            body.insert("title".to_owned(), Value::String(title.clone()));
        }
        if let Some(images) = &self.images {
            let urls = images.iter().cloned().map(Value::String).collect();
            body.insert("images".to_owned(), Value::Array(urls));
        }
        Value::Object(body)
    }
}

/// One requested chapter mutation. Constructed per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMutation {
    /// Parent comic id.
    pub comic_id: String,
    /// Target chapter id within the comic's embedded list.
    pub chapter_id: String,
    /// Fields to apply.
    pub fields: ChapterFields,
}

/// Field state confirmed applied, merged from the backend's echo when it
/// returns the chapter and from the request otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChapterFields {
    /// Title in effect after the update.
    pub title: Option<String>,
    /// Image list in effect after the update.
    pub images: Option<Vec<String>>,
}

/// Resilient updater walking the nested-endpoint attempt ladder.
pub struct ChapterUpdater {
    gateway: Arc<dyn ComicsGateway>,
}

impl ChapterUpdater {
    /// Build an updater over a gateway adapter.
    pub fn new(gateway: Arc<dyn ComicsGateway>) -> Self {
        Self { gateway }
    }

    /// Apply `mutation`, probing request variants until one sticks.
    ///
    /// The ladder is strictly sequential: the status of each attempt decides
    /// whether a next attempt exists. Independent mutations may run
    /// concurrently; they share no state.
    ///
    /// # Errors
    ///
    /// - [`UpdateError::AuthExpired`] when the token is absent or rejected
    ///   under every applicable header convention.
    /// - [`UpdateError::Rejected`] when the backend answers with a terminal
    ///   status the ladder has no move for.
    /// - [`UpdateError::Network`] on transport failure or timeout; the
    ///   ladder does not retry across these.
    /// - [`UpdateError::ChapterMissing`] when the aggregate fallback cannot
    ///   find the chapter inside the fetched comic.
    pub async fn update_chapter(
        &self,
        mutation: &ChapterMutation,
        token: Option<&str>,
    ) -> Result<AppliedChapterFields, UpdateError> {
        let mut ladder = NestedLadder::new(token.is_some());
        let mut attempt = ladder.start();

        loop {
            let request = nested_request(mutation, attempt, token);
            let response = self.execute(&request).await?;
            if response.is_success() {
                return Ok(applied_from_response(&response.body, &mutation.fields));
            }

            match ladder.on_status(attempt, response.status) {
                Transition::Retry(next) => attempt = next,
                Transition::Fallback => {
                    tracing::warn!(
                        comic_id = %mutation.comic_id,
                        chapter_id = %mutation.chapter_id,
                        "nested chapter endpoint unsupported; rewriting full comic aggregate"
                    );
                    return self
                        .apply_via_aggregate(mutation, token, attempt.variant)
                        .await;
                }
                Transition::AuthExpired => return Err(UpdateError::AuthExpired),
                Transition::Rejected => return Err(rejection(&response)),
            }
        }
    }

    /// Last resort: mutate the chapter indirectly by rewriting its parent.
    async fn apply_via_aggregate(
        &self,
        mutation: &ChapterMutation,
        token: Option<&str>,
        variant: AuthVariant,
    ) -> Result<AppliedChapterFields, UpdateError> {
        let comic_path = format!("comics/{}", mutation.comic_id);

        let fetched = self
            .execute(&BackendRequest {
                method: BackendMethod::Get,
                path: comic_path.clone(),
                auth: variant.header(token),
                body: None,
            })
            .await?;
        if !fetched.is_success() {
            return Err(terminal_failure(&fetched));
        }

        let comic: Value = serde_json::from_str(&fetched.body).map_err(|error| {
            UpdateError::Network {
                message: format!("comic aggregate was not valid JSON: {error}"),
            }
        })?;
        let Some(rewrite) = rewrite_aggregate(&comic, &mutation.chapter_id, &mutation.fields)
        else {
            return Err(UpdateError::ChapterMissing {
                comic_id: mutation.comic_id.clone(),
                chapter_id: mutation.chapter_id.clone(),
            });
        };

        let put = self
            .execute(&BackendRequest {
                method: BackendMethod::Put,
                path: comic_path.clone(),
                auth: variant.header(token),
                body: Some(rewrite.payload),
            })
            .await?;
        if put.is_success() {
            return Ok(applied_from_fields(&mutation.fields));
        }

        tracing::warn!(
            status = put.status,
            "full aggregate rewrite rejected; retrying with chapters-only patch"
        );
        let patched = self
            .execute(&BackendRequest {
                method: BackendMethod::Patch,
                path: comic_path,
                auth: variant.header(token),
                body: Some(json!({ "chapters": rewrite.chapters })),
            })
            .await?;
        if patched.is_success() {
            Ok(applied_from_fields(&mutation.fields))
        } else {
            Err(terminal_failure(&patched))
        }
    }

    async fn execute(&self, request: &BackendRequest) -> Result<BackendResponse, UpdateError> {
        match self.gateway.send(request).await {
            Ok(response) => {
                tracing::debug!(
                    method = request.method.as_str(),
                    path = %request.path,
                    status = response.status,
                    body = %body_preview(&response.body),
                    "backend attempt completed"
                );
                Ok(response)
            }
            Err(error) => {
                tracing::warn!(
                    method = request.method.as_str(),
                    path = %request.path,
                    error = %error,
                    "backend attempt failed in transport"
                );
                Err(UpdateError::Network {
                    message: error.to_string(),
                })
            }
        }
    }
}

fn nested_request(
    mutation: &ChapterMutation,
    attempt: NestedAttempt,
    token: Option<&str>,
) -> BackendRequest {
    BackendRequest {
        method: attempt.verb.method(),
        path: format!(
            "comics/{}/chapters/{}",
            mutation.comic_id, mutation.chapter_id
        ),
        auth: attempt.variant.header(token),
        body: Some(mutation.fields.to_body()),
    }
}

fn terminal_failure(response: &BackendResponse) -> UpdateError {
    if response.status == 401 {
        UpdateError::AuthExpired
    } else {
        rejection(response)
    }
}

fn rejection(response: &BackendResponse) -> UpdateError {
    UpdateError::Rejected {
        status: response.status,
        body: rejection_body(&response.body),
    }
}

/// Best-effort body extraction for surfaced rejections: a JSON
/// `message`/`error` field when present, else the JSON itself, else the raw
/// text, else a placeholder.
fn rejection_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(no body)".to_owned();
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(fields)) => {
            for key in ["message", "error"] {
                if let Some(Value::String(text)) = fields.get(key) {
                    return text.clone();
                }
            }
            Value::Object(fields).to_string()
        }
        Ok(other) => other.to_string(),
        Err(_) => trimmed.to_owned(),
    }
}

fn applied_from_fields(fields: &ChapterFields) -> AppliedChapterFields {
    AppliedChapterFields {
        title: fields.title.clone(),
        images: fields.images.clone(),
    }
}

/// Merge the applied state from the backend's echo when it returns the
/// chapter, falling back to the requested fields.
fn applied_from_response(body: &str, requested: &ChapterFields) -> AppliedChapterFields {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let chapter = parsed.as_ref().and_then(chapter_in_response);

    let title = chapter
        .and_then(|chapter| chapter.get("title"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| requested.title.clone());
    let images = chapter
        .and_then(|chapter| chapter.get("images"))
        .and_then(string_list)
        .or_else(|| requested.images.clone());

    AppliedChapterFields { title, images }
}

fn chapter_in_response(value: &Value) -> Option<&Value> {
    let Value::Object(fields) = value else {
        return None;
    };
    fields
        .get("chapter")
        .filter(|inner| inner.is_object())
        .or(Some(value))
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_owned))
        .collect()
}

fn body_preview(body: &str) -> String {
    let compact = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() <= BODY_PREVIEW_LIMIT {
        return compact;
    }
    let mut preview: String = compact.chars().take(BODY_PREVIEW_LIMIT).collect();
    preview.push_str("...");
    preview
}
