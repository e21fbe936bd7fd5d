//! Principal normalization.
//!
//! Identity and role data arrives from several backend versions in
//! incompatible shapes: a single role string, an array of strings, or an
//! array of role objects labelled under `name` or `role`. This module
//! resolves whichever shape is present into one canonical view before any
//! decision logic runs. Normalization is total: malformed fields contribute
//! nothing instead of failing.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

/// Accepted shapes of a `roles` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RoleField {
    /// Single role label.
    One(String),
    /// List of labels or role objects.
    Many(Vec<RoleEntry>),
}

/// One element of a role list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RoleEntry {
    Label(String),
    Object(RoleObject),
}

/// Role object carrying its label under `name` or `role`.
#[derive(Debug, Clone, Deserialize)]
struct RoleObject {
    name: Option<String>,
    role: Option<String>,
}

impl RoleEntry {
    fn label(&self) -> Option<&str> {
        match self {
            Self::Label(label) => Some(label),
            Self::Object(object) => object.name.as_deref().or(object.role.as_deref()),
        }
    }
}

/// Canonical `{id, roles}` view of a session user document.
///
/// ## Invariants
/// - `id` is either absent or a non-empty string.
/// - Role labels are stored lowercased, so membership checks are
///   case-insensitive and re-normalizing an already normalized label is a
///   no-op.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Principal {
    id: Option<String>,
    roles: BTreeSet<String>,
}

impl Principal {
    /// Resolve a principal from whatever user document the session holds.
    ///
    /// # Examples
    /// ```
    /// use admin_client::domain::Principal;
    /// use serde_json::json;
    ///
    /// let principal = Principal::from_value(&json!({
    ///     "id": "u1",
    ///     "roles": [{ "name": "Uploader" }],
    /// }));
    /// assert_eq!(principal.id(), Some("u1"));
    /// assert!(principal.has_role("uploader"));
    /// ```
    pub fn from_value(user: &Value) -> Self {
        let Value::Object(fields) = user else {
            return Self::default();
        };

        let id = ["id", "_id"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(identity_string));

        let mut roles = BTreeSet::new();
        for field in ["role", "roles"] {
            if let Some(value) = fields.get(field) {
                collect_roles(value, &mut roles);
            }
        }

        Self { id, roles }
    }

    /// Normalized user id, when one could be derived.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether the normalized role set contains `role` (case-insensitive).
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(&role.to_ascii_lowercase())
    }

    /// Whether any role could be derived at all.
    pub fn has_any_role(&self) -> bool {
        !self.roles.is_empty()
    }
}

fn collect_roles(value: &Value, roles: &mut BTreeSet<String>) {
    let Ok(field) = serde_json::from_value::<RoleField>(value.clone()) else {
        return;
    };

    match field {
        RoleField::One(label) => {
            insert_role(&label, roles);
        }
        RoleField::Many(entries) => {
            for entry in &entries {
                if let Some(label) = entry.label() {
                    insert_role(label, roles);
                }
            }
        }
    }
}

fn insert_role(label: &str, roles: &mut BTreeSet<String>) {
    let normalized = label.trim().to_ascii_lowercase();
    if !normalized.is_empty() {
        roles.insert(normalized);
    }
}

/// Flatten an identity value to a plain, non-empty id string.
///
/// Backends variously hand out a raw id, an id array (first element wins),
/// or an object keyed by `_id`/`id`, sometimes behind one wrapper level such
/// as `owner.user._id`. Numeric ids are rendered in decimal. Anything else
/// yields `None`.
pub(crate) fn identity_string(value: &Value) -> Option<String> {
    identity_at(value, 1)
}

fn identity_at(value: &Value, wrappers_left: u8) -> Option<String> {
    match value {
        Value::String(id) => {
            let trimmed = id.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(id) => Some(id.to_string()),
        Value::Array(items) => items.first().and_then(|item| identity_at(item, wrappers_left)),
        Value::Object(fields) => {
            for key in ["_id", "id"] {
                if let Some(id) = fields.get(key).and_then(|inner| identity_at(inner, 0)) {
                    return Some(id);
                }
            }
            if wrappers_left == 0 {
                return None;
            }
            for key in ["user", "creator"] {
                if let Some(id) = fields
                    .get(key)
                    .and_then(|inner| identity_at(inner, wrappers_left - 1))
                {
                    return Some(id);
                }
            }
            None
        }
        _ => None,
    }
}
