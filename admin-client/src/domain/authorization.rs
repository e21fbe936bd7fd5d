//! Capability rules for mutating a comic's chapters.
//!
//! Every rule treats its input as untyped JSON and fails closed: an
//! unrecognized shape denies rather than allows, and no input can make a
//! decision panic. Admin access always wins; ownership is consulted only
//! for the uploader tier.

use serde_json::Value;

use crate::domain::user::{Principal, identity_string};

const ADMIN_ROLE: &str = "admin";
const UPLOADER_ROLE: &str = "uploader";

/// Ownership fields in authority order; the first populated one wins.
const CREATOR_FIELDS: [&str; 6] = [
    "createdBy",
    "createdById",
    "creator",
    "owner",
    "user",
    "created_by",
];

/// Whether the user holds any privileged role (`admin` or `uploader`).
///
/// # Examples
/// ```
/// use admin_client::is_privileged;
/// use serde_json::json;
///
/// assert!(is_privileged(&json!({ "roles": ["Uploader"] })));
/// assert!(!is_privileged(&json!({ "roles": ["reader"] })));
/// ```
pub fn is_privileged(user: &Value) -> bool {
    let principal = Principal::from_value(user);
    principal.has_role(ADMIN_ROLE) || principal.has_role(UPLOADER_ROLE)
}

/// Whether the user holds the unrestricted `admin` role.
pub fn is_admin_only(user: &Value) -> bool {
    Principal::from_value(user).has_role(ADMIN_ROLE)
}

/// Whether the user may mutate the comic's chapters.
///
/// Admins may always; uploaders only when the comic's creator identity
/// resolves to the same non-empty id as their own. Every other case,
/// including null or malformed inputs, denies.
///
/// # Examples
/// ```
/// use admin_client::can_manage_comic;
/// use serde_json::json;
///
/// let uploader = json!({ "id": "u1", "roles": [{ "name": "Uploader" }] });
/// let own = json!({ "owner": { "user": { "_id": "u1" } } });
/// let foreign = json!({ "createdBy": "u2" });
/// assert!(can_manage_comic(&uploader, &own));
/// assert!(!can_manage_comic(&uploader, &foreign));
/// ```
pub fn can_manage_comic(user: &Value, comic: &Value) -> bool {
    let principal = Principal::from_value(user);
    if principal.has_role(ADMIN_ROLE) {
        return true;
    }
    if !principal.has_role(UPLOADER_ROLE) {
        return false;
    }

    match (principal.id(), creator_identity(comic)) {
        (Some(user_id), Some(creator_id)) => user_id == creator_id,
        _ => false,
    }
}

/// Resolve the comic's creator identity.
///
/// The first populated ownership field is authoritative even when its value
/// cannot be flattened to an id; later fields are never consulted as a
/// substitute.
pub(crate) fn creator_identity(comic: &Value) -> Option<String> {
    let Value::Object(fields) = comic else {
        return None;
    };

    let value = CREATOR_FIELDS
        .iter()
        .find_map(|field| fields.get(*field).filter(|value| !value.is_null()))?;
    identity_string(value)
}

#[cfg(test)]
mod tests;
