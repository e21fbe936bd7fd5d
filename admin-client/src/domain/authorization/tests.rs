//! Capability-rule coverage, including the fail-closed paths.

use rstest::rstest;
use serde_json::{Value, json};

use super::{can_manage_comic, creator_identity, is_admin_only, is_privileged};

fn admin() -> Value {
    json!({ "id": "a1", "role": "admin" })
}

fn uploader(id: &str) -> Value {
    json!({ "id": id, "roles": [{ "name": "Uploader" }] })
}

#[rstest]
#[case::admin_string(json!({ "role": "admin" }), true)]
#[case::admin_mixed_case(json!({ "roles": ["Admin"] }), true)]
#[case::uploader_object(json!({ "roles": [{ "name": "Uploader" }] }), true)]
#[case::reader(json!({ "role": "reader" }), false)]
#[case::no_roles(json!({ "id": "u1" }), false)]
#[case::null(json!(null), false)]
fn privilege_covers_both_tiers(#[case] user: Value, #[case] expected: bool) {
    assert_eq!(is_privileged(&user), expected);
}

#[rstest]
#[case::admin(json!({ "role": "admin" }), true)]
#[case::uploader(json!({ "roles": ["uploader"] }), false)]
#[case::both(json!({ "roles": ["uploader", "ADMIN"] }), true)]
fn admin_tier_is_admin_alone(#[case] user: Value, #[case] expected: bool) {
    assert_eq!(is_admin_only(&user), expected);
}

#[test]
fn admins_manage_any_comic_regardless_of_ownership() {
    assert!(can_manage_comic(&admin(), &json!({ "createdBy": "someone-else" })));
    assert!(can_manage_comic(&admin(), &json!(null)));
    assert!(can_manage_comic(&admin(), &json!({})));
}

#[rstest]
#[case::created_by_string(json!({ "createdBy": "u1" }))]
#[case::created_by_id(json!({ "createdById": "u1" }))]
#[case::creator_object(json!({ "creator": { "_id": "u1" } }))]
#[case::owner_wrapped_user(json!({ "owner": { "user": { "_id": "u1" } } }))]
#[case::user_field(json!({ "user": "u1" }))]
#[case::snake_case_field(json!({ "created_by": "u1" }))]
#[case::id_array(json!({ "createdBy": ["u1", "u2"] }))]
fn uploaders_manage_their_own_comics(#[case] comic: Value) {
    assert!(can_manage_comic(&uploader("u1"), &comic));
    assert!(!can_manage_comic(&uploader("u9"), &comic));
}

#[test]
fn ownership_precedence_takes_the_first_populated_field() {
    let comic = json!({ "createdBy": "u1", "owner": "u2" });
    assert!(can_manage_comic(&uploader("u1"), &comic));
    assert!(!can_manage_comic(&uploader("u2"), &comic));

    // Null fields are skipped, not treated as populated.
    let with_null = json!({ "createdBy": null, "owner": "u2" });
    assert!(can_manage_comic(&uploader("u2"), &with_null));
}

#[test]
fn an_unresolvable_authoritative_field_denies_rather_than_falling_through() {
    let comic = json!({ "createdBy": "", "owner": "u1" });
    assert!(!can_manage_comic(&uploader("u1"), &comic));
    assert_eq!(creator_identity(&comic), None);
}

#[rstest]
#[case::unprivileged_owner(json!({ "id": "u1", "role": "reader" }), json!({ "createdBy": "u1" }))]
#[case::no_user_id(json!({ "roles": ["uploader"] }), json!({ "createdBy": "u1" }))]
#[case::no_creator(json!({ "id": "u1", "roles": ["uploader"] }), json!({ "title": "X" }))]
#[case::empty_ids(json!({ "id": "", "roles": ["uploader"] }), json!({ "createdBy": "" }))]
#[case::null_user(json!(null), json!({ "createdBy": "u1" }))]
#[case::null_comic(json!({ "id": "u1", "roles": ["uploader"] }), json!(null))]
#[case::both_null(json!(null), json!(null))]
#[case::array_comic(json!({ "id": "u1", "roles": ["uploader"] }), json!(["u1"]))]
#[case::numeric_user(json!(12), json!({ "createdBy": "12" }))]
fn every_ambiguous_shape_denies(#[case] user: Value, #[case] comic: Value) {
    assert!(!can_manage_comic(&user, &comic));
}

#[test]
fn numeric_ids_compare_by_decimal_rendering() {
    let user = json!({ "id": 7, "roles": ["uploader"] });
    let comic = json!({ "createdBy": "7" });
    assert!(can_manage_comic(&user, &comic));
}

#[test]
fn uploader_with_wrapped_owner_matches_scenario_from_the_field() {
    // roles: [{ name: "Uploader" }], owner: { user: { _id: "u1" } }, id "u1".
    let user = json!({ "id": "u1", "roles": [{ "name": "Uploader" }] });
    let comic = json!({ "owner": { "user": { "_id": "u1" } } });
    assert!(can_manage_comic(&user, &comic));
}
