// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stored and public JSON shapes of a user record.

use user_records::models::{PublicUser, User};
use user_records::services::prepare_for_persistence;

mod common;
use common::local_user;

#[test]
fn test_stored_document_uses_camel_case() {
    let mut user = User::new("ada", "github");
    user.provider_id = Some("1815".to_string());
    user.set_full_name("Ada Lovelace");

    let json = serde_json::to_value(&user).unwrap();

    assert_eq!(json["firstName"], "Ada");
    assert_eq!(json["lastName"], "Lovelace");
    assert_eq!(json["providerId"], "1815");
    assert!(json.get("first_name").is_none());
    assert!(json.get("fullName").is_none());
}

#[test]
fn test_stored_document_round_trips_credentials() {
    let user = prepare_for_persistence(local_user("ada", "analytical")).unwrap();

    let json = serde_json::to_string(&user).unwrap();
    let loaded: User = serde_json::from_str(&json).unwrap();

    assert_eq!(loaded, user);
    assert!(loaded.authenticate("analytical"));
    assert!(!json.contains("analytical"));
}

#[test]
fn test_public_view_excludes_password_and_salt() {
    let mut user = prepare_for_persistence(local_user("ada", "analytical")).unwrap();
    user.set_full_name("Ada Lovelace");
    user.set_website(Some("findingada.com"));

    let json = serde_json::to_value(user.public_view()).unwrap();
    let object = json.as_object().unwrap();

    assert!(!object.contains_key("password"));
    assert!(!object.contains_key("salt"));
    assert_eq!(json["fullName"], "Ada Lovelace");
    assert_eq!(json["firstName"], "Ada");
    assert_eq!(json["website"], "http://findingada.com");
    assert_eq!(json["email"], "ada@example.com");
    assert_eq!(json["provider"], "local");

    let text = json.to_string();
    assert!(!text.contains(user.password().unwrap()));
    assert!(!text.contains(user.salt().unwrap()));
}

#[test]
fn test_public_view_field_allow_list() {
    let user = prepare_for_persistence(local_user("ada", "analytical")).unwrap();
    let json = serde_json::to_value(PublicUser::from(&user)).unwrap();

    let mut keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();

    assert_eq!(
        keys,
        vec![
            "created",
            "email",
            "firstName",
            "fullName",
            "id",
            "lastName",
            "provider",
            "providerData",
            "providerId",
            "username",
            "website",
        ]
    );
}

#[test]
fn test_provider_data_passes_through() {
    let mut user = User::new("octocat", "github");
    user.provider_data = Some(serde_json::json!({ "login": "octocat", "plan": { "name": "pro" } }));

    let json = serde_json::to_value(user.public_view()).unwrap();

    assert_eq!(json["providerData"]["plan"]["name"], "pro");
}
