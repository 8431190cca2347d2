// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use user_records::error::AppError;

#[test]
fn test_is_uniqueness_conflict_matches() {
    let err = AppError::UniquenessConflict("bob".to_string());
    assert!(err.is_uniqueness_conflict());
    assert_eq!(err.to_string(), "Username already taken: bob");
}

#[test]
fn test_is_uniqueness_conflict_no_match() {
    let err = AppError::validation("username", "A username is required.");
    assert!(!err.is_uniqueness_conflict());

    let err = AppError::Database("unavailable".to_string());
    assert!(!err.is_uniqueness_conflict());
}

#[test]
fn test_validation_field() {
    let err = AppError::validation("email", "Please create a valid e-mail address.");
    assert_eq!(err.validation_field(), Some("email"));
    assert_eq!(
        err.to_string(),
        "Validation failed for email: Please create a valid e-mail address."
    );

    let err = AppError::NotFound("User x not found".to_string());
    assert_eq!(err.validation_field(), None);
}

#[test]
fn test_exhaustion_message() {
    let err = AppError::UsernameExhausted {
        base: "bob".to_string(),
        attempts: 3,
    };
    assert_eq!(
        err.to_string(),
        "No free username for 'bob' after 3 attempts"
    );
}
