// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field validation for user records before they are written.

use crate::error::{AppError, Result};
use crate::models::User;
use validator::Validate;

/// Order in which failing fields are reported.
const FIELD_ORDER: [&str; 4] = ["email", "username", "password", "provider"];

const UNPAIRED_CREDENTIALS: &str = "Password hash and salt must be stored together.";

/// Validate a user record.
///
/// Checks the email shape, required username and provider, the length of a
/// staged plaintext password, and that a stored hash and salt come as a pair.
/// Reports the first failing field.
pub fn validate(user: &User) -> Result<()> {
    let mut failures: Vec<(String, String)> = match user.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                let first = errs.first()?;
                let message = first
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| first.code.to_string());
                Some((public_field_name(&field.to_string()), message))
            })
            .collect(),
    };

    if user.password().is_some() != user.salt().is_some() {
        failures.push(("password".to_string(), UNPAIRED_CREDENTIALS.to_string()));
    }

    failures.sort_by_key(|(field, _)| {
        FIELD_ORDER
            .iter()
            .position(|f| f == field)
            .unwrap_or(FIELD_ORDER.len())
    });

    match failures.into_iter().next() {
        Some((field, message)) => {
            tracing::debug!(field = %field, message = %message, "User validation failed");
            Err(AppError::Validation { field, message })
        }
        None => Ok(()),
    }
}

/// The staged plaintext lives in a private field; report it as `password`.
fn public_field_name(field: &str) -> String {
    match field {
        "pending_password" | "pendingPassword" => "password".to_string(),
        other => other.to_string(),
    }
}
