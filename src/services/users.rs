// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User record manager: the write pipeline, lookups, credential checks and
//! the username probe.

use crate::config::Config;
use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::models::{normalize_website, User};
use crate::services::password;
use crate::services::validation::validate;
use std::sync::Arc;

/// Normalize, validate and hash a record before it is written.
///
/// - trims the username and normalizes the website URL
/// - treats an empty email as absent
/// - validates every field before anything is hashed
/// - if a plaintext password is staged, generates a new salt and replaces
///   `password` with its hash
///
/// A record whose `password` already holds a hash and has no staged
/// plaintext passes through untouched, so re-saving never re-hashes.
pub fn prepare_for_persistence(mut user: User) -> Result<User> {
    user.username = user.username.trim().to_string();
    if let Some(website) = user.website.take() {
        user.website = Some(normalize_website(&website));
    }
    if user.email.as_deref() == Some("") {
        user.email = None;
    }

    validate(&user)?;

    if let Some(plaintext) = user.take_pending_password() {
        if !plaintext.is_empty() {
            let salt = password::generate_salt()?;
            let hash = password::hash_password(&plaintext, &salt)?;
            user.set_credentials(hash, salt);
        }
    }

    Ok(user)
}

/// Manages user records on top of a [`UserStore`].
#[derive(Clone)]
pub struct UserManager {
    store: Arc<dyn UserStore>,
    username_probe_limit: u32,
}

impl UserManager {
    pub fn new(store: Arc<dyn UserStore>, config: &Config) -> Self {
        Self::with_probe_limit(store, config.username_probe_limit)
    }

    pub fn with_probe_limit(store: Arc<dyn UserStore>, username_probe_limit: u32) -> Self {
        Self {
            store,
            username_probe_limit: username_probe_limit.max(1),
        }
    }

    /// Validate, hash and store a new user.
    ///
    /// Fails with [`AppError::UniquenessConflict`] if the username is taken,
    /// even when another registration for it is racing this one.
    pub async fn create(&self, user: User) -> Result<User> {
        let user = prepare_for_persistence(user)?;

        match self.store.insert_user(&user).await {
            Ok(()) => {
                tracing::info!(
                    user_id = %user.id,
                    username = %user.username,
                    provider = %user.provider,
                    "User registered"
                );
                Ok(user)
            }
            Err(e) => {
                if e.is_uniqueness_conflict() {
                    tracing::warn!(username = %user.username, "Username already taken");
                }
                Err(e)
            }
        }
    }

    /// Validate and store changes to an existing user.
    ///
    /// The password is re-hashed only if a new plaintext was staged with
    /// [`User::set_password`].
    pub async fn update(&self, user: User) -> Result<User> {
        let rehashed = user.has_pending_password();
        let user = prepare_for_persistence(user)?;

        self.store.update_user(&user).await?;
        tracing::debug!(user_id = %user.id, password_changed = rehashed, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete_user(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        self.store.get_user(id).await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.store.find_by_username(username.trim()).await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.store.find_by_email(email).await
    }

    pub async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>> {
        self.store.find_by_provider(provider, provider_id).await
    }

    /// Look up `username` and check `password` against it.
    ///
    /// Returns the user on success and `None` for an unknown username or a
    /// wrong password. Store failures are returned as errors.
    pub async fn authenticate_local(&self, username: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_username(username).await? else {
            tracing::debug!(username = %username, "Authentication for unknown user");
            return Ok(None);
        };

        if user.authenticate(password) {
            Ok(Some(user))
        } else {
            tracing::warn!(user_id = %user.id, "Authentication failed");
            Ok(None)
        }
    }

    /// Find the first free username among `base`, `base1`, `base2`, ...
    ///
    /// `base` is trimmed the same way usernames are on save; an empty base is
    /// a validation error.
    ///
    /// Tries at most the configured number of candidates and then fails with
    /// [`AppError::UsernameExhausted`]. Store errors are propagated. The result
    /// is only a hint: a concurrent registration can still take it, in which
    /// case [`UserManager::create`] reports a uniqueness conflict.
    pub async fn find_unique_username(&self, base: &str) -> Result<String> {
        let base = base.trim();
        if base.is_empty() {
            return Err(AppError::validation("username", "A username is required."));
        }

        for attempt in 0..self.username_probe_limit {
            let candidate = if attempt == 0 {
                base.to_string()
            } else {
                format!("{}{}", base, attempt)
            };

            if self.store.find_by_username(&candidate).await?.is_none() {
                tracing::debug!(
                    base = %base,
                    username = %candidate,
                    attempts = attempt + 1,
                    "Found free username"
                );
                return Ok(candidate);
            }

            tracing::debug!(username = %candidate, "Username taken, trying next suffix");
        }

        tracing::warn!(
            base = %base,
            attempts = self.username_probe_limit,
            "Username probe exhausted"
        );
        Err(AppError::UsernameExhausted {
            base: base.to_string(),
            attempts: self.username_probe_limit,
        })
    }
}
