// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User record as stored in Firestore, plus its public API view.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::services::password;
use crate::time_utils::now_rfc3339;

/// Minimal `local@domain.tld` shape check, not RFC 5322.
pub static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".+@.+\..+").expect("email pattern is valid"));

/// User record stored in Firestore (`users/{id}`).
///
/// `password` and `salt` only ever hold the PBKDF2 hash and its salt, and are
/// private so that nothing else can be written there. A new plaintext is
/// staged with [`User::set_password`] and hashed by the manager on the next
/// save; it is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Document ID
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[validate(regex(path = *EMAIL_PATTERN, message = "Please create a valid e-mail address."))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "A username is required."))]
    pub username: String,
    /// Base64 PBKDF2 hash
    password: Option<String>,
    /// Base64 salt, set together with `password`
    salt: Option<String>,
    /// Strategy that registered the user ("local", "github", ...)
    #[validate(length(min = 1, message = "Provider is required."))]
    pub provider: String,
    pub provider_id: Option<String>,
    /// Raw profile payload from an external identity provider
    pub provider_data: Option<serde_json::Value>,
    /// Creation time (RFC 3339)
    pub created: String,
    pub website: Option<String>,

    #[serde(skip)]
    #[validate(length(
        min = 6,
        message = "Password must be greater than or equal to six characters."
    ))]
    pending_password: Option<String>,
}

impl User {
    /// Create a new record with a fresh ID and creation timestamp.
    pub fn new(username: &str, provider: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            username: username.trim().to_string(),
            password: None,
            salt: None,
            provider: provider.to_string(),
            provider_id: None,
            provider_data: None,
            created: now_rfc3339(),
            website: None,
            pending_password: None,
        }
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = username.trim().to_string();
    }

    /// `first_name + " " + last_name`, even when either part is empty.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Split on spaces into first/last name. Tokens past the second are dropped.
    pub fn set_full_name(&mut self, full_name: &str) {
        let mut parts = full_name.split(' ');
        self.first_name = parts.next().unwrap_or_default().to_string();
        self.last_name = parts.next().unwrap_or_default().to_string();
    }

    pub fn set_website(&mut self, website: Option<&str>) {
        self.website = website.map(normalize_website);
    }

    /// Stage a new plaintext password. It is validated and hashed on the next save.
    pub fn set_password(&mut self, plaintext: &str) {
        self.pending_password = Some(plaintext.to_string());
    }

    /// Stored PBKDF2 hash, base64.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn salt(&self) -> Option<&str> {
        self.salt.as_deref()
    }

    pub(crate) fn set_credentials(&mut self, hash: String, salt: String) {
        self.password = Some(hash);
        self.salt = Some(salt);
    }

    /// Whether a plaintext password is waiting to be hashed.
    pub fn has_pending_password(&self) -> bool {
        self.pending_password
            .as_deref()
            .is_some_and(|p| !p.is_empty())
    }

    pub(crate) fn take_pending_password(&mut self) -> Option<String> {
        self.pending_password.take()
    }

    /// Hash `password` with this record's salt.
    ///
    /// Fails if the record has no salt or the stored salt is not valid base64.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = self
            .salt
            .as_deref()
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("user has no password salt")))?;
        password::hash_password(password, salt)
    }

    /// Check `password` against the stored hash in constant time.
    pub fn authenticate(&self, password: &str) -> bool {
        match (self.salt.as_deref(), self.password.as_deref()) {
            (Some(salt), Some(hash)) => password::verify_password(password, salt, hash),
            _ => false,
        }
    }

    pub fn public_view(&self) -> PublicUser {
        PublicUser::from(self)
    }
}

/// Prefix `http://` onto a non-empty URL that has no http(s) scheme.
pub fn normalize_website(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

/// Externally visible user fields. Never carries `password` or `salt`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub username: String,
    pub provider: String,
    pub provider_id: Option<String>,
    pub provider_data: Option<serde_json::Value>,
    pub created: String,
    pub website: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            username: user.username.clone(),
            provider: user.provider.clone(),
            provider_id: user.provider_id.clone(),
            provider_data: user.provider_data.clone(),
            created: user.created.clone(),
            website: user.website.clone(),
        }
    }
}
