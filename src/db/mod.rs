// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: the store contract plus Firestore and in-memory backends.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::User;
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Username claims (keyed by username) backing the uniqueness constraint
    pub const USERNAMES: &str = "usernames";
}

/// Persistent store for user records.
///
/// Implementations must enforce username uniqueness atomically: of two
/// concurrent writes claiming the same username, exactly one succeeds and the
/// other fails with [`AppError::UniquenessConflict`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Get a user by document ID.
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Find the user registered through `provider` with external ID `provider_id`.
    async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, AppError>;

    /// Store a new user, claiming its username.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    /// Overwrite an existing user, moving its username claim if it changed.
    async fn update_user(&self, user: &User) -> Result<(), AppError>;

    /// Delete a user and release its username.
    async fn delete_user(&self, id: &str) -> Result<(), AppError>;
}
