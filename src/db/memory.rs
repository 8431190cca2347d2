// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory user store for tests and local tooling.

use crate::db::UserStore;
use crate::error::AppError;
use crate::models::User;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// User store backed by concurrent hash maps.
///
/// The username index is claimed through `DashMap::entry`, which holds the
/// shard lock, so two concurrent inserts of the same username cannot both win.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    /// username -> user ID
    usernames: DashMap<String, String>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `users`, bypassing validation.
    pub fn with_users(users: Vec<User>) -> Self {
        let store = Self::new();
        for user in users {
            store.usernames.insert(user.username.clone(), user.id.clone());
            store.users.insert(user.id.clone(), user);
        }
        store
    }

    /// Make every subsequent call fail as if the store were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn check_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Database("Store unavailable (offline mode)".to_string()));
        }
        Ok(())
    }

    fn find_where<F>(&self, predicate: F) -> Option<User>
    where
        F: Fn(&User) -> bool,
    {
        self.users
            .iter()
            .find(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.check_online()?;
        Ok(self.users.get(id).map(|u| u.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.check_online()?;
        let id = match self.usernames.get(username) {
            Some(id) => id.value().clone(),
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.check_online()?;
        Ok(self.find_where(|u| u.email.as_deref() == Some(email)))
    }

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, AppError> {
        self.check_online()?;
        Ok(self.find_where(|u| {
            u.provider == provider && u.provider_id.as_deref() == Some(provider_id)
        }))
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.check_online()?;
        if self.users.contains_key(&user.id) {
            return Err(AppError::Database(format!(
                "User document {} already exists",
                user.id
            )));
        }

        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::UniquenessConflict(user.username.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.id.clone());
                self.users.insert(user.id.clone(), user.clone());
                Ok(())
            }
        }
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        self.check_online()?;
        let old_username = match self.users.get(&user.id) {
            Some(existing) => existing.username.clone(),
            None => return Err(AppError::NotFound(format!("User {} not found", user.id))),
        };

        if old_username != user.username {
            match self.usernames.entry(user.username.clone()) {
                Entry::Occupied(_) => {
                    return Err(AppError::UniquenessConflict(user.username.clone()))
                }
                Entry::Vacant(slot) => {
                    slot.insert(user.id.clone());
                }
            }
            self.usernames
                .remove_if(&old_username, |_, owner| owner == &user.id);
        }

        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        self.check_online()?;
        let (_, user) = self
            .users
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        self.usernames
            .remove_if(&user.username, |_, owner| owner == &user.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = MemoryStore::new();
        let mut user = User::new("ada", "local");
        user.email = Some("ada@example.com".to_string());
        user.provider_id = Some("ada-1".to_string());

        store.insert_user(&user).await.unwrap();

        assert_eq!(store.get_user(&user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(store.find_by_username("ada").await.unwrap(), Some(user.clone()));
        assert_eq!(
            store.find_by_email("ada@example.com").await.unwrap(),
            Some(user.clone())
        );
        assert_eq!(
            store.find_by_provider("local", "ada-1").await.unwrap(),
            Some(user)
        );
        assert!(store.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(&User::new("ada", "local")).await.unwrap();

        let err = store
            .insert_user(&User::new("ada", "github"))
            .await
            .unwrap_err();

        assert!(err.is_uniqueness_conflict());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_moves_username_claim() {
        let store = MemoryStore::new();
        let mut user = User::new("ada", "local");
        store.insert_user(&user).await.unwrap();

        user.set_username("countess");
        store.update_user(&user).await.unwrap();

        assert!(store.find_by_username("ada").await.unwrap().is_none());
        assert_eq!(
            store.find_by_username("countess").await.unwrap().map(|u| u.id),
            Some(user.id.clone())
        );

        // The old name is free again.
        store.insert_user(&User::new("ada", "local")).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_into_taken_username_conflicts() {
        let store = MemoryStore::new();
        store.insert_user(&User::new("ada", "local")).await.unwrap();
        let mut bob = User::new("bob", "local");
        store.insert_user(&bob).await.unwrap();

        bob.set_username("ada");
        let err = store.update_user(&bob).await.unwrap_err();

        assert!(err.is_uniqueness_conflict());
        assert_eq!(
            store.find_by_username("bob").await.unwrap().map(|u| u.id),
            Some(bob.id)
        );
    }

    #[tokio::test]
    async fn test_update_missing_user_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update_user(&User::new("ghost", "local"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_releases_username() {
        let store = MemoryStore::new();
        let user = User::new("ada", "local");
        store.insert_user(&user).await.unwrap();

        store.delete_user(&user.id).await.unwrap();

        assert!(store.is_empty());
        assert!(store.find_by_username("ada").await.unwrap().is_none());
        assert!(matches!(
            store.delete_user(&user.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_store_errors() {
        let store = MemoryStore::new();
        store.set_offline(true);

        let err = store.find_by_username("ada").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
