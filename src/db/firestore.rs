// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed user operations.
//!
//! Layout:
//! - `users/{id}` holds the user record
//! - `usernames/{username}` is a claim document pointing at the owning user
//!
//! Claims are written with an `exists = false` precondition in the same
//! transaction as the user document, so Firestore itself rejects a second
//! record with the same username.

use crate::db::{collections, UserStore};
use crate::error::AppError;
use crate::models::User;
use async_trait::async_trait;
use firestore::FirestoreWritePrecondition;
use serde::{Deserialize, Serialize};

/// Claim document stored at `usernames/{username}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameClaim {
    pub user_id: String,
}

/// Add the `usernames/{username}` claim for `user` to a transaction.
///
/// The write only succeeds if no claim exists yet.
fn add_claim_to_transaction<'a>(
    client: &'a firestore::FirestoreDb,
    transaction: &mut firestore::FirestoreTransaction<'a>,
    user: &User,
) -> Result<(), AppError> {
    let claim = UsernameClaim {
        user_id: user.id.clone(),
    };
    client
        .fluent()
        .update()
        .in_col(collections::USERNAMES)
        .precondition(FirestoreWritePrecondition::Exists(false))
        .document_id(&user.username)
        .object(&claim)
        .add_to_transaction(transaction)
        .map_err(|e| AppError::Database(format!("Failed to add claim to transaction: {}", e)))?;
    Ok(())
}

/// Unsigned JWT accepted by the Firestore emulator.
const EMULATOR_TOKEN: &str = "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0.";

fn connect_error(project_id: &str, e: impl std::fmt::Display) -> AppError {
    AppError::Database(format!("Failed to open user store in {}: {}", project_id, e))
}

/// Client for the emulator, authenticated with [`EMULATOR_TOKEN`].
async fn emulator_client(project_id: &str) -> Result<firestore::FirestoreDb, AppError> {
    let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
        Ok(gcloud_sdk::Token {
            token_type: "Bearer".to_string(),
            token: gcloud_sdk::SecretValue::new(EMULATOR_TOKEN.to_string().into()),
            expiry: chrono::Utc::now() + chrono::Duration::hours(1),
        })
    });

    firestore::FirestoreDb::with_options_token_source(
        firestore::FirestoreDbOptions::new(project_id.to_string()),
        gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
        gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
    )
    .await
    .map_err(|e| connect_error(project_id, e))
}

/// User store backed by Firestore.
#[derive(Clone)]
pub struct FirestoreDb {
    inner: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Open the user store in `project_id`.
    ///
    /// Talks to the emulator instead when FIRESTORE_EMULATOR_HOST is set.
    pub async fn connect(project_id: &str) -> Result<Self, AppError> {
        let emulator_host = std::env::var("FIRESTORE_EMULATOR_HOST").ok();
        let inner = match emulator_host.as_deref() {
            Some(_) => emulator_client(project_id).await?,
            None => firestore::FirestoreDb::new(project_id)
                .await
                .map_err(|e| connect_error(project_id, e))?,
        };

        tracing::info!(
            project = project_id,
            emulator = emulator_host.as_deref().unwrap_or("none"),
            "User store connected"
        );
        Ok(Self { inner: Some(inner) })
    }

    /// A store with no connection. Every operation fails with `AppError::Database`.
    pub fn offline() -> Self {
        Self { inner: None }
    }

    fn client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.inner
            .as_ref()
            .ok_or_else(|| AppError::Database("User store is offline".to_string()))
    }

    async fn get_claim(&self, username: &str) -> Result<Option<UsernameClaim>, AppError> {
        self.client()?
            .fluent()
            .select()
            .by_id_in(collections::USERNAMES)
            .obj()
            .one(username)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_one_where_eq(
        &self,
        conditions: Vec<(&'static str, String)>,
    ) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(move |q| {
                q.for_all(
                    conditions
                        .iter()
                        .map(|(field, value)| q.field(*field).eq(value.clone())),
                )
            })
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    /// Decide why a commit that claimed `username` failed.
    ///
    /// If someone else now holds the claim the commit lost the race; anything
    /// else is surfaced as a store error.
    async fn classify_commit_failure(
        &self,
        user: &User,
        err: firestore::errors::FirestoreError,
    ) -> AppError {
        match self.get_claim(&user.username).await {
            Ok(Some(claim)) if claim.user_id != user.id => {
                tracing::warn!(username = %user.username, "Username claimed concurrently");
                AppError::UniquenessConflict(user.username.clone())
            }
            _ => AppError::Database(format!("Transaction commit failed: {}", err)),
        }
    }
}

#[async_trait]
impl UserStore for FirestoreDb {
    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        match self.get_claim(username).await? {
            Some(claim) => self.get_user(&claim.user_id).await,
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.find_one_where_eq(vec![("email", email.to_string())])
            .await
    }

    async fn find_by_provider(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> Result<Option<User>, AppError> {
        self.find_one_where_eq(vec![
            ("provider", provider.to_string()),
            ("providerId", provider_id.to_string()),
        ])
        .await
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        if self.get_claim(&user.username).await?.is_some() {
            return Err(AppError::UniquenessConflict(user.username.clone()));
        }

        let client = self.client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        add_claim_to_transaction(client, &mut transaction, user)?;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(&user.id)
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

        if let Err(e) = transaction.commit().await {
            return Err(self.classify_commit_failure(user, e).await);
        }

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        Ok(())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let existing = self
            .get_user(&user.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user.id)))?;

        let client = self.client()?;

        if existing.username == user.username {
            let _: () = client
                .fluent()
                .update()
                .in_col(collections::USERS)
                .document_id(&user.id)
                .object(user)
                .execute()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(());
        }

        // Username changed: claim the new one and release the old one atomically.
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        add_claim_to_transaction(client, &mut transaction, user)?;

        client
            .fluent()
            .delete()
            .from(collections::USERNAMES)
            .document_id(&existing.username)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add claim release to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| AppError::Database(format!("Failed to add user to transaction: {}", e)))?;

        if let Err(e) = transaction.commit().await {
            return Err(self.classify_commit_failure(user, e).await);
        }

        tracing::info!(
            user_id = %user.id,
            old_username = %existing.username,
            new_username = %user.username,
            "Username changed"
        );
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        let existing = self
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        let client = self.client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        for (collection, doc_id) in [
            (collections::USERS, id),
            (collections::USERNAMES, existing.username.as_str()),
        ] {
            client
                .fluent()
                .delete()
                .from(collection)
                .document_id(doc_id)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add deletion to transaction for {}: {}",
                        collection, e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit deletion: {}", e)))?;

        tracing::info!(user_id = id, username = %existing.username, "User deleted");
        Ok(())
    }
}
