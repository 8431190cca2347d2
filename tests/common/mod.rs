// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use std::sync::Arc;
use user_records::db::{FirestoreDb, MemoryStore};
use user_records::models::User;
use user_records::services::UserManager;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::connect("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// A store with no connection.
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::offline()
}

/// Manager over a fresh in-memory store. Returns the store for direct inspection.
#[allow(dead_code)]
pub fn memory_manager() -> (UserManager, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let manager = UserManager::with_probe_limit(store.clone(), 100);
    (manager, store)
}

/// A valid local user with a staged password.
#[allow(dead_code)]
pub fn local_user(username: &str, password: &str) -> User {
    let mut user = User::new(username, "local");
    user.email = Some(format!("{}@example.com", username));
    user.set_full_name("Test User");
    user.set_password(password);
    user
}

/// Generate a unique username for test isolation.
#[allow(dead_code)]
pub fn unique_username(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
