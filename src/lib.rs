// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! User records: the user data model and its persistence helpers.
//!
//! This crate validates and normalizes user records, hashes passwords with
//! PBKDF2 before they are written, authenticates credentials, and finds free
//! usernames. Records live in Firestore (or an in-memory store for tests).

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

pub use config::Config;
pub use db::{FirestoreDb, MemoryStore, UserStore};
pub use error::{AppError, Result};
pub use models::{PublicUser, User};
pub use services::UserManager;
