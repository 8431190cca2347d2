// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod password;
pub mod users;
pub mod validation;

pub use users::{prepare_for_persistence, UserManager};
pub use validation::validate;
