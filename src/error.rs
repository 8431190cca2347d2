// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the model, store and manager layers.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A field failed its validation rule.
    #[error("Validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    /// The username is already claimed by another record.
    #[error("Username already taken: {0}")]
    UniquenessConflict(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Store unavailable or the store operation failed.
    #[error("Database error: {0}")]
    Database(String),

    #[error("No free username for '{base}' after {attempts} attempts")]
    UsernameExhausted { base: String, attempts: u32 },

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether this error was caused by a duplicate username.
    pub fn is_uniqueness_conflict(&self) -> bool {
        matches!(self, AppError::UniquenessConflict(_))
    }

    /// The failing field for validation errors.
    pub fn validation_field(&self) -> Option<&str> {
        match self {
            AppError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
