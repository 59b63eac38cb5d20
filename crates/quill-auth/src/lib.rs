//! Credential store for the quill blog.
//!
//! Handles user registration and login against the `user` table. Passwords
//! are stored as one-way bcrypt hashes; the plaintext never touches the
//! database. Username uniqueness is enforced by the storage layer's UNIQUE
//! constraint and surfaced as [`RegisterError::DuplicateUsername`] rather
//! than a crash.

mod password;
mod store;

pub use password::{hash_password, verify_password};
pub use store::{authenticate, get_user_by_id, get_user_by_username, register_user};

use thiserror::Error;

/// A registered user.
///
/// Read on login and once per request to populate the current identity;
/// never updated or deleted by the blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Row id in the `user` table.
    pub id: i64,
    /// Unique username.
    pub username: String,
    /// Bcrypt password hash.
    pub password_hash: String,
}

/// Errors produced by registration.
///
/// The `Display` strings of the first three variants are shown to the end
/// user verbatim, matching the original flash messages.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Username is required.")]
    UsernameRequired,
    #[error("Password is required.")]
    PasswordRequired,
    /// The UNIQUE constraint on `user.username` fired.
    #[error("User {0} is already registered.")]
    DuplicateUsername(String),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Errors produced by authentication.
///
/// The incorrect-username and incorrect-password variants carry distinct
/// user-facing messages. This mirrors the original behavior and is a known
/// username-enumeration pattern, kept deliberately.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Incorrect username.")]
    IncorrectUsername,
    #[error("Incorrect password.")]
    IncorrectPassword,
    #[error("password verification failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
