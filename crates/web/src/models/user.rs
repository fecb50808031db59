//! User domain types.

use chrono::{DateTime, Utc};

use bazaar_core::{Email, UserId};

/// A registered user (domain type).
///
/// The password hash never leaves the database layer; it is fetched
/// separately by the auth service when verifying credentials.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// User's email address (unique).
    pub email: Email,
    /// Whether this account has admin privileges.
    pub is_admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}
