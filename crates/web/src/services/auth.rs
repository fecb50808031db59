//! Authentication service.
//!
//! Wraps the user repository with validation and Argon2 password hashing.
//! Every input is validated before anything is written, so a failed account
//! update leaves the row untouched.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;
use thiserror::Error;

use bazaar_core::{Email, EmailError, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum username length.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum email length accepted at registration.
const MAX_EMAIL_LENGTH: usize = 50;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password is wrong. Deliberately does not say which.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The email is already registered.
    #[error("an account with this email already exists")]
    DuplicateEmail,

    /// The current password given for an account change is wrong.
    #[error("current password is incorrect")]
    WrongCurrentPassword,

    /// New password and confirmation don't match.
    #[error("new passwords do not match")]
    PasswordMismatch,

    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Username is empty or too long.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// Repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,
}

/// Requested changes to an account, applied all-or-nothing.
pub struct AccountUpdate<'a> {
    pub username: &'a str,
    pub email: &'a str,
    /// Required whenever a password change is requested.
    pub current_password: &'a str,
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

impl AccountUpdate<'_> {
    fn wants_password_change(&self) -> bool {
        !self.new_password.is_empty() || !self.confirm_password.is_empty()
    }
}

/// Authentication service.
///
/// Handles registration, login and account updates.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with username, email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username is empty or too long.
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::DuplicateEmail` if the email is already registered.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let username = validate_username(username)?;
        let email = validate_email(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        // Malformed emails get the same answer as unknown ones
        let Ok(email) = Email::parse(email) else {
            return Err(AuthError::InvalidCredentials);
        };

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Update a user's account (username, email, optionally password).
    ///
    /// All validation runs before the write: if a password change is
    /// requested, the current password must verify and the new pair must
    /// match, otherwise nothing changes. The write itself is one UPDATE, so
    /// partial application can't happen.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongCurrentPassword` if the current password fails.
    /// Returns `AuthError::PasswordMismatch` if the new passwords differ.
    /// Returns `AuthError::DuplicateEmail` if the new email belongs to someone else.
    pub async fn update_account(
        &self,
        user_id: UserId,
        update: AccountUpdate<'_>,
    ) -> Result<User, AuthError> {
        let username = validate_username(update.username)?;
        let email = validate_email(update.email)?;

        let new_hash = if update.wants_password_change() {
            if update.new_password != update.confirm_password {
                return Err(AuthError::PasswordMismatch);
            }
            validate_password(update.new_password)?;

            let stored_hash = self
                .users
                .get_password_hash_by_id(user_id)
                .await
                .map_err(|e| match e {
                    RepositoryError::NotFound => AuthError::UserNotFound,
                    other => AuthError::Repository(other),
                })?;
            verify_password(update.current_password, &stored_hash)
                .map_err(|_| AuthError::WrongCurrentPassword)?;

            Some(hash_password(update.new_password)?)
        } else {
            None
        };

        let user = self
            .users
            .update_account(user_id, username, &email, new_hash.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateEmail,
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

fn validate_username(username: &str) -> Result<&str, AuthError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::InvalidUsername("username is required".to_owned()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(AuthError::InvalidUsername(format!(
            "username must be at most {MAX_USERNAME_LENGTH} characters"
        )));
    }
    Ok(username)
}

fn validate_email(email: &str) -> Result<Email, AuthError> {
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(AuthError::InvalidEmail(EmailError::TooLong {
            max: MAX_EMAIL_LENGTH,
        }));
    }
    Ok(Email::parse(email)?)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("secret").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("  alice  ").unwrap(), "alice");
        assert!(matches!(
            validate_username("   "),
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            validate_username(&"x".repeat(51)),
            Err(AuthError::InvalidUsername(_))
        ));
    }

    #[test]
    fn test_validate_email_length_cap() {
        let long = format!("{}@example.com", "a".repeat(60));
        assert!(matches!(
            validate_email(&long),
            Err(AuthError::InvalidEmail(EmailError::TooLong { .. }))
        ));
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("whatever", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
