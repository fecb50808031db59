//! Registration, login and account-update behavior.

#![allow(clippy::unwrap_used)]

mod common;

use bazaar_web::services::{AccountUpdate, AuthError, AuthService};

use common::{register_user, test_pool};

#[tokio::test]
async fn register_then_login_roundtrip() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    let registered = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    assert_eq!(registered.username, "alice");
    assert!(!registered.is_admin);

    let logged_in = auth.login("alice@example.com", "hunter22").await.unwrap();
    assert_eq!(logged_in.id, registered.id);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    register_user(&pool, "alice", "alice@example.com", "hunter22").await;

    let result = auth.register("bob", "alice@example.com", "password9").await;
    assert!(matches!(result, Err(AuthError::DuplicateEmail)));
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    register_user(&pool, "alice", "alice@example.com", "hunter22").await;

    // Wrong password and unknown email produce the same error
    assert!(matches!(
        auth.login("alice@example.com", "wrong-password").await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.login("nobody@example.com", "hunter22").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn weak_password_is_rejected_at_registration() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    let result = auth.register("alice", "alice@example.com", "short").await;
    assert!(matches!(result, Err(AuthError::WeakPassword(_))));
}

#[tokio::test]
async fn account_update_changes_fields_and_password() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;

    let updated = auth
        .update_account(
            user.id,
            AccountUpdate {
                username: "alicia",
                email: "alicia@example.com",
                current_password: "hunter22",
                new_password: "hunter23",
                confirm_password: "hunter23",
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.username, "alicia");
    assert_eq!(updated.email.as_str(), "alicia@example.com");

    // New password works, old one doesn't
    assert!(auth.login("alicia@example.com", "hunter23").await.is_ok());
    assert!(matches!(
        auth.login("alicia@example.com", "hunter22").await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn account_update_with_wrong_current_password_commits_nothing() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;

    let result = auth
        .update_account(
            user.id,
            AccountUpdate {
                username: "alicia",
                email: "alicia@example.com",
                current_password: "not-my-password",
                new_password: "hunter23",
                confirm_password: "hunter23",
            },
        )
        .await;
    assert!(matches!(result, Err(AuthError::WrongCurrentPassword)));

    // Nothing changed, not even the non-password fields
    let unchanged = auth.get_user(user.id).await.unwrap();
    assert_eq!(unchanged.username, "alice");
    assert_eq!(unchanged.email.as_str(), "alice@example.com");
    assert!(auth.login("alice@example.com", "hunter22").await.is_ok());
}

#[tokio::test]
async fn account_update_with_mismatched_confirmation_commits_nothing() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;

    let result = auth
        .update_account(
            user.id,
            AccountUpdate {
                username: "alicia",
                email: "alicia@example.com",
                current_password: "hunter22",
                new_password: "hunter23",
                confirm_password: "hunter24",
            },
        )
        .await;
    assert!(matches!(result, Err(AuthError::PasswordMismatch)));

    let unchanged = auth.get_user(user.id).await.unwrap();
    assert_eq!(unchanged.username, "alice");
}

#[tokio::test]
async fn account_update_without_password_leaves_hash_alone() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;

    auth.update_account(
        user.id,
        AccountUpdate {
            username: "alicia",
            email: "alice@example.com",
            current_password: "",
            new_password: "",
            confirm_password: "",
        },
    )
    .await
    .unwrap();

    assert!(auth.login("alice@example.com", "hunter22").await.is_ok());
}

#[tokio::test]
async fn account_update_to_taken_email_is_rejected() {
    let pool = test_pool().await;
    let auth = AuthService::new(&pool);

    register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let bob = register_user(&pool, "bob", "bob@example.com", "hunter22").await;

    let result = auth
        .update_account(
            bob.id,
            AccountUpdate {
                username: "bob",
                email: "alice@example.com",
                current_password: "",
                new_password: "",
                confirm_password: "",
            },
        )
        .await;
    assert!(matches!(result, Err(AuthError::DuplicateEmail)));
}
