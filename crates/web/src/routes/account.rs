//! Account self-service route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::filters;
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::CurrentUser;
use crate::routes::auth::MessageQuery;
use crate::services::{AccountUpdate, AuthError, AuthService};
use crate::state::AppState;

/// Account update form data.
///
/// The three password fields travel together; all empty means no password
/// change.
#[derive(Debug, Deserialize)]
pub struct AccountForm {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub user: Option<CurrentUser>,
    pub username: String,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the account page.
pub async fn account_page(
    RequireAuth(current): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    AccountTemplate {
        username: current.username.clone(),
        email: current.email.to_string(),
        user: Some(current),
        error: query.error,
        success: query.success,
    }
}

/// Handle account update form submission.
///
/// Password change (when requested) is validated before anything is
/// written; a failure leaves the account untouched. On success the
/// session's copy of the user is refreshed.
pub async fn update_account(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    session: Session,
    Form(form): Form<AccountForm>,
) -> Response {
    let auth = AuthService::new(state.pool());

    let update = AccountUpdate {
        username: &form.username,
        email: &form.email,
        current_password: &form.current_password,
        new_password: &form.new_password,
        confirm_password: &form.confirm_password,
    };

    match auth.update_account(current.id, update).await {
        Ok(user) => {
            let refreshed = CurrentUser::from_user(&user);
            if let Err(e) = set_current_user(&session, &refreshed).await {
                tracing::error!("Failed to refresh session after account update: {}", e);
            }
            Redirect::to("/user-account?success=updated").into_response()
        }
        Err(AuthError::WrongCurrentPassword) => {
            Redirect::to("/user-account?error=wrong_password").into_response()
        }
        Err(AuthError::PasswordMismatch) => {
            Redirect::to("/user-account?error=password_mismatch").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/user-account?error=password_too_short").into_response()
        }
        Err(AuthError::DuplicateEmail) => {
            Redirect::to("/user-account?error=email_taken").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/user-account?error=invalid_email").into_response()
        }
        Err(AuthError::InvalidUsername(_)) => {
            Redirect::to("/user-account?error=invalid_username").into_response()
        }
        Err(e) => {
            tracing::error!("Account update failed: {}", e);
            Redirect::to("/user-account?error=failed").into_response()
        }
    }
}
