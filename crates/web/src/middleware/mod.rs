//! HTTP middleware.

pub mod auth;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user,
};
pub use session::{create_session_layer, migrate_session_store};
