//! Business logic services.

pub mod auth;
pub mod images;

pub use auth::{AccountUpdate, AuthError, AuthService};
pub use images::{ImageHost, UploadError};
