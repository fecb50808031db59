//! Access policy for owner-scoped resources.
//!
//! Every route that mutates or inspects another user's data goes through
//! [`authorize_owner_or_admin`] instead of comparing IDs inline, so the
//! rule lives in exactly one place.

use bazaar_core::UserId;

use crate::models::CurrentUser;

/// The current user is neither the owner of the resource nor an admin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("access denied: not the owner of this resource")]
pub struct Forbidden;

/// Allow the action when `user` owns the resource or is an admin.
///
/// # Errors
///
/// Returns [`Forbidden`] otherwise.
pub fn authorize_owner_or_admin(user: &CurrentUser, owner: UserId) -> Result<(), Forbidden> {
    if user.is_admin || user.id == owner {
        Ok(())
    } else {
        Err(Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use bazaar_core::{Email, UserId};

    use super::*;

    fn user(id: i64, is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new(id),
            username: "test".to_owned(),
            email: Email::parse("test@example.com").unwrap(),
            is_admin,
        }
    }

    #[test]
    fn owner_is_allowed() {
        assert!(authorize_owner_or_admin(&user(1, false), UserId::new(1)).is_ok());
    }

    #[test]
    fn admin_is_allowed_for_any_owner() {
        assert!(authorize_owner_or_admin(&user(2, true), UserId::new(1)).is_ok());
    }

    #[test]
    fn other_user_is_forbidden() {
        assert_eq!(
            authorize_owner_or_admin(&user(2, false), UserId::new(1)),
            Err(Forbidden)
        );
    }
}
