//! Pre-resolved actors.
//!
//! Token validation happens upstream. The booking engine only sees the
//! resulting actor: a user ID and the role names granted in the organization.

use serde::{Deserialize, Serialize};
use tally_shared::types::UserId;

/// Role required to book vouchers.
pub const ADMIN_ROLE: &str = "admin";

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The acting user.
    pub user_id: UserId,
    /// Role names granted to the user.
    pub roles: Vec<String>,
}

impl Actor {
    /// Creates an actor from a user ID and role names.
    #[must_use]
    pub fn new<I, S>(user_id: UserId, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the actor holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns true if this actor can book vouchers.
    #[must_use]
    pub fn can_book(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}
