//! Authenticated admin-panel user.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::status::Role;

/// User returned by the login and verify-token endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl User {
    /// Whether the user has the `admin` role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the user can edit content (`editor` or `admin`).
    #[must_use]
    pub fn is_editor(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Editor)
    }
}
