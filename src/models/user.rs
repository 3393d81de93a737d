use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Role assigned to a user account.
/// Corresponds to the `user_role` SQL enum. The auth subsystem never branches
/// on it; it exists for downstream authorization layers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum UserRole {
    Admin,
    ProductOwner,
    ProjectManager,
    TeamMember,
}

/// A full user row, including the bcrypt password hash.
///
/// This type never crosses the HTTP boundary; handlers return [`UserPublic`]
/// instead so the hash cannot leak into a response body.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Bcrypt hash of the user's password, never the raw value.
    pub password: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The outward-facing projection of a user: everything except the password.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar_url: user.avatar_url,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
