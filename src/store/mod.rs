//!
//! # Persistence Collaborators
//!
//! The auth subsystem never talks to the database directly; it depends on two
//! narrow contracts, a user directory and a refresh-token store. Production
//! wires in the Postgres implementations, the test suites wire in the
//! in-memory ones.

pub mod memory;
pub mod postgres;

use crate::error::AppError;
use crate::models::{RefreshToken, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use memory::{MemoryTokenStore, MemoryUserDirectory};
pub use postgres::{PgTokenStore, PgUserDirectory};

/// Lookup and creation of user records.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError>;

    /// Creates a user. The directory owns password hashing: `raw_password`
    /// arrives in the clear and is stored only as a bcrypt hash.
    async fn create(&self, name: &str, email: &str, raw_password: &str)
        -> Result<User, AppError>;
}

/// Persistence of hashed refresh tokens.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Inserts a fresh, unrevoked record.
    async fn insert(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Finds a record matching the hash that is owned by `user_id`, not
    /// revoked, and not expired. Returns `None` for rotated-out, foreign,
    /// expired or unknown tokens alike.
    async fn find_active(
        &self,
        token_hash: &str,
        user_id: i32,
    ) -> Result<Option<RefreshToken>, AppError>;

    /// Finds a record matching the hash owned by `user_id`, regardless of
    /// revocation or expiry. Used by logout to enforce ownership.
    async fn find_owned(
        &self,
        token_hash: &str,
        user_id: i32,
    ) -> Result<Option<RefreshToken>, AppError>;

    /// Flips `is_revoked` from false to true and reports how many rows were
    /// affected. The conditional update is what lets rotation detect that a
    /// concurrent request already spent the token: the loser observes zero
    /// affected rows.
    async fn mark_revoked(&self, token_hash: &str) -> Result<u64, AppError>;
}
