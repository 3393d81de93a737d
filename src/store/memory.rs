//! In-memory implementations of the persistence collaborators.
//!
//! Backing the auth subsystem with plain `Mutex<Vec<_>>` state lets the unit
//! and integration test suites exercise the full register/login/refresh flows
//! without a Postgres instance. They also work for quick local experiments.

use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::models::{user::UserRole, RefreshToken, User};
use crate::store::{TokenStore, UserDirectory};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: Mutex<Vec<User>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<User, AppError> {
        let password = hash_password(raw_password)?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("Record already exists".into()));
        }

        let now = Utc::now();
        let user = User {
            id: users.len() as i32 + 1,
            name: name.to_string(),
            email: email.to_string(),
            password,
            avatar_url: None,
            role: UserRole::TeamMember,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    records: Mutex<Vec<RefreshToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, revoked ones included. Test hook.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn insert(
        &self,
        user_id: i32,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut records = self.records.lock().unwrap();
        let record = RefreshToken {
            id: records.len() as i32 + 1,
            user_id,
            token_hash: token_hash.to_string(),
            expires_at,
            created_at: Utc::now(),
            is_revoked: false,
        };
        records.push(record);
        Ok(())
    }

    async fn find_active(
        &self,
        token_hash: &str,
        user_id: i32,
    ) -> Result<Option<RefreshToken>, AppError> {
        let now = Utc::now();
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|r| r.token_hash == token_hash && r.user_id == user_id && r.is_active(now))
            .cloned())
    }

    async fn find_owned(
        &self,
        token_hash: &str,
        user_id: i32,
    ) -> Result<Option<RefreshToken>, AppError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .find(|r| r.token_hash == token_hash && r.user_id == user_id)
            .cloned())
    }

    async fn mark_revoked(&self, token_hash: &str) -> Result<u64, AppError> {
        let mut records = self.records.lock().unwrap();
        let mut affected = 0;
        for record in records
            .iter_mut()
            .filter(|r| r.token_hash == token_hash && !r.is_revoked)
        {
            record.is_revoked = true;
            affected += 1;
        }
        Ok(affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn test_directory_create_and_find() {
        let directory = MemoryUserDirectory::new();
        let user = directory
            .create("Alice", "alice@example.com", "secret123")
            .await
            .unwrap();

        assert_eq!(user.id, 1);
        // The directory owns hashing; the raw password is never stored.
        assert_ne!(user.password, "secret123");

        let found = directory.find_by_email("alice@example.com").await.unwrap();
        assert!(found.is_some());
        assert!(directory.find_by_email("bob@example.com").await.unwrap().is_none());
        assert!(directory.find_by_id(1).await.unwrap().is_some());
        assert!(directory.find_by_id(99).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_token_store_active_filtering() {
        let store = MemoryTokenStore::new();
        let future = Utc::now() + chrono::Duration::days(1);
        let past = Utc::now() - chrono::Duration::days(1);

        store.insert(1, "live", future).await.unwrap();
        store.insert(1, "expired", past).await.unwrap();
        store.insert(2, "foreign", future).await.unwrap();

        assert!(store.find_active("live", 1).await.unwrap().is_some());
        assert!(store.find_active("expired", 1).await.unwrap().is_none());
        // Ownership is part of the active check.
        assert!(store.find_active("foreign", 1).await.unwrap().is_none());
        assert!(store.find_active("missing", 1).await.unwrap().is_none());

        // find_owned ignores expiry but not ownership.
        assert!(store.find_owned("expired", 1).await.unwrap().is_some());
        assert!(store.find_owned("foreign", 1).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_mark_revoked_is_conditional() {
        let store = MemoryTokenStore::new();
        let future = Utc::now() + chrono::Duration::days(1);
        store.insert(1, "hash", future).await.unwrap();

        assert_eq!(store.mark_revoked("hash").await.unwrap(), 1);
        // Second revocation finds nothing left to flip.
        assert_eq!(store.mark_revoked("hash").await.unwrap(), 0);
        assert_eq!(store.mark_revoked("missing").await.unwrap(), 0);

        assert!(store.find_active("hash", 1).await.unwrap().is_none());
        assert!(store.find_owned("hash", 1).await.unwrap().is_some());
    }
}
