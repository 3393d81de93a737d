use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A stored refresh-token record.
///
/// Only the SHA-256 hex digest of the raw token is persisted; the raw value
/// exists solely in the response that delivered it to the client. Rows are
/// marked revoked on rotation or logout and are never deleted, which is what
/// makes replay of a rotated-out token detectable.
#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: i32,
    pub user_id: i32,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_revoked: bool,
}

impl RefreshToken {
    /// A token is usable only while unrevoked and unexpired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(is_revoked: bool, expires_in_secs: i64) -> RefreshToken {
        let now = Utc::now();
        RefreshToken {
            id: 1,
            user_id: 1,
            token_hash: "abc".to_string(),
            expires_at: now + chrono::Duration::seconds(expires_in_secs),
            created_at: now,
            is_revoked,
        }
    }

    #[test]
    fn test_is_active() {
        let now = Utc::now();
        assert!(record(false, 60).is_active(now));
        assert!(!record(true, 60).is_active(now));
        assert!(!record(false, -60).is_active(now));
        assert!(!record(true, -60).is_active(now));
    }
}
