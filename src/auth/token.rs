//!
//! # Token Issuing and Verification
//!
//! Two JWT families are minted here, distinguished by a `type` claim and
//! signed with separate secrets:
//!
//! - **access** tokens: short-lived, stateless, presented on API calls;
//! - **refresh** tokens: long-lived, persisted (hashed) and revocable, used
//!   only to obtain new access tokens.
//!
//! A `jti` claim makes every minted token a unique string even when two are
//! issued for the same user within the same clock second, which rotation
//! relies on. [`hash_token`] produces the digest under which refresh tokens
//! are stored; the raw token value never reaches the database.

use crate::config::AuthConfig;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Claims encoded within both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's unique identifier.
    pub id: i32,
    /// The user's email at issuance time.
    pub email: String,
    /// Either `"access"` or `"refresh"`; verification rejects a token
    /// presented to the wrong side.
    #[serde(rename = "type")]
    pub token_type: String,
    /// Unique token id, so two tokens minted in the same second differ.
    pub jti: Uuid,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

fn generate_token(
    secret: &str,
    lifetime: chrono::Duration,
    token_type: &str,
    user_id: i32,
    email: &str,
) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(lifetime)
        .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?
        .timestamp() as usize;

    let claims = Claims {
        id: user_id,
        email: email.to_string(),
        token_type: token_type.to_string(),
        jti: Uuid::new_v4(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

fn verify_token(secret: &str, expected_type: &str, token: &str) -> Result<Claims, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    if claims.token_type != expected_type {
        return Err(AppError::Unauthorized("Invalid token: wrong type".into()));
    }
    Ok(claims)
}

/// Mints a short-lived access token for `user_id`.
pub fn generate_access_token(
    config: &AuthConfig,
    user_id: i32,
    email: &str,
) -> Result<String, AppError> {
    generate_token(
        &config.access_secret,
        config.access_lifetime.to_duration(),
        TOKEN_TYPE_ACCESS,
        user_id,
        email,
    )
}

/// Mints a long-lived refresh token for `user_id`. The caller is responsible
/// for persisting its hash via the token store.
pub fn generate_refresh_token(
    config: &AuthConfig,
    user_id: i32,
    email: &str,
) -> Result<String, AppError> {
    generate_token(
        &config.refresh_secret,
        config.refresh_lifetime.to_duration(),
        TOKEN_TYPE_REFRESH,
        user_id,
        email,
    )
}

/// Verifies an access token's signature, expiry and type.
pub fn verify_access_token(config: &AuthConfig, token: &str) -> Result<Claims, AppError> {
    verify_token(&config.access_secret, TOKEN_TYPE_ACCESS, token)
}

/// Verifies a refresh token's signature, expiry and type.
///
/// Every failure mode collapses into [`AppError::InvalidRefreshToken`]; the
/// caller (and the client) learns nothing about why the token was rejected.
pub fn verify_refresh_token(config: &AuthConfig, token: &str) -> Result<Claims, AppError> {
    verify_token(&config.refresh_secret, TOKEN_TYPE_REFRESH, token)
        .map_err(|_| AppError::InvalidRefreshToken)
}

/// SHA-256 hex digest of a raw token, the only form stored for refresh tokens.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenLifetime;

    fn test_config() -> AuthConfig {
        AuthConfig {
            access_secret: "access-secret-for-tests".to_string(),
            access_lifetime: TokenLifetime::parse("15m").unwrap(),
            refresh_secret: "refresh-secret-for-tests".to_string(),
            refresh_lifetime: TokenLifetime::parse("7d").unwrap(),
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let config = test_config();
        let token = generate_access_token(&config, 1, "test@example.com").unwrap();
        let claims = verify_access_token(&config, &token).unwrap();

        assert_eq!(claims.id, 1);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn test_refresh_token_roundtrip() {
        let config = test_config();
        let token = generate_refresh_token(&config, 2, "test@example.com").unwrap();
        let claims = verify_refresh_token(&config, &token).unwrap();

        assert_eq!(claims.id, 2);
        assert_eq!(claims.token_type, TOKEN_TYPE_REFRESH);
    }

    #[test]
    fn test_token_type_confusion_rejected() {
        let config = test_config();
        let access = generate_access_token(&config, 3, "test@example.com").unwrap();
        let refresh = generate_refresh_token(&config, 3, "test@example.com").unwrap();

        // Signed with different secrets AND carrying the wrong type claim;
        // either check alone is enough to reject.
        assert!(verify_access_token(&config, &refresh).is_err());
        assert!(matches!(
            verify_refresh_token(&config, &access),
            Err(AppError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn test_type_claim_checked_even_with_shared_secret() {
        let mut config = test_config();
        config.refresh_secret = config.access_secret.clone();

        let refresh = generate_refresh_token(&config, 4, "test@example.com").unwrap();
        match verify_access_token(&config, &refresh) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("wrong type")),
            other => panic!("expected wrong-type rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config();
        let expiration = chrono::Utc::now()
            .checked_sub_signed(chrono::Duration::hours(2))
            .expect("valid timestamp")
            .timestamp() as usize;
        let claims = Claims {
            id: 5,
            email: "test@example.com".to_string(),
            token_type: TOKEN_TYPE_REFRESH.to_string(),
            jti: Uuid::new_v4(),
            exp: expiration,
        };
        let expired = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.refresh_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_refresh_token(&config, &expired),
            Err(AppError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let config = test_config();
        assert!(verify_access_token(&config, "not.a.jwt").is_err());
        assert!(matches!(
            verify_refresh_token(&config, "not.a.jwt"),
            Err(AppError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn test_tokens_are_unique_within_a_second() {
        let config = test_config();
        let a = generate_refresh_token(&config, 6, "test@example.com").unwrap();
        let b = generate_refresh_token(&config, 6, "test@example.com").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let a = hash_token("some-raw-token");
        let b = hash_token("some-raw-token");
        let c = hash_token("another-raw-token");

        assert_eq!(a, b);
        assert_ne!(a, c);
        // SHA-256 hex digest.
        assert_eq!(a.len(), 64);
        assert_ne!(a, "some-raw-token");
    }
}
