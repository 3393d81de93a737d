//!
//! # Auth/Session Manager
//!
//! Owns credential verification, token issuance, refresh-token persistence
//! and rotation, and revocation. Holds only immutable configuration plus the
//! two persistence collaborators; every request-scoped call goes through
//! those seams, so there is no shared mutable state here.

use crate::auth::token::{
    generate_access_token, generate_refresh_token, hash_token, verify_refresh_token,
};
use crate::auth::{password::verify_password, LoginResponse, TokenPair};
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::UserPublic;
use crate::store::{TokenStore, UserDirectory};
use std::sync::Arc;

pub struct AuthService {
    config: AuthConfig,
    users: Arc<dyn UserDirectory>,
    tokens: Arc<dyn TokenStore>,
}

impl AuthService {
    pub fn new(
        config: AuthConfig,
        users: Arc<dyn UserDirectory>,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            config,
            users,
            tokens,
        }
    }

    /// Creates a new account. No tokens are issued at registration; the
    /// client is expected to log in afterwards.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserPublic, AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".into()));
        }

        // The directory owns password hashing on create.
        let user = self.users.create(name, email, password).await?;
        Ok(UserPublic::from(user))
    }

    /// Verifies credentials and opens a session: issues an access token and a
    /// refresh token, persisting the latter hashed.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::InvalidCredentials);
        }

        let access_token = generate_access_token(&self.config, user.id, &user.email)?;
        let refresh_token = generate_refresh_token(&self.config, user.id, &user.email)?;
        self.save_refresh_token(user.id, &refresh_token).await?;

        Ok(LoginResponse {
            user: UserPublic::from(user),
            access_token,
            refresh_token,
        })
    }

    /// Exchanges a valid refresh token for a new access token, rotating the
    /// refresh token in the process: the presented token is revoked and a
    /// brand-new one is persisted and returned.
    ///
    /// The presented token must verify against the refresh secret AND have a
    /// matching stored record that is unrevoked, unexpired, and owned by the
    /// user the token claims. A record already spent by a concurrent refresh
    /// fails here too: the conditional revoke reports zero affected rows for
    /// the loser of the race, so each token can be rotated exactly once.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        let claims = verify_refresh_token(&self.config, refresh_token)?;

        let token_hash = hash_token(refresh_token);
        self.tokens
            .find_active(&token_hash, claims.id)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;

        let user = self
            .users
            .find_by_id(claims.id)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;

        if self.tokens.mark_revoked(&token_hash).await? == 0 {
            return Err(AppError::InvalidRefreshToken);
        }

        let access_token = generate_access_token(&self.config, user.id, &user.email)?;
        let new_refresh_token = generate_refresh_token(&self.config, user.id, &user.email)?;
        self.save_refresh_token(user.id, &new_refresh_token).await?;

        Ok(TokenPair {
            access_token,
            refresh_token: new_refresh_token,
        })
    }

    /// Logout path: revokes a refresh token, but only if it belongs to
    /// `user_id`. Revoking someone else's token (or an unknown one) fails
    /// with a `Forbidden` the HTTP layer maps to 403.
    pub async fn revoke_user_refresh_token(
        &self,
        user_id: i32,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        let token_hash = hash_token(refresh_token);

        self.tokens
            .find_owned(&token_hash, user_id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("Refresh token not found or does not belong to user".into())
            })?;

        self.tokens.mark_revoked(&token_hash).await?;
        Ok(())
    }

    /// Hashes the raw token, computes its absolute expiry from the configured
    /// lifetime, and inserts an unrevoked record.
    async fn save_refresh_token(&self, user_id: i32, refresh_token: &str) -> Result<(), AppError> {
        let token_hash = hash_token(refresh_token);
        let expires_at = chrono::Utc::now() + self.config.refresh_lifetime.to_duration();
        self.tokens.insert(user_id, &token_hash, expires_at).await
    }
}
