use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::guard::AuthGuard;
use super::models::{Credentials, Principal, Token};
use super::revocation::RevocationList;
use super::token::RequestToken;
use super::users::UserDirectory;
use crate::config::AuthConfig;
use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // User ID
    pub jti: Uuid,    // Token ID, the unit of revocation
    pub iat: i64,     // Issued at
    pub exp: i64,     // Expiration time
}

/// HS256 JWT guard with a config-seeded user directory and an in-memory
/// revocation list.
///
/// Expired tokens stay refreshable until `iat + refresh_ttl`. Refreshing
/// revokes the old token, so each token rotates at most once.
pub struct JwtGuard {
    users: UserDirectory,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    refresh_ttl: Duration,
    revoked: RevocationList,
}

impl JwtGuard {
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        if config.jwt_secret.is_empty() {
            return Err(AppError::ConfigError("auth.jwt_secret must not be empty".into()));
        }
        if config.token_ttl_minutes <= 0 {
            return Err(AppError::ConfigError("auth.token_ttl_minutes must be positive".into()));
        }
        if config.refresh_ttl_minutes < config.token_ttl_minutes {
            return Err(AppError::ConfigError(
                "auth.refresh_ttl_minutes must not be shorter than auth.token_ttl_minutes".into(),
            ));
        }

        let users = UserDirectory::from_seeds(&config.users)?;
        if users.is_empty() {
            warn!("No users configured, every login attempt will be rejected");
        }

        Ok(Self {
            users,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::minutes(config.token_ttl_minutes),
            refresh_ttl: Duration::minutes(config.refresh_ttl_minutes),
            revoked: RevocationList::new(),
        })
    }

    /// Drops revocation entries for tokens past their refresh window.
    pub async fn purge_revoked(&self) -> usize {
        let purged = self.revoked.purge(Utc::now()).await;
        if purged > 0 {
            debug!(purged, "Purged stale token revocations");
        }
        purged
    }

    fn issue_token(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Token, AppError> {
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalError(format!("Failed to sign token: {}", e)))?;

        Ok(Token::from(token))
    }

    /// Verifies the signature, and the expiry when `check_expiry` is set.
    fn decode_token(&self, token: &str, check_expiry: bool) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = check_expiry;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// End of the window in which a token can still be refreshed, which is
    /// also how long its revocation has to be remembered.
    fn refresh_deadline(&self, claims: &Claims) -> DateTime<Utc> {
        let issued_at = Utc
            .timestamp_opt(claims.iat, 0)
            .single()
            .unwrap_or_else(Utc::now);
        issued_at + self.refresh_ttl
    }

    async fn authenticated_claims(&self, token: &RequestToken) -> Result<Claims, AuthError> {
        let raw = token.as_deref().ok_or(AuthError::MissingToken)?;
        let claims = self.decode_token(raw, true)?;
        if self.revoked.is_revoked(&claims.jti).await {
            return Err(AuthError::TokenRevoked);
        }
        Ok(claims)
    }
}

#[async_trait]
impl AuthGuard for JwtGuard {
    async fn attempt(&self, credentials: &Credentials) -> Result<Option<Token>, AppError> {
        let Some(user) = self.users.verify(credentials.email(), credentials.password()) else {
            return Ok(None);
        };

        let token = self.issue_token(user.id, Utc::now())?;
        info!(user_id = %user.id, "Issued token");
        Ok(Some(token))
    }

    async fn logout(&self, token: &RequestToken) -> Result<(), AppError> {
        let Some(raw) = token.as_deref() else {
            debug!("Logout without a token");
            return Ok(());
        };

        let claims = match self.decode_token(raw, false) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Logout with unusable token: {}", e);
                return Ok(());
            }
        };

        if self.revoked.revoke(claims.jti, self.refresh_deadline(&claims)).await {
            info!(user_id = %claims.sub, jti = %claims.jti, "Token revoked on logout");
        } else {
            debug!(jti = %claims.jti, "Logout with already revoked token");
        }
        Ok(())
    }

    async fn refresh(&self, token: &RequestToken) -> Result<Token, AppError> {
        let raw = token.as_deref().ok_or(AuthError::MissingToken)?;
        let claims = self.decode_token(raw, false)?;

        let now = Utc::now();
        let deadline = self.refresh_deadline(&claims);
        if now >= deadline {
            return Err(AuthError::RefreshExpired.into());
        }

        // Sign before revoking so a signing failure leaves the old token usable.
        let token = self.issue_token(claims.sub, now)?;
        if !self.revoked.revoke(claims.jti, deadline).await {
            warn!(user_id = %claims.sub, jti = %claims.jti, "Refresh attempted with revoked token");
            return Err(AuthError::TokenRevoked.into());
        }

        info!(user_id = %claims.sub, "Token refreshed");
        Ok(token)
    }

    async fn current_user(&self, token: &RequestToken) -> Result<Option<Principal>, AppError> {
        match self.authenticated_claims(token).await {
            Ok(claims) => Ok(self.users.find_by_id(&claims.sub).cloned()),
            Err(e) => {
                debug!("No current user: {}", e);
                Ok(None)
            }
        }
    }

    fn token_ttl_minutes(&self) -> i64 {
        self.ttl.num_minutes()
    }
}
