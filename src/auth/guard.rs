use async_trait::async_trait;

use super::models::{Credentials, Principal, Token};
use super::token::RequestToken;
use crate::error::AppError;

/// Authentication backend the endpoint delegates to.
///
/// Everything stateful (credential checks, token issuance, invalidation,
/// resolving the current user) lives behind this trait. Request-bound
/// state is passed in as the request's [`RequestToken`].
#[async_trait]
pub trait AuthGuard: Send + Sync {
    /// Checks the credentials and issues a token. `Ok(None)` means the
    /// credentials were rejected.
    async fn attempt(&self, credentials: &Credentials) -> Result<Option<Token>, AppError>;

    /// Invalidates the request's token.
    async fn logout(&self, token: &RequestToken) -> Result<(), AppError>;

    /// Exchanges the request's token for a new one.
    async fn refresh(&self, token: &RequestToken) -> Result<Token, AppError>;

    /// Resolves the user the request's token belongs to.
    async fn current_user(&self, token: &RequestToken) -> Result<Option<Principal>, AppError>;

    /// Lifetime of issued tokens, in minutes.
    fn token_ttl_minutes(&self) -> i64;
}
