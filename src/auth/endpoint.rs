use std::sync::Arc;

use actix_web::{http::StatusCode, HttpResponse};
use tracing::{info, warn};

use super::guard::AuthGuard;
use super::models::{Credentials, Token, TokenPayload};
use super::token::RequestToken;
use crate::envelope::ResponseEnvelope;
use crate::error::AppError;

pub const LOGIN_SUCCESS: &str = "Login success";
pub const LOGIN_FORBIDDEN: &str = "403 Forbidden";
pub const LOGOUT_SUCCESS: &str = "Logout success";
pub const REFRESH_SUCCESS: &str = "Refresh token success";

/// The login / logout / refresh / me operations, backed by an injected guard.
///
/// Login rejection is the only failure handled here. Errors returned by
/// the guard are passed through to the HTTP layer untouched.
#[derive(Clone)]
pub struct AuthEndpoint {
    guard: Arc<dyn AuthGuard>,
}

impl AuthEndpoint {
    pub fn new(guard: Arc<dyn AuthGuard>) -> Self {
        Self { guard }
    }

    pub async fn login(&self, credentials: Credentials) -> Result<HttpResponse, AppError> {
        match self.guard.attempt(&credentials).await? {
            Some(token) => {
                info!(email = %credentials.email(), "Login successful");
                Ok(self.token_response(LOGIN_SUCCESS, token))
            }
            None => {
                warn!(email = %credentials.email(), "Login rejected");
                Ok(ResponseEnvelope::error(LOGIN_FORBIDDEN).into_response(StatusCode::FORBIDDEN))
            }
        }
    }

    // No failure branch: whatever the guard does with a missing or stale
    // token, a successful return is reported as a successful logout.
    pub async fn logout(&self, token: &RequestToken) -> Result<HttpResponse, AppError> {
        self.guard.logout(token).await?;
        Ok(ResponseEnvelope::success(LOGOUT_SUCCESS).into_response(StatusCode::OK))
    }

    pub async fn refresh(&self, token: &RequestToken) -> Result<HttpResponse, AppError> {
        let token = self.guard.refresh(token).await?;
        Ok(self.token_response(REFRESH_SUCCESS, token))
    }

    /// Body is the guard's current user as-is, `null` when there is none.
    pub async fn me(&self, token: &RequestToken) -> Result<HttpResponse, AppError> {
        let user = self.guard.current_user(token).await?;
        Ok(HttpResponse::Ok().json(user))
    }

    fn token_response(&self, description: &str, token: Token) -> HttpResponse {
        let expires_in = self.guard.token_ttl_minutes() * 60;
        ResponseEnvelope::success_with(description, TokenPayload::bearer(token, expires_in))
            .into_response(StatusCode::OK)
    }
}
