pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;

use std::sync::Arc;
use actix_web::HttpResponse;

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::{AuthConfig, Settings};

pub use auth::{AuthEndpoint, AuthGuard, JwtGuard};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all workers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthEndpoint>,
}

impl AppState {
    /// State backed by the bundled [`JwtGuard`].
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let guard = JwtGuard::new(config)?;
        Ok(Self::with_guard(Arc::new(guard)))
    }

    pub fn with_guard(guard: Arc<dyn AuthGuard>) -> Self {
        Self {
            auth: Arc::new(AuthEndpoint::new(guard)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_creation() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        assert!(AppState::new(&config.auth).is_ok());
    }

    #[test]
    fn test_app_state_rejects_bad_auth_config() {
        let mut config = Settings::new_for_test().expect("Failed to load test config");
        config.auth.jwt_secret = String::new();

        let state = AppState::new(&config.auth);
        assert!(matches!(state, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_app_state_clone() {
        let config = Settings::new_for_test().expect("Failed to load test config");
        let state = AppState::new(&config.auth).unwrap();

        let cloned = state.clone();

        // Verify Arc references are shared
        assert!(Arc::ptr_eq(&state.auth, &cloned.auth));
    }
}
