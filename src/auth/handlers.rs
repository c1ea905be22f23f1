use actix_web::error::{JsonPayloadError, UrlencodedError};
use actix_web::{web, Either, HttpRequest, HttpResponse};
use tracing::debug;

use super::models::Credentials;
use super::token::RequestToken;
use crate::AppState;
use crate::error::AppError;

/// Accepts the credentials as a JSON or a form-encoded body.
pub async fn login(
    credentials: Either<web::Json<Credentials>, web::Form<Credentials>>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let credentials = match credentials {
        Either::Left(web::Json(credentials)) => credentials,
        Either::Right(web::Form(credentials)) => credentials,
    };
    state.auth.login(credentials).await
}

pub async fn logout(
    token: RequestToken,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.auth.logout(&token).await
}

pub async fn refresh(
    token: RequestToken,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.auth.refresh(&token).await
}

pub async fn me(
    token: RequestToken,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.auth.me(&token).await
}

/// Malformed login bodies never reach the guard.
fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected request body: {}", err);
    AppError::ValidationError(err.to_string()).into()
}

fn form_error_handler(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    debug!("Rejected form body: {}", err);
    AppError::ValidationError(err.to_string()).into()
}

/// Registers the auth routes under `/api/auth`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::FormConfig::default().error_handler(form_error_handler))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/refresh", web::post().to(refresh))
            .route("/me", web::get().to(me)),
    );
}
