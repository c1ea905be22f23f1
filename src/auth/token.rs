use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};
use futures::future::{ready, Ready};

use crate::error::AppError;

const BEARER_PREFIX: &str = "bearer ";
const TOKEN_QUERY_PARAM: &str = "token";

/// Bearer token carried by the current request, if any.
///
/// Looked up in the `Authorization: Bearer <token>` header first, then in
/// the `token` query parameter. Extraction never fails; whether a missing
/// token is an error is up to the guard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestToken(Option<String>);

impl RequestToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }

    pub fn from_request_parts(req: &HttpRequest) -> Self {
        let from_header = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_bearer);

        let token = from_header.or_else(|| {
            url::form_urlencoded::parse(req.query_string().as_bytes())
                .find(|(key, _)| key == TOKEN_QUERY_PARAM)
                .map(|(_, value)| value.trim().to_string())
                .filter(|value| !value.is_empty())
        });

        Self(token)
    }
}

fn parse_bearer(value: &str) -> Option<String> {
    let value = value.trim();
    if value.len() <= BEARER_PREFIX.len() || !value.is_char_boundary(BEARER_PREFIX.len()) {
        return None;
    }
    let (scheme, token) = value.split_at(BEARER_PREFIX.len());
    if !scheme.eq_ignore_ascii_case(BEARER_PREFIX) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

impl FromRequest for RequestToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(Self::from_request_parts(req)))
    }
}
