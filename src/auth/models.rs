use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Login input. Both fields are required and non-empty; construction
/// (including deserialization) fails otherwise.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawCredentials")]
pub struct Credentials {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RawCredentials {
    email: String,
    password: String,
}

impl TryFrom<RawCredentials> for Credentials {
    type Error = AppError;

    fn try_from(raw: RawCredentials) -> Result<Self, Self::Error> {
        Credentials::new(raw.email, raw.password)
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Result<Self, AppError> {
        let email = email.into().trim().to_string();
        let password = password.into();

        if email.is_empty() {
            return Err(AppError::ValidationError("email must not be empty".into()));
        }
        if password.is_empty() {
            return Err(AppError::ValidationError("password must not be empty".into()));
        }

        Ok(Self { email, password })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque bearer token issued by a guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The authenticated user, as returned by `me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// `data` of a successful login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub token: Token,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenPayload {
    pub fn bearer(token: Token, expires_in: i64) -> Self {
        Self {
            token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in,
        }
    }
}
