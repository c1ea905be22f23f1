//! JSON envelope shared by every auth response.
//!
//! ```json
//! { "status": "success", "message": { "description": "...", "data": { } } }
//! ```

use actix_web::{http::StatusCode, HttpResponse};
use serde::{Deserialize, Serialize};

/// `data` payload of responses that carry nothing. Serializes as `{}`.
pub type EmptyData = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message<T> {
    pub description: String,
    pub data: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T = EmptyData> {
    pub status: Status,
    pub message: Message<T>,
}

impl<T: Serialize> ResponseEnvelope<T> {
    pub fn success_with(description: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: Message {
                description: description.into(),
                data,
            },
        }
    }

    pub fn into_response(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

impl ResponseEnvelope {
    pub fn success(description: impl Into<String>) -> Self {
        Self::success_with(description, EmptyData::new())
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Message {
                description: description.into(),
                data: EmptyData::new(),
            },
        }
    }
}
