//! Mapping of domain failures onto HTTP responses.
//!
//! This is the only place that knows about status codes. Every error body is
//! `{ "status": u16, "message": String }`. A copy of the body that also
//! carries the diagnostic `detail` rides along as a response extension and is
//! only written out by `middleware::attach_error_detail` outside production.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde::Serialize;
use tracing::error;

pub const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    Domain(DomainError),
    /// The framework refused the request before it reached a handler body.
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Domain(err) => status_for(err),
            Self::Rejected { status, .. } => *status,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Rejected {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::SiteNotFound(_) | DomainError::CommentNotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::StorageUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Domain(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, detail) = match &self {
            Self::Domain(DomainError::StorageUnavailable(cause)) => {
                error!(error = %cause, "request failed on storage");
                (INTERNAL_MESSAGE.to_string(), cause.clone())
            }
            Self::Domain(err) => (err.to_string(), format!("{err:?}")),
            Self::Rejected { message, .. } => (message.clone(), message.clone()),
        };

        let full = ErrorBody {
            status: status.as_u16(),
            message,
            detail: Some(detail),
        };
        let public = ErrorBody {
            detail: None,
            ..full.clone()
        };
        let mut response = (status, Json(public)).into_response();
        response.extensions_mut().insert(full);
        response
    }
}
