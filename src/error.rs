use std::{any::Any, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::error;
use uuid::Uuid;

use crate::{config::AppConfig, store::StoreError};

pub const NO_TOKEN: &str = "Not authorized, no token";
pub const TOKEN_FAILED: &str = "Not authorized, token failed";

/// Errors surfaced by handlers. Each variant maps to one HTTP status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    /// Missing, invalid or expired token, or a token whose user is gone.
    #[error("{0}")]
    Unauthenticated(&'static str),

    /// Unknown email and wrong password share this variant.
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("User already exists")]
    DuplicateEmail,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Parses a path id. Anything that is not a UUID cannot name an existing
/// resource, so it is reported as not found.
pub fn parse_id(raw: &str, not_found: &'static str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(not_found))
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::DuplicateEmail => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

/// Marker left on 500 responses for [`error_envelope`] to pick up.
#[derive(Debug, Clone)]
pub struct InternalFailure {
    pub message: String,
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let Self::Internal(err) = &self {
            let mut res = (
                status,
                Json(ErrorBody {
                    success: false,
                    message: "Internal server error".into(),
                }),
            )
                .into_response();
            res.extensions_mut().insert(InternalFailure {
                message: err.to_string(),
                detail: format!("{err:?}"),
            });
            return res;
        }
        (
            status,
            Json(ErrorBody {
                success: false,
                message: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => Self::DuplicateEmail,
            StoreError::Backend(e) => Self::Internal(e),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    message: String,
    stack: String,
    timestamp: String,
    path: String,
}

pub(crate) fn now_rfc3339() -> String {
    OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default()
}

/// Top-level handler for unexpected failures: logs them and rewrites the body
/// with a timestamp and the request path. Detail is hidden in production.
pub async fn error_envelope(
    State(config): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let mut res = next.run(req).await;
    let Some(failure) = res.extensions_mut().remove::<InternalFailure>() else {
        return res;
    };

    error!(%path, error = %failure.detail, "unhandled error");
    let (message, stack) = if config.is_production() {
        ("Internal server error".to_string(), "redacted".to_string())
    } else {
        (failure.message, failure.detail)
    };
    let body = ErrorEnvelope {
        success: false,
        message,
        stack,
        timestamp: now_rfc3339(),
        path,
    };
    (res.status(), Json(body)).into_response()
}

/// Response for a handler panic, routed through [`error_envelope`] like any
/// other internal failure.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}
