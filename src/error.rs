// src/error.rs
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};

use crate::{message::ErrorResponse, services::upstream::UpstreamError};

pub const NO_MESSAGE: &str = "No message provided.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Unconfigured,
    UpstreamError,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No message provided.")]
    InvalidInput,
    #[error("Upstream API key is not configured. Set OPENAI_API_KEY and restart the server.")]
    Unconfigured,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::InvalidInput => ErrorKind::InvalidInput,
            AppError::Unconfigured => ErrorKind::Unconfigured,
            AppError::Upstream(_) => ErrorKind::UpstreamError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput => StatusCode::BAD_REQUEST,
            AppError::Unconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(e) if e.is_rate_limited() => StatusCode::TOO_MANY_REQUESTS,
            AppError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match &self {
            AppError::Upstream(e) if e.is_rate_limited() => e.retry_after(),
            _ => None,
        };

        let mut response = (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response();

        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
