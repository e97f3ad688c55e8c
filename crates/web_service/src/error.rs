use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use gateway_core::UpstreamError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct JsonError {
    ok: bool,
    error: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(e) => match e {
                // 5xx from a provider is their outage, not the caller's input.
                UpstreamError::Rejected { status, .. } if *status >= 500 => StatusCode::BAD_GATEWAY,
                UpstreamError::Rejected { .. } => StatusCode::BAD_REQUEST,
                UpstreamError::Unreachable(_) => StatusCode::BAD_GATEWAY,
                UpstreamError::NotAuthenticated => StatusCode::UNAUTHORIZED,
                UpstreamError::TokenExchangeFailed(_) => StatusCode::UNAUTHORIZED,
                UpstreamError::AuthPending(_) => StatusCode::CONFLICT,
            },
            AppError::InternalError(_)
            | AppError::IoError(_)
            | AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonError {
            ok: false,
            error: self.to_string(),
        })
    }
}
