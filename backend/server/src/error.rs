use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::{cache::CacheError, mail::MailError, otp::OtpError, store::StoreError};

pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MalformedPayload(&'static str),

    #[error("Invalid or expired OTP")]
    InvalidOtp,

    #[error("{0}")]
    InvalidFeature(String),

    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("{message}")]
    Delivery {
        message: &'static str,
        #[source]
        source: MailError,
    },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<OtpError> for AppError {
    fn from(error: OtpError) -> Self {
        match error {
            OtpError::Cache(e) => AppError::Cache(e),
            OtpError::Delivery(source) => AppError::Delivery {
                message: "Failed to send OTP. Please try again.",
                source,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::MalformedPayload(_) | AppError::InvalidOtp => {
                (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() }))
            }
            AppError::InvalidFeature(_) => {
                (StatusCode::BAD_REQUEST, json!({ "detail": self.to_string() }))
            }
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": self.to_string() }),
            ),
            AppError::Delivery { message, source } => {
                error!("Email delivery failed: {source}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": message }),
                )
            }
            AppError::Cache(e) => {
                error!("Cache failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": INTERNAL_ERROR }),
                )
            }
            AppError::Store(e) => {
                error!("Store failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "detail": INTERNAL_ERROR }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
