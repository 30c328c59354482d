//! # ApiError
//!
//! Every handler failure is rendered as `{"message": "..."}` with a status
//! code derived from the underlying [`DomainError`].

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Body or query string failed to parse.
    #[error("{0}")]
    BadRequest(String),

    #[error("metrics encoding failed")]
    Metrics(#[from] std::fmt::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::NotFound(..)) => StatusCode::NOT_FOUND,
            ApiError::Domain(DomainError::Validation(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Domain(DomainError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Domain(DomainError::PremiumRequired(_)) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Domain(DomainError::Internal(_)) | ApiError::Metrics(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing text. Internal details stay in the logs.
    fn message(&self) -> String {
        match self {
            ApiError::Domain(DomainError::NotFound(entity, _)) => {
                format!("{} not found", capitalize(entity))
            }
            ApiError::Domain(DomainError::Validation(msg))
            | ApiError::Domain(DomainError::Conflict(msg))
            | ApiError::Domain(DomainError::PremiumRequired(msg))
            | ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Domain(DomainError::Internal(_)) | ApiError::Metrics(_) => {
                "Internal server error".to_string()
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "message": self.message() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::not_found("image", "x"), StatusCode::NOT_FOUND),
            (DomainError::validation("bad"), StatusCode::BAD_REQUEST),
            (DomainError::conflict("dup"), StatusCode::CONFLICT),
            (DomainError::PremiumRequired("pay".into()), StatusCode::PAYMENT_REQUIRED),
            (DomainError::internal("disk on fire"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn body_carries_message_without_internals() {
        let (status, body) = render(DomainError::not_found("payment", "42").into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Payment not found");

        let (_, body) = render(DomainError::internal("password=hunter2").into()).await;
        assert_eq!(body["message"], "Internal server error");
    }
}
