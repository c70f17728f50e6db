//! Domain error → HTTP response mapping
//!
//! Body shape:
//! `{"status":"error","kind":"zone_full","message":"...","errors":{"field":["..."]}}`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

use crate::shared::{DomainError, FieldErrors};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `"error"`
    pub status: String,
    /// Stable machine-readable kind, e.g. `zone_full`
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "FieldErrors::is_empty")]
    pub errors: FieldErrors,
}

#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self(DomainError::Unauthorized(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self(DomainError::Forbidden(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            e if e.is_conflict() => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.0.kind();
        let (message, errors) = match self.0 {
            DomainError::Validation { message, fields } => (message, fields),
            DomainError::Unauthorized(message) | DomainError::Forbidden(message) => {
                (message, FieldErrors::new())
            }
            DomainError::Internal(detail) => {
                error!(error = %detail, "Internal error");
                ("Internal server error".to_string(), FieldErrors::new())
            }
            other => (other.to_string(), FieldErrors::new()),
        };

        let body = ErrorBody {
            status: "error".to_string(),
            kind: kind.to_string(),
            message,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(err: DomainError) -> (StatusCode, serde_json::Value) {
        let resp = ApiError(err).into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn status_mapping() {
        let cases = [
            (DomainError::field("zoneId", "is required"), StatusCode::BAD_REQUEST),
            (DomainError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (DomainError::not_found("Ticket", "t"), StatusCode::NOT_FOUND),
            (DomainError::ZoneFull("z".into()), StatusCode::CONFLICT),
            (DomainError::ZoneClosed("z".into()), StatusCode::CONFLICT),
            (DomainError::AlreadyCheckedOut("t".into()), StatusCode::CONFLICT),
            (
                DomainError::GateZoneMismatch {
                    gate_id: "g".into(),
                    zone_id: "z".into(),
                },
                StatusCode::CONFLICT,
            ),
            (DomainError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError(err).status(), expected);
        }
    }

    #[tokio::test]
    async fn validation_body_carries_field_map() {
        let (status, body) = body_of(DomainError::field("rateNormal", "must not be negative")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["kind"], "validation");
        assert_eq!(body["errors"]["rateNormal"][0], "must not be negative");
    }

    #[tokio::test]
    async fn internal_detail_is_hidden() {
        let (_, body) = body_of(DomainError::Internal("db password leaked".into())).await;
        assert_eq!(body["message"], "Internal server error");
        assert!(body.get("errors").is_none());
    }
}
