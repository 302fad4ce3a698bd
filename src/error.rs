use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name → messages, serialized as `{"field": ["msg", ...]}`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Every failure a handler can surface to a client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input. The payload is sent as the body.
    #[error("validation failed: {0}")]
    Validation(Value),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// A non-field validation error: `{"detail": [msg]}`.
    pub fn detail(msg: impl Into<String>) -> Self {
        ApiError::Validation(json!({ "detail": [msg.into()] }))
    }

    pub fn fields(errors: FieldErrors) -> Self {
        ApiError::Validation(json!(errors))
    }

    fn body(&self) -> Value {
        match self {
            ApiError::Validation(value) => value.clone(),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => json!({ "detail": [msg] }),
            ApiError::Database(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    json!({ "detail": ["Eintrag existiert bereits."] })
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                    json!({ "detail": ["Verweis auf einen nicht vorhandenen Eintrag."] })
                }
                _ => json!({ "detail": ["Interner Serverfehler."] }),
            },
            ApiError::Internal(_) => json!({ "detail": ["Interner Serverfehler."] }),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => StatusCode::CONFLICT,
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(status).json(self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_kind() {
        assert_eq!(ApiError::detail("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn field_errors_are_sent_verbatim() {
        let mut errors = FieldErrors::new();
        errors
            .entry("price".into())
            .or_default()
            .push("Preis muss höher als 1 sein.".into());
        let body = ApiError::fields(errors).body();
        assert_eq!(body, json!({ "price": ["Preis muss höher als 1 sein."] }));
    }

    #[test]
    fn non_field_errors_use_a_detail_list() {
        assert_eq!(
            ApiError::Forbidden("nope".into()).body(),
            json!({ "detail": ["nope"] })
        );
        assert_eq!(
            ApiError::Internal("hash failed".into()).body(),
            json!({ "detail": ["Interner Serverfehler."] })
        );
    }
}
