use crate::access::AccessError;
use crate::catalog::ImportError;
use crate::config::ConfigError;
use crate::orders::OrderError;
use crate::requirements::ResolveError;
use crate::store::{RepositoryError, SeedError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Process-level failures surfaced by the binary.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Seed(SeedError),
    Import(ImportError),
    Repository(RepositoryError),
    DataQuality(usize),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Seed(err) => write!(f, "dataset error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Repository(err) => write!(f, "store error: {}", err),
            AppError::DataQuality(count) => {
                write!(f, "catalog audit found {} data-quality warning(s)", count)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Seed(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Repository(err) => Some(err),
            AppError::DataQuality(_) => None,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<SeedError> for AppError {
    fn from(value: SeedError) -> Self {
        Self::Seed(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Repository(value)
    }
}

/// Request-level failures and their HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(%detail, "request failed");
        }
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ApiError::NotFound("not found".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(value: AccessError) -> Self {
        match value {
            AccessError::Unauthenticated => ApiError::Unauthorized,
            AccessError::Forbidden { .. } | AccessError::NoCustomer => ApiError::Forbidden,
            AccessError::Repository(err) => err.into(),
        }
    }
}

impl From<ResolveError> for ApiError {
    fn from(value: ResolveError) -> Self {
        match value {
            ResolveError::EmptySelection | ResolveError::Disabled { .. } => {
                ApiError::Validation(value.to_string())
            }
            ResolveError::NotFound { .. } => ApiError::NotFound(value.to_string()),
            ResolveError::Repository(err) => err.into(),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(value: OrderError) -> Self {
        match value {
            OrderError::EmptyItems
            | OrderError::MissingSubjectFields(_)
            | OrderError::CustomerDisabled(_) => ApiError::Validation(value.to_string()),
            OrderError::CustomerNotFound(_)
            | OrderError::NotFoundOrSubmitted
            | OrderError::NotFound => ApiError::NotFound(value.to_string()),
            OrderError::NumberExhausted(_) => ApiError::Internal(value.to_string()),
            OrderError::Resolve(err) => err.into(),
            OrderError::Repository(err) => err.into(),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(value: ImportError) -> Self {
        match value {
            ImportError::Csv(_) => ApiError::Validation(value.to_string()),
            ImportError::Repository(err) => err.into(),
        }
    }
}
