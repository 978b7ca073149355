//! # Tipos de Error
//! src/error.rs
//!
//! `ApiError` agrupa todo lo que un handler puede devolver al cliente. Cada
//! variante sabe su código HTTP y se renderiza como documento RFC 7807.
//! `StartupError` agrupa los errores fatales del arranque.

use crate::config::ConfigError;
use crate::fingerprint::FingerprintError;
use crate::http::{Method, Response, StatusCode};
use crate::refresher::BaselineError;
use thiserror::Error;

/// Resultado estándar de los handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Errores visibles para el cliente HTTP
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(String),

    /// Falló una precondición de escritura (o If-Match en lectura)
    #[error("{0}")]
    PreconditionFailed(String),

    #[error("{0}")]
    BadRequest(String),

    /// El body se parseó pero no es un recurso válido
    #[error("{0}")]
    Unprocessable(String),

    #[error("method {method} not allowed, expected one of: {allowed}")]
    MethodNotAllowed { method: &'static str, allowed: String },

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    pub fn method_not_allowed(method: Method, allowed: &[Method]) -> Self {
        let allowed = allowed
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::MethodNotAllowed {
            method: method.as_str(),
            allowed,
        }
    }

    /// Código HTTP asociado a cada variante
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NotFound,
            ApiError::PreconditionFailed(_) => StatusCode::PreconditionFailed,
            ApiError::BadRequest(_) => StatusCode::BadRequest,
            ApiError::Unprocessable(_) => StatusCode::UnprocessableEntity,
            ApiError::MethodNotAllowed { .. } => StatusCode::MethodNotAllowed,
            ApiError::PayloadTooLarge { .. } => StatusCode::PayloadTooLarge,
            ApiError::Fingerprint(_) | ApiError::Serialization(_) => {
                StatusCode::InternalServerError
            }
        }
    }

    /// Renderiza el error como `application/problem+json`
    pub fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "error interno atendiendo request");
        }

        let mut response = Response::problem(status, &self.to_string());
        if let ApiError::MethodNotAllowed { allowed, .. } = &self {
            response.add_header("Allow", allowed);
        }
        response
    }
}

/// Errores que abortan el arranque del proceso
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid baseline dataset: {0}")]
    Baseline(#[from] BaselineError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}
