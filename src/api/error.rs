use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use super::response::ApiResponse;
use crate::domain::DomainError;
use crate::engine::EngineError;
use crate::io::IoError;

/// Failures surfaced by HTTP handlers
///
/// Business-rule failures are HTTP 200 with `success: false`; only malformed
/// requests and internal faults change the status code.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Invalid request body.")]
    Body(#[from] JsonRejection),

    #[error("Invalid query string.")]
    Query(#[from] QueryRejection),

    #[error("Failed to export transactions.")]
    Export(#[from] IoError),
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self::Engine(EngineError::Domain(err))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Engine(EngineError::Domain(_)) => StatusCode::OK,
            Self::Body(_) | Self::Query(_) => StatusCode::BAD_REQUEST,
            Self::Engine(_) | Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Body(rejection) => {
                warn!(error = %rejection, "Rejected request body");
                self.to_string()
            }
            Self::Query(rejection) => {
                warn!(error = %rejection, "Rejected query string");
                self.to_string()
            }
            Self::Engine(EngineError::Domain(e)) => e.to_string(),
            Self::Engine(e) => {
                error!(error = %e, "Request failed");
                "Internal server error.".to_string()
            }
            Self::Export(e) => {
                error!(error = %e, "Transaction export failed");
                self.to_string()
            }
        };

        (status, ApiResponse::failure(message)).into_response()
    }
}
