//! Unified error handling for admin.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shopfloor_core::ValidationError;
use shopfloor_store::StoreError;
use thiserror::Error;

use crate::export::ExportError;

/// Application-level error type for the admin panel.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Form input failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// CSV or PDF export failed.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::NotFound { .. }) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Export(ExportError::Unavailable) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Export(ExportError::Render(_) | ExportError::Pdf(_)) => StatusCode::BAD_GATEWAY,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Store(StoreError::NotFound { collection, id }) => {
                format!("Not found: {collection}/{id}")
            }
            Self::Store(_) | Self::Template(_) | Self::Internal(_) => {
                "Internal server error".to_owned()
            }
            Self::Export(ExportError::Render(_) | ExportError::Pdf(_)) => {
                "Invoice rendering failed".to_owned()
            }
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{PdfError, RenderError};

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("order abc".to_owned());
        assert_eq!(err.to_string(), "Not found: order abc");

        let err = AppError::Export(ExportError::Unavailable);
        assert_eq!(err.to_string(), "Export error: PDF export is not configured");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            status_of(AppError::NotFound("x".to_owned())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Store(StoreError::NotFound {
                collection: shopfloor_core::Collection::Products,
                id: "p1".to_owned(),
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::Validation(ValidationError::NoVariants)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Export(ExportError::Unavailable)),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(AppError::Export(ExportError::Render(RenderError::Empty))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::Export(ExportError::Pdf(PdfError::Empty))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::Internal("x".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
