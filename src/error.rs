use askama::Template;
use axum::http::StatusCode;
use axum::response::Html;
use thiserror::Error;

use crate::views::{ErrorTemplate, NotFoundTemplate};

/// Standard error type for the application.
///
/// Every handler returns `Result<_, AppError>`; whatever escapes is logged
/// and rendered as a user-safe HTML page. Internal detail (driver errors,
/// template errors) never reaches the client.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = match status {
            StatusCode::NOT_FOUND => NotFoundTemplate {
                title: "Page Not Found",
                user: None,
            }
            .render(),
            _ => ErrorTemplate {
                title: "Server Error",
                user: None,
                message: "Something went wrong!",
            }
            .render(),
        };

        match body {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "failed to render error page");
                (status, "Something went wrong!").into_response()
            }
        }
    }
}
