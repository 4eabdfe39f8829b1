//! Error types for the library server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable error codes returned in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    UnhandledError = 1,
    EntityNotFound = 2,
    BorrowRecordNotFound = 3,
    BookUnavailable = 4,
    ValidationFailed = 5,
    BadRequest = 6,
    Conflict = 7,
    Cancelled = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing record, or one that was already returned
    #[error("Active borrow record with ID {0} was not found or has already been returned.")]
    BorrowRecordNotFound(i32),

    #[error("Book unavailable: {0}")]
    BookUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Not-found error for an entity addressed by id
    pub fn not_found(entity: &str, id: i32) -> Self {
        AppError::NotFound(format!("{} with ID {} was not found.", entity, id))
    }

    fn parts(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::EntityNotFound),
            AppError::BorrowRecordNotFound(_) => {
                (StatusCode::NOT_FOUND, ErrorCode::BorrowRecordNotFound)
            }
            AppError::BookUnavailable(_) => (StatusCode::BAD_REQUEST, ErrorCode::BookUnavailable),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest),
            AppError::Conflict(_) => (StatusCode::CONFLICT, ErrorCode::Conflict),
            AppError::Cancelled => (
                // nginx's "client closed request"
                StatusCode::from_u16(499).unwrap_or(StatusCode::REQUEST_TIMEOUT),
                ErrorCode::Cancelled,
            ),
            AppError::Database(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::UnhandledError)
            }
        }
    }
}

/// Maps constraint names from the schema to user-facing messages
fn constraint_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("uq_books_isbn") => "A book with this ISBN already exists".to_string(),
        Some("uq_patrons_email") => "A patron with this email already exists".to_string(),
        Some("fk_books_author") => {
            "Author still has books, or the referenced author does not exist".to_string()
        }
        Some("fk_borrow_records_book") => {
            "Book has borrow records, or the referenced book does not exist".to_string()
        }
        Some("fk_borrow_records_patron") => {
            "Patron has borrow records, or the referenced patron does not exist".to_string()
        }
        Some(other) => format!("Constraint {} violated", other),
        None => "Constraint violated".to_string(),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() || db.is_foreign_key_violation() {
                return AppError::Conflict(constraint_message(db.constraint()));
            }
        }
        AppError::Database(e)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.parts();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "An unexpected error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An unexpected error occurred".to_string()
            }
            AppError::Cancelled => {
                tracing::debug!("Request cancelled before completion");
                self.to_string()
            }
            AppError::NotFound(msg)
            | AppError::BookUnavailable(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::BorrowRecordNotFound(_) => self.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
