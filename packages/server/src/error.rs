//! Mapping of request failures onto HTTP responses.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use nephro_coach_database::DbError;
use nephro_coach_pdf::ExtractionError;
use nephro_coach_server_models::{ApiError, ApiMessage, ValidationError};

/// Any failure a handler can report.
///
/// "Not found" is answered with a `{"message": ...}` body, every other
/// failure with an `{"error": ...}` body carrying the underlying message.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Required input was missing.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The multipart body could not be parsed.
    #[error("Invalid multipart body: {0}")]
    Multipart(String),

    /// No matching record; answered with a message body.
    #[error("{0}")]
    NotFound(&'static str),

    /// The latest patient record has no creatinine result; answered with an
    /// error body.
    #[error("{0}")]
    CreatinineNotFound(&'static str),

    /// The lab report could not be turned into a record.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// A database operation failed.
    #[error(transparent)]
    Storage(#[from] DbError),

    /// Writing the uploaded file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking extraction task did not complete.
    #[error("Extraction task failed: {0}")]
    Blocking(String),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Multipart(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) | Self::CreatinineNotFound(_) => StatusCode::NOT_FOUND,
            Self::Extraction(_) | Self::Storage(_) | Self::Io(_) | Self::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            log::error!("Request failed: {self}");
        } else {
            log::debug!("Request rejected ({status}): {self}");
        }

        match self {
            Self::NotFound(message) => HttpResponse::build(status).json(ApiMessage::new(*message)),
            other => HttpResponse::build(status).json(ApiError::new(other.to_string())),
        }
    }
}
