use axum::{http::StatusCode, response::IntoResponse};
use validator::ValidationErrors;

use crate::{
    db::error::DatabaseError, library::LibraryError, recommendation::RecommendationError,
};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Database error")]
    Database(DatabaseError),

    #[error("Library error: {0}")]
    Library(LibraryError),

    #[error("Recommendation error")]
    Recommendation(RecommendationError),

    #[error("Validation error")]
    Validation(ValidationErrors),

    #[error("Other error: {0}")]
    Other(anyhow::Error),
}

impl From<DatabaseError> for Error {
    fn from(value: DatabaseError) -> Self {
        Self::Database(value)
    }
}

impl From<LibraryError> for Error {
    fn from(value: LibraryError) -> Self {
        Self::Library(value)
    }
}

impl From<RecommendationError> for Error {
    fn from(value: RecommendationError) -> Self {
        Self::Recommendation(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match self {
            Error::Database(database_error) => match database_error {
                DatabaseError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, database_error.to_string()).into_response()
                }
                error => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Database Error");

                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            },
            Error::Library(library_error) => {
                let status = match library_error {
                    ref e if e.is_not_found() => StatusCode::NOT_FOUND,
                    LibraryError::DuplicateShelf(_) => StatusCode::CONFLICT,
                    _ => StatusCode::BAD_REQUEST,
                };

                (status, library_error.to_string()).into_response()
            }
            Error::Recommendation(recommendation_error) => match recommendation_error {
                RecommendationError::Unavailable => {
                    (StatusCode::SERVICE_UNAVAILABLE, recommendation_error.to_string())
                        .into_response()
                }
                error => {
                    tracing::error!(err.msg = %error, err.details = ?error, "Recommendation Error");

                    (StatusCode::BAD_GATEWAY, error.to_string()).into_response()
                }
            },
            Error::Other(error) => {
                tracing::error!(err.msg = %error, err.details = ?error, "Other Error");

                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            Error::Validation(validation_error) => {
                tracing::warn!(err.msg = %validation_error, err.details = ?validation_error, "Validation Error");

                (StatusCode::BAD_REQUEST, validation_error.to_string()).into_response()
            }
        }
    }
}
