use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::FormRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Request failures reported as an HTTP error with an `{"error": ...}` body.
///
/// Problems with the file itself or the model are not errors at this level;
/// they come back as answer text.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No question provided")]
    MissingQuestion,

    #[error("No file selected")]
    NoFileSelected,

    #[error("Invalid form data: {message}")]
    InvalidForm { status: StatusCode, message: String },

    #[error("Failed to store upload")]
    Storage(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingQuestion | ApiError::NoFileSelected => StatusCode::BAD_REQUEST,
            ApiError::InvalidForm { status, .. } => *status,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(e: MultipartRejection) -> Self {
        ApiError::InvalidForm {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(e: FormRejection) -> Self {
        ApiError::InvalidForm {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        ApiError::InvalidForm {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(e) = &self {
            tracing::error!(error = ?e, "Upload could not be stored");
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_errors_are_bad_requests() {
        assert_eq!(ApiError::MissingQuestion.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoFileSelected.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingQuestion.to_string(), "No question provided");
        assert_eq!(ApiError::NoFileSelected.to_string(), "No file selected");
    }

    #[test]
    fn storage_errors_are_server_errors() {
        let err = ApiError::Storage(anyhow::anyhow!("disk full"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
