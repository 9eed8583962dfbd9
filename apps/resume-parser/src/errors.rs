use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::storage::StorageError;

/// Application-level error type.
/// The HTML upload flow answers with plain text; wrap in [`ApiError`] for JSON.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    NoFile,

    #[error("Invalid file type. Only PDFs are allowed.")]
    InvalidFileType,

    #[error("Malformed upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoFile | AppError::InvalidFileType => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::Storage(_) | AppError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::NoFile => "NO_FILE",
            AppError::InvalidFileType => "INVALID_FILE_TYPE",
            AppError::Multipart(_) => "MALFORMED_UPLOAD",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Extraction(ExtractionError::DocumentParse(_)) => "UNPROCESSABLE_DOCUMENT",
            AppError::Extraction(_) => "EXTRACTION_ERROR",
        }
    }

    /// Client-facing message. Server-side failures are logged here and
    /// answered generically.
    fn public_message(&self) -> String {
        match self {
            AppError::NoFile | AppError::InvalidFileType => self.to_string(),
            AppError::Multipart(e) => e.body_text(),
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                "Failed to store the uploaded file".to_string()
            }
            AppError::Extraction(ExtractionError::DocumentParse(e)) => {
                tracing::error!("PDF parse error: {e}");
                "Could not read the uploaded PDF".to_string()
            }
            AppError::Extraction(e) => {
                tracing::error!("Extraction error: {e}");
                "An internal server error occurred".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, self.public_message()).into_response()
    }
}

/// JSON-envelope flavor of [`AppError`] for the `/api/v1` routes.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::Extraction(ExtractionError::DocumentParse(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            other => other.status_code(),
        };
        let code = self.0.code();
        let message = self.0.public_message();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;
    use crate::extraction::pdf_text::extract_text;

    async fn body_string(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn parse_error() -> AppError {
        let err = extract_text(b"garbage").unwrap_err();
        AppError::Extraction(ExtractionError::DocumentParse(err))
    }

    #[tokio::test]
    async fn test_user_errors_are_plain_text_400() {
        let response = AppError::NoFile.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(response).await, "No file uploaded");

        let response = AppError::InvalidFileType.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_string(response).await,
            "Invalid file type. Only PDFs are allowed."
        );
    }

    #[tokio::test]
    async fn test_parse_error_is_generic_500() {
        let response = parse_error().into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_string(response).await;
        assert_eq!(body, "Could not read the uploaded PDF");
    }

    #[tokio::test]
    async fn test_api_error_uses_json_envelope() {
        let response = ApiError(AppError::InvalidFileType).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_FILE_TYPE");
        assert_eq!(
            json["error"]["message"],
            "Invalid file type. Only PDFs are allowed."
        );
    }

    #[tokio::test]
    async fn test_api_parse_error_is_422() {
        let response = ApiError(parse_error()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(json["error"]["code"], "UNPROCESSABLE_DOCUMENT");
    }
}
