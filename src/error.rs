use actix_multipart::MultipartError;
use actix_web::{HttpResponse, ResponseError, error::BlockingError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

use crate::vision::image_decode::ImageError;

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "No image uploaded")]
    NoImage,

    #[display(fmt = "Unsupported file type: {}. Allowed types: jpg, jpeg, png", _0)]
    UnsupportedType(String),

    #[display(fmt = "{}", _0)]
    Image(ImageError),

    #[display(fmt = "No face recognized in the uploaded image")]
    NotRecognized,

    #[display(fmt = "Invalid upload: {}", _0)]
    Upload(String),

    #[display(fmt = "No records to export")]
    NothingToExport,

    #[display(fmt = "Attendance storage failure: {}", _0)]
    Storage(String),
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NoImage | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::UnsupportedType(_) | AppError::Image(ImageError::UnsupportedFormat) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::Image(ImageError::TooLarge(..)) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Image(ImageError::EmptyData) => StatusCode::BAD_REQUEST,
            AppError::Image(ImageError::DecodeFailed(_)) | AppError::NotRecognized => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::NothingToExport => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Storage(cause) => {
                tracing::error!(error = %cause, "Attendance storage failed");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

impl From<ImageError> for AppError {
    fn from(e: ImageError) -> Self {
        AppError::Image(e)
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Upload(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Storage(e.to_string())
    }
}

impl From<BlockingError> for AppError {
    fn from(e: BlockingError) -> Self {
        AppError::Storage(e.to_string())
    }
}
