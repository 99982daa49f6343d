use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use trafficwatch_common::{TrafficWatchError, ValidationError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request body")]
    MalformedPayload,

    #[error("Invalid latitude")]
    InvalidLatitude,

    #[error("Invalid longitude")]
    InvalidLongitude,

    #[error("Invalid event type")]
    InvalidType,

    #[error("Failed to save event")]
    SaveFailed,

    #[error("Failed to fetch events")]
    FetchFailed,

    #[error("Internal error")]
    Internal,
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidType(_) => ApiError::InvalidType,
            ValidationError::InvalidLatitude(_) => ApiError::InvalidLatitude,
            ValidationError::InvalidLongitude(_) => ApiError::InvalidLongitude,
        }
    }
}

impl From<TrafficWatchError> for ApiError {
    fn from(err: TrafficWatchError) -> Self {
        match err {
            TrafficWatchError::Validation(v) => v.into(),
            TrafficWatchError::Retrieval(_) => ApiError::FetchFailed,
            TrafficWatchError::Persistence(_) => ApiError::SaveFailed,
            TrafficWatchError::Config(_) => ApiError::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MalformedPayload
            | ApiError::InvalidLatitude
            | ApiError::InvalidLongitude
            | ApiError::InvalidType => StatusCode::BAD_REQUEST,
            ApiError::SaveFailed | ApiError::FetchFailed | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}
