use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use immo_price::{ErrorClass, PredictionFailure};
use serde::{Deserialize, Serialize};

/// Body of every non-success response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// The body could not be read as a JSON object.
    Rejected(JsonRejection),
    Prediction(PredictionFailure),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected(rejection)
    }
}

impl From<PredictionFailure> for ApiError {
    fn from(failure: PredictionFailure) -> Self {
        ApiError::Prediction(failure)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Rejected(rejection) => {
                tracing::info!(error = %rejection, "rejected request body");
                (rejection.status(), rejection.body_text())
            }
            ApiError::Prediction(failure) => {
                let status = match failure.error.class() {
                    ErrorClass::Client => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    tracing::error!(stage = %failure.stage, error = %failure, "prediction failed");
                } else {
                    tracing::info!(stage = %failure.stage, error = %failure, "prediction refused");
                }
                (status, failure.to_string())
            }
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}
