use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rolegrid_core::AppError;
use serde::Serialize;
use tracing::{error, warn};
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    message: String,
    /// Members not yet stored when a reconciliation was interrupted.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pending_ids: Option<Vec<String>>,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::PartialWrite(_) => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        match &self.0 {
            AppError::PartialWrite(partial) => warn!(%partial, "responding with partial write"),
            AppError::Store(_) | AppError::Internal(_) => error!(error = %self.0, "request failed"),
            _ => {}
        }

        let pending_ids = match &self.0 {
            AppError::PartialWrite(partial) => Some(partial.pending_ids.clone()),
            _ => None,
        };

        let payload = Json(ErrorResponse {
            message: self.0.to_string(),
            pending_ids,
        });

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
