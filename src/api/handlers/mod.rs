pub mod dashboard;
pub mod energy;
pub mod health;
pub mod sensors;

use crate::api::models::ErrorResponse;
use crate::error::AppError;
use crate::repositories::RetrievalError;
use crate::series::TimeRange;
use axum::{http::StatusCode, response::Json};
use tracing::warn;

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Maps a domain error onto a status code and a JSON body carrying the message.
pub fn api_error(err: AppError) -> ApiError {
    let status = match &err {
        AppError::Configuration(_) => StatusCode::BAD_REQUEST,
        AppError::Parse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Retrieval(RetrievalError::Unauthorized) | AppError::Auth(_) => {
            StatusCode::UNAUTHORIZED
        }
        AppError::Retrieval(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(status = status.as_u16(), error = %err, "request failed");
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// The requested range token, or the configured default when none is given.
fn range_or(token: Option<&str>, default: TimeRange) -> TimeRange {
    token.map(TimeRange::parse_lenient).unwrap_or(default)
}
