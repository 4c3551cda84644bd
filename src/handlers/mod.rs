pub mod dashboard;
pub mod health;
pub mod pathogens;
pub mod reports;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ReportError;

pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        self.0
            .downcast_ref::<ReportError>()
            .map(ReportError::status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }
        (
            status,
            Json(json!({
                "error": self.0.to_string()
            })),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Path ids are positive integers; anything else is rejected before the store
/// is touched.
pub fn parse_id(raw: &str) -> Result<i32, ReportError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ReportError::InvalidInput(format!(
            "id must be a positive integer, got {:?}",
            raw
        ))),
    }
}
