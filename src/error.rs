use axum::http::StatusCode;
use thiserror::Error;

use crate::report::template::TemplateVariant;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("{entity} with id: {id} not found.")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to render {variant} report for lab {lab_id}: {message}")]
    Rendering {
        lab_id: i32,
        variant: TemplateVariant,
        message: String,
    },

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Asset error: {0}")]
    Asset(String),
}

impl ReportError {
    pub fn not_found(entity: &'static str, id: impl Into<i64>) -> Self {
        ReportError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ReportError::NotFound { .. } => StatusCode::NOT_FOUND,
            ReportError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ReportError::Rendering { .. } | ReportError::Store(_) | ReportError::Asset(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
