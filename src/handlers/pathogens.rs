use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::{parse_id, AppError};
use crate::models::Pathogen;
use crate::repository::PathogenRepository;
use crate::services::AppState;

/// Pathogens on a test type's panel.
pub async fn by_test_type(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Pathogen>>, AppError> {
    let test_type_id = parse_id(&id)?;
    let pathogens = PathogenRepository::new(state.db.clone())
        .find_by_test_type(test_type_id)
        .await
        .map_err(crate::error::ReportError::from)?;
    Ok(Json(pathogens))
}
