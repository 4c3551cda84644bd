use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{parse_id, AppError};
use crate::services::{AppState, LayoutChoice, RenderedReport};

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub case_no: Option<String>,
}

/// Report in the form chosen by the case's machine.
pub async fn lab_pdf_fm(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    report(&state, &id, query, LayoutChoice::Selected).await
}

/// Report in the institute's generic layout.
pub async fn lab_pdf_icn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    report(&state, &id, query, LayoutChoice::Generic).await
}

async fn report(
    state: &AppState,
    raw_id: &str,
    query: ReportQuery,
    choice: LayoutChoice,
) -> Result<Response, AppError> {
    let lab_id = parse_id(raw_id)?;
    let generated_at = chrono::Local::now().naive_local();
    let rendered = state.reports.render(lab_id, choice, generated_at).await?;
    pdf_response(rendered, query.case_no.as_deref())
}

/// `<case_no>.pdf`, keeping only characters that are safe in a header.
pub fn attachment_name(case_no: Option<&str>) -> String {
    let stem: String = case_no
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    if stem.is_empty() {
        "default.pdf".to_string()
    } else {
        format!("{}.pdf", stem)
    }
}

fn pdf_response(rendered: RenderedReport, case_no: Option<&str>) -> Result<Response, AppError> {
    let disposition = format!("inline; filename={}", attachment_name(case_no));
    let etag = format!("\"{}\"", rendered.fingerprint);
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static(rendered.content_type))
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::ETAG, etag)
        .body(Body::from(rendered.bytes))?;
    Ok(response)
}
