use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::AppError;
use crate::error::ReportError;
use crate::repository::DashboardRepository;
use crate::services::dashboard::{default_year, PathogenChartQuery, ResultsChart};
use crate::services::{AppState, DashboardService};

#[derive(Debug, Deserialize)]
pub struct PathogenChartParams {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "pathogensId")]
    pub pathogens_id: Option<i32>,
    pub test_type_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ResultsChartParams {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS` or an RFC 3339 timestamp.
pub fn parse_day(raw: &str) -> Result<NaiveDate, ReportError> {
    let raw = raw.trim();
    raw.parse::<NaiveDate>()
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|ts| ts.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.date_naive()))
        .map_err(|_| ReportError::InvalidInput(format!("invalid date {:?}", raw)))
}

fn optional_day(raw: Option<&str>) -> Result<Option<NaiveDate>, ReportError> {
    raw.filter(|s| !s.trim().is_empty()).map(parse_day).transpose()
}

impl PathogenChartParams {
    pub fn into_query(self) -> Result<PathogenChartQuery, ReportError> {
        Ok(PathogenChartQuery {
            start: optional_day(self.start_date.as_deref())?,
            end: optional_day(self.end_date.as_deref())?,
            pathogen_id: self.pathogens_id.filter(|id| *id > 0),
            test_type_id: self.test_type_id.filter(|id| *id > 0),
        })
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub async fn pathogen_chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PathogenChartParams>,
) -> Result<Json<Value>, AppError> {
    let query = params.into_query()?;
    let service = DashboardService::new(DashboardRepository::new(state.db.clone()));
    Ok(Json(service.pathogen_chart(&query, today()).await?))
}

pub async fn results_chart(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResultsChartParams>,
) -> Result<Json<ResultsChart>, AppError> {
    let month = params
        .month
        .ok_or_else(|| ReportError::InvalidInput("month is required".into()))?;
    let year = params.year.unwrap_or_else(|| default_year(today()));
    let service = DashboardService::new(DashboardRepository::new(state.db.clone()));
    Ok(Json(service.results_chart(month, year).await?))
}
