use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{ReportError, Result};
use crate::models::ResultCode;
use crate::repository::DashboardRepository;

/// Filters for the per-pathogen findings chart.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathogenChartQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub pathogen_id: Option<i32>,
    pub test_type_id: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ResultsChart {
    pub detected: i64,
    pub detected_percentage: f64,
    pub not_detected: i64,
    pub not_detected_percentage: f64,
    pub positive: i64,
    pub positive_percentage: f64,
    pub negative: i64,
    pub negative_percentage: f64,
    pub indeterminate: i64,
    pub indeterminate_percentage: f64,
    pub borderline: i64,
    pub borderline_percentage: f64,
    pub total: i64,
}

pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    pub async fn pathogen_chart(&self, query: &PathogenChartQuery, today: NaiveDate) -> Result<Value> {
        let (from, to) = chart_range(query.start, query.end, today)?;
        let total = self.repo.count_findings(from, to).await?;
        let findings = self.repo.findings_by_pathogen(from, to).await?;
        let panel = match query.test_type_id {
            Some(id) => Some(self.repo.pathogen_ids_for_test_type(id).await?),
            None => None,
        };
        Ok(pathogen_counts(total, &findings, query.pathogen_id, panel.as_deref()))
    }

    pub async fn results_chart(&self, month: u32, year: i32) -> Result<ResultsChart> {
        let (from, to) = month_range(month, year)?;
        let counts = self.repo.count_results(from, to).await?;
        let labs = self.repo.count_labs(from, to).await?;
        Ok(results_chart(&counts, labs))
    }
}

fn start_of(day: NaiveDate) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN)
}

/// `[start, end)` for the findings chart. A missing start is today and a
/// missing end is the day after the start.
pub fn chart_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let start = start.unwrap_or(today);
    let end = end.unwrap_or(start + Duration::days(1));
    if end < start {
        return Err(ReportError::InvalidInput(format!(
            "endDate {} is before startDate {}",
            end, start
        )));
    }
    Ok((start_of(start), start_of(end)))
}

/// First instant of `month` up to the first instant of the following month.
pub fn month_range(month: u32, year: i32) -> Result<(NaiveDateTime, NaiveDateTime)> {
    if !(1..=12).contains(&month) {
        return Err(ReportError::InvalidInput(format!("month must be 1-12, got {}", month)));
    }
    let invalid = || ReportError::InvalidInput(format!("year {} is out of range", year));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    Ok((start_of(first), start_of(next)))
}

/// `{"total": n, "<pathogen id>": count, ...}`.
///
/// With neither filter every pathogen is reported. A pathogen filter and a
/// panel filter each add their pathogens to the selection.
pub fn pathogen_counts(
    total: i64,
    findings: &[(i32, i64)],
    pathogen_id: Option<i32>,
    panel: Option<&[i32]>,
) -> Value {
    let panel: Option<HashSet<i32>> = panel.map(|ids| ids.iter().copied().collect());
    let unfiltered = pathogen_id.is_none() && panel.is_none();

    let mut out = Map::new();
    out.insert("total".to_string(), Value::from(total));
    for (id, count) in findings {
        let selected = unfiltered
            || pathogen_id == Some(*id)
            || panel.as_ref().map(|p| p.contains(id)).unwrap_or(false);
        if selected && *count > 0 {
            out.insert(id.to_string(), Value::from(*count));
        }
    }
    Value::Object(out)
}

fn percentage(count: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10_000.0).round() / 100.0
}

pub fn results_chart(counts: &[(String, i64)], labs: i64) -> ResultsChart {
    let count = |code: ResultCode| {
        counts
            .iter()
            .filter(|(result, _)| result == code.sub_result_value())
            .map(|(_, n)| *n)
            .sum::<i64>()
    };
    let detected = count(ResultCode::Detected);
    let not_detected = count(ResultCode::NotDetected);
    let positive = count(ResultCode::Positive);
    let negative = count(ResultCode::Negative);
    let indeterminate = count(ResultCode::Indeterminate);
    let borderline = count(ResultCode::Borderline);

    ResultsChart {
        detected,
        detected_percentage: percentage(detected, labs),
        not_detected,
        not_detected_percentage: percentage(not_detected, labs),
        positive,
        positive_percentage: percentage(positive, labs),
        negative,
        negative_percentage: percentage(negative, labs),
        indeterminate,
        indeterminate_percentage: percentage(indeterminate, labs),
        borderline,
        borderline_percentage: percentage(borderline, labs),
        total: labs,
    }
}

/// Current year, for requests that leave it out.
pub fn default_year(today: NaiveDate) -> i32 {
    today.year()
}
