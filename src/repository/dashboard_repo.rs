use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use sqlx::PgPool;

use crate::models::ResultCode;

/// `lab_test.result` values counted as findings.
pub static FINDING_RESULTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    ResultCode::ALL
        .into_iter()
        .filter(|code| code.is_finding())
        .map(ResultCode::sub_result_value)
        .collect()
});

/// Aggregate counts behind the dashboard charts. All ranges are `[from, to)`
/// on `created_at`.
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Findings per pathogen id. Pathogens without findings are absent.
    pub async fn findings_by_pathogen(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (i32, i64)>(
            r#"
            SELECT pathogens_id, COUNT(*)
            FROM lab_test
            WHERE pathogens_id IS NOT NULL
              AND created_at >= $1 AND created_at < $2
              AND result = ANY($3)
            GROUP BY pathogens_id
            ORDER BY pathogens_id
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(FINDING_RESULTS.as_slice())
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_findings(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM lab_test
            WHERE created_at >= $1 AND created_at < $2
              AND result = ANY($3)
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(FINDING_RESULTS.as_slice())
        .fetch_one(&self.pool)
        .await
    }

    pub async fn pathogen_ids_for_test_type(
        &self,
        test_type_id: i32,
    ) -> Result<Vec<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            "SELECT DISTINCT pathogens_id FROM pathogens_test_type WHERE test_type_id = $1 AND pathogens_id IS NOT NULL",
        )
        .bind(test_type_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Sub-result counts grouped by the literal result string.
    pub async fn count_results(
        &self,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT result, COUNT(*)
            FROM lab_test
            WHERE result IS NOT NULL
              AND created_at >= $1 AND created_at < $2
            GROUP BY result
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_labs(&self, from: NaiveDateTime, to: NaiveDateTime) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lab WHERE created_at >= $1 AND created_at < $2")
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn findings_are_the_positive_class_spellings() {
        assert_eq!(
            *FINDING_RESULTS,
            vec!["Detected", "Positive", "Indeterminate", "Borderline"]
        );
    }
}
