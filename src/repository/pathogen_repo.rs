use sqlx::PgPool;

use crate::models::Pathogen;

pub struct PathogenRepository {
    pool: PgPool,
}

impl PathogenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Pathogens tested by a panel, ordered by pathogen id.
    pub async fn find_by_test_type(&self, test_type_id: i32) -> Result<Vec<Pathogen>, sqlx::Error> {
        sqlx::query_as::<_, Pathogen>(
            r#"
            SELECT DISTINCT pa.id, pa.name, pa.description
            FROM pathogens pa
            INNER JOIN pathogens_test_type ptt ON ptt.pathogens_id = pa.id
            WHERE ptt.test_type_id = $1
            ORDER BY pa.id
            "#,
        )
        .bind(test_type_id)
        .fetch_all(&self.pool)
        .await
    }
}
