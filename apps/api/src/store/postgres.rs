use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::assessment::Assessment;
use crate::models::questionnaire::Questionnaire;
use crate::models::recommendation::Recommendation;
use crate::store::{AssessmentStore, StoreError};

/// Row shape of the `assessments` table. JSON columns are `jsonb`.
#[derive(Debug, FromRow)]
struct AssessmentRow {
    id: Uuid,
    session_id: String,
    form_data: Json<Questionnaire>,
    recommendation: Option<Json<Recommendation>>,
    created_at: DateTime<Utc>,
}

impl From<AssessmentRow> for Assessment {
    fn from(row: AssessmentRow) -> Self {
        Assessment {
            id: row.id,
            session_id: row.session_id,
            form_data: row.form_data.0,
            recommendation: row.recommendation.map(|r| r.0),
            created_at: row.created_at,
        }
    }
}

/// Postgres-backed store. Expects the schema from `db::ensure_schema`.
pub struct PgAssessmentStore {
    db: PgPool,
}

impl PgAssessmentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AssessmentStore for PgAssessmentStore {
    async fn create_assessment(
        &self,
        session_id: &str,
        form_data: &Questionnaire,
    ) -> Result<Assessment, StoreError> {
        let fresh = Assessment::new(session_id.to_string(), form_data.clone());

        // Resubmitting a session replaces the previous record wholesale.
        let row: AssessmentRow = sqlx::query_as(
            r#"
            INSERT INTO assessments (id, session_id, form_data, recommendation, created_at)
            VALUES ($1, $2, $3, NULL, $4)
            ON CONFLICT (session_id) DO UPDATE
                SET id = EXCLUDED.id,
                    form_data = EXCLUDED.form_data,
                    recommendation = NULL,
                    created_at = EXCLUDED.created_at
            RETURNING id, session_id, form_data, recommendation, created_at
            "#,
        )
        .bind(fresh.id)
        .bind(&fresh.session_id)
        .bind(Json(&fresh.form_data))
        .bind(fresh.created_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    async fn get_assessment(&self, session_id: &str) -> Result<Option<Assessment>, StoreError> {
        let row: Option<AssessmentRow> = sqlx::query_as(
            "SELECT id, session_id, form_data, recommendation, created_at \
             FROM assessments WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Assessment::from))
    }

    async fn update_assessment_recommendation(
        &self,
        session_id: &str,
        recommendation: &Recommendation,
    ) -> Result<Option<Assessment>, StoreError> {
        let row: Option<AssessmentRow> = sqlx::query_as(
            r#"
            UPDATE assessments SET recommendation = $1
            WHERE session_id = $2
            RETURNING id, session_id, form_data, recommendation, created_at
            "#,
        )
        .bind(Json(recommendation))
        .bind(session_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Assessment::from))
    }
}
