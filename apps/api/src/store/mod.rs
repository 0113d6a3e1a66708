//! Assessment storage, injected into handlers as `Arc<dyn AssessmentStore>`.
//!
//! Each session id maps to one record. A record is created with no recommendation
//! and updated once orchestration finishes; updates are idempotent overwrites.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::assessment::Assessment;
use crate::models::questionnaire::Questionnaire;
use crate::models::recommendation::Recommendation;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgAssessmentStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Stores a new assessment with no recommendation. An existing record for the
    /// same session id is replaced.
    async fn create_assessment(
        &self,
        session_id: &str,
        form_data: &Questionnaire,
    ) -> Result<Assessment, StoreError>;

    /// `Ok(None)` when the session id is unknown.
    async fn get_assessment(&self, session_id: &str) -> Result<Option<Assessment>, StoreError>;

    /// Attaches the recommendation. `Ok(None)` (and no write) when the session id is unknown.
    async fn update_assessment_recommendation(
        &self,
        session_id: &str,
        recommendation: &Recommendation,
    ) -> Result<Option<Assessment>, StoreError>;
}
