use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::questionnaire::Questionnaire;
use crate::models::recommendation::Recommendation;

/// A submitted questionnaire and, once orchestration finishes, its recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: Uuid,
    pub session_id: String,
    pub form_data: Questionnaire,
    pub recommendation: Option<Recommendation>,
    pub created_at: DateTime<Utc>,
}

impl Assessment {
    /// New record with no recommendation attached yet.
    pub fn new(session_id: String, form_data: Questionnaire) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            form_data,
            recommendation: None,
            created_at: Utc::now(),
        }
    }
}
