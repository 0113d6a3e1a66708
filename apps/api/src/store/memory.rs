use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::assessment::Assessment;
use crate::models::questionnaire::Questionnaire;
use crate::models::recommendation::Recommendation;
use crate::store::{AssessmentStore, StoreError};

/// Process-lifetime store keyed by session id.
#[derive(Default)]
pub struct MemoryStore {
    assessments: RwLock<HashMap<String, Assessment>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn create_assessment(
        &self,
        session_id: &str,
        form_data: &Questionnaire,
    ) -> Result<Assessment, StoreError> {
        let assessment = Assessment::new(session_id.to_string(), form_data.clone());
        self.assessments
            .write()
            .await
            .insert(session_id.to_string(), assessment.clone());
        Ok(assessment)
    }

    async fn get_assessment(&self, session_id: &str) -> Result<Option<Assessment>, StoreError> {
        Ok(self.assessments.read().await.get(session_id).cloned())
    }

    async fn update_assessment_recommendation(
        &self,
        session_id: &str,
        recommendation: &Recommendation,
    ) -> Result<Option<Assessment>, StoreError> {
        let mut assessments = self.assessments.write().await;
        Ok(assessments.get_mut(session_id).map(|assessment| {
            assessment.recommendation = Some(recommendation.clone());
            assessment.clone()
        }))
    }
}
