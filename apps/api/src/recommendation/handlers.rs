use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::models::assessment::Assessment;
use crate::models::questionnaire::Questionnaire;
use crate::models::recommendation::Recommendation;
use crate::state::AppState;

const SESSION_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    /// Kept untyped so field-level problems surface as questionnaire errors.
    #[serde(default)]
    pub form_data: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub session_id: String,
    pub recommendation: Recommendation,
}

/// POST /api/assessment
pub async fn handle_create_assessment(
    State(state): State<AppState>,
    payload: Result<Json<AssessmentRequest>, JsonRejection>,
) -> Result<Json<AssessmentResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let form_data = Questionnaire::from_value(&req.form_data)?;

    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(generate_session_id);

    state
        .store
        .create_assessment(&session_id, &form_data)
        .await?;
    info!(session_id = %session_id, "Assessment created");

    let recommendation = state.orchestrator.recommend(&form_data).await;

    state
        .store
        .update_assessment_recommendation(&session_id, &recommendation)
        .await?;

    Ok(Json(AssessmentResponse {
        session_id,
        recommendation,
    }))
}

/// GET /api/assessment/:session_id
pub async fn handle_get_assessment(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Assessment>, AppError> {
    let assessment = state
        .store
        .get_assessment(&session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;
    Ok(Json(assessment))
}

/// `session_<unix millis>_<9 lowercase base36 chars>`.
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SESSION_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("session_{}_{suffix}", Utc::now().timestamp_millis())
}
