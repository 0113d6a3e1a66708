//! Recommendation — the structured program suggestion returned to the caller.
//!
//! Field names serialize in camelCase to match the JSON contract given to LLM providers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_program: RecommendedProgram,
    pub program_insights: ProgramInsights,
    pub career_projections: CareerProjections,
    pub financial_info: FinancialInfo,
    pub alternative_pathways: Vec<Pathway>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedProgram {
    pub title: String,
    pub description: String,
    /// Conventionally 0 – 100.
    pub match_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInsights {
    pub enrolled: u64,
    pub graduated: u64,
    /// Human phrase, e.g. "18 months".
    pub completion_time: String,
    /// Percentage.
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerProjections {
    /// Never empty.
    pub job_titles: Vec<String>,
    pub salary_range: String,
    pub industry_growth: String,
    pub alumni_example: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialInfo {
    pub estimated_cost: String,
    pub scholarships: Vec<String>,
    pub corporate_discounts: bool,
}

/// An alternative program, ranked below the primary recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pathway {
    pub title: String,
    pub description: String,
    pub match_score: f64,
}
