// Prompt constants and rendering for recommendation generation.
// Reuses cross-cutting fragments from providers::prompts.

use serde_json::{json, Value};

use crate::models::questionnaire::Questionnaire;
use crate::providers::prompts::JSON_ONLY_SYSTEM;

/// Name used for the structured-output schema / forced tool.
pub const SCHEMA_NAME: &str = "submit_recommendation";

/// System prompt for recommendation generation — enforces JSON-only output.
pub const RECOMMENDATION_SYSTEM: &str = "You are an expert educational advisor. \
    Recommend the single most suitable educational program for a student profile \
    and support it with realistic program, career, and financial figures.";

const NOT_SPECIFIED: &str = "Not specified";

/// Recommendation prompt template.
/// Replace: {education_level}, {field_of_study}, {current_role}, {years_experience},
///          {location}, {career_goals}, {learning_preference}
pub const RECOMMENDATION_PROMPT_TEMPLATE: &str = r#"Based on the following student profile, recommend the most suitable educational program and provide detailed insights.

Student Profile:
- Education Level: {education_level}
- Field of Study: {field_of_study}
- Current Role: {current_role}
- Years of Experience: {years_experience}
- Location: {location}
- Career Goals: {career_goals}
- Learning Preference: {learning_preference}

Return a JSON object with this EXACT schema (no extra fields):
{
  "recommendedProgram": {
    "title": "Program name",
    "description": "Why this program fits the student's profile and goals",
    "matchScore": 85
  },
  "programInsights": {
    "enrolled": 1200,
    "graduated": 3000,
    "completionTime": "18 months",
    "successRate": 82
  },
  "careerProjections": {
    "jobTitles": ["Job Title 1", "Job Title 2", "Job Title 3"],
    "salaryRange": "$XX,000 - $XX,000",
    "industryGrowth": "X% growth by 2030",
    "alumniExample": "Brief success story"
  },
  "financialInfo": {
    "estimatedCost": "$XX,000",
    "scholarships": ["Scholarship 1", "Scholarship 2"],
    "corporateDiscounts": true
  },
  "alternativePathways": [
    {
      "title": "Alternative Program 1",
      "description": "Brief description",
      "matchScore": 75
    },
    {
      "title": "Alternative Program 2",
      "description": "Brief description",
      "matchScore": 70
    }
  ]
}

HARD RULES:
1. Every field above is required — never omit a field or return null
2. matchScore, enrolled, graduated, and successRate are JSON numbers, not strings
3. enrolled and graduated are whole numbers; matchScore and successRate are between 0 and 100
4. jobTitles must contain at least one title
5. Ensure all numbers are realistic and the recommendations are relevant to the student's background and goals"#;

/// Renders the questionnaire into the user prompt. Blank optional fields read "Not specified".
pub fn render_prompt(questionnaire: &Questionnaire) -> String {
    fill_placeholders(RECOMMENDATION_PROMPT_TEMPLATE, |name| match name {
        "education_level" => Some(questionnaire.education_level.label()),
        "field_of_study" => Some(questionnaire.field_of_study().unwrap_or(NOT_SPECIFIED)),
        "current_role" => Some(questionnaire.current_role().unwrap_or(NOT_SPECIFIED)),
        "years_experience" => Some(questionnaire.years_experience.label()),
        "location" => Some(questionnaire.location().unwrap_or(NOT_SPECIFIED)),
        "career_goals" => Some(questionnaire.career_goals.label()),
        "learning_preference" => Some(questionnaire.learning_preference.label()),
        _ => None,
    })
}

/// Replaces each `{name}` the lookup knows in one left-to-right pass.
/// Substituted text is never rescanned; unknown braces are copied through.
fn fill_placeholders<'a, F>(template: &str, value_for: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let filled = after
            .find('}')
            .and_then(|close| value_for(&after[..close]).map(|value| (close, value)));
        match filled {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Full system prompt: advisor persona plus the JSON-only rules.
pub fn system_prompt() -> String {
    format!("{RECOMMENDATION_SYSTEM} {JSON_ONLY_SYSTEM}")
}

/// JSON Schema mirroring the Recommendation shape, for providers that support constrained output.
pub fn recommendation_schema() -> Value {
    let program = json!({
        "type": "object",
        "properties": {
            "title": {"type": "string"},
            "description": {"type": "string"},
            "matchScore": {"type": "number"}
        },
        "required": ["title", "description", "matchScore"],
        "additionalProperties": false
    });

    json!({
        "type": "object",
        "properties": {
            "recommendedProgram": program.clone(),
            "programInsights": {
                "type": "object",
                "properties": {
                    "enrolled": {"type": "integer"},
                    "graduated": {"type": "integer"},
                    "completionTime": {"type": "string"},
                    "successRate": {"type": "number"}
                },
                "required": ["enrolled", "graduated", "completionTime", "successRate"],
                "additionalProperties": false
            },
            "careerProjections": {
                "type": "object",
                "properties": {
                    "jobTitles": {"type": "array", "items": {"type": "string"}},
                    "salaryRange": {"type": "string"},
                    "industryGrowth": {"type": "string"},
                    "alumniExample": {"type": "string"}
                },
                "required": ["jobTitles", "salaryRange", "industryGrowth", "alumniExample"],
                "additionalProperties": false
            },
            "financialInfo": {
                "type": "object",
                "properties": {
                    "estimatedCost": {"type": "string"},
                    "scholarships": {"type": "array", "items": {"type": "string"}},
                    "corporateDiscounts": {"type": "boolean"}
                },
                "required": ["estimatedCost", "scholarships", "corporateDiscounts"],
                "additionalProperties": false
            },
            "alternativePathways": {"type": "array", "items": program}
        },
        "required": [
            "recommendedProgram",
            "programInsights",
            "careerProjections",
            "financialInfo",
            "alternativePathways"
        ],
        "additionalProperties": false
    })
}
