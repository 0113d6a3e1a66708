//! Response Validator — the only gate between decoded provider output and the rest of the service.
//!
//! Walks an untrusted JSON value and builds a typed `Recommendation` from it.
//! Nothing is coerced or defaulted: a numeric string where a number is required,
//! a missing nested object, or a mistyped array element all reject the whole candidate.
//! Unknown extra keys are ignored.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::recommendation::{
    CareerProjections, FinancialInfo, Pathway, ProgramInsights, Recommendation,
    RecommendedProgram,
};

/// Names the first field that failed, e.g. `financialInfo.estimatedCost`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: expected {expected}")]
pub struct ValidationError {
    pub path: String,
    pub expected: &'static str,
}

impl ValidationError {
    fn new(path: impl Into<String>, expected: &'static str) -> Self {
        Self {
            path: path.into(),
            expected,
        }
    }
}

type Obj = Map<String, Value>;

/// Validates a decoded candidate and returns it as a `Recommendation`.
pub fn validate(candidate: &Value) -> Result<Recommendation, ValidationError> {
    let root = candidate
        .as_object()
        .ok_or_else(|| ValidationError::new("$", "object"))?;

    let program = object(root, "", "recommendedProgram")?;
    let insights = object(root, "", "programInsights")?;
    let careers = object(root, "", "careerProjections")?;
    let financial = object(root, "", "financialInfo")?;

    let recommended_program = RecommendedProgram {
        title: string(program, "recommendedProgram", "title")?,
        description: string(program, "recommendedProgram", "description")?,
        match_score: number(program, "recommendedProgram", "matchScore")?,
    };

    let program_insights = ProgramInsights {
        enrolled: integer(insights, "programInsights", "enrolled")?,
        graduated: integer(insights, "programInsights", "graduated")?,
        completion_time: string(insights, "programInsights", "completionTime")?,
        success_rate: number(insights, "programInsights", "successRate")?,
    };

    let job_titles = string_array(careers, "careerProjections", "jobTitles")?;
    if job_titles.is_empty() {
        return Err(ValidationError::new(
            "careerProjections.jobTitles",
            "non-empty array",
        ));
    }

    let career_projections = CareerProjections {
        job_titles,
        salary_range: string(careers, "careerProjections", "salaryRange")?,
        industry_growth: string(careers, "careerProjections", "industryGrowth")?,
        alumni_example: string(careers, "careerProjections", "alumniExample")?,
    };

    let financial_info = FinancialInfo {
        estimated_cost: string(financial, "financialInfo", "estimatedCost")?,
        scholarships: string_array(financial, "financialInfo", "scholarships")?,
        corporate_discounts: boolean(financial, "financialInfo", "corporateDiscounts")?,
    };

    let alternative_pathways = array(root, "", "alternativePathways")?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let path = format!("alternativePathways[{i}]");
            let pathway = item
                .as_object()
                .ok_or_else(|| ValidationError::new(path.clone(), "object"))?;
            Ok(Pathway {
                title: string(pathway, &path, "title")?,
                description: string(pathway, &path, "description")?,
                match_score: number(pathway, &path, "matchScore")?,
            })
        })
        .collect::<Result<Vec<_>, ValidationError>>()?;

    Ok(Recommendation {
        recommended_program,
        program_insights,
        career_projections,
        financial_info,
        alternative_pathways,
    })
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn field<'a>(
    obj: &'a Obj,
    parent: &str,
    key: &str,
    expected: &'static str,
) -> Result<&'a Value, ValidationError> {
    match obj.get(key) {
        None | Some(Value::Null) => Err(ValidationError::new(join(parent, key), expected)),
        Some(v) => Ok(v),
    }
}

fn object<'a>(obj: &'a Obj, parent: &str, key: &str) -> Result<&'a Obj, ValidationError> {
    field(obj, parent, key, "object")?
        .as_object()
        .ok_or_else(|| ValidationError::new(join(parent, key), "object"))
}

fn array<'a>(obj: &'a Obj, parent: &str, key: &str) -> Result<&'a Vec<Value>, ValidationError> {
    field(obj, parent, key, "array")?
        .as_array()
        .ok_or_else(|| ValidationError::new(join(parent, key), "array"))
}

fn string(obj: &Obj, parent: &str, key: &str) -> Result<String, ValidationError> {
    field(obj, parent, key, "string")?
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| ValidationError::new(join(parent, key), "string"))
}

fn number(obj: &Obj, parent: &str, key: &str) -> Result<f64, ValidationError> {
    field(obj, parent, key, "number")?
        .as_f64()
        .ok_or_else(|| ValidationError::new(join(parent, key), "number"))
}

/// Non-negative whole number. `1200.0` is accepted, `1200.5` and `-3` are not.
fn integer(obj: &Obj, parent: &str, key: &str) -> Result<u64, ValidationError> {
    let value = field(obj, parent, key, "integer")?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Ok(f as u64),
        _ => Err(ValidationError::new(join(parent, key), "integer")),
    }
}

fn boolean(obj: &Obj, parent: &str, key: &str) -> Result<bool, ValidationError> {
    field(obj, parent, key, "boolean")?
        .as_bool()
        .ok_or_else(|| ValidationError::new(join(parent, key), "boolean"))
}

fn string_array(obj: &Obj, parent: &str, key: &str) -> Result<Vec<String>, ValidationError> {
    array(obj, parent, key)
        .map_err(|_| ValidationError::new(join(parent, key), "array of strings"))?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                ValidationError::new(format!("{}[{i}]", join(parent, key)), "string")
            })
        })
        .collect()
}
