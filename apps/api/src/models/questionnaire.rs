//! Questionnaire — the validated profile a user submits before a recommendation is generated.
//!
//! Inbound payloads are walked field by field so a rejection can name the exact field.
//! The derived `Deserialize` is only used when reading records back from storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum QuestionnaireError {
    #[error("formData must be a JSON object")]
    NotAnObject,

    #[error("formData.{field} is required")]
    Missing { field: &'static str },

    #[error("formData.{field} must be a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("formData.{field} has invalid value '{value}' (expected one of: {allowed})")]
    InvalidValue {
        field: &'static str,
        value: String,
        allowed: String,
    },
}

/// Declares a closed string enum with its wire value and human label.
macro_rules! closed_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal, $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            /// Label shown to people and used in LLM prompts.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            fn allowed() -> String {
                Self::ALL
                    .iter()
                    .map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl FromStr for $name {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_enum!(
    /// Highest completed education level. `HighSchool` is the entry level.
    EducationLevel {
        HighSchool => "high_school", "High School Graduate",
        Associate => "associate", "Associate Degree",
        Bachelor => "bachelor", "Bachelor's Degree",
        Master => "master", "Master's Degree",
        Doctoral => "doctoral", "Doctoral Degree",
    }
);

closed_enum!(
    YearsExperience {
        ZeroToTwo => "0-2", "0-2 years",
        ThreeToFive => "3-5", "3-5 years",
        SixToTen => "6-10", "6-10 years",
        TenPlus => "10+", "10+ years",
    }
);

closed_enum!(
    CareerGoal {
        Leadership => "leadership", "Leadership and Management",
        Specialization => "specialization", "Technical Specialization",
        Research => "research", "Research and Academia",
        IndustryChange => "industry_change", "Career Transition",
    }
);

closed_enum!(
    LearningPreference {
        FullTime => "full_time", "Full-time Study",
        PartTime => "part_time", "Part-time Study",
        SelfPaced => "self_paced", "Self-paced (FlexPath)",
    }
);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub education_level: EducationLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_role: Option<String>,
    pub years_experience: YearsExperience,
    pub location: String,
    pub career_goals: CareerGoal,
    pub learning_preference: LearningPreference,
}

impl Questionnaire {
    /// Validates an untrusted `formData` payload.
    ///
    /// Required fields are checked in declaration order and the first failure is returned.
    /// Unknown extra keys are ignored.
    pub fn from_value(value: &Value) -> Result<Self, QuestionnaireError> {
        let obj = value.as_object().ok_or(QuestionnaireError::NotAnObject)?;

        Ok(Questionnaire {
            education_level: closed(obj, "educationLevel", EducationLevel::allowed)?,
            field_of_study: optional_text(obj, "fieldOfStudy")?,
            current_role: optional_text(obj, "currentRole")?,
            years_experience: closed(obj, "yearsExperience", YearsExperience::allowed)?,
            location: required_text(obj, "location")?.to_string(),
            career_goals: closed(obj, "careerGoals", CareerGoal::allowed)?,
            learning_preference: closed(obj, "learningPreference", LearningPreference::allowed)?,
        })
    }

    /// Field of study, or `None` when absent or blank.
    pub fn field_of_study(&self) -> Option<&str> {
        non_blank(self.field_of_study.as_deref())
    }

    /// Current role, or `None` when absent or blank.
    pub fn current_role(&self) -> Option<&str> {
        non_blank(self.current_role.as_deref())
    }

    /// Location, or `None` when blank.
    pub fn location(&self) -> Option<&str> {
        non_blank(Some(self.location.as_str()))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn required_text<'a>(
    obj: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, QuestionnaireError> {
    match obj.get(field) {
        None | Some(Value::Null) => Err(QuestionnaireError::Missing { field }),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(QuestionnaireError::WrongType {
            field,
            expected: "string",
        }),
    }
}

fn optional_text(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, QuestionnaireError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(QuestionnaireError::WrongType {
            field,
            expected: "string",
        }),
    }
}

fn closed<T: FromStr>(
    obj: &Map<String, Value>,
    field: &'static str,
    allowed: fn() -> String,
) -> Result<T, QuestionnaireError> {
    let raw = required_text(obj, field)?;
    raw.parse::<T>()
        .map_err(|_| QuestionnaireError::InvalidValue {
            field,
            value: raw.to_string(),
            allowed: allowed(),
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample(
        education_level: EducationLevel,
        career_goals: CareerGoal,
        learning_preference: LearningPreference,
    ) -> Questionnaire {
        Questionnaire {
            education_level,
            field_of_study: None,
            current_role: None,
            years_experience: YearsExperience::ThreeToFive,
            location: "Denver".to_string(),
            career_goals,
            learning_preference,
        }
    }

    fn valid_payload() -> Value {
        json!({
            "educationLevel": "bachelor",
            "fieldOfStudy": "Computer Science",
            "currentRole": "Analyst",
            "yearsExperience": "3-5",
            "location": "New York",
            "careerGoals": "leadership",
            "learningPreference": "full_time"
        })
    }

    #[test]
    fn test_valid_payload_parses() {
        let q = Questionnaire::from_value(&valid_payload()).unwrap();
        assert_eq!(q.education_level, EducationLevel::Bachelor);
        assert_eq!(q.years_experience, YearsExperience::ThreeToFive);
        assert_eq!(q.career_goals, CareerGoal::Leadership);
        assert_eq!(q.learning_preference, LearningPreference::FullTime);
        assert_eq!(q.field_of_study(), Some("Computer Science"));
    }

    #[test]
    fn test_optional_fields_may_be_absent() {
        let mut payload = valid_payload();
        let obj = payload.as_object_mut().unwrap();
        obj.remove("fieldOfStudy");
        obj.remove("currentRole");
        let q = Questionnaire::from_value(&payload).unwrap();
        assert!(q.field_of_study().is_none());
        assert!(q.current_role().is_none());
    }

    #[test]
    fn test_blank_optional_fields_read_as_absent() {
        let mut payload = valid_payload();
        payload["fieldOfStudy"] = json!("   ");
        payload["currentRole"] = json!("");
        let q = Questionnaire::from_value(&payload).unwrap();
        assert!(q.field_of_study().is_none());
        assert!(q.current_role().is_none());
    }

    #[test]
    fn test_bad_enum_value_names_field() {
        let mut payload = valid_payload();
        payload["educationLevel"] = json!("phd");
        let err = Questionnaire::from_value(&payload).unwrap_err();
        assert!(matches!(
            err,
            QuestionnaireError::InvalidValue { field: "educationLevel", .. }
        ));
        assert!(err.to_string().contains("high_school"));
    }

    #[test]
    fn test_unknown_experience_bucket_rejected() {
        let mut payload = valid_payload();
        payload["yearsExperience"] = json!("11-20");
        let err = Questionnaire::from_value(&payload).unwrap_err();
        assert!(matches!(
            err,
            QuestionnaireError::InvalidValue { field: "yearsExperience", .. }
        ));
    }

    #[test]
    fn test_missing_required_field() {
        let mut payload = valid_payload();
        payload.as_object_mut().unwrap().remove("location");
        assert_eq!(
            Questionnaire::from_value(&payload).unwrap_err(),
            QuestionnaireError::Missing { field: "location" }
        );
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut payload = valid_payload();
        payload["currentRole"] = json!(42);
        assert_eq!(
            Questionnaire::from_value(&payload).unwrap_err(),
            QuestionnaireError::WrongType {
                field: "currentRole",
                expected: "string"
            }
        );
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(
            Questionnaire::from_value(&json!("bachelor")).unwrap_err(),
            QuestionnaireError::NotAnObject
        );
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let q = Questionnaire::from_value(&valid_payload()).unwrap();
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["educationLevel"], "bachelor");
        assert_eq!(value["yearsExperience"], "3-5");
        assert_eq!(value["learningPreference"], "full_time");
        let recovered: Questionnaire = serde_json::from_value(value).unwrap();
        assert_eq!(recovered, q);
    }

    #[test]
    fn test_labels() {
        assert_eq!(EducationLevel::Bachelor.label(), "Bachelor's Degree");
        assert_eq!(LearningPreference::SelfPaced.label(), "Self-paced (FlexPath)");
        assert_eq!(CareerGoal::IndustryChange.label(), "Career Transition");
    }
}
