//! Rule-Based Synthesizer — the terminal fallback when no provider produced a usable recommendation.
//!
//! Pure and infallible. Every axis is a decision table evaluated top to bottom, first match wins:
//! 1. base bundle from (education level, career goal), else General Studies
//! 2. keyword refinement from field of study / current role
//! 3. completion time from learning preference
//! 4. salary cost-of-living multiplier from location
//! 5. enrollment figures from the injected random source
//! 6. scholarships (additive, capped at 3)
//! 7. alternative pathways
//!
//! The random source only fills presentation figures (enrolled, graduated, success rate).
//! Seed it to pin the output.

use rand::Rng;

use crate::models::questionnaire::{
    CareerGoal, EducationLevel, LearningPreference, Questionnaire, YearsExperience,
};
use crate::models::recommendation::{
    CareerProjections, FinancialInfo, Pathway, ProgramInsights, Recommendation,
    RecommendedProgram,
};

/// Appended to the completion time for self-paced learners.
pub const SELF_PACED_SUFFIX: &str = "(FlexPath)";

const MAX_SCHOLARSHIPS: usize = 3;

/// Full-time study shrinks duration to 7/10, rounded up.
const FULL_TIME_NUM: u64 = 7;
const FULL_TIME_DEN: u64 = 10;

/// High cost-of-living salary multiplier 13/10, rounded up.
const COL_NUM: u64 = 13;
const COL_DEN: u64 = 10;

const HIGH_COST_LOCATIONS: &[&str] = &[
    "new york",
    "nyc",
    "san francisco",
    "los angeles",
    "san jose",
    "san diego",
    "boston",
    "seattle",
    "washington",
    "honolulu",
];

const TECH_TERMS: &[&str] = &[
    "computer",
    "software",
    "technology",
    "information systems",
    "programming",
    "developer",
    "engineer",
    "cyber",
    "network",
];

const DATA_TERMS: &[&str] = &[
    "data",
    "analytics",
    "statistic",
    "analyst",
    "business intelligence",
];

// ────────────────────────────────────────────────────────────────────────────
// Program bundles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct PathwaySeed {
    title: &'static str,
    description: &'static str,
    /// Subtracted from the primary match score.
    offset: f64,
}

#[derive(Debug, Clone, Copy)]
struct Bundle {
    title: &'static str,
    description: &'static str,
    match_score: f64,
    completion_time: &'static str,
    job_titles: &'static [&'static str],
    salary_range: &'static str,
    industry_growth: &'static str,
    estimated_cost: &'static str,
    pathways: Option<[PathwaySeed; 2]>,
}

const GENERAL_STUDIES: Bundle = Bundle {
    title: "General Studies Program",
    description: "Based on your profile, we recommend exploring our general studies program \
        to help you identify your specific interests and career path.",
    match_score: 70.0,
    completion_time: "24 months",
    job_titles: &["Program Coordinator", "Business Analyst", "Project Manager"],
    salary_range: "$45,000 - $75,000",
    industry_growth: "5% growth by 2030",
    estimated_cost: "$18,000",
    pathways: None,
};

const GENERIC_PATHWAYS: [PathwaySeed; 2] = [
    PathwaySeed {
        title: "Professional Certificate Program",
        description: "Focused skill development in a specific area",
        offset: 10.0,
    },
    PathwaySeed {
        title: "Continuing Education Program",
        description: "Short courses to build targeted skills at your own pace",
        offset: 15.0,
    },
];

const LEADERSHIP_PATHWAYS: [PathwaySeed; 2] = [
    PathwaySeed {
        title: "Master of Science in Organizational Leadership",
        description: "Leadership theory and change management without the full business core",
        offset: 6.0,
    },
    PathwaySeed {
        title: "Graduate Certificate in Project Management",
        description: "A shorter credential aligned with PMP preparation",
        offset: 12.0,
    },
];

const UNDERGRAD_LEADERSHIP_PATHWAYS: [PathwaySeed; 2] = [
    PathwaySeed {
        title: "Associate of Applied Science in Business Management",
        description: "A two-year foundation in supervision and operations",
        offset: 7.0,
    },
    PathwaySeed {
        title: "Certificate in Supervisory Leadership",
        description: "Practical people-management skills for new team leads",
        offset: 12.0,
    },
];

const RESEARCH_PATHWAYS: [PathwaySeed; 2] = [
    PathwaySeed {
        title: "Graduate Certificate in Research Methods",
        description: "Quantitative and qualitative methods for applied research",
        offset: 8.0,
    },
    PathwaySeed {
        title: "Master of Education in Learning Sciences",
        description: "Research-driven study of how people learn",
        offset: 13.0,
    },
];

/// Step 1: base bundle keyed by (education level, career goal).
fn base_bundle(level: EducationLevel, goal: CareerGoal) -> Bundle {
    use CareerGoal::*;
    use EducationLevel::*;

    match (level, goal) {
        (HighSchool, Leadership) => Bundle {
            title: "Bachelor of Science in Business Administration",
            description: "An undergraduate business program that builds management, \
                finance, and communication skills for future team leaders.",
            match_score: 82.0,
            completion_time: "48 months",
            job_titles: &[
                "Operations Supervisor",
                "Management Trainee",
                "Business Development Associate",
            ],
            salary_range: "$50,000 - $85,000",
            industry_growth: "7% growth by 2030",
            estimated_cost: "$42,000",
            pathways: Some(UNDERGRAD_LEADERSHIP_PATHWAYS),
        },
        (HighSchool, _) => Bundle {
            title: "Bachelor of Arts in Liberal Studies",
            description: "A foundational undergraduate program that provides broad knowledge \
                across multiple disciplines, suited to recent high school graduates exploring their interests.",
            match_score: 75.0,
            completion_time: "48 months",
            job_titles: &[
                "Program Coordinator",
                "Communications Specialist",
                "Administrative Manager",
            ],
            salary_range: "$42,000 - $68,000",
            industry_growth: "6% growth by 2030",
            estimated_cost: "$38,000",
            pathways: None,
        },
        (Associate, Leadership) => Bundle {
            title: "Bachelor of Science in Business Administration (Degree Completion)",
            description: "Applies your associate credits toward a bachelor's degree focused \
                on management and organizational strategy.",
            match_score: 80.0,
            completion_time: "24 months",
            job_titles: &["Operations Manager", "Team Lead", "Store Manager"],
            salary_range: "$52,000 - $88,000",
            industry_growth: "7% growth by 2030",
            estimated_cost: "$24,000",
            pathways: Some(UNDERGRAD_LEADERSHIP_PATHWAYS),
        },
        (Associate, IndustryChange) => Bundle {
            title: "Bachelor of Science in Healthcare Administration",
            description: "A degree-completion path into one of the fastest-growing \
                administrative fields.",
            match_score: 78.0,
            completion_time: "30 months",
            job_titles: &[
                "Healthcare Administrator",
                "Medical Office Manager",
                "Patient Services Coordinator",
            ],
            salary_range: "$48,000 - $82,000",
            industry_growth: "28% growth by 2030",
            estimated_cost: "$27,000",
            pathways: None,
        },
        (Associate, _) => Bundle {
            title: "Bachelor of Applied Science (Degree Completion)",
            description: "Builds on your associate degree with upper-division coursework \
                in your area of interest.",
            match_score: 76.0,
            completion_time: "24 months",
            job_titles: &["Technical Specialist", "Program Analyst", "Operations Coordinator"],
            salary_range: "$48,000 - $78,000",
            industry_growth: "6% growth by 2030",
            estimated_cost: "$22,000",
            pathways: None,
        },
        (Bachelor, Leadership) => Bundle {
            title: "Master of Business Administration (MBA)",
            description: "A versatile graduate degree that develops leadership and business \
                skills applicable across industries and career paths.",
            match_score: 88.0,
            completion_time: "18 months",
            job_titles: &[
                "Operations Manager",
                "Management Consultant",
                "Director of Business Development",
            ],
            salary_range: "$70,000 - $120,000",
            industry_growth: "8% growth by 2030",
            estimated_cost: "$32,000",
            pathways: Some(LEADERSHIP_PATHWAYS),
        },
        (Bachelor, Specialization) => Bundle {
            title: "Master of Science in Project Management",
            description: "Deepens delivery, risk, and portfolio expertise for professionals \
                who want to specialize.",
            match_score: 84.0,
            completion_time: "20 months",
            job_titles: &["Project Manager", "Program Manager", "Delivery Lead"],
            salary_range: "$72,000 - $115,000",
            industry_growth: "7% growth by 2030",
            estimated_cost: "$26,000",
            pathways: None,
        },
        (Bachelor, Research) => Bundle {
            title: "Master of Science in Psychology",
            description: "Research design and behavioral science training that prepares \
                you for doctoral study or applied research roles.",
            match_score: 83.0,
            completion_time: "24 months",
            job_titles: &["Research Associate", "Behavioral Analyst", "Program Evaluator"],
            salary_range: "$55,000 - $90,000",
            industry_growth: "6% growth by 2030",
            estimated_cost: "$27,000",
            pathways: Some(RESEARCH_PATHWAYS),
        },
        (Bachelor, IndustryChange) => Bundle {
            title: "Master of Science in Human Resource Management",
            description: "A graduate program designed for career changers moving into \
                people operations and talent strategy.",
            match_score: 80.0,
            completion_time: "20 months",
            job_titles: &["HR Manager", "Talent Acquisition Lead", "HR Business Partner"],
            salary_range: "$62,000 - $105,000",
            industry_growth: "9% growth by 2030",
            estimated_cost: "$25,000",
            pathways: None,
        },
        (Master, Leadership) => Bundle {
            title: "Doctor of Business Administration (DBA)",
            description: "An applied doctorate for experienced leaders who want to solve \
                organizational problems with research.",
            match_score: 86.0,
            completion_time: "36 months",
            job_titles: &["Chief Operating Officer", "VP of Strategy", "Executive Director"],
            salary_range: "$110,000 - $190,000",
            industry_growth: "8% growth by 2030",
            estimated_cost: "$55,000",
            pathways: Some(LEADERSHIP_PATHWAYS),
        },
        (Master, Research) => Bundle {
            title: "Doctor of Philosophy (PhD) in Business Management",
            description: "A research doctorate preparing you to publish, teach, and lead \
                evidence-based inquiry.",
            match_score: 87.0,
            completion_time: "48 months",
            job_titles: &["Professor", "Research Director", "Senior Research Scientist"],
            salary_range: "$85,000 - $150,000",
            industry_growth: "10% growth by 2030",
            estimated_cost: "$60,000",
            pathways: Some(RESEARCH_PATHWAYS),
        },
        (Master, Specialization) => Bundle {
            title: "Professional Development Certificate",
            description: "Focused skill enhancement programs designed for experienced \
                professionals seeking to advance their expertise.",
            match_score: 80.0,
            completion_time: "12 months",
            job_titles: &["Senior Specialist", "Principal Consultant", "Subject Matter Expert"],
            salary_range: "$80,000 - $130,000",
            industry_growth: "7% growth by 2030",
            estimated_cost: "$9,000",
            pathways: None,
        },
        (Master, IndustryChange) => Bundle {
            title: "Graduate Certificate in Information Technology",
            description: "A compact technical credential for graduate-educated professionals \
                moving into technology roles.",
            match_score: 78.0,
            completion_time: "12 months",
            job_titles: &["IT Project Manager", "Systems Analyst", "Technology Consultant"],
            salary_range: "$75,000 - $120,000",
            industry_growth: "13% growth by 2030",
            estimated_cost: "$12,000",
            pathways: None,
        },
        (Doctoral, Leadership) => Bundle {
            title: "Executive Leadership Certificate",
            description: "Executive education in strategy and governance for doctorally \
                prepared professionals.",
            match_score: 80.0,
            completion_time: "9 months",
            job_titles: &["Executive Director", "Dean", "Chief Academic Officer"],
            salary_range: "$120,000 - $200,000",
            industry_growth: "6% growth by 2030",
            estimated_cost: "$15,000",
            pathways: None,
        },
        (Doctoral, Specialization) => Bundle {
            title: "Advanced Professional Certificate",
            description: "Targeted post-doctoral coursework that extends your expertise \
                into an adjacent specialty.",
            match_score: 78.0,
            completion_time: "9 months",
            job_titles: &["Principal Scientist", "Clinical Director", "Senior Advisor"],
            salary_range: "$100,000 - $170,000",
            industry_growth: "6% growth by 2030",
            estimated_cost: "$11,000",
            pathways: None,
        },
        _ => GENERAL_STUDIES,
    }
}

/// Step 2: keyword upgrade. Technology terms are checked before data terms.
fn refine_bundle(base: Bundle, questionnaire: &Questionnaire) -> Bundle {
    let refined = if mentions_any(questionnaire, TECH_TERMS) {
        tech_bundle(questionnaire.education_level)
    } else if mentions_any(questionnaire, DATA_TERMS) {
        data_bundle(questionnaire.education_level)
    } else {
        None
    };

    match refined {
        Some(bundle) => Bundle {
            pathways: bundle.pathways.or(base.pathways),
            ..bundle
        },
        None => base,
    }
}

fn tech_bundle(level: EducationLevel) -> Option<Bundle> {
    let bundle = match level {
        EducationLevel::HighSchool | EducationLevel::Associate => Bundle {
            title: "Bachelor of Science in Information Technology",
            description: "A hands-on information technology degree covering networking, \
                security, and software fundamentals.",
            match_score: 85.0,
            completion_time: if level == EducationLevel::Associate {
                "24 months"
            } else {
                "48 months"
            },
            job_titles: &["IT Support Specialist", "Network Administrator", "Systems Analyst"],
            salary_range: "$55,000 - $95,000",
            industry_growth: "13% growth by 2030",
            estimated_cost: "$40,000",
            pathways: None,
        },
        EducationLevel::Bachelor => Bundle {
            title: "Master of Science in Information Technology",
            description: "Advanced study in architecture, cloud, and security for \
                technically grounded professionals.",
            match_score: 90.0,
            completion_time: "18 months",
            job_titles: &["IT Manager", "Cloud Architect", "Information Security Analyst"],
            salary_range: "$85,000 - $140,000",
            industry_growth: "15% growth by 2030",
            estimated_cost: "$30,000",
            pathways: None,
        },
        EducationLevel::Master => Bundle {
            title: "Doctor of Information Technology (DIT)",
            description: "An applied doctorate in information technology leadership \
                and research.",
            match_score: 88.0,
            completion_time: "36 months",
            job_titles: &["Chief Information Officer", "Director of IT", "Technology Strategist"],
            salary_range: "$120,000 - $200,000",
            industry_growth: "11% growth by 2030",
            estimated_cost: "$52,000",
            pathways: None,
        },
        EducationLevel::Doctoral => return None,
    };
    Some(bundle)
}

fn data_bundle(level: EducationLevel) -> Option<Bundle> {
    let bundle = match level {
        EducationLevel::HighSchool | EducationLevel::Associate => Bundle {
            title: "Bachelor of Science in Data Analytics",
            description: "Statistics, SQL, and visualization skills for entry into \
                analytics careers.",
            match_score: 84.0,
            completion_time: if level == EducationLevel::Associate {
                "24 months"
            } else {
                "48 months"
            },
            job_titles: &["Data Analyst", "Reporting Analyst", "Business Intelligence Analyst"],
            salary_range: "$55,000 - $90,000",
            industry_growth: "23% growth by 2030",
            estimated_cost: "$40,000",
            pathways: None,
        },
        EducationLevel::Bachelor => Bundle {
            title: "Master of Science in Data Analytics",
            description: "Machine learning, statistical modeling, and data engineering \
                for analytically minded professionals.",
            match_score: 89.0,
            completion_time: "18 months",
            job_titles: &["Data Scientist", "Analytics Manager", "Machine Learning Analyst"],
            salary_range: "$80,000 - $135,000",
            industry_growth: "23% growth by 2030",
            estimated_cost: "$29,000",
            pathways: None,
        },
        EducationLevel::Master | EducationLevel::Doctoral => return None,
    };
    Some(bundle)
}

/// Case-insensitive substring match against field of study and current role.
/// Absent or blank fields never match.
fn mentions_any(questionnaire: &Questionnaire, terms: &[&str]) -> bool {
    text_mentions(questionnaire.field_of_study(), terms)
        || text_mentions(questionnaire.current_role(), terms)
}

fn text_mentions(text: Option<&str>, terms: &[&str]) -> bool {
    text.map(str::to_lowercase)
        .is_some_and(|text| terms.iter().any(|term| text.contains(term)))
}

// ────────────────────────────────────────────────────────────────────────────
// Synthesis
// ────────────────────────────────────────────────────────────────────────────

/// Builds a complete recommendation from the questionnaire alone.
pub fn synthesize<R: Rng + ?Sized>(questionnaire: &Questionnaire, rng: &mut R) -> Recommendation {
    let bundle = refine_bundle(
        base_bundle(questionnaire.education_level, questionnaire.career_goals),
        questionnaire,
    );

    let completion_time =
        adjust_completion_time(bundle.completion_time, questionnaire.learning_preference);

    let salary_range = if is_high_cost_location(&questionnaire.location) {
        scale_salary_range(bundle.salary_range, COL_NUM, COL_DEN)
    } else {
        bundle.salary_range.to_string()
    };

    let program_insights = ProgramInsights {
        enrolled: rng.gen_range(500..1500),
        graduated: rng.gen_range(1500..3500),
        completion_time,
        success_rate: rng.gen_range(75..90) as f64,
    };

    let description = match questionnaire.field_of_study() {
        Some(field) => format!(
            "{} It builds directly on your background in {field}.",
            bundle.description
        ),
        None => bundle.description.to_string(),
    };

    let region = questionnaire.location().unwrap_or("their region");
    let alumni_example = format!(
        "A graduate based in {region} moved into a {} role within a year of completing the program.",
        bundle.job_titles[0]
    );

    let seeds = bundle.pathways.unwrap_or(GENERIC_PATHWAYS);
    let alternative_pathways = seeds
        .iter()
        .map(|seed| Pathway {
            title: seed.title.to_string(),
            description: seed.description.to_string(),
            match_score: bundle.match_score - seed.offset,
        })
        .collect();

    Recommendation {
        recommended_program: RecommendedProgram {
            title: bundle.title.to_string(),
            description,
            match_score: bundle.match_score,
        },
        program_insights,
        career_projections: CareerProjections {
            job_titles: bundle.job_titles.iter().map(|t| t.to_string()).collect(),
            salary_range,
            industry_growth: bundle.industry_growth.to_string(),
            alumni_example,
        },
        financial_info: FinancialInfo {
            estimated_cost: bundle.estimated_cost.to_string(),
            scholarships: scholarships(questionnaire),
            corporate_discounts: corporate_discounts(questionnaire),
        },
        alternative_pathways,
    }
}

/// Step 3: full-time shrinks the leading number to 7/10 (rounded up), self-paced
/// gets the FlexPath suffix, part-time is unchanged.
pub fn adjust_completion_time(base: &str, preference: LearningPreference) -> String {
    match preference {
        LearningPreference::PartTime => base.to_string(),
        LearningPreference::SelfPaced => format!("{base} {SELF_PACED_SUFFIX}"),
        LearningPreference::FullTime => {
            let digits = base.chars().take_while(|c| c.is_ascii_digit()).count();
            match base[..digits].parse::<u64>() {
                Ok(n) => format!("{}{}", ceil_scale(n, FULL_TIME_NUM, FULL_TIME_DEN), &base[digits..]),
                Err(_) => base.to_string(),
            }
        }
    }
}

/// Step 4 predicate.
pub fn is_high_cost_location(location: &str) -> bool {
    let location = location.to_lowercase();
    HIGH_COST_LOCATIONS.iter().any(|place| location.contains(place))
}

/// Scales every comma-grouped number in `range` by `num/den`, rounded up,
/// leaving the surrounding text intact: `"$70,000 - $120,000"` × 13/10 → `"$91,000 - $156,000"`.
pub fn scale_salary_range(range: &str, num: u64, den: u64) -> String {
    let chars: Vec<char> = range.chars().collect();
    let mut out = String::with_capacity(range.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let mut value: u64 = 0;
        while i < chars.len() {
            match chars[i] {
                c if c.is_ascii_digit() => {
                    value = value.saturating_mul(10).saturating_add(u64::from(c as u8 - b'0'));
                    i += 1;
                }
                ',' if chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()) => i += 1,
                _ => break,
            }
        }
        out.push_str(&group_thousands(ceil_scale(value, num, den)));
    }

    out
}

fn ceil_scale(value: u64, num: u64, den: u64) -> u64 {
    value.saturating_mul(num).div_ceil(den)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Step 6: additive rules in fixed order, truncated to the first three.
fn scholarships(questionnaire: &Questionnaire) -> Vec<String> {
    let mut awards: Vec<&str> = Vec::new();

    if questionnaire.education_level == EducationLevel::HighSchool {
        awards.push("First-Generation Student Scholarship");
        awards.push("Academic Excellence Award");
    }
    if questionnaire.career_goals == CareerGoal::Leadership {
        awards.push("Emerging Leaders Grant");
    }
    // Field of study only; the current role plays no part here.
    if text_mentions(questionnaire.field_of_study(), TECH_TERMS) {
        awards.push("STEM Innovation Grant");
    }
    awards.push("Merit-Based Scholarship");
    awards.push("Need-Based Grant");

    awards
        .into_iter()
        .take(MAX_SCHOLARSHIPS)
        .map(str::to_string)
        .collect()
}

/// Employer tuition programs are assumed available to anyone already working
/// or with three or more years of experience.
fn corporate_discounts(questionnaire: &Questionnaire) -> bool {
    questionnaire.current_role().is_some()
        || questionnaire.years_experience != YearsExperience::ZeroToTwo
}
