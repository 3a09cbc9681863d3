//! Major-consultation survey: raw intake form and its validated shape.

use serde::{Deserialize, Serialize};

use crate::error::ValidationErrors;

const CAREER_GOAL_MAX_CHARS: usize = 1000;
const SCORE_RANGE: std::ops::RangeInclusive<f64> = 0.0..=10.0;
const LEVEL_RANGE: std::ops::RangeInclusive<i64> = 1..=5;

/// Survey body as received. Every field is optional here so that validation can report
/// all missing fields at once instead of failing on the first one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyForm {
    #[serde(default)]
    pub interests: Option<Vec<String>>,
    #[serde(default)]
    pub skills: Option<Vec<String>>,
    #[serde(default)]
    pub favorite_subjects: Option<Vec<String>>,
    #[serde(default)]
    pub scores: Option<ScoresForm>,
    #[serde(default)]
    pub career_goal: Option<String>,
    #[serde(default)]
    pub study_habits: Option<Vec<String>>,
    #[serde(default)]
    pub technology_level: Option<i64>,
    #[serde(default)]
    pub creativity_level: Option<i64>,
    #[serde(default)]
    pub communication_level: Option<i64>,
    #[serde(default)]
    pub logic_level: Option<i64>,
    #[serde(default)]
    pub work_environment: Option<String>,
    #[serde(default)]
    pub learning_style: Option<String>,
    #[serde(default)]
    pub personality_type: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoresForm {
    #[serde(default)]
    pub math: Option<f64>,
    #[serde(default)]
    pub physics: Option<f64>,
    #[serde(default)]
    pub chemistry: Option<f64>,
    #[serde(default)]
    pub english: Option<f64>,
    #[serde(default)]
    pub literature: Option<f64>,
}

/// Average score per subject, 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub math: f64,
    pub physics: f64,
    pub chemistry: f64,
    pub english: f64,
    pub literature: f64,
}

/// Self-rated levels, 1-5 each. Absent when the student skipped the question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfRatings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creativity_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic_level: Option<u8>,
}

/// A survey that passed intake validation. Serialized (camelCase) as the stored `input_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveySubmission {
    pub interests: Vec<String>,
    pub skills: Vec<String>,
    pub favorite_subjects: Vec<String>,
    pub scores: Scores,
    pub career_goal: String,
    #[serde(flatten)]
    pub ratings: SelfRatings,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub study_habits: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_environment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_style: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personality_type: Vec<String>,
}

impl SurveyForm {
    /// Checks every rule and returns either the typed submission or all field errors.
    pub fn validate(self) -> Result<SurveySubmission, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let interests = required_list(&mut errors, "interests", self.interests);
        let skills = required_list(&mut errors, "skills", self.skills);
        let favorite_subjects =
            required_list(&mut errors, "favoriteSubjects", self.favorite_subjects);
        let scores = validate_scores(&mut errors, self.scores);

        let career_goal = match self.career_goal.map(|g| g.trim().to_string()) {
            Some(goal) if goal.is_empty() => {
                errors.add("careerGoal", "The careerGoal field is required.");
                String::new()
            }
            Some(goal) if goal.chars().count() > CAREER_GOAL_MAX_CHARS => {
                errors.add(
                    "careerGoal",
                    format!("The careerGoal may not be greater than {CAREER_GOAL_MAX_CHARS} characters."),
                );
                goal
            }
            Some(goal) => goal,
            None => {
                errors.add("careerGoal", "The careerGoal field is required.");
                String::new()
            }
        };

        let ratings = SelfRatings {
            technology_level: level(&mut errors, "technologyLevel", self.technology_level),
            creativity_level: level(&mut errors, "creativityLevel", self.creativity_level),
            communication_level: level(
                &mut errors,
                "communicationLevel",
                self.communication_level,
            ),
            logic_level: level(&mut errors, "logicLevel", self.logic_level),
        };

        let submission = SurveySubmission {
            interests,
            skills,
            favorite_subjects,
            scores: scores.unwrap_or(Scores {
                math: 0.0,
                physics: 0.0,
                chemistry: 0.0,
                english: 0.0,
                literature: 0.0,
            }),
            career_goal,
            ratings,
            study_habits: self.study_habits.unwrap_or_default(),
            work_environment: non_blank(self.work_environment),
            learning_style: non_blank(self.learning_style),
            personality_type: self.personality_type.unwrap_or_default(),
        };
        errors.into_result(submission)
    }
}

fn required_list(errors: &mut ValidationErrors, field: &str, value: Option<Vec<String>>) -> Vec<String> {
    let items: Vec<String> = value
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if items.is_empty() {
        errors.add(field, format!("The {field} field must have at least 1 item."));
    }
    items
}

fn validate_scores(errors: &mut ValidationErrors, scores: Option<ScoresForm>) -> Option<Scores> {
    let Some(form) = scores else {
        errors.add("scores", "The scores field is required.");
        return None;
    };
    let mut subject = |name: &str, value: Option<f64>| -> f64 {
        match value {
            Some(v) if v.is_finite() && SCORE_RANGE.contains(&v) => v,
            Some(_) => {
                errors.add(&format!("scores.{name}"), format!("The scores.{name} must be between 0 and 10."));
                0.0
            }
            None => {
                errors.add(&format!("scores.{name}"), format!("The scores.{name} field is required."));
                0.0
            }
        }
    };
    Some(Scores {
        math: subject("math", form.math),
        physics: subject("physics", form.physics),
        chemistry: subject("chemistry", form.chemistry),
        english: subject("english", form.english),
        literature: subject("literature", form.literature),
    })
}

fn level(errors: &mut ValidationErrors, field: &str, value: Option<i64>) -> Option<u8> {
    let v = value?;
    if LEVEL_RANGE.contains(&v) {
        u8::try_from(v).ok()
    } else {
        errors.add(field, format!("The {field} must be between 1 and 5."));
        None
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
