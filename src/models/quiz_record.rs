// src/models/quiz_record.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A student's response to one question, index-aligned with the quiz.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[serde(default)]
    pub response: String,

    /// One-way flag: once true it is never cleared by a save.
    #[serde(default)]
    pub submitted: bool,
}

/// One student's answer sheet for one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRecord {
    pub id: String,
    pub name: String,
    pub quiz_id: String,
    pub version: u64,
    pub answers: Vec<Answer>,
}

/// DTO for roster import.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecordsRequest {
    #[validate(
        length(min = 1, message = "At least one name is required"),
        custom(function = validate_names)
    )]
    pub names: Vec<String>,
}

fn validate_names(names: &[String]) -> Result<(), validator::ValidationError> {
    for name in names {
        let len = name.trim().chars().count();
        if len == 0 {
            return Err(validator::ValidationError::new("name_cannot_be_empty"));
        }
        if len > 100 {
            return Err(validator::ValidationError::new("name_too_long"));
        }
    }
    Ok(())
}

/// DTO for the student save path.
#[derive(Debug, Deserialize)]
pub struct SaveRecordRequest {
    pub version: u64,

    #[serde(default)]
    pub answers: Vec<Answer>,
}
