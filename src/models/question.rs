// src/models/question.rs

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// The fixed set of answer kinds a question can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    Text,
    Mc,
    Int,
    Float,
    Duration,
}

impl AnswerType {
    pub const ALL: [AnswerType; 5] = [
        AnswerType::Text,
        AnswerType::Mc,
        AnswerType::Int,
        AnswerType::Float,
        AnswerType::Duration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::Text => "text",
            AnswerType::Mc => "mc",
            AnswerType::Int => "int",
            AnswerType::Float => "float",
            AnswerType::Duration => "duration",
        }
    }
}

impl FromStr for AnswerType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnswerType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or(())
    }
}

/// One question of a quiz, as the owner sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub text: String,

    /// Choices for `mc` questions, empty otherwise.
    #[serde(default)]
    pub answer_options: Vec<String>,

    /// The answer key. Never part of a student payload.
    #[serde(default)]
    pub answer: String,

    pub answer_type: AnswerType,

    /// Gate: later questions stay hidden until this one is submitted.
    #[serde(default)]
    pub is_stop: bool,

    #[serde(default)]
    pub show_work: bool,

    #[serde(default)]
    pub work: String,
}

/// Question shape sent to students (answer key stripped).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub text: String,
    pub answer_options: Vec<String>,
    pub answer_type: AnswerType,
    pub is_stop: bool,
    pub show_work: bool,
    pub work: String,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        Self {
            text: q.text.clone(),
            answer_options: q.answer_options.clone(),
            answer_type: q.answer_type,
            is_stop: q.is_stop,
            show_work: q.show_work,
            work: q.work.clone(),
        }
    }
}

/// Incoming question in an update request.
/// `answer_type` stays a raw string here; the repository checks it against the
/// configured set so one bad entry rejects the whole update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[validate(length(max = 5000, message = "Question text must be at most 5000 chars"))]
    pub text: String,

    #[serde(default)]
    #[validate(custom(function = validate_options))]
    pub answer_options: Vec<String>,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub answer: String,

    pub answer_type: String,

    #[serde(default)]
    pub is_stop: bool,

    #[serde(default)]
    pub show_work: bool,

    #[serde(default)]
    #[validate(length(max = 10000))]
    pub work: String,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    for opt in options {
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

impl QuestionInput {
    /// Builds the stored question once the answer type has been checked.
    pub fn into_question(self, answer_type: AnswerType) -> Question {
        Question {
            text: self.text,
            answer_options: self.answer_options,
            answer: self.answer,
            answer_type,
            is_stop: self.is_stop,
            show_work: self.show_work,
            work: self.work,
        }
    }
}
