// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::{Question, QuestionInput};

/// Authoring-side quiz with its questions decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub id: String,
    pub title: String,

    /// Creating instructor. Write-once and never sent over the wire.
    #[serde(skip)]
    pub owner_id: String,

    pub created: DateTime<Utc>,

    /// Optimistic-concurrency token, bumped by one on every accepted update.
    pub version: u64,

    /// Students may only take the quiz while this is set.
    pub enabled: bool,

    pub questions: Vec<Question>,
}

/// DTO for creating a new quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,
}

/// DTO for replacing a quiz's title and questions.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuizRequest {
    /// The version the client last read.
    pub version: u64,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[serde(default)]
    #[validate(nested)]
    pub questions: Vec<QuestionInput>,
}

/// DTO for deleting a quiz.
#[derive(Debug, Deserialize)]
pub struct DeleteQuizRequest {
    pub version: u64,
}
