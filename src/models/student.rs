// src/models/student.rs

use serde::Serialize;

use crate::models::{question::PublicQuestion, quiz_record::Answer};

/// What a student sees of a quiz: the revealed prefix and the total count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuiz {
    pub title: String,
    pub questions: Vec<PublicQuestion>,
    pub num_questions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuizRecord {
    pub id: String,
    pub name: String,
    pub answers: Vec<Answer>,
    pub version: u64,
}

/// Payload of the student read path.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeResponse {
    pub quiz: StudentQuiz,
    pub quiz_record: StudentQuizRecord,
}
