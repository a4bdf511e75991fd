// src/handlers/take.rs

//! Student-facing routes. No login: the record id is the credential.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{quiz_record::SaveRecordRequest, student::StudentQuizRecord},
    repository::{self, AnswerRecordRepository, QuizRepository},
    utils::extract::AppJson,
};

/// The revealed part of the quiz plus the student's own answers.
pub async fn get_quiz_for_student(
    State(quizzes): State<QuizRepository>,
    State(records): State<AnswerRecordRepository>,
    Path(record_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let view = repository::student_view(&quizzes, &records, &record_id).await?;

    Ok(Json(view))
}

/// Saves answers while the quiz is open. Submitted answers are kept as they are.
pub async fn save_quiz_record(
    State(quizzes): State<QuizRepository>,
    State(records): State<AnswerRecordRepository>,
    Path(record_id): Path<String>,
    AppJson(payload): AppJson<SaveRecordRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = repository::student_save(
        &quizzes,
        &records,
        &record_id,
        payload.version,
        payload.answers,
    )
    .await?;

    let quiz_record = StudentQuizRecord {
        id: record.id,
        name: record.name,
        answers: record.answers,
        version: record.version,
    };

    Ok(Json(json!({ "quizRecord": quiz_record })))
}
