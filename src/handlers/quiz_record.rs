// src/handlers/quiz_record.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::quiz_record::CreateRecordsRequest,
    repository::{AnswerRecordRepository, QuizRepository},
    utils::{extract::AppJson, jwt::Claims},
};

/// Roster import: one record per name.
///
/// Not atomic across names. If a write fails, the response carries the
/// records created before it under `created` plus the error. Only the owner
/// gets to see payload errors.
pub async fn create_quiz_records(
    State(quizzes): State<QuizRepository>,
    State(records): State<AnswerRecordRepository>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
    AppJson(payload): AppJson<CreateRecordsRequest>,
) -> Result<impl IntoResponse, AppError> {
    quizzes.get_owned(&quiz_id, &claims.sub).await?;
    payload.validate()?;

    if payload.names.len() > config.max_roster_size {
        return Err(AppError::Validation(format!(
            "At most {} names per import",
            config.max_roster_size
        )));
    }

    let outcome = records
        .create_batch(&claims.sub, &quiz_id, &payload.names)
        .await?;

    Ok(match outcome.error {
        None => (StatusCode::CREATED, Json(json!({ "created": outcome.items }))),
        Some(e) => (
            e.status(),
            Json(json!({ "created": outcome.items, "error": e.to_json() })),
        ),
    })
}

/// Every record of a quiz, for its owner.
pub async fn get_quiz_records(
    State(records): State<AnswerRecordRepository>,
    Extension(claims): Extension<Claims>,
    Path(quiz_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let list = records.list_for_quiz(&claims.sub, &quiz_id).await?;

    Ok(Json(json!({ "quizRecords": list })))
}
