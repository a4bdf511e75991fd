// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::quiz::{CreateQuizRequest, DeleteQuizRequest, UpdateQuizRequest},
    repository::QuizRepository,
    utils::{extract::AppJson, jwt::Claims},
};

/// Creates an empty, disabled quiz owned by the caller.
pub async fn create_quiz(
    State(quizzes): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let quiz = quizzes.create(&claims.sub, &payload.title).await?;

    Ok((StatusCode::CREATED, Json(json!({ "quiz": quiz }))))
}

/// Lists the caller's quizzes, oldest first.
///
/// A failure part-way still returns the quizzes read so far next to the error.
pub async fn list_quizzes(
    State(quizzes): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
) -> impl IntoResponse {
    let outcome = quizzes.list_by_owner(&claims.sub).await;

    match outcome.error {
        None => (StatusCode::OK, Json(json!({ "quizList": outcome.items }))),
        Some(e) => (
            e.status(),
            Json(json!({ "quizList": outcome.items, "error": e.to_json() })),
        ),
    }
}

/// Full quiz for its owner, answer keys included.
pub async fn get_quiz(
    State(quizzes): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes.get_owned(&id, &claims.sub).await?;

    Ok(Json(json!({ "quiz": quiz })))
}

/// Replaces title and questions if `version` is still current.
///
/// Ownership and version are checked before the payload, and again inside
/// the write.
pub async fn update_quiz(
    State(quizzes): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    quizzes.get_for_edit(&id, &claims.sub, payload.version).await?;
    payload.validate()?;

    let quiz = quizzes
        .update(
            &claims.sub,
            &id,
            payload.version,
            payload.title,
            payload.questions,
        )
        .await?;

    Ok(Json(json!({ "quiz": quiz })))
}

/// Deletes the quiz if `version` is still current. Records are not touched.
pub async fn delete_quiz(
    State(quizzes): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<DeleteQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    quizzes.delete(&claims.sub, &id, payload.version).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn enable_quiz(
    State(quizzes): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes.set_enabled(&claims.sub, &id, true).await?;

    Ok(Json(json!({ "quiz": quiz })))
}

pub async fn disable_quiz(
    State(quizzes): State<QuizRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = quizzes.set_enabled(&claims.sub, &id, false).await?;

    Ok(Json(json!({ "quiz": quiz })))
}
