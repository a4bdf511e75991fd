// src/repository/mod.rs

//! Entity repositories. These own the storage encoding of quizzes and
//! records; everything above them only ever sees decoded values.

pub mod quiz;
pub mod quiz_record;

use crate::{
    disclosure,
    error::AppError,
    models::{
        quiz::Quiz,
        quiz_record::{Answer, QuizRecord},
        student::TakeResponse,
    },
};

pub use quiz::QuizRepository;
pub use quiz_record::AnswerRecordRepository;

/// Result of a multi-document operation that is not atomic across documents.
/// `items` holds what succeeded before `error` stopped the run.
#[derive(Debug, Clone)]
pub struct BatchOutcome<T> {
    pub items: Vec<T>,
    pub error: Option<AppError>,
}

impl<T> BatchOutcome<T> {
    pub fn complete(items: Vec<T>) -> Self {
        Self { items, error: None }
    }

    pub fn partial(items: Vec<T>, error: AppError) -> Self {
        Self {
            items,
            error: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// The record's quiz, provided students may currently use it.
async fn open_quiz(quizzes: &QuizRepository, record: &QuizRecord) -> Result<Quiz, AppError> {
    let quiz = quizzes.get(&record.quiz_id).await?;

    if !quiz.enabled {
        tracing::info!("Record {} used against disabled quiz {}", record.id, quiz.id);
        return Err(AppError::QuizDisabled("This quiz is not open".to_string()));
    }
    Ok(quiz)
}

/// Student read path: record, then its quiz, then disclosure.
/// A disabled quiz fails before anything is revealed.
pub async fn student_view(
    quizzes: &QuizRepository,
    records: &AnswerRecordRepository,
    record_id: &str,
) -> Result<TakeResponse, AppError> {
    let record = records.get(record_id).await?;
    let quiz = open_quiz(quizzes, &record).await?;

    let (quiz, quiz_record) = disclosure::reveal(&quiz, &record);
    Ok(TakeResponse { quiz, quiz_record })
}

/// Student write path. A disabled quiz takes no answers; otherwise the save
/// goes through [`AnswerRecordRepository::save_merge`].
pub async fn student_save(
    quizzes: &QuizRepository,
    records: &AnswerRecordRepository,
    record_id: &str,
    caller_version: u64,
    answers: Vec<Answer>,
) -> Result<QuizRecord, AppError> {
    let record = records.get(record_id).await?;
    open_quiz(quizzes, &record).await?;

    records.save_merge(record_id, caller_version, answers).await
}
