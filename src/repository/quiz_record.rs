// src/repository/quiz_record.rs

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::AppError,
    models::quiz_record::{Answer, QuizRecord},
    repository::{BatchOutcome, QuizRepository},
    store::{DocumentStore, Kind, Mutation, tx_body},
    utils::id::generate_id,
};

/// Storage form of a record. Answers are kept JSON-encoded in `answers_m`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord {
    id: String,
    name: String,
    quiz_id: String,
    version: u64,
    answers_m: String,
}

fn encode(record: &QuizRecord) -> Result<Value, AppError> {
    let stored = StoredRecord {
        id: record.id.clone(),
        name: record.name.clone(),
        quiz_id: record.quiz_id.clone(),
        version: record.version,
        answers_m: serde_json::to_string(&record.answers)?,
    };
    Ok(serde_json::to_value(stored)?)
}

fn decode(body: Value) -> Result<QuizRecord, AppError> {
    let stored: StoredRecord = serde_json::from_value(body).map_err(corrupt)?;
    let answers: Vec<Answer> = if stored.answers_m.is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&stored.answers_m).map_err(corrupt)?
    };

    Ok(QuizRecord {
        id: stored.id,
        name: stored.name,
        quiz_id: stored.quiz_id,
        version: stored.version,
        answers,
    })
}

fn corrupt(e: serde_json::Error) -> AppError {
    tracing::error!("Corrupt quiz record document: {}", e);
    AppError::from(e)
}

/// Applies a save onto the stored answers.
///
/// Indices past the end are appended. A submitted entry is never touched,
/// whatever the incoming value says. Everything else is overwritten.
pub fn merge_answers(current: &mut Vec<Answer>, incoming: Vec<Answer>) {
    for (i, answer) in incoming.into_iter().enumerate() {
        match current.get_mut(i) {
            None => current.push(answer),
            Some(existing) if existing.submitted => {}
            Some(existing) => *existing = answer,
        }
    }
}

/// Per-student answer sheets.
#[derive(Clone)]
pub struct AnswerRecordRepository {
    store: Arc<dyn DocumentStore>,
    quizzes: QuizRepository,
}

impl AnswerRecordRepository {
    pub fn new(store: Arc<dyn DocumentStore>, quizzes: QuizRepository) -> Self {
        Self { store, quizzes }
    }

    /// Roster import: one record per name for a quiz the requester owns.
    ///
    /// Records are written one by one. The first failure stops the run and is
    /// reported next to the records already written; those stay committed.
    pub async fn create_batch(
        &self,
        requester_id: &str,
        quiz_id: &str,
        names: &[String],
    ) -> Result<BatchOutcome<QuizRecord>, AppError> {
        let quiz = self.quizzes.get_owned(quiz_id, requester_id).await?;

        let mut created = Vec::with_capacity(names.len());
        for name in names {
            let record = QuizRecord {
                id: generate_id(),
                name: name.trim().to_string(),
                quiz_id: quiz.id.clone(),
                version: 0,
                answers: Vec::new(),
            };
            let body = encode(&record)?;
            let record_id = record.id.clone();

            let written = self
                .store
                .transact(
                    Kind::QuizRecord,
                    &record.id,
                    tx_body(move |current| match current {
                        Some(_) => Err(AppError::Storage(format!(
                            "Record id '{}' already exists",
                            record_id
                        ))),
                        None => Ok(Mutation::Put(body)),
                    }),
                )
                .await;

            if let Err(e) = written {
                tracing::error!(
                    "Roster import for quiz {} stopped after {} of {} names: {}",
                    quiz.id,
                    created.len(),
                    names.len(),
                    e
                );
                return Ok(BatchOutcome::partial(created, e));
            }
            created.push(record);
        }

        tracing::info!("Created {} records for quiz {}", created.len(), quiz.id);
        Ok(BatchOutcome::complete(created))
    }

    pub async fn get(&self, id: &str) -> Result<QuizRecord, AppError> {
        match self.store.get(Kind::QuizRecord, id).await? {
            Some(body) => decode(body),
            None => Err(AppError::not_found("Quiz record", id)),
        }
    }

    /// All records of a quiz the requester owns, sorted by student name.
    pub async fn list_for_quiz(
        &self,
        requester_id: &str,
        quiz_id: &str,
    ) -> Result<Vec<QuizRecord>, AppError> {
        let quiz = self.quizzes.get_owned(quiz_id, requester_id).await?;

        let mut records = self
            .store
            .list(Kind::QuizRecord, "quizId", &quiz.id)
            .await?
            .into_iter()
            .map(decode)
            .collect::<Result<Vec<_>, _>>()?;

        records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// Student save. Version-checked, merged with [`merge_answers`], and always
    /// bumps the version by one when accepted.
    pub async fn save_merge(
        &self,
        id: &str,
        caller_version: u64,
        incoming: Vec<Answer>,
    ) -> Result<QuizRecord, AppError> {
        let record_id = id.to_string();

        let applied = self
            .store
            .transact(
                Kind::QuizRecord,
                id,
                tx_body(move |current| {
                    let mut record = match current {
                        Some(body) => decode(body)?,
                        None => return Err(AppError::not_found("Quiz record", &record_id)),
                    };

                    if record.version != caller_version {
                        tracing::info!(
                            "Version conflict on record {}: stored {}, caller {}",
                            record.id,
                            record.version,
                            caller_version
                        );
                        return Err(AppError::VersionConflict(
                            "Conflicting update - your answers were saved elsewhere since you loaded them."
                                .to_string(),
                        ));
                    }

                    merge_answers(&mut record.answers, incoming);
                    record.version += 1;
                    Ok(Mutation::Put(encode(&record)?))
                }),
            )
            .await?;

        match applied {
            Mutation::Put(body) => decode(body),
            Mutation::Delete => Err(AppError::Storage("Quiz record was removed".to_string())),
        }
    }
}
