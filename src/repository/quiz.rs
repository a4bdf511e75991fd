// src/repository/quiz.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::Config,
    error::AppError,
    models::{
        question::{AnswerType, Question, QuestionInput},
        quiz::Quiz,
    },
    repository::BatchOutcome,
    store::{DocumentStore, Kind, Mutation, tx_body},
    utils::{guard, id::generate_id},
};

/// Storage form of a quiz. Questions are kept JSON-encoded in `questions_m`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredQuiz {
    id: String,
    title: String,
    owner_id: String,
    created: DateTime<Utc>,
    version: u64,
    enabled: bool,
    questions_m: String,
}

fn encode(quiz: &Quiz) -> Result<Value, AppError> {
    let stored = StoredQuiz {
        id: quiz.id.clone(),
        title: quiz.title.clone(),
        owner_id: quiz.owner_id.clone(),
        created: quiz.created,
        version: quiz.version,
        enabled: quiz.enabled,
        questions_m: serde_json::to_string(&quiz.questions)?,
    };
    Ok(serde_json::to_value(stored)?)
}

fn decode(body: Value) -> Result<Quiz, AppError> {
    let stored: StoredQuiz = serde_json::from_value(body).map_err(corrupt)?;
    let questions: Vec<Question> = if stored.questions_m.is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&stored.questions_m).map_err(corrupt)?
    };

    Ok(Quiz {
        id: stored.id,
        title: stored.title,
        owner_id: stored.owner_id,
        created: stored.created,
        version: stored.version,
        enabled: stored.enabled,
        questions,
    })
}

fn corrupt(e: serde_json::Error) -> AppError {
    tracing::error!("Corrupt quiz document: {}", e);
    AppError::from(e)
}

/// Loads the current quiz inside a transaction body.
fn load(current: Option<Value>, id: &str) -> Result<Quiz, AppError> {
    match current {
        Some(body) => decode(body),
        None => Err(AppError::not_found("Quiz", id)),
    }
}

fn check_version(quiz: &Quiz, caller_version: u64) -> Result<(), AppError> {
    if quiz.version != caller_version {
        tracing::info!(
            "Version conflict on quiz {}: stored {}, caller {}",
            quiz.id,
            quiz.version,
            caller_version
        );
        return Err(AppError::VersionConflict(
            "Conflicting update - someone else updated this since you loaded it.".to_string(),
        ));
    }
    Ok(())
}

/// Checks every incoming answer type before any of them is applied.
fn validate_questions(
    incoming: Vec<QuestionInput>,
    allowed: &BTreeSet<AnswerType>,
) -> Result<Vec<Question>, AppError> {
    incoming
        .into_iter()
        .map(|q| match q.answer_type.parse::<AnswerType>() {
            Ok(t) if allowed.contains(&t) => Ok(q.into_question(t)),
            _ => {
                tracing::info!("Invalid answer type: {:?}", q.answer_type);
                Err(AppError::Validation(format!(
                    "Invalid answer type '{}'",
                    q.answer_type
                )))
            }
        })
        .collect()
}

/// Quiz lifecycle. Every mutation is a single-document transaction.
#[derive(Clone)]
pub struct QuizRepository {
    store: Arc<dyn DocumentStore>,
    allowed_answer_types: Arc<BTreeSet<AnswerType>>,
}

impl QuizRepository {
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self {
            store,
            allowed_answer_types: Arc::new(config.allowed_answer_types.clone()),
        }
    }

    /// New quiz: version 0, disabled, no questions.
    pub async fn create(&self, owner_id: &str, title: &str) -> Result<Quiz, AppError> {
        let quiz = Quiz {
            id: generate_id(),
            title: title.to_string(),
            owner_id: owner_id.to_string(),
            created: Utc::now(),
            version: 0,
            enabled: false,
            questions: Vec::new(),
        };

        self.store
            .put(Kind::Quiz, &quiz.id, encode(&quiz)?)
            .await?;

        tracing::info!("Quiz {} created by {}", quiz.id, owner_id);
        Ok(quiz)
    }

    pub async fn get(&self, id: &str) -> Result<Quiz, AppError> {
        match self.store.get(Kind::Quiz, id).await? {
            Some(body) => decode(body),
            None => Err(AppError::not_found("Quiz", id)),
        }
    }

    /// Instructor read: the full quiz, answer keys included, owner only.
    pub async fn get_owned(&self, id: &str, requester_id: &str) -> Result<Quiz, AppError> {
        let quiz = self.get(id).await?;
        guard::require_owner(&quiz.owner_id, requester_id)?;
        Ok(quiz)
    }

    /// Owner read that also requires `caller_version` to be current, so a
    /// foreign or stale edit is turned away before its payload is looked at.
    pub async fn get_for_edit(
        &self,
        id: &str,
        requester_id: &str,
        caller_version: u64,
    ) -> Result<Quiz, AppError> {
        let quiz = self.get_owned(id, requester_id).await?;
        check_version(&quiz, caller_version)?;
        Ok(quiz)
    }

    /// The owner's quizzes, oldest first. Stops at the first bad document and
    /// returns what was collected so far alongside the error.
    pub async fn list_by_owner(&self, owner_id: &str) -> BatchOutcome<Quiz> {
        let bodies = match self.store.list(Kind::Quiz, "ownerId", owner_id).await {
            Ok(bodies) => bodies,
            Err(e) => return BatchOutcome::partial(Vec::new(), e),
        };

        let mut quizzes = Vec::with_capacity(bodies.len());
        let mut failure = None;
        for body in bodies {
            match decode(body) {
                Ok(quiz) => quizzes.push(quiz),
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        quizzes.sort_by_key(|q| q.created);
        match failure {
            Some(e) => BatchOutcome::partial(quizzes, e),
            None => BatchOutcome::complete(quizzes),
        }
    }

    /// Replaces title and questions.
    ///
    /// Inside one transaction: load, owner check, version check, answer-type
    /// check over all questions, then write with `version + 1`. Any failure
    /// leaves the stored quiz untouched. Text is stored as given; escaping
    /// belongs to whatever renders it.
    pub async fn update(
        &self,
        requester_id: &str,
        id: &str,
        caller_version: u64,
        title: String,
        questions: Vec<QuestionInput>,
    ) -> Result<Quiz, AppError> {
        let quiz_id = id.to_string();
        let requester = requester_id.to_string();
        let allowed = Arc::clone(&self.allowed_answer_types);

        let applied = self
            .store
            .transact(
                Kind::Quiz,
                id,
                tx_body(move |current| {
                    let mut quiz = load(current, &quiz_id)?;
                    guard::require_owner(&quiz.owner_id, &requester)?;
                    check_version(&quiz, caller_version)?;
                    let questions = validate_questions(questions, &allowed)?;

                    quiz.title = title;
                    quiz.questions = questions;
                    quiz.version += 1;
                    Ok(Mutation::Put(encode(&quiz)?))
                }),
            )
            .await?;

        committed_quiz(applied)
    }

    /// Removes the quiz document. Its records are left in place.
    pub async fn delete(
        &self,
        requester_id: &str,
        id: &str,
        caller_version: u64,
    ) -> Result<(), AppError> {
        let quiz_id = id.to_string();
        let requester = requester_id.to_string();

        self.store
            .transact(
                Kind::Quiz,
                id,
                tx_body(move |current| {
                    let quiz = load(current, &quiz_id)?;
                    guard::require_owner(&quiz.owner_id, &requester)?;
                    check_version(&quiz, caller_version)?;
                    Ok(Mutation::Delete)
                }),
            )
            .await?;

        tracing::info!("Quiz {} deleted by {}", id, requester_id);
        Ok(())
    }

    /// Owner-only toggle. Does not check or bump the version.
    pub async fn set_enabled(
        &self,
        requester_id: &str,
        id: &str,
        enabled: bool,
    ) -> Result<Quiz, AppError> {
        let quiz_id = id.to_string();
        let requester = requester_id.to_string();

        let applied = self
            .store
            .transact(
                Kind::Quiz,
                id,
                tx_body(move |current| {
                    let mut quiz = load(current, &quiz_id)?;
                    guard::require_owner(&quiz.owner_id, &requester)?;
                    quiz.enabled = enabled;
                    Ok(Mutation::Put(encode(&quiz)?))
                }),
            )
            .await?;

        committed_quiz(applied)
    }
}

fn committed_quiz(applied: Mutation) -> Result<Quiz, AppError> {
    match applied {
        Mutation::Put(body) => decode(body),
        Mutation::Delete => Err(AppError::Storage("Quiz was removed".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::MemoryStore;

    fn repo() -> (Arc<MemoryStore>, QuizRepository) {
        let store = Arc::new(MemoryStore::new());
        let repo = QuizRepository::new(store.clone(), &Config::with_secret("test"));
        (store, repo)
    }

    fn input(text: &str, answer_type: &str, is_stop: bool) -> QuestionInput {
        serde_json::from_value(json!({
            "text": text,
            "answer": "42",
            "answerType": answer_type,
            "isStop": is_stop,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn create_starts_disabled_at_version_zero() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "Week 1").await.unwrap();
        assert_eq!(quiz.version, 0);
        assert!(!quiz.enabled);
        assert!(quiz.questions.is_empty());

        let fetched = repo.get(&quiz.id).await.unwrap();
        assert_eq!(fetched, quiz);
    }

    #[tokio::test]
    async fn get_missing_is_a_storage_error() {
        let (_, repo) = repo();
        assert!(matches!(repo.get("nope").await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn update_bumps_version_and_stores_unescaped_text() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "Draft").await.unwrap();

        let updated = repo
            .update(
                "owner",
                &quiz.id,
                0,
                "Fish & <Chips>".to_string(),
                vec![input("a < b?", "text", false), input("pick", "mc", true)],
            )
            .await
            .unwrap();

        assert_eq!(updated.version, 1);
        assert_eq!(updated.title, "Fish & <Chips>");
        assert_eq!(updated.questions[0].text, "a < b?");
        assert_eq!(updated.questions[1].answer_type, AnswerType::Mc);
        assert_eq!(repo.get(&quiz.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn stale_version_is_rejected_and_nothing_changes() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "v0").await.unwrap();

        // Client A wins with version 0.
        repo.update("owner", &quiz.id, 0, "from A".to_string(), vec![])
            .await
            .unwrap();

        // Client B still holds version 0.
        let err = repo
            .update("owner", &quiz.id, 0, "from B".to_string(), vec![])
            .await
            .unwrap_err();
        assert_eq!(err.name(), "VERSION");

        let stored = repo.get(&quiz.id).await.unwrap();
        assert_eq!(stored.title, "from A");
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn invalid_answer_type_rejects_whole_update() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "Quiz").await.unwrap();

        let err = repo
            .update(
                "owner",
                &quiz.id,
                0,
                "Changed".to_string(),
                vec![input("ok", "int", false), input("bad", "essay", false)],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = repo.get(&quiz.id).await.unwrap();
        assert_eq!(stored.title, "Quiz");
        assert!(stored.questions.is_empty());
        assert_eq!(stored.version, 0);
    }

    #[tokio::test]
    async fn configured_answer_types_are_enforced() {
        let store = Arc::new(MemoryStore::new());
        let mut config = Config::with_secret("test");
        config.allowed_answer_types = [AnswerType::Text].into_iter().collect();
        let repo = QuizRepository::new(store, &config);
        let quiz = repo.create("owner", "Quiz").await.unwrap();

        let err = repo
            .update("owner", &quiz.id, 0, "t".to_string(), vec![input("q", "int", false)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn non_owner_cannot_mutate() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "Mine").await.unwrap();

        let update = repo
            .update("intruder", &quiz.id, 0, "Theirs".to_string(), vec![])
            .await;
        assert!(matches!(update, Err(AppError::Auth(_))));
        assert!(matches!(
            repo.delete("intruder", &quiz.id, 0).await,
            Err(AppError::Auth(_))
        ));
        assert!(matches!(
            repo.set_enabled("intruder", &quiz.id, true).await,
            Err(AppError::Auth(_))
        ));
        assert!(matches!(
            repo.get_owned(&quiz.id, "intruder").await,
            Err(AppError::Auth(_))
        ));

        let stored = repo.get(&quiz.id).await.unwrap();
        assert_eq!(stored, quiz);
    }

    #[tokio::test]
    async fn get_for_edit_checks_owner_then_version() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "Draft").await.unwrap();

        assert!(matches!(
            repo.get_for_edit(&quiz.id, "stranger", 9).await,
            Err(AppError::Auth(_))
        ));
        assert!(matches!(
            repo.get_for_edit(&quiz.id, "owner", 9).await,
            Err(AppError::VersionConflict(_))
        ));
        assert_eq!(repo.get_for_edit(&quiz.id, "owner", 0).await.unwrap().id, quiz.id);
    }

    #[tokio::test]
    async fn set_enabled_leaves_version_alone() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "Toggle").await.unwrap();

        let enabled = repo.set_enabled("owner", &quiz.id, true).await.unwrap();
        assert!(enabled.enabled);
        assert_eq!(enabled.version, 0);

        // The version token from before the toggle is still good.
        let updated = repo
            .update("owner", &quiz.id, 0, "Toggle".to_string(), vec![])
            .await
            .unwrap();
        assert!(updated.enabled);
        assert_eq!(updated.version, 1);
    }

    #[tokio::test]
    async fn delete_checks_version() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "Gone").await.unwrap();

        assert!(matches!(
            repo.delete("owner", &quiz.id, 3).await,
            Err(AppError::VersionConflict(_))
        ));
        repo.delete("owner", &quiz.id, 0).await.unwrap();
        assert!(matches!(repo.get(&quiz.id).await, Err(AppError::Storage(_))));
    }

    #[tokio::test]
    async fn concurrent_updates_from_same_version_admit_one() {
        let (_, repo) = repo();
        let quiz = repo.create("owner", "Race").await.unwrap();

        let (a, b) = tokio::join!(
            repo.update("owner", &quiz.id, 0, "A".to_string(), vec![]),
            repo.update("owner", &quiz.id, 0, "B".to_string(), vec![]),
        );

        let results = [a, b];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::VersionConflict(_))))
            .count();
        assert_eq!((ok, conflicts), (1, 1));
        assert_eq!(repo.get(&quiz.id).await.unwrap().version, 1);
    }

    #[tokio::test]
    async fn list_by_owner_is_oldest_first_and_scoped() {
        let (_, repo) = repo();
        let first = repo.create("owner", "first").await.unwrap();
        repo.create("someone-else", "other").await.unwrap();
        let second = repo.create("owner", "second").await.unwrap();

        let outcome = repo.list_by_owner("owner").await;
        assert!(outcome.is_complete());
        let ids: Vec<&str> = outcome.items.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    }

    #[tokio::test]
    async fn list_by_owner_stops_at_corrupt_document() {
        let (store, repo) = repo();
        let good = repo.create("owner", "good").await.unwrap();
        store
            .put(Kind::Quiz, "broken", json!({"ownerId": "owner", "title": 7}))
            .await
            .unwrap();
        repo.create("owner", "after").await.unwrap();

        let outcome = repo.list_by_owner("owner").await;
        assert!(matches!(outcome.error, Some(AppError::Storage(_))));
        assert_eq!(outcome.items.len(), 1);
        assert_eq!(outcome.items[0].id, good.id);
    }
}
