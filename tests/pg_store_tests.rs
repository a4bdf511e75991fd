// tests/pg_store_tests.rs

//! Repository behaviour on the Postgres store.
//!
//! These need a running database. With `DATABASE_URL` unset each test returns
//! early without checking anything.

use std::sync::Arc;

use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use sysquiz::{
    config::Config,
    error::AppError,
    models::quiz_record::Answer,
    repository::{AnswerRecordRepository, QuizRepository},
    store::{DocumentStore, Kind, Mutation, PgStore, tx_body},
};
use uuid::Uuid;

async fn pg_store() -> Option<Arc<PgStore>> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(Arc::new(PgStore::new(pool)))
}

fn repos(store: Arc<PgStore>) -> (QuizRepository, AnswerRecordRepository) {
    let quizzes = QuizRepository::new(store.clone(), &Config::with_secret("pg_test"));
    let records = AnswerRecordRepository::new(store, quizzes.clone());
    (quizzes, records)
}

/// Owner ids unique per run, so tests sharing a database stay apart.
fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[tokio::test]
async fn concurrent_updates_admit_exactly_one() {
    let Some(store) = pg_store().await else { return };
    let (quizzes, _) = repos(store);
    let owner = unique("owner");
    let quiz = quizzes.create(&owner, "Race").await.unwrap();

    let mut handles = Vec::new();
    for title in ["A", "B", "C", "D"] {
        let quizzes = quizzes.clone();
        let owner = owner.clone();
        let id = quiz.id.clone();
        handles.push(tokio::spawn(async move {
            quizzes.update(&owner, &id, 0, title.to_string(), vec![]).await
        }));
    }

    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AppError::VersionConflict(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!((ok, conflicts), (1, 3));
    assert_eq!(quizzes.get(&quiz.id).await.unwrap().version, 1);
}

#[tokio::test]
async fn failed_body_rolls_back() {
    let Some(store) = pg_store().await else { return };
    let (quizzes, _) = repos(store.clone());
    let owner = unique("owner");
    let quiz = quizzes.create(&owner, "Kept").await.unwrap();

    let result = store
        .transact(
            Kind::Quiz,
            &quiz.id,
            tx_body(|_| Err(AppError::Validation("no".to_string()))),
        )
        .await;
    assert_eq!(result, Err(AppError::Validation("no".to_string())));

    let stale = quizzes
        .update(&owner, &quiz.id, 4, "Changed".to_string(), vec![])
        .await;
    assert!(matches!(stale, Err(AppError::VersionConflict(_))));

    let stored = quizzes.get(&quiz.id).await.unwrap();
    assert_eq!(stored.title, "Kept");
    assert_eq!(stored.version, 0);
}

#[tokio::test]
async fn list_by_owner_is_scoped_and_oldest_first() {
    let Some(store) = pg_store().await else { return };
    let (quizzes, _) = repos(store);
    let owner = unique("owner");
    let other = unique("other");

    let first = quizzes.create(&owner, "first").await.unwrap();
    quizzes.create(&other, "theirs").await.unwrap();
    let second = quizzes.create(&owner, "second").await.unwrap();
    let third = quizzes.create(&owner, "third").await.unwrap();

    // Rewriting a quiz keeps its place.
    quizzes
        .update(&owner, &first.id, 0, "first, edited".to_string(), vec![])
        .await
        .unwrap();

    let outcome = quizzes.list_by_owner(&owner).await;
    assert!(outcome.is_complete());
    let ids: Vec<&str> = outcome.items.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec![first.id.as_str(), second.id.as_str(), third.id.as_str()]);
    assert_eq!(outcome.items[0].title, "first, edited");

    assert_eq!(quizzes.list_by_owner(&unique("nobody")).await.items.len(), 0);
}

#[tokio::test]
async fn store_list_filters_on_field_in_insertion_order() {
    let Some(store) = pg_store().await else { return };
    let quiz_id = unique("quiz");
    let (a, b, c) = (unique("rec"), unique("rec"), unique("rec"));

    store
        .put(Kind::QuizRecord, &b, json!({ "id": b, "quizId": quiz_id }))
        .await
        .unwrap();
    store
        .put(Kind::QuizRecord, &c, json!({ "id": c, "quizId": unique("quiz") }))
        .await
        .unwrap();
    store
        .put(Kind::QuizRecord, &a, json!({ "id": a, "quizId": quiz_id }))
        .await
        .unwrap();
    // Same id under the other kind is a different document.
    store
        .put(Kind::Quiz, &a, json!({ "id": a, "quizId": quiz_id }))
        .await
        .unwrap();
    // Upsert keeps the original position.
    store
        .put(Kind::QuizRecord, &b, json!({ "id": b, "quizId": quiz_id, "n": 2 }))
        .await
        .unwrap();

    let listed = store.list(Kind::QuizRecord, "quizId", &quiz_id).await.unwrap();
    let ids: Vec<&str> = listed.iter().map(|d| d["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![b.as_str(), a.as_str()]);
    assert_eq!(listed[0]["n"], 2);

    store.delete(Kind::QuizRecord, &a).await.unwrap();
    assert_eq!(store.get(Kind::QuizRecord, &a).await.unwrap(), None);
    assert!(store.get(Kind::Quiz, &a).await.unwrap().is_some());
}

#[tokio::test]
async fn transact_delete_removes_document() {
    let Some(store) = pg_store().await else { return };
    let id = unique("doc");
    store
        .put(Kind::Quiz, &id, json!({ "id": id }))
        .await
        .unwrap();

    let applied = store
        .transact(Kind::Quiz, &id, tx_body(|_| Ok(Mutation::Delete)))
        .await
        .unwrap();
    assert_eq!(applied, Mutation::Delete);
    assert_eq!(store.get(Kind::Quiz, &id).await.unwrap(), None);
}

#[tokio::test]
async fn save_merge_rejects_stale_version() {
    let Some(store) = pg_store().await else { return };
    let (quizzes, records) = repos(store);
    let owner = unique("owner");
    let quiz = quizzes.create(&owner, "Roster").await.unwrap();

    let outcome = records
        .create_batch(&owner, &quiz.id, &["Zoe".to_string(), "Adam".to_string()])
        .await
        .unwrap();
    assert!(outcome.is_complete());
    let record_id = outcome.items[0].id.clone();

    let saved = records
        .save_merge(
            &record_id,
            0,
            vec![Answer {
                response: "first".to_string(),
                submitted: true,
            }],
        )
        .await
        .unwrap();
    assert_eq!(saved.version, 1);

    let stale = records
        .save_merge(
            &record_id,
            0,
            vec![Answer {
                response: "second".to_string(),
                submitted: false,
            }],
        )
        .await;
    assert!(matches!(stale, Err(AppError::VersionConflict(_))));

    let stored = records.get(&record_id).await.unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.answers[0].response, "first");

    let listed = records.list_for_quiz(&owner, &quiz.id).await.unwrap();
    let names: Vec<&str> = listed.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Adam", "Zoe"]);
}

#[tokio::test]
async fn concurrent_saves_admit_exactly_one() {
    let Some(store) = pg_store().await else { return };
    let (quizzes, records) = repos(store);
    let owner = unique("owner");
    let quiz = quizzes.create(&owner, "Tabs").await.unwrap();
    let outcome = records
        .create_batch(&owner, &quiz.id, &["Ann".to_string()])
        .await
        .unwrap();
    let record_id = outcome.items[0].id.clone();

    let mut handles = Vec::new();
    for tab in ["one", "two", "three"] {
        let records = records.clone();
        let id = record_id.clone();
        handles.push(tokio::spawn(async move {
            let answer = Answer {
                response: tab.to_string(),
                submitted: false,
            };
            records.save_merge(&id, 0, vec![answer]).await
        }));
    }

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AppError::VersionConflict(_)) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(records.get(&record_id).await.unwrap().version, 1);
}
