// src/store/mod.rs

//! Keyed document storage.
//!
//! The repositories only talk to [`DocumentStore`]. Each mutation runs through
//! [`DocumentStore::transact`], which reads one document, hands it to a
//! synchronous body and applies whatever the body returns against the same
//! snapshot. Commit races are the backend's problem and surface as
//! `AppError::Storage`; nothing here retries.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The two document kinds this backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Quiz,
    QuizRecord,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Quiz => "Quiz",
            Kind::QuizRecord => "QuizRecord",
        }
    }
}

/// The write a transaction body asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Put(Value),
    Delete,
}

/// Read-modify-write body. Receives the current document (if any).
/// Returning `Err` aborts the transaction with nothing written.
pub type TxBody = Box<dyn FnOnce(Option<Value>) -> Result<Mutation, AppError> + Send>;

/// Boxes a closure as a [`TxBody`].
pub fn tx_body<F>(body: F) -> TxBody
where
    F: FnOnce(Option<Value>) -> Result<Mutation, AppError> + Send + 'static,
{
    Box::new(body)
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, kind: Kind, id: &str) -> Result<Option<Value>, AppError>;

    /// Insert or replace.
    async fn put(&self, kind: Kind, id: &str, body: Value) -> Result<(), AppError>;

    async fn delete(&self, kind: Kind, id: &str) -> Result<(), AppError>;

    /// Documents of `kind` whose top-level string `field` equals `value`,
    /// in insertion order.
    async fn list(&self, kind: Kind, field: &str, value: &str) -> Result<Vec<Value>, AppError>;

    /// Runs `body` exactly once against a consistent snapshot of one document
    /// and commits the returned mutation atomically.
    async fn transact(&self, kind: Kind, id: &str, body: TxBody) -> Result<Mutation, AppError>;
}
