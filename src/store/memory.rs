// src/store/memory.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    error::AppError,
    store::{DocumentStore, Kind, Mutation, TxBody},
};

#[derive(Default)]
struct Inner {
    /// (kind, id) -> (insertion sequence, body)
    docs: HashMap<(Kind, String), (u64, Value)>,
    next_seq: u64,
}

impl Inner {
    fn upsert(&mut self, kind: Kind, id: &str, body: Value) {
        let key = (kind, id.to_string());
        match self.docs.get_mut(&key) {
            Some(entry) => entry.1 = body,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.docs.insert(key, (seq, body));
            }
        }
    }
}

/// Process-local store. One lock guards every document, held for the whole
/// transaction body, so transactions on it are serializable.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, kind: Kind, id: &str) -> Result<Option<Value>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .docs
            .get(&(kind, id.to_string()))
            .map(|(_, body)| body.clone()))
    }

    async fn put(&self, kind: Kind, id: &str, body: Value) -> Result<(), AppError> {
        self.inner.lock().await.upsert(kind, id, body);
        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &str) -> Result<(), AppError> {
        self.inner.lock().await.docs.remove(&(kind, id.to_string()));
        Ok(())
    }

    async fn list(&self, kind: Kind, field: &str, value: &str) -> Result<Vec<Value>, AppError> {
        let inner = self.inner.lock().await;
        let mut hits: Vec<(u64, Value)> = inner
            .docs
            .iter()
            .filter(|((k, _), (_, body))| {
                *k == kind && body.get(field).and_then(Value::as_str) == Some(value)
            })
            .map(|(_, (seq, body))| (*seq, body.clone()))
            .collect();
        hits.sort_by_key(|(seq, _)| *seq);
        Ok(hits.into_iter().map(|(_, body)| body).collect())
    }

    async fn transact(&self, kind: Kind, id: &str, body: TxBody) -> Result<Mutation, AppError> {
        let mut inner = self.inner.lock().await;
        let current = inner
            .docs
            .get(&(kind, id.to_string()))
            .map(|(_, doc)| doc.clone());

        let mutation = body(current)?;
        match &mutation {
            Mutation::Put(doc) => inner.upsert(kind, id, doc.clone()),
            Mutation::Delete => {
                inner.docs.remove(&(kind, id.to_string()));
            }
        }
        Ok(mutation)
    }
}
