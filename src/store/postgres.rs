// src/store/postgres.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::{
    error::AppError,
    store::{DocumentStore, Kind, Mutation, TxBody},
};

/// Postgres-backed store over the `documents` table.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Logs a database failure with its context, then converts it.
fn db_error(context: String) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::from(e)
    }
}

const UPSERT: &str = r#"
    INSERT INTO documents (kind, id, body)
    VALUES ($1, $2, $3)
    ON CONFLICT (kind, id) DO UPDATE SET body = EXCLUDED.body
"#;

#[async_trait]
impl DocumentStore for PgStore {
    async fn get(&self, kind: Kind, id: &str) -> Result<Option<Value>, AppError> {
        let body = sqlx::query_scalar::<_, Value>(
            "SELECT body FROM documents WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error(format!("Failed to get {} {}", kind.as_str(), id)))?;

        Ok(body)
    }

    async fn put(&self, kind: Kind, id: &str, body: Value) -> Result<(), AppError> {
        sqlx::query(UPSERT)
            .bind(kind.as_str())
            .bind(id)
            .bind(body)
            .execute(&self.pool)
            .await
            .map_err(db_error(format!("Failed to put {} {}", kind.as_str(), id)))?;

        Ok(())
    }

    async fn delete(&self, kind: Kind, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM documents WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error(format!("Failed to delete {} {}", kind.as_str(), id)))?;

        Ok(())
    }

    async fn list(&self, kind: Kind, field: &str, value: &str) -> Result<Vec<Value>, AppError> {
        let bodies = sqlx::query_scalar::<_, Value>(
            r#"
            SELECT body
            FROM documents
            WHERE kind = $1 AND body ->> $2::text = $3
            ORDER BY seq
            "#,
        )
        .bind(kind.as_str())
        .bind(field)
        .bind(value)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error(format!("{} query on {} failed", kind.as_str(), field)))?;

        Ok(bodies)
    }

    async fn transact(&self, kind: Kind, id: &str, body: TxBody) -> Result<Mutation, AppError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Could not begin transaction".to_string()))?;

        let current = sqlx::query_scalar::<_, Value>(
            "SELECT body FROM documents WHERE kind = $1 AND id = $2 FOR UPDATE",
        )
        .bind(kind.as_str())
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error(format!("Failed to lock {} {}", kind.as_str(), id)))?;

        // Dropping `tx` on the error path rolls back.
        let mutation = body(current)?;

        match &mutation {
            Mutation::Put(doc) => {
                sqlx::query(UPSERT)
                    .bind(kind.as_str())
                    .bind(id)
                    .bind(doc.clone())
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error(format!("Failed to put {} {}", kind.as_str(), id)))?;
            }
            Mutation::Delete => {
                sqlx::query("DELETE FROM documents WHERE kind = $1 AND id = $2")
                    .bind(kind.as_str())
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error(format!("Failed to delete {} {}", kind.as_str(), id)))?;
            }
        }

        tx.commit()
            .await
            .map_err(db_error(format!("Commit failed for {} {}", kind.as_str(), id)))?;

        Ok(mutation)
    }
}
