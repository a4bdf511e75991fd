// src/config.rs

use std::collections::BTreeSet;
use std::env;

use dotenvy::dotenv;

use crate::models::question::AnswerType;

pub const DEFAULT_MAX_ROSTER_SIZE: usize = 500;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: String,
    /// Answer types an update may carry. Built once at startup.
    pub allowed_answer_types: BTreeSet<AnswerType>,
    pub max_roster_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let allowed_answer_types = match env::var("ALLOWED_ANSWER_TYPES") {
            Ok(raw) => parse_answer_types(&raw)
                .unwrap_or_else(|e| panic!("ALLOWED_ANSWER_TYPES: {}", e)),
            Err(_) => AnswerType::ALL.into_iter().collect(),
        };

        let max_roster_size = env::var("MAX_ROSTER_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_ROSTER_SIZE);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            allowed_answer_types,
            max_roster_size,
        }
    }

    /// Configuration for tests and embedding: in-memory store, every answer type allowed.
    pub fn with_secret(jwt_secret: &str) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            rust_log: "error".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            allowed_answer_types: AnswerType::ALL.into_iter().collect(),
            max_roster_size: DEFAULT_MAX_ROSTER_SIZE,
        }
    }
}

/// Parses a comma separated list such as `text,mc,int`.
/// Fails on the first unknown entry, or when no type is left.
fn parse_answer_types(raw: &str) -> Result<BTreeSet<AnswerType>, String> {
    let set = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<AnswerType>()
                .map_err(|_| format!("unknown answer type '{}'", s))
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    if set.is_empty() {
        return Err("no answer type given".to_string());
    }
    Ok(set)
}
