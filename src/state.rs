use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    config::Config,
    repository::{AnswerRecordRepository, QuizRepository},
    store::DocumentStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub quizzes: QuizRepository,
    pub records: AnswerRecordRepository,
}

impl AppState {
    /// Wires both repositories onto one store.
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        let quizzes = QuizRepository::new(store.clone(), &config);
        let records = AnswerRecordRepository::new(store, quizzes.clone());
        Self {
            config,
            quizzes,
            records,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for QuizRepository {
    fn from_ref(state: &AppState) -> Self {
        state.quizzes.clone()
    }
}

impl FromRef<AppState> for AnswerRecordRepository {
    fn from_ref(state: &AppState) -> Self {
        state.records.clone()
    }
}
