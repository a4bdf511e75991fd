// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{quiz, quiz_record, take},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * `/api/quizzes` is the instructor side and requires a bearer token.
/// * `/api/take` is the student side; the record id in the path is enough.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes).post(quiz::create_quiz))
        .route(
            "/{id}",
            get(quiz::get_quiz)
                .put(quiz::update_quiz)
                .delete(quiz::delete_quiz),
        )
        .route("/{id}/enable", post(quiz::enable_quiz))
        .route("/{id}/disable", post(quiz::disable_quiz))
        .route(
            "/{id}/records",
            get(quiz_record::get_quiz_records).post(quiz_record::create_quiz_records),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let take_routes = Router::new().route(
        "/{record_id}",
        get(take::get_quiz_for_student).put(take::save_quiz_record),
    );

    Router::new()
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/take", take_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
