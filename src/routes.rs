// src/routes.rs

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{Method, header},
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    handlers::{course, dashboard, page, question, solution, tag},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Mounts the JSON API under `/api`; mutation routes are left out in read-only mode.
/// * Serves uploaded images from the upload directory under `/uploads`.
/// * Applies global middleware (body limit, Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = if state.config.read_only {
        tracing::info!("Read-only mode: mutation routes are disabled");
        read_routes()
    } else {
        read_routes().merge(write_routes())
    };

    Router::new()
        .nest("/api", api_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        // Multipart uploads are bounded by the configured limit instead of axum's 2 MB default.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_upload_bytes))
        // Global Middleware (CORS outermost)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(course::list_courses))
        .route("/courses/{id}/questions", get(question::list_questions))
        .route("/questions/recent", get(dashboard::recent_questions))
        .route("/questions/unsolved", get(dashboard::unsolved_questions))
        .route("/questions/{id}", get(question::get_question))
        .route("/tags", get(tag::list_tags))
        .route("/stats", get(dashboard::get_stats))
}

fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", post(course::create_course))
        .route("/courses/reorder", post(course::reorder_courses))
        .route(
            "/courses/{id}",
            put(course::update_course).delete(course::delete_course),
        )
        .route("/questions", post(question::create_question))
        .route(
            "/questions/{id}",
            put(question::update_question).delete(question::delete_question),
        )
        .route("/questions/{id}/pages", post(page::add_pages))
        .route("/pages/{id}", put(page::update_page).delete(page::delete_page))
        .route("/questions/{id}/solutions", post(solution::add_solution))
        .route(
            "/solutions/{id}",
            put(solution::update_solution).delete(solution::delete_solution),
        )
}
