//! HTTP handlers and routing

pub mod books;
pub mod health;
pub mod openapi;

use axum::{response::Redirect, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/", get(|| async { Redirect::to(books::BOOKS_PATH) }))
        .route("/books", get(books::list_books))
        .route("/books/details", get(books::book_details_by_query))
        .route("/books/details/:id", get(books::book_details))
        .route("/books/create", get(books::show_create).post(books::submit_create))
        .route(
            "/books/edit",
            get(books::show_edit_by_query).post(books::submit_edit_by_form),
        )
        .route("/books/edit/:id", get(books::show_edit).post(books::submit_edit))
        .route("/books/delete", get(books::show_delete_by_query))
        .route("/books/delete/:id", get(books::show_delete).post(books::submit_delete))
        .with_state(state);

    Router::new()
        .merge(routes)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
