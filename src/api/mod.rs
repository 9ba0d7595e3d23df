//! HTTP routes and handlers

pub mod books;
pub mod health;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let catalog = Router::new()
        .route("/", get(books::list_books).post(books::search_books))
        .route("/new", get(books::new_book_form).post(books::create_book))
        .route("/:id", get(books::edit_book_form).post(books::update_book))
        .route(
            "/:id/delete",
            get(books::delete_book_form).post(books::delete_book),
        );

    Router::new()
        .route("/", get(books::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest(books::CATALOG_ROOT, catalog)
        .fallback(books::page_not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
