//! Library management server
//!
//! REST JSON API over a PostgreSQL catalog of books and authors, library
//! patrons, and the borrow records that track checkouts and returns.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, put},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    /// Root of every request's cancellation token; cancelled on shutdown
    pub shutdown: CancellationToken,
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Books
        .route("/books", get(api::books::list_books).post(api::books::create_book))
        .route("/books/search", get(api::books::search_books))
        .route(
            "/books/:id",
            get(api::books::get_book)
                .put(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route("/books/:id/availability", get(api::books::get_availability))
        // Authors
        .route("/authors", get(api::authors::list_authors).post(api::authors::create_author))
        .route("/authors/search", get(api::authors::search_authors))
        .route(
            "/authors/:id",
            get(api::authors::get_author)
                .put(api::authors::update_author)
                .delete(api::authors::delete_author),
        )
        .route("/authors/:id/books", get(api::authors::get_author_books))
        // Patrons
        .route("/patrons", get(api::patrons::list_patrons).post(api::patrons::create_patron))
        .route(
            "/patrons/:id",
            get(api::patrons::get_patron)
                .put(api::patrons::update_patron)
                .delete(api::patrons::delete_patron),
        )
        .route("/patrons/:id/books", get(api::patrons::get_patron_books))
        // Borrow records
        .route(
            "/borrow-records",
            get(api::borrow_records::list_borrow_records).post(api::borrow_records::check_out),
        )
        .route("/borrow-records/overdue", get(api::borrow_records::list_overdue))
        .route("/borrow-records/:id", get(api::borrow_records::get_borrow_record))
        .route("/borrow-records/:id/return", put(api::borrow_records::return_book))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::request_cancellation,
        ))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api", api)
        .merge(openapi)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
