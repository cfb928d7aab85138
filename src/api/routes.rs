use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;

use crate::api::{handlers, lyric_handlers};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // API Documentation
        .route("/docs", get(handlers::get_api_docs))
        .route("/docs/openapi.json", get(handlers::get_openapi_spec))
        // Songs
        .route(
            "/songs",
            get(handlers::list_songs::<S>).post(handlers::create_song::<S>),
        )
        .route(
            "/songs/:id",
            get(handlers::get_song::<S>)
                .put(handlers::update_song::<S>)
                .delete(handlers::delete_song::<S>),
        )
        // Lyrics
        .route("/lyrics", post(lyric_handlers::create_lyric::<S>))
        .route(
            "/lyrics/:id",
            get(lyric_handlers::get_lyric::<S>)
                .put(lyric_handlers::update_lyric::<S>)
                .delete(lyric_handlers::delete_lyric::<S>),
        )
}

/// Router with state attached and the per-request timeout applied
pub fn create_app<S: Store + 'static>(store: Arc<S>, request_timeout: Duration) -> Router {
    create_router::<S>()
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(store)
}
