use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::{MessageLog, SummaryStore},
    services::{
        providers::MovieMetadataProvider, ChatSummaryWriter, FeedNotifier, RecentActivityFeed,
    },
};

pub mod chat;
pub mod feed;
pub mod movies;

/// Shared application state
///
/// The writer and the feed are wired to the same notifier so every summary
/// write wakes the open feed subscriptions.
pub struct AppState {
    pub writer: ChatSummaryWriter,
    pub feed: RecentActivityFeed,
    pub messages: Arc<dyn MessageLog>,
    pub provider: Arc<dyn MovieMetadataProvider>,
    pub default_feed_limit: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn SummaryStore>,
        messages: Arc<dyn MessageLog>,
        provider: Arc<dyn MovieMetadataProvider>,
        default_feed_limit: usize,
    ) -> Self {
        let notifier = FeedNotifier::new();
        Self {
            writer: ChatSummaryWriter::new(store.clone(), notifier.clone()),
            feed: RecentActivityFeed::new(store, notifier),
            messages,
            provider,
            default_feed_limit,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies/search", get(movies::search))
        .route(
            "/movies/:movie_id/messages",
            get(chat::list_messages).post(chat::post_message),
        )
        .route("/feed/recent", get(feed::recent))
        .route("/feed/recent/live", get(feed::recent_live))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
