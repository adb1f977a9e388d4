use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;

use cinechat_api::db::{MemoryStore, SummaryStore};
use cinechat_api::error::{AppError, AppResult};
use cinechat_api::models::{ChatSummary, Movie, SummaryUpdate, WatchKind, WatchProvider};
use cinechat_api::routes::{create_router, AppState};
use cinechat_api::services::providers::MovieMetadataProvider;

/// Metadata provider double: one known movie, optional hard failure
struct StubProvider {
    fail: bool,
}

#[async_trait::async_trait]
impl MovieMetadataProvider for StubProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<Movie>> {
        if self.fail {
            return Err(AppError::ExternalApi("provider down".to_string()));
        }
        if query.to_lowercase().contains("inception") {
            Ok(vec![Movie {
                id: 27205,
                title: "Inception".to_string(),
                release_date: Some("2010-07-16".to_string()),
                overview: None,
                poster_path: Some("/inception.jpg".to_string()),
            }])
        } else {
            Ok(vec![])
        }
    }

    async fn movie_details(&self, movie_id: i64) -> AppResult<Movie> {
        if self.fail {
            return Err(AppError::ExternalApi("provider down".to_string()));
        }
        Ok(Movie {
            id: movie_id,
            title: format!("Movie {}", movie_id),
            release_date: None,
            overview: None,
            poster_path: Some("/poster.jpg".to_string()),
        })
    }

    async fn watch_providers(&self, _movie_id: i64, _title: &str) -> AppResult<Vec<WatchProvider>> {
        if self.fail {
            return Err(AppError::ExternalApi("provider down".to_string()));
        }
        Ok(vec![WatchProvider {
            name: "Netflix".to_string(),
            logo_path: Some("/netflix.jpg".to_string()),
            kind: WatchKind::Flatrate,
            link: Some("https://www.netflix.com/jp/".to_string()),
        }])
    }
}

/// Summary store double whose writes always fail
struct BrokenSummaryStore;

#[async_trait::async_trait]
impl SummaryStore for BrokenSummaryStore {
    async fn upsert_summary(&self, _update: &SummaryUpdate) -> AppResult<()> {
        Err(AppError::Internal("summaries unavailable".to_string()))
    }

    async fn top_summaries(&self, _top_n: usize) -> AppResult<Vec<ChatSummary>> {
        Ok(vec![])
    }
}

fn create_test_server() -> TestServer {
    create_test_server_with(StubProvider { fail: false })
}

fn create_test_server_with(provider: StubProvider) -> TestServer {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        store.clone(),
        store,
        Arc::new(provider),
        10,
    ));
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_movie_search_includes_watch_providers() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/movies/search")
        .add_query_param("q", "inception")
        .await;
    response.assert_status_ok();

    let results: Vec<serde_json::Value> = response.json();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["title"], "Inception");
    assert_eq!(results[0]["watch_providers"][0]["name"], "Netflix");
    assert_eq!(results[0]["watch_providers"][0]["kind"], "flatrate");
}

#[tokio::test]
async fn test_post_and_list_messages() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/27205/messages")
        .json(&json!({ "text": "best ending ever" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: serde_json::Value = response.json();
    assert_eq!(created["movie_id"], 27205);
    assert_eq!(created["body"], "best ending ever");

    let response = server.get("/api/v1/movies/27205/messages").await;
    response.assert_status_ok();
    let messages: Vec<serde_json::Value> = response.json();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["body"], "best ending ever");
}

#[tokio::test]
async fn test_messages_listed_newest_first() {
    let server = create_test_server();

    for text in ["first", "second", "third"] {
        server
            .post("/api/v1/movies/1/messages")
            .json(&json!({ "text": text }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let messages: Vec<serde_json::Value> = server.get("/api/v1/movies/1/messages").await.json();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["body"], "third");
    assert_eq!(messages[2]["body"], "first");
}

#[tokio::test]
async fn test_post_message_populates_feed() {
    let server = create_test_server();

    server
        .post("/api/v1/movies/42/messages")
        .json(&json!({ "text": "anyone watching this?" }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server.get("/api/v1/feed/recent").await;
    response.assert_status_ok();
    let feed: Vec<serde_json::Value> = response.json();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["movie_id"], 42);
    assert_eq!(feed[0]["title"], "Movie 42");
    assert_eq!(feed[0]["poster_path"], "/poster.jpg");
    assert_eq!(feed[0]["last_message_text"], "anyone watching this?");
    assert!(feed[0]["last_message_at"].is_string());
    assert!(feed[0]["last_message_ago"].is_string());
}

#[tokio::test]
async fn test_feed_orders_by_activity_and_respects_limit() {
    let server = create_test_server();

    for movie_id in [1, 2, 3] {
        server
            .post(&format!("/api/v1/movies/{}/messages", movie_id))
            .json(&json!({ "text": format!("message for {}", movie_id) }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }

    let feed: Vec<serde_json::Value> = server
        .get("/api/v1/feed/recent")
        .add_query_param("limit", 2)
        .await
        .json();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed[0]["movie_id"], 3);
    assert_eq!(feed[1]["movie_id"], 2);
}

#[tokio::test]
async fn test_feed_snippet_truncated_to_80_chars() {
    let server = create_test_server();

    let long_text = "x".repeat(200);
    server
        .post("/api/v1/movies/7/messages")
        .json(&json!({ "text": long_text }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let feed: Vec<serde_json::Value> = server.get("/api/v1/feed/recent").await.json();
    let snippet = feed[0]["last_message_text"].as_str().unwrap();
    assert_eq!(snippet.len(), 80);

    // The full message body is untouched.
    let messages: Vec<serde_json::Value> = server.get("/api/v1/movies/7/messages").await.json();
    assert_eq!(messages[0]["body"].as_str().unwrap().len(), 200);
}

#[tokio::test]
async fn test_repeated_posts_keep_single_feed_entry() {
    let server = create_test_server();

    for text in ["one", "two", "three"] {
        server
            .post("/api/v1/movies/9/messages")
            .json(&json!({ "text": text }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);
    }

    let feed: Vec<serde_json::Value> = server.get("/api/v1/feed/recent").await.json();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["last_message_text"], "three");
}

#[tokio::test]
async fn test_empty_feed_is_empty_list() {
    let server = create_test_server();

    let response = server.get("/api/v1/feed/recent").await;
    response.assert_status_ok();
    let feed: Vec<serde_json::Value> = response.json();
    assert!(feed.is_empty());
}

#[tokio::test]
async fn test_feed_rejects_zero_limit() {
    let server = create_test_server();

    let response = server
        .get("/api/v1/feed/recent")
        .add_query_param("limit", 0)
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_message_rejects_invalid_movie_id() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/0/messages")
        .json(&json!({ "text": "hello" }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_message_rejects_empty_text() {
    let server = create_test_server();

    let response = server
        .post("/api/v1/movies/5/messages")
        .json(&json!({ "text": "   " }))
        .await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_message_survives_provider_outage() {
    let server = create_test_server_with(StubProvider { fail: true });

    // The message commits even though the metadata lookup fails; the
    // summary falls back to a placeholder title.
    let response = server
        .post("/api/v1/movies/31/messages")
        .json(&json!({ "text": "still works" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let feed: Vec<serde_json::Value> = server.get("/api/v1/feed/recent").await.json();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["title"], "ID: 31");
    assert_eq!(feed[0]["poster_path"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_post_message_survives_summary_write_failure() {
    let summaries = Arc::new(BrokenSummaryStore);
    let messages = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        summaries,
        messages,
        Arc::new(StubProvider { fail: false }),
        10,
    ));
    let server = TestServer::new(create_router(state)).unwrap();

    let response = server
        .post("/api/v1/movies/27205/messages")
        .json(&json!({ "text": "durable anyway" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    // The message commits even though the summary upsert failed.
    let listed: Vec<serde_json::Value> = server.get("/api/v1/movies/27205/messages").await.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["body"], "durable anyway");
}
