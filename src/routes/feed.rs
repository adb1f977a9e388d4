use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_stream::{Stream, StreamExt};

use crate::{error::AppResult, models::ChatSummary, routes::AppState, time::format_distance_to_now};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub limit: Option<usize>,
}

/// One entry of the recent-activity feed as sent to clients
#[derive(Debug, Serialize)]
pub struct FeedItem {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub last_message_text: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    /// Pre-formatted age ("5m", "3h") for sidebar display
    pub last_message_ago: Option<String>,
}

impl From<ChatSummary> for FeedItem {
    fn from(summary: ChatSummary) -> Self {
        FeedItem {
            movie_id: summary.movie_id,
            title: summary.title,
            poster_path: summary.poster_path,
            last_message_text: summary.last_message_text,
            last_message_at: summary.last_message_at,
            last_message_ago: summary.last_message_at.map(format_distance_to_now),
        }
    }
}

/// Handler for a one-shot read of the recent-activity feed
pub async fn recent(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedQuery>,
) -> AppResult<Json<Vec<FeedItem>>> {
    let limit = params.limit.unwrap_or(state.default_feed_limit);
    let summaries = state.feed.fetch_once(limit).await?;

    Ok(Json(summaries.into_iter().map(FeedItem::from).collect()))
}

/// Handler for the live feed, streamed as server-sent events
///
/// Each event carries a full ordered snapshot. The subscription is torn
/// down when the client disconnects (the stream drops); a snapshot read
/// error is delivered as an `error` payload and ends the stream, and the
/// client resubscribes if it wants to keep watching.
pub async fn recent_live(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedQuery>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let limit = params.limit.unwrap_or(state.default_feed_limit);
    let subscription = state.feed.subscribe(limit)?;

    let stream = subscription.into_stream().map(|snapshot| {
        let event = match snapshot {
            Ok(summaries) => {
                let items: Vec<FeedItem> = summaries.into_iter().map(FeedItem::from).collect();
                match Event::default().json_data(&items) {
                    Ok(event) => event,
                    Err(e) => Event::default()
                        .data(serde_json::json!({ "error": e.to_string() }).to_string()),
                }
            }
            Err(e) => {
                Event::default().data(serde_json::json!({ "error": e.to_string() }).to_string())
            }
        };
        Ok(event)
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
