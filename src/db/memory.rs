use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{ChatMessage, ChatSummary, SummaryUpdate},
};

use super::store::{MessageLog, SummaryStore};

/// In-memory summary store and message log
///
/// Used by the test suite and for running the service without a database.
/// The write lock makes each upsert a single atomic merge, matching the
/// guarantee the Postgres backend gets from its upsert statement.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    summaries: HashMap<i64, ChatSummary>,
    messages: Vec<ChatMessage>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SummaryStore for MemoryStore {
    async fn upsert_summary(&self, update: &SummaryUpdate) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();

        let entry = inner
            .summaries
            .entry(update.movie_id)
            .or_insert_with(|| ChatSummary {
                movie_id: update.movie_id,
                title: update.title.clone(),
                poster_path: update.poster_path.clone(),
                last_message_text: None,
                last_message_at: None,
            });

        entry.title = update.title.clone();
        entry.poster_path = update.poster_path.clone();
        entry.last_message_text = Some(update.snippet.clone());
        // Never move the timestamp backwards.
        entry.last_message_at = Some(match entry.last_message_at {
            Some(prev) if prev > now => prev,
            _ => now,
        });

        Ok(())
    }

    async fn top_summaries(&self, top_n: usize) -> AppResult<Vec<ChatSummary>> {
        let inner = self.inner.read().await;
        let mut summaries: Vec<ChatSummary> = inner.summaries.values().cloned().collect();

        // Newest first; rows without a timestamp sort last.
        summaries.sort_by(|a, b| match (&a.last_message_at, &b.last_message_at) {
            (Some(x), Some(y)) => y.cmp(x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        summaries.truncate(top_n);

        Ok(summaries)
    }
}

#[async_trait::async_trait]
impl MessageLog for MemoryStore {
    async fn append_message(&self, movie_id: i64, body: &str) -> AppResult<ChatMessage> {
        let message = ChatMessage {
            id: Uuid::new_v4(),
            movie_id,
            body: body.to_string(),
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write().await;
        inner.messages.push(message.clone());

        Ok(message)
    }

    async fn messages_for_movie(&self, movie_id: i64) -> AppResult<Vec<ChatMessage>> {
        let inner = self.inner.read().await;
        let mut messages: Vec<ChatMessage> = inner
            .messages
            .iter()
            .filter(|m| m.movie_id == movie_id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(messages)
    }
}
