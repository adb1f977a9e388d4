use crate::{
    error::AppResult,
    models::{ChatMessage, ChatSummary, SummaryUpdate},
};

/// Keyed store for per-movie chat summaries
///
/// Implementations must provide `upsert_summary` as a single atomic
/// field-level merge with a store-assigned timestamp. Callers never
/// read-modify-write a summary row themselves; concurrent writers race
/// safely because the store resolves them last-write-wins by its own
/// clock.
#[async_trait::async_trait]
pub trait SummaryStore: Send + Sync {
    /// Merge the supplied fields into the row for `update.movie_id`,
    /// creating it if absent, and bump `last_message_at` to the store's
    /// current time. The timestamp never moves backwards.
    async fn upsert_summary(&self, update: &SummaryUpdate) -> AppResult<()>;

    /// The top `top_n` rows by `last_message_at` descending
    ///
    /// Rows without a timestamp sort last. Zero rows is a valid result.
    async fn top_summaries(&self, top_n: usize) -> AppResult<Vec<ChatSummary>>;
}

/// Append-only per-movie message log
#[async_trait::async_trait]
pub trait MessageLog: Send + Sync {
    async fn append_message(&self, movie_id: i64, body: &str) -> AppResult<ChatMessage>;

    /// Messages for one movie, newest first
    async fn messages_for_movie(&self, movie_id: i64) -> AppResult<Vec<ChatMessage>>;
}
