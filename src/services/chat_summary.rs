use std::sync::Arc;

use crate::{
    db::SummaryStore,
    error::{AppError, AppResult},
    models::SummaryUpdate,
    services::recent_activity::FeedNotifier,
};

/// Maximum number of characters of a message body kept in the summary row
pub const MAX_SNIPPET_CHARS: usize = 80;

/// Keeps one denormalized "latest activity" row per movie in sync with the
/// message log
///
/// The summary row is not a cache of the log; it is the ranking source of
/// truth for the recent-activity feed, written so the feed never has to scan
/// every movie's messages. The write is best-effort relative to the message
/// append: a failure here leaves the already-committed message in place and
/// propagates to the caller.
pub struct ChatSummaryWriter {
    store: Arc<dyn SummaryStore>,
    notifier: FeedNotifier,
}

impl ChatSummaryWriter {
    pub fn new(store: Arc<dyn SummaryStore>, notifier: FeedNotifier) -> Self {
        Self { store, notifier }
    }

    /// Upserts the summary row for `movie_id`
    ///
    /// Longer message bodies are silently truncated to the first
    /// [`MAX_SNIPPET_CHARS`] characters. The store assigns the timestamp;
    /// concurrent writers for the same movie resolve last-write-wins on its
    /// clock. Open feed subscriptions are nudged after a successful write.
    pub async fn record_message(
        &self,
        movie_id: i64,
        title: &str,
        poster_path: Option<&str>,
        message_text: &str,
    ) -> AppResult<()> {
        if movie_id <= 0 {
            return Err(AppError::InvalidInput(format!(
                "movie id must be positive, got {}",
                movie_id
            )));
        }

        let update = SummaryUpdate {
            movie_id,
            title: title.to_string(),
            poster_path: poster_path.map(str::to_string),
            snippet: truncate_chars(message_text, MAX_SNIPPET_CHARS),
        };

        self.store.upsert_summary(&update).await?;

        tracing::debug!(movie_id, "Chat summary upserted");
        self.notifier.notify();

        Ok(())
    }
}

/// First `max` characters of `s`, safe on multi-byte boundaries
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
