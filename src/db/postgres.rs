use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{ChatMessage, ChatSummary, SummaryUpdate},
};

use super::store::{MessageLog, SummaryStore};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Postgres-backed summary store and message log
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SummaryStore for PgStore {
    async fn upsert_summary(&self, update: &SummaryUpdate) -> AppResult<()> {
        // One atomic statement; the timestamp comes from the database clock
        // and GREATEST keeps it from moving backwards under concurrent writes.
        sqlx::query(
            r#"
            INSERT INTO chat_summaries (movie_id, title, poster_path, last_message_text, last_message_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (movie_id) DO UPDATE
            SET title = EXCLUDED.title,
                poster_path = EXCLUDED.poster_path,
                last_message_text = EXCLUDED.last_message_text,
                last_message_at = GREATEST(chat_summaries.last_message_at, now())
            "#,
        )
        .bind(update.movie_id)
        .bind(&update.title)
        .bind(&update.poster_path)
        .bind(&update.snippet)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn top_summaries(&self, top_n: usize) -> AppResult<Vec<ChatSummary>> {
        let summaries = sqlx::query_as::<_, ChatSummary>(
            r#"
            SELECT movie_id, title, poster_path, last_message_text, last_message_at
            FROM chat_summaries
            ORDER BY last_message_at DESC NULLS LAST
            LIMIT $1
            "#,
        )
        .bind(top_n as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }
}

#[async_trait::async_trait]
impl MessageLog for PgStore {
    async fn append_message(&self, movie_id: i64, body: &str) -> AppResult<ChatMessage> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, movie_id, body, created_at)
            VALUES ($1, $2, $3, now())
            RETURNING id, movie_id, body, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(movie_id)
        .bind(body)
        .fetch_one(&self.pool)
        .await?;

        Ok(message)
    }

    async fn messages_for_movie(&self, movie_id: i64) -> AppResult<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, movie_id, body, created_at
            FROM chat_messages
            WHERE movie_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
