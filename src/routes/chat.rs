use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::ChatMessage,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    pub text: String,
}

/// Handler for posting a message to a movie's discussion thread
///
/// Appends the message to the log, then best-effort updates the chat
/// summary: the summary write rides on metadata from the provider, and a
/// failure in either leaves the already-committed message in place and
/// still returns 201. Message log and summary are deliberately not written
/// in one transaction.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
    Json(request): Json<PostMessageRequest>,
) -> AppResult<(StatusCode, Json<ChatMessage>)> {
    if movie_id <= 0 {
        return Err(AppError::InvalidInput(format!(
            "movie id must be positive, got {}",
            movie_id
        )));
    }
    if request.text.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "message text cannot be empty".to_string(),
        ));
    }

    let message = state.messages.append_message(movie_id, &request.text).await?;

    // Denormalize title/poster from the metadata provider; fall back to a
    // placeholder title when the provider is unreachable.
    let (title, poster_path) = match state.provider.movie_details(movie_id).await {
        Ok(movie) => (movie.title, movie.poster_path),
        Err(e) => {
            tracing::warn!(movie_id, error = %e, "Movie detail lookup failed, using fallback title");
            (format!("ID: {}", movie_id), None)
        }
    };

    if let Err(e) = state
        .writer
        .record_message(movie_id, &title, poster_path.as_deref(), &request.text)
        .await
    {
        // The message itself is committed; the feed will catch up on the
        // next successful write.
        tracing::warn!(movie_id, error = %e, "Chat summary update failed");
    }

    Ok((StatusCode::CREATED, Json(message)))
}

/// Handler for listing a movie's messages, newest first
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i64>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    if movie_id <= 0 {
        return Err(AppError::InvalidInput(format!(
            "movie id must be positive, got {}",
            movie_id
        )));
    }

    let messages = state.messages.messages_for_movie(movie_id).await?;
    Ok(Json(messages))
}
