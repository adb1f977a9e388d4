use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Movie, WatchProvider},
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

/// A search result decorated with where the movie can be watched
#[derive(Debug, Serialize)]
pub struct MovieSearchResult {
    #[serde(flatten)]
    pub movie: Movie,
    pub watch_providers: Vec<WatchProvider>,
}

/// Handler for movie search
///
/// Searches the metadata provider, then fetches watch providers for each
/// result in parallel. A provider lookup failing for one movie degrades
/// that movie to an empty provider list rather than failing the search.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieSearchResult>>> {
    let movies = state.provider.search_movies(&params.q).await?;

    let mut tasks = Vec::new();
    for movie in movies {
        let provider = state.provider.clone();
        let task = tokio::spawn(async move {
            let watch_providers = match provider.watch_providers(movie.id, &movie.title).await {
                Ok(providers) => providers,
                Err(e) => {
                    tracing::warn!(
                        movie_id = movie.id,
                        error = %e,
                        "Watch provider lookup failed, returning movie without providers"
                    );
                    Vec::new()
                }
            };
            MovieSearchResult {
                movie,
                watch_providers,
            }
        });
        tasks.push(task);
    }

    let mut results = Vec::new();
    for task in tasks {
        match task.await {
            Ok(result) => results.push(result),
            Err(e) => tracing::error!(error = %e, "Task join error during provider lookup"),
        }
    }

    tracing::info!(
        query = %params.q,
        results = results.len(),
        "Movie search with providers completed"
    );

    Ok(Json(results))
}
