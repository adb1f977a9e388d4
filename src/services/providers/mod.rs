/// Movie metadata provider abstraction
///
/// A pluggable seam over the third-party metadata API so route handlers and
/// the summary writer never talk to a vendor SDK directly. TMDB is the one
/// production implementation; tests substitute their own.
use crate::{
    error::AppResult,
    models::{Movie, WatchProvider},
};

pub mod tmdb;

/// Trait for movie metadata providers
///
/// Covers the three lookups the app needs: search by name, detail fetch
/// (title and poster for summary denormalization), and watch providers for
/// the availability display.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieMetadataProvider: Send + Sync {
    /// Search for movies by name
    async fn search_movies(&self, query: &str) -> AppResult<Vec<Movie>>;

    /// Fetch one movie's details by its external id
    async fn movie_details(&self, movie_id: i64) -> AppResult<Movie>;

    /// Watch providers carrying the movie, deduplicated by provider name
    ///
    /// `title` feeds the service-specific deep links (several services have
    /// no per-title URL scheme beyond a search page).
    async fn watch_providers(&self, movie_id: i64, title: &str) -> AppResult<Vec<WatchProvider>>;
}
