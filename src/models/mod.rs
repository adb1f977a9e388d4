use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized per-movie record of the latest chat activity
///
/// One row exists per movie with at least one message. Rows are created on
/// the first message, overwritten on every subsequent one, and never deleted.
/// `last_message_at` is assigned by the store, not the client, so ordering
/// stays consistent across clients with skewed clocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatSummary {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub last_message_text: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
}

/// A single message in a per-movie discussion thread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: uuid::Uuid,
    pub movie_id: i64,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Fields merged into a ChatSummary row on each message
///
/// The store supplies the timestamp; callers only supply the denormalized
/// display fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryUpdate {
    pub movie_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub snippet: String,
}

/// A movie as returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

/// How a watch provider carries a title
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum WatchKind {
    Flatrate,
    Rent,
    Buy,
}

/// A streaming/rental/purchase service carrying a movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchProvider {
    pub name: String,
    pub logo_path: Option<String>,
    pub kind: WatchKind,
    pub link: Option<String>,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw movie object from TMDB search and detail endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl From<TmdbMovie> for Movie {
    fn from(movie: TmdbMovie) -> Self {
        Movie {
            id: movie.id,
            title: movie.title,
            // TMDB sends "" for unknown release dates
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            overview: movie.overview,
            poster_path: movie.poster_path,
        }
    }
}

/// Response from GET /search/movie
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Response from GET /movie/{id}/watch/providers
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbWatchProvidersResponse {
    #[serde(default)]
    pub results: std::collections::HashMap<String, TmdbRegionProviders>,
}

/// Provider lists for one region, plus the JustWatch landing link
///
/// Round-trips through the Redis cache, hence the Serialize derive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TmdbRegionProviders {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Option<Vec<TmdbProviderEntry>>,
    #[serde(default)]
    pub buy: Option<Vec<TmdbProviderEntry>>,
    #[serde(default)]
    pub rent: Option<Vec<TmdbProviderEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbProviderEntry {
    pub provider_id: i64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}
