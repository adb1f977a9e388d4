/// TMDB API provider
///
/// API flow:
/// 1. Search: /search/movie → movie list with ids
/// 2. Details: /movie/{id} → title + poster for summary writes
/// 3. Providers: /movie/{id}/watch/providers → per-region service lists
///
/// Responses are cached in Redis; provider lists change slowly, search
/// results even slower.
use reqwest::Client as HttpClient;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        Movie, TmdbMovie, TmdbRegionProviders, TmdbSearchResponse, TmdbWatchProvidersResponse,
        WatchKind, WatchProvider,
    },
    services::providers::MovieMetadataProvider,
};

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const DETAILS_CACHE_TTL: u64 = 86_400; // 1 day
const PROVIDERS_CACHE_TTL: u64 = 86_400; // 1 day

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    region: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, region: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            region,
            cache,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        extra_query: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "ja-JP")])
            .query(extra_query)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("TMDB has no {}", path)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                path = %path,
                status = %status,
                body = %body,
                "TMDB request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "TMDB returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl MovieMetadataProvider for TmdbProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<Movie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::MovieSearch(query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let response: TmdbSearchResponse = self
                    .get_json("/search/movie", &[("query", query)])
                    .await?;

                let movies: Vec<Movie> = response.results.into_iter().map(Movie::from).collect();

                tracing::info!(
                    query = %query,
                    results = movies.len(),
                    provider = "tmdb",
                    "Movie search completed"
                );

                Ok::<_, AppError>(movies)
            }
        )
    }

    async fn movie_details(&self, movie_id: i64) -> AppResult<Movie> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            async move {
                let movie: TmdbMovie = self.get_json(&format!("/movie/{}", movie_id), &[]).await?;
                Ok::<_, AppError>(Movie::from(movie))
            }
        )
    }

    async fn watch_providers(&self, movie_id: i64, title: &str) -> AppResult<Vec<WatchProvider>> {
        let region_providers: AppResult<TmdbRegionProviders> = cached!(
            self.cache,
            CacheKey::WatchProviders(movie_id),
            PROVIDERS_CACHE_TTL,
            async move {
                let mut response: TmdbWatchProvidersResponse = self
                    .get_json(&format!("/movie/{}/watch/providers", movie_id), &[])
                    .await?;

                // A movie with no providers in the region is a valid result.
                let region = response.results.remove(&self.region).unwrap_or_default();

                tracing::info!(
                    movie_id,
                    region = %self.region,
                    provider = "tmdb",
                    "Watch providers fetched"
                );

                Ok::<_, AppError>(region)
            }
        );

        Ok(flatten_region_providers(&region_providers?, title))
    }
}

/// Flattens one region's provider lists into a deduplicated display list
///
/// Flatrate, buy and rent lists are concatenated in that order; duplicates
/// (by provider name) keep their first position but take their last value,
/// so a service offering both streaming and rental shows up once.
pub fn flatten_region_providers(region: &TmdbRegionProviders, title: &str) -> Vec<WatchProvider> {
    let justwatch_link = region.link.as_deref();
    let mut providers: Vec<WatchProvider> = Vec::new();

    let categories = [
        (&region.flatrate, WatchKind::Flatrate),
        (&region.buy, WatchKind::Buy),
        (&region.rent, WatchKind::Rent),
    ];

    for (entries, kind) in categories {
        let Some(entries) = entries else { continue };
        for entry in entries {
            let provider = WatchProvider {
                name: entry.provider_name.clone(),
                logo_path: entry.logo_path.clone(),
                kind,
                link: service_link(&entry.provider_name, title, justwatch_link),
            };

            match providers.iter().position(|p| p.name == provider.name) {
                Some(index) => providers[index] = provider,
                None => providers.push(provider),
            }
        }
    }

    providers
}

/// Best-effort deep link for a watch provider
///
/// Most services have no stable per-title URL, so this points at their
/// search page (or landing page) with the JustWatch link as the fallback.
fn service_link(provider_name: &str, title: &str, justwatch_link: Option<&str>) -> Option<String> {
    let encoded = urlencoding::encode(title);
    let link = match provider_name {
        "Amazon Prime Video" => {
            format!("https://www.amazon.co.jp/s?k={}&i=instant-video", encoded)
        }
        "Netflix" => "https://www.netflix.com/jp/".to_string(),
        "U-NEXT" => "https://video.unext.jp/".to_string(),
        "Hulu" => "https://www.hulu.jp/".to_string(),
        "Disney Plus" => "https://www.disneyplus.com/ja-jp".to_string(),
        "Apple TV" => format!("https://tv.apple.com/jp/search/{}", encoded),
        "Google Play Movies" => format!(
            "https://play.google.com/store/search?q={}&c=movies",
            encoded
        ),
        "YouTube" => format!(
            "https://www.youtube.com/results?search_query={}+full+movie",
            encoded
        ),
        _ => return justwatch_link.map(str::to_string),
    };
    Some(link)
}
