use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use entropy_core::config::NetworkConfig;
use entropy_core::net::{ApiFetcher, ApiRequest, ApiRequestError, HttpClient, HttpMethod};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Source of movie search results.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<Movie>, ApiRequestError>;
}

/// In-memory catalog used when no API key is configured.
pub struct StaticCatalog {
    movies: Vec<Movie>,
}

impl Default for StaticCatalog {
    fn default() -> Self {
        let movie = |title: &str, date: &str, poster: &str| Movie {
            title: title.to_string(),
            release_date: Some(date.to_string()),
            poster_path: Some(poster.to_string()),
        };
        Self {
            movies: vec![
                movie("Dune", "2021-09-15", "d5NXSklXo0qyIYkgV94XAgMIckC.jpg"),
                movie("Dune: Part Two", "2024-02-27", "1pdfLvkbY9ohJlCjQH2CZjjYVvJ.jpg"),
                movie("Arrival", "2016-11-10", "x2FJsf1ElAgr63Y3PNPtJrcmpoe.jpg"),
                movie("Blade Runner 2049", "2017-10-04", "gajva2L0rPYkEWjzgFlBXCAVBE5.jpg"),
                movie("Sicario", "2015-09-17", "lz8vNyXeidqqOdJW9ZjnDAMb5Vr.jpg"),
            ],
        }
    }
}

#[async_trait]
impl MovieCatalog for StaticCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Movie>, ApiRequestError> {
        let needle = query.to_lowercase();
        Ok(self
            .movies
            .iter()
            .filter(|m| m.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

struct SearchMovies<'a> {
    base_url: &'a str,
    api_key: &'a str,
    query: &'a str,
    debug: bool,
}

impl ApiFetcher for SearchMovies<'_> {
    fn path(&self) -> String {
        let endpoint = format!("{}/search/movie", self.base_url.trim_end_matches('/'));
        match Url::parse_with_params(
            &endpoint,
            &[("api_key", self.api_key), ("query", self.query)],
        ) {
            Ok(url) => url.to_string(),
            // Surfaces as InvalidUrl when the request is built.
            Err(_) => endpoint,
        }
    }

    fn method(&self) -> HttpMethod {
        HttpMethod::Get
    }

    fn debug(&self) -> bool {
        self.debug
    }
}

#[derive(Deserialize)]
struct SearchPage {
    results: Vec<Movie>,
}

/// Catalog backed by the TMDB search endpoint.
pub struct TmdbCatalog {
    api: ApiRequest<Arc<dyn HttpClient>>,
    base_url: String,
    api_key: String,
    debug: bool,
}

impl TmdbCatalog {
    pub fn new(client: Arc<dyn HttpClient>, config: &NetworkConfig, api_key: String) -> Self {
        Self {
            api: ApiRequest::new(client),
            base_url: config.api_base_url.clone(),
            api_key,
            debug: config.debug,
        }
    }
}

#[async_trait]
impl MovieCatalog for TmdbCatalog {
    async fn search(&self, query: &str) -> Result<Vec<Movie>, ApiRequestError> {
        let target = SearchMovies {
            base_url: &self.base_url,
            api_key: &self.api_key,
            query,
            debug: self.debug,
        };
        let page: SearchPage = self.api.fetch(&target).await?;
        Ok(page.results)
    }
}
