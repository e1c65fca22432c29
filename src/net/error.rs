use thiserror::Error;

/// Errors that can occur while fetching an API resource.
#[derive(Debug, Error)]
pub enum ApiRequestError {
    /// The fetcher's path is not a valid absolute URL.
    #[error("Invalid URL '{url}'")]
    InvalidUrl { url: String },

    /// The request could not be built (body encoding, client setup).
    #[error("Failed to build request: {0}")]
    Generic(String),

    /// The HTTP exchange itself failed.
    #[error("Request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be decoded into the expected type.
    #[error("Failed to decode response: {message}")]
    Parse { message: String },
}
