//! Minimal HTTP collaborator for interactors.
//!
//! Interactors depend on the `HttpClient` capability; `ApiRequest` layers
//! request building and JSON decoding on top of it.

mod client;
mod error;
mod fetcher;
mod request;

pub use client::{HttpClient, HttpResponse, ReqwestClient};
pub use error::ApiRequestError;
pub use fetcher::{ApiFetcher, HttpMethod};
pub use request::{build_request, ApiRequest};
