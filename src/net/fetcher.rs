use serde_json::Value;

/// HTTP methods supported by `ApiRequest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
    Put,
}

impl HttpMethod {
    /// Whether the request task is sent as a JSON body.
    pub fn has_body(&self) -> bool {
        !matches!(self, HttpMethod::Get)
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Put => reqwest::Method::PUT,
        }
    }
}

/// Describes a single API endpoint call.
pub trait ApiFetcher {
    /// Absolute URL of the endpoint.
    fn path(&self) -> String;

    fn method(&self) -> HttpMethod;

    /// JSON object sent as the body of POST, PUT and DELETE requests.
    fn task(&self) -> Option<Value> {
        None
    }

    /// JSON object whose string-valued entries are added as headers.
    fn header(&self) -> Option<Value> {
        None
    }

    /// Log request and response details at debug level.
    fn debug(&self) -> bool {
        false
    }
}
