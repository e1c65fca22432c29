use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Body, Request, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::client::{HttpClient, HttpResponse};
use super::error::ApiRequestError;
use super::fetcher::ApiFetcher;

/// Fetches JSON resources described by an `ApiFetcher`.
pub struct ApiRequest<C> {
    client: C,
}

impl<C: HttpClient> ApiRequest<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Build, execute and decode a request.
    ///
    /// # Errors
    /// - `InvalidUrl` if the target path does not parse
    /// - `Generic` if the body cannot be encoded
    /// - `Transport` if the exchange fails
    /// - `Parse` if the body does not decode into `V`
    pub async fn fetch<T, V>(&self, target: &T) -> Result<V, ApiRequestError>
    where
        T: ApiFetcher + Sync,
        V: DeserializeOwned,
    {
        let request = build_request(target)?;
        let request_id = uuid::Uuid::new_v4();
        if target.debug() {
            debug_request(&request_id, &request);
        }

        let url = request.url().to_string();
        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                if target.debug() {
                    tracing::debug!(request_id = %request_id, error = %err, "API request failed");
                }
                return Err(err);
            }
        };
        if target.debug() {
            debug_response(&request_id, &response);
        }

        serde_json::from_slice(&response.body).map_err(|err| {
            let message = parse_message(&url, &response, &err);
            tracing::warn!(request_id = %request_id, %message, "API response decode failed");
            ApiRequestError::Parse { message }
        })
    }
}

/// Build the HTTP request for `target` without executing it.
///
/// Always sets `Content-Type: application/json`. The task is encoded as the
/// body (keys sorted) for methods that carry one.
pub fn build_request<T: ApiFetcher>(target: &T) -> Result<Request, ApiRequestError> {
    let path = target.path();
    let url = Url::parse(&path).map_err(|_| ApiRequestError::InvalidUrl { url: path.clone() })?;
    let method = target.method();

    let mut request = Request::new(method.into(), url);
    let headers = request.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(Value::Object(extra)) = target.header() {
        for (key, value) in extra {
            let Value::String(value) = value else {
                continue;
            };
            match (
                HeaderName::from_bytes(key.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!(header = %key, "Skipping invalid request header"),
            }
        }
    }

    if method.has_body() {
        let task = match target.task() {
            None => Value::Object(Map::new()),
            Some(task @ Value::Object(_)) => task,
            Some(_) => {
                return Err(ApiRequestError::Generic(
                    "request task must be a JSON object".to_string(),
                ))
            }
        };
        let body = serde_json::to_vec(&task).map_err(|e| ApiRequestError::Generic(e.to_string()))?;
        *request.body_mut() = Some(Body::from(body));
    }

    Ok(request)
}

fn debug_request(request_id: &uuid::Uuid, request: &Request) {
    let body = request
        .body()
        .and_then(|b| b.as_bytes())
        .map(|b| String::from_utf8_lossy(b).into_owned())
        .unwrap_or_default();
    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        url = %request.url(),
        headers = ?request.headers(),
        body = %body,
        "API request"
    );
}

fn debug_response(request_id: &uuid::Uuid, response: &HttpResponse) {
    let outcome = match response.status {
        200..=202 | 204 | 205 => "success",
        400..=505 => "failure",
        _ => "other",
    };
    tracing::debug!(
        request_id = %request_id,
        status = response.status,
        outcome,
        headers = ?response.headers,
        body = %String::from_utf8_lossy(&response.body),
        "API response"
    );
}

fn parse_message(url: &str, response: &HttpResponse, err: &serde_json::Error) -> String {
    format!(
        "[REQUEST_URL: {}] [RESPONSE_CODE: {}] [RESPONSE_BODY: {}] [PARSE: {}]",
        url,
        response.status,
        String::from_utf8_lossy(&response.body),
        err
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::HttpMethod;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::header::HeaderMap;
    use serde::Deserialize;
    use serde_json::json;

    struct Target {
        path: String,
        method: HttpMethod,
        task: Option<Value>,
        header: Option<Value>,
    }

    impl ApiFetcher for Target {
        fn path(&self) -> String {
            self.path.clone()
        }

        fn method(&self) -> HttpMethod {
            self.method
        }

        fn task(&self) -> Option<Value> {
            self.task.clone()
        }

        fn header(&self) -> Option<Value> {
            self.header.clone()
        }

        fn debug(&self) -> bool {
            true
        }
    }

    fn target(method: HttpMethod) -> Target {
        Target {
            path: "https://api.example.com/3/search/movie".to_string(),
            method,
            task: None,
            header: None,
        }
    }

    struct CannedClient {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl HttpClient for CannedClient {
        async fn execute(&self, request: Request) -> Result<HttpResponse, ApiRequestError> {
            self.seen.lock().push(request.url().to_string());
            Ok(HttpResponse {
                status: self.status,
                headers: HeaderMap::new(),
                body: self.body.as_bytes().to_vec(),
            })
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Page {
        page: u32,
        total_results: u32,
    }

    #[test]
    fn test_get_has_json_content_type_and_no_body() {
        let mut get = target(HttpMethod::Get);
        get.task = Some(json!({"query": "dune"}));

        let request = build_request(&get).unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(request.body().is_none());
    }

    #[test]
    fn test_post_body_has_sorted_keys() {
        let mut post = target(HttpMethod::Post);
        post.task = Some(json!({"zeta": 1, "alpha": "a"}));

        let request = build_request(&post).unwrap();
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"alpha":"a","zeta":1}"#);
    }

    #[test]
    fn test_delete_without_task_sends_empty_object() {
        let request = build_request(&target(HttpMethod::Delete)).unwrap();
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, b"{}");
    }

    #[test]
    fn test_only_string_headers_are_added() {
        let mut get = target(HttpMethod::Get);
        get.header = Some(json!({"Authorization": "Bearer token", "X-Retries": 3}));

        let request = build_request(&get).unwrap();
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer token"
        );
        assert!(request.headers().get("x-retries").is_none());
    }

    #[test]
    fn test_invalid_url() {
        let mut bad = target(HttpMethod::Get);
        bad.path = "not a url".to_string();
        assert!(matches!(
            build_request(&bad),
            Err(ApiRequestError::InvalidUrl { url }) if url == "not a url"
        ));
    }

    #[test]
    fn test_non_object_task_is_rejected() {
        let mut put = target(HttpMethod::Put);
        put.task = Some(json!([1, 2, 3]));
        assert!(matches!(
            build_request(&put),
            Err(ApiRequestError::Generic(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_decodes_body() {
        let client = CannedClient {
            status: 200,
            body: r#"{"page": 1, "total_results": 42, "results": []}"#,
            seen: Mutex::new(Vec::new()),
        };
        let api = ApiRequest::new(client);

        let page: Page = api.fetch(&target(HttpMethod::Get)).await.unwrap();
        assert_eq!(
            page,
            Page {
                page: 1,
                total_results: 42
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_parse_error_describes_exchange() {
        let client = CannedClient {
            status: 401,
            body: r#"{"status_message": "Invalid API key"}"#,
            seen: Mutex::new(Vec::new()),
        };
        let api = ApiRequest::new(client);

        let err = api
            .fetch::<_, Page>(&target(HttpMethod::Get))
            .await
            .unwrap_err();
        let ApiRequestError::Parse { message } = err else {
            panic!("expected Parse error");
        };
        assert!(message.contains("[RESPONSE_CODE: 401]"));
        assert!(message.contains("Invalid API key"));
        assert!(message.starts_with("[REQUEST_URL: https://api.example.com/3/search/movie]"));
    }
}
