//! HTTP backend abstraction for the GitHub REST API.
//!
//! The production backend uses reqwest with retry for transient errors; tests
//! swap in [`testing::FakeBackend`].

use crate::config::GithubClientConfig;
use crate::error::{GithubError, GithubResult};
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Sends JSON requests and decodes JSON responses.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    async fn get_json(&self, url: &Url) -> GithubResult<Value>;

    async fn post_json(&self, url: &Url, body: &Value) -> GithubResult<Value>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production backend.
///
/// GETs are retried with exponential backoff on server errors (5xx) and
/// network failures. Other methods are retried only when the connection was
/// never established, so a write is sent at most once. Client errors (4xx)
/// fail immediately.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay: Duration,
    auth_token: Option<String>,
}

impl ReqwestBackend {
    pub fn new(config: &GithubClientConfig) -> GithubResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
            auth_token: config.token.clone(),
        })
    }

    fn build_request(&self, method: Method, url: &Url, body: Option<&Value>) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .request(method, url.as_str())
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(ref token) = self.auth_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    async fn send_with_retry(
        &self,
        method: Method,
        url: &Url,
        body: Option<&Value>,
    ) -> GithubResult<Value> {
        let mut last_error: Option<GithubError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tokio::time::sleep(backoff_delay(self.retry_base_delay, attempt)).await;
            }

            debug!(%method, %url, attempt, "GitHub request");
            match self.build_request(method.clone(), url, body).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return decode_body(response).await;
                    }

                    let error = api_error(url, response).await;
                    if status.is_server_error()
                        && attempt < self.max_retries
                        && may_retry(&method, Failure::ServerError)
                    {
                        warn!(%url, status = status.as_u16(), attempt, "Retrying after server error");
                        last_error = Some(error);
                        continue;
                    }
                    return Err(error);
                }
                Err(e) => {
                    let failure = if e.is_connect() {
                        Failure::Connect
                    } else {
                        Failure::Network
                    };
                    if attempt < self.max_retries && may_retry(&method, failure) {
                        warn!(%url, error = %e, attempt, "Retrying after network error");
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            GithubError::InvalidResponse("request was never sent".to_string())
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// The server answered 5xx.
    ServerError,
    /// No connection was made; the request never left.
    Connect,
    /// The request may have reached the server.
    Network,
}

fn may_retry(method: &Method, failure: Failure) -> bool {
    *method == Method::GET || failure == Failure::Connect
}

/// Delay before retry number `attempt` (1-based).
pub(crate) fn backoff_delay(base: Duration, attempt: u8) -> Duration {
    let factor = 2u32.saturating_pow(u32::from(attempt.saturating_sub(1)));
    base.saturating_mul(factor)
}

async fn decode_body(response: reqwest::Response) -> GithubResult<Value> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| GithubError::InvalidResponse(e.to_string()))
}

async fn api_error(url: &Url, response: reqwest::Response) -> GithubError {
    let status = response.status();
    let message = response
        .json::<Value>()
        .await
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string());

    GithubError::ApiRequestFailed {
        status: status.as_u16(),
        url: url.to_string(),
        message,
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json(&self, url: &Url) -> GithubResult<Value> {
        self.send_with_retry(Method::GET, url, None).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> GithubResult<Value> {
        self.send_with_retry(Method::POST, url, Some(body)).await
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Canned response for the fake backend.
    #[derive(Clone)]
    pub struct CannedResponse {
        pub status: u16,
        pub json: Value,
    }

    impl CannedResponse {
        pub const fn ok(json: Value) -> Self {
            Self { status: 200, json }
        }

        pub fn failure(status: u16, message: &str) -> Self {
            Self {
                status,
                json: serde_json::json!({ "message": message }),
            }
        }
    }

    /// One request seen by the fake backend.
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRequest {
        pub method: &'static str,
        pub url: String,
        pub body: Option<Value>,
    }

    /// Returns canned responses keyed by URL substring and records every call.
    #[derive(Default)]
    pub struct FakeBackend {
        responses: Vec<(String, CannedResponse)>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(mut self, url_contains: &str, response: CannedResponse) -> Self {
            self.responses.push((url_contains.to_string(), response));
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        fn respond(&self, method: &'static str, url: &Url, body: Option<&Value>) -> GithubResult<Value> {
            self.requests.lock().unwrap().push(RecordedRequest {
                method,
                url: url.to_string(),
                body: body.cloned(),
            });

            let canned = self
                .responses
                .iter()
                .find(|(pattern, _)| url.as_str().contains(pattern.as_str()))
                .map(|(_, response)| response.clone())
                .unwrap_or_else(|| CannedResponse::failure(404, "Not Found"));

            if (200..300).contains(&canned.status) {
                Ok(canned.json)
            } else {
                Err(GithubError::ApiRequestFailed {
                    status: canned.status,
                    url: url.to_string(),
                    message: canned.json["message"].as_str().unwrap_or("error").to_string(),
                })
            }
        }
    }

    #[async_trait]
    impl HttpBackend for FakeBackend {
        async fn get_json(&self, url: &Url) -> GithubResult<Value> {
            self.respond("GET", url, None)
        }

        async fn post_json(&self, url: &Url, body: &Value) -> GithubResult<Value> {
            self.respond("POST", url, Some(body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn test_backoff_doubles() {
        let base = Duration::from_millis(100);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(100));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(200));
        assert_eq!(backoff_delay(base, 4), Duration::from_millis(800));
    }

    #[test]
    fn test_backoff_saturates() {
        let delay = backoff_delay(Duration::from_secs(1), u8::MAX);
        assert!(delay >= Duration::from_secs(1));
    }

    #[test]
    fn test_only_reads_retry_after_send() {
        assert!(may_retry(&Method::GET, Failure::ServerError));
        assert!(may_retry(&Method::GET, Failure::Network));
        assert!(may_retry(&Method::POST, Failure::Connect));
        assert!(!may_retry(&Method::POST, Failure::ServerError));
        assert!(!may_retry(&Method::POST, Failure::Network));
    }

    /// Serve `statuses` in order, one per connection, then repeat the last.
    /// Returns the base URL and a counter of requests seen.
    async fn scripted_server(statuses: Vec<u16>) -> (Url, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let status = statuses[n.min(statuses.len() - 1)];
                read_request(&mut stream).await;

                let body = if status < 300 { "{\"number\":1}" } else { "{\"message\":\"upstream\"}" };
                let response = format!(
                    "HTTP/1.1 {status} Status\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (Url::parse(&format!("http://{addr}/repos/o/r/issues")).unwrap(), seen)
    }

    async fn read_request(stream: &mut TcpStream) {
        let mut data = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let Ok(n) = stream.read(&mut chunk).await else {
                return;
            };
            if n == 0 {
                return;
            }
            data.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    fn fast_backend() -> ReqwestBackend {
        let config = GithubClientConfig::new()
            .with_token("t")
            .with_retry_delay(Duration::from_millis(1));
        ReqwestBackend::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_post_is_not_resent_after_server_error() {
        let (url, seen) = scripted_server(vec![502, 201]).await;

        let err = fast_backend()
            .post_json(&url, &serde_json::json!({ "title": "t" }))
            .await
            .unwrap_err();

        assert!(matches!(err, GithubError::ApiRequestFailed { status: 502, .. }));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_retries_after_server_error() {
        let (url, seen) = scripted_server(vec![502, 200]).await;

        let body = fast_backend().get_json(&url).await.unwrap();

        assert_eq!(body["number"], 1);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_reqwest_backend_builds() {
        let config = GithubClientConfig::new().with_token("t");
        assert!(ReqwestBackend::new(&config).is_ok());
    }
}
