use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::errors::{Result, UlazAiError};
use crate::models::{
    image_status, video_status, ImageRequest, VideoRequest, WaitOptions, TERMINAL_STATUSES,
};
use crate::poll::poll_until_terminal;

const DEFAULT_BASE_URL: &str = "https://ulazai.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const CLIENT_USER_AGENT: &str = "UlazAI-Rust-Client/1.0";
const API_KEY_ENV: &str = "ULAZAI_API_KEY";

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use ulazai::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> ulazai::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("ulz_live_abc123")
///     .base_url("https://staging.ulazai.com/")
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    http: Option<reqwest::Client>,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            http: None,
        }
    }

    /// Set the API key sent as a bearer token. Surrounding whitespace is trimmed.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the base URL (defaults to `https://ulazai.com`). Trailing
    /// slashes are stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout (defaults to 120 seconds).
    ///
    /// This does not bound `wait_for_*` as a whole; see [`WaitOptions`].
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Send requests through an existing `reqwest::Client`.
    ///
    /// The client's connection pool is shared with every other holder of a
    /// clone. Its own default headers and timeout still apply underneath the
    /// ones this SDK sets per request.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Build the [`Client`].
    ///
    /// If no API key was set via [`api_key`](Self::api_key), the builder will
    /// attempt to read the `ULAZAI_API_KEY` environment variable.
    ///
    /// Returns [`UlazAiError::Authentication`] if the key is missing or blank.
    /// Nothing is sent over the network.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .ok_or_else(|| UlazAiError::Authentication {
                message: "API key is required. Pass it to ClientBuilder::api_key() \
                          or set the ULAZAI_API_KEY environment variable."
                    .into(),
            })?;

        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(UlazAiError::Authentication {
                message: "API key must not be blank".into(),
            });
        }

        let headers = default_headers(api_key)?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .build()
                .map_err(UlazAiError::Http)?,
        };

        Ok(Client {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
            headers,
            http,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The UlazAI API client.
///
/// Every method maps to exactly one HTTP request, except the `wait_for_*`
/// helpers which poll a status endpoint. Nothing is retried: API failures
/// come back as [`UlazAiError::Api`] and transport failures as
/// [`UlazAiError::Http`].
///
/// # Example
///
/// ```no_run
/// use ulazai::{Client, ImageRequest};
///
/// # async fn example() -> ulazai::Result<()> {
/// let client = Client::new("ulz_live_abc123")?;
///
/// let created = client
///     .generate_image(&ImageRequest::new("a red fox in snow", "nano-banana-pro"))
///     .await?;
/// let id = created["generation_id"].as_str().unwrap_or_default();
/// let done = client.wait_for_image(id, None).await?;
/// println!("{done}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: String,
    timeout: Duration,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl Client {
    /// Create a new client with the given API key and default settings.
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // -----------------------------------------------------------------------
    // Model discovery
    // -----------------------------------------------------------------------

    /// List the image models available to this account.
    pub async fn list_image_models(&self) -> Result<Value> {
        self.execute(Method::GET, "/api/v1/models/image/", &[], None)
            .await
    }

    /// List the video models available to this account.
    pub async fn list_video_models(&self) -> Result<Value> {
        self.execute(Method::GET, "/api/v1/models/video/", &[], None)
            .await
    }

    // -----------------------------------------------------------------------
    // Images
    // -----------------------------------------------------------------------

    /// Start an image generation. The response carries the generation id to
    /// pass to [`get_image_status`](Self::get_image_status) or
    /// [`wait_for_image`](Self::wait_for_image).
    pub async fn generate_image(&self, req: &ImageRequest) -> Result<Value> {
        let body = req.to_body()?;
        self.execute(Method::POST, "/api/v1/generate/", &[], Some(&body))
            .await
    }

    pub async fn get_image_status(&self, generation_id: &str) -> Result<Value> {
        self.execute(
            Method::GET,
            &format!("/api/v1/generate/{generation_id}/"),
            &[],
            None,
        )
        .await
    }

    /// Page through past image generations.
    ///
    /// `page` defaults to 1 and `limit` to 20.
    pub async fn list_image_history(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Value> {
        let query = [
            ("page", page.unwrap_or(1).to_string()),
            ("limit", limit.unwrap_or(20).to_string()),
        ];
        self.execute(Method::GET, "/api/v1/generate/history/", &query, None)
            .await
    }

    /// Poll an image generation until it is `completed` or `failed`.
    ///
    /// Both outcomes return `Ok` with the last status payload; check its
    /// status to tell them apart. Defaults to [`WaitOptions::image`].
    ///
    /// # Errors
    ///
    /// - [`UlazAiError::Timeout`] if no terminal status shows up in time.
    /// - Any error from [`get_image_status`](Self::get_image_status), unchanged.
    pub async fn wait_for_image(
        &self,
        generation_id: &str,
        opts: Option<WaitOptions>,
    ) -> Result<Value> {
        let opts = opts.unwrap_or_else(WaitOptions::image);
        poll_until_terminal(
            generation_id,
            || self.get_image_status(generation_id),
            image_status,
            TERMINAL_STATUSES,
            &opts,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Videos
    // -----------------------------------------------------------------------

    /// Start a video studio job.
    pub async fn generate_video(&self, req: &VideoRequest) -> Result<Value> {
        let body = req.to_body()?;
        self.execute(
            Method::POST,
            "/api/v1/video-studio/generate/",
            &[],
            Some(&body),
        )
        .await
    }

    pub async fn get_video_status(&self, job_id: &str) -> Result<Value> {
        self.execute(
            Method::GET,
            &format!("/api/v1/video-studio/status/{job_id}/"),
            &[],
            None,
        )
        .await
    }

    /// Most recent video jobs, `limit` defaulting to 20.
    pub async fn list_video_history(&self, limit: Option<u32>) -> Result<Value> {
        let query = [("limit", limit.unwrap_or(20).to_string())];
        self.execute(Method::GET, "/api/v1/video-studio/history/", &query, None)
            .await
    }

    /// Poll a video job until it is `completed` or `failed`.
    ///
    /// Same contract as [`wait_for_image`](Self::wait_for_image), with
    /// [`WaitOptions::video`] as the default.
    pub async fn wait_for_video(&self, job_id: &str, opts: Option<WaitOptions>) -> Result<Value> {
        let opts = opts.unwrap_or_else(WaitOptions::video);
        poll_until_terminal(
            job_id,
            || self.get_video_status(job_id),
            video_status,
            TERMINAL_STATUSES,
            &opts,
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Video studio tools. Payloads are sent as given.
    // -----------------------------------------------------------------------

    pub async fn generate_street_interview(&self, payload: &Value) -> Result<Value> {
        self.execute(
            Method::POST,
            "/api/v1/video-studio/tools/street-interview/generate/",
            &[],
            Some(payload),
        )
        .await
    }

    pub async fn generate_ugc_ad_quick(&self, payload: &Value) -> Result<Value> {
        self.execute(
            Method::POST,
            "/api/v1/video-studio/tools/ugc-ad-quick/generate/",
            &[],
            Some(payload),
        )
        .await
    }

    pub async fn generate_video_remix(&self, payload: &Value) -> Result<Value> {
        self.execute(
            Method::POST,
            "/api/v1/video-studio/tools/video-remix/generate/",
            &[],
            Some(payload),
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Send one request and normalize the response.
    ///
    /// A 2xx response returns its JSON body as-is, whatever its shape. A body
    /// that isn't JSON becomes `{"success": false, "error": <text>}`. Any
    /// other status becomes [`UlazAiError::Api`].
    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, path, "dispatching request");
        let start = Instant::now();

        let mut req = self
            .http
            .request(method, &url)
            .headers(self.headers.clone())
            .timeout(self.timeout);

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "request completed"
        );

        let parsed: Option<Value> = serde_json::from_str(&text).ok();

        if status.is_success() {
            return Ok(parsed.unwrap_or_else(|| invalid_json_payload(&text)));
        }

        let err = api_error(status, parsed);
        if let UlazAiError::Api { message, .. } = &err {
            warn!(status = status.as_u16(), path, message = message.as_str(), "API error");
        }
        Err(err)
    }
}

fn default_headers(api_key: &str) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|_| {
        UlazAiError::Authentication {
            message: "API key contains characters that are not allowed in an HTTP header"
                .into(),
        }
    })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    Ok(headers)
}

/// Stand-in for a success body that wasn't JSON.
fn invalid_json_payload(text: &str) -> Value {
    let error = if text.is_empty() {
        "Invalid JSON response"
    } else {
        text
    };
    json!({ "success": false, "error": error })
}

/// Build the error for a non-2xx response.
///
/// Only a JSON object contributes a message and payload; anything else falls
/// back to the reason phrase with an empty payload.
fn api_error(status: StatusCode, parsed: Option<Value>) -> UlazAiError {
    let reason = status.canonical_reason().unwrap_or("Request failed");

    match parsed {
        Some(Value::Object(payload)) => {
            let message = message_field(&payload, "error")
                .or_else(|| message_field(&payload, "message"))
                .unwrap_or_else(|| reason.to_string());
            UlazAiError::Api {
                status_code: status.as_u16(),
                message,
                payload,
            }
        }
        _ => UlazAiError::Api {
            status_code: status.as_u16(),
            message: reason.to_string(),
            payload: Map::new(),
        },
    }
}

/// A usable message in `payload[key]`: a non-empty string as-is, other
/// non-null values rendered as JSON.
fn message_field(payload: &Map<String, Value>, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Null | Value::Bool(false) | Value::String(_) => None,
        other => Some(other.to_string()),
    }
}
