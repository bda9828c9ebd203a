use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

/// Statuses after which a generation job won't change anymore.
///
/// `failed` counts as terminal; inspect the returned payload to tell the two apart.
pub const TERMINAL_STATUSES: &[&str] = &["completed", "failed"];

/// Body for `POST /api/v1/generate/`.
///
/// Optional fields left blank are not sent. Extra fields are merged last and
/// overwrite anything set before them, `prompt` and `model` included.
///
/// ```
/// use ulazai::ImageRequest;
///
/// let req = ImageRequest::new("a lighthouse at dusk", "nano-banana-pro")
///     .size("1024x1024")
///     .google_search(true)
///     .extra("seed", 42);
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ImageRequest {
    prompt: String,
    model: String,
    #[serde(skip_serializing_if = "is_blank")]
    size: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<ImageInput>,
    #[serde(skip)]
    extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
struct ImageInput {
    google_search: bool,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            size: None,
            quality: None,
            input: None,
            extra: Map::new(),
        }
    }

    /// e.g. "1024x1024" or an aspect ratio such as "16:9", depending on the model.
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    /// Sent as `input.google_search`.
    pub fn google_search(mut self, enabled: bool) -> Self {
        self.input = Some(ImageInput {
            google_search: enabled,
        });
        self
    }

    /// Add one field the SDK has no named setter for.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Add several extra fields at once.
    pub fn extra_fields(mut self, fields: Map<String, Value>) -> Self {
        self.extra.extend(fields);
        self
    }

    pub(crate) fn to_body(&self) -> serde_json::Result<Value> {
        Ok(merge_extra(serde_json::to_value(self)?, &self.extra))
    }
}

/// Body for `POST /api/v1/video-studio/generate/`.
///
/// Same merge rules as [`ImageRequest`]: a zero duration or blank string is
/// not sent, and extra fields win over everything else.
#[derive(Debug, Clone, Serialize)]
pub struct VideoRequest {
    model_slug: String,
    prompt: String,
    #[serde(skip_serializing_if = "is_blank")]
    aspect_ratio: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    duration_seconds: Option<u32>,
    #[serde(skip_serializing_if = "is_blank")]
    quality_mode: Option<String>,
    #[serde(skip)]
    extra: Map<String, Value>,
}

impl VideoRequest {
    pub fn new(model_slug: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_slug: model_slug.into(),
            prompt: prompt.into(),
            aspect_ratio: None,
            duration_seconds: None,
            quality_mode: None,
            extra: Map::new(),
        }
    }

    pub fn aspect_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.aspect_ratio = Some(ratio.into());
        self
    }

    pub fn duration_seconds(mut self, seconds: u32) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn quality_mode(mut self, mode: impl Into<String>) -> Self {
        self.quality_mode = Some(mode.into());
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn extra_fields(mut self, fields: Map<String, Value>) -> Self {
        self.extra.extend(fields);
        self
    }

    pub(crate) fn to_body(&self) -> serde_json::Result<Value> {
        Ok(merge_extra(serde_json::to_value(self)?, &self.extra))
    }
}

/// Polling config for `wait_for_image` / `wait_for_video`.
pub struct WaitOptions {
    /// Total time budget for the wait, not per request.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Called with every fetched status payload, the terminal one included.
    #[allow(clippy::type_complexity)]
    pub on_progress: Option<Box<dyn Fn(&Value) + Send + Sync>>,
}

impl WaitOptions {
    /// 300s timeout, polling every 2s.
    pub fn image() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(2),
            on_progress: None,
        }
    }

    /// 600s timeout, polling every 3s.
    pub fn video() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            poll_interval: Duration::from_secs(3),
            on_progress: None,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn on_progress(mut self, cb: impl Fn(&Value) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Box::new(cb));
        self
    }
}

impl std::fmt::Debug for WaitOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitOptions")
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

/// Lower-cased status of an image generation payload.
///
/// Looks at `status`, then `data.status`, then `generation.status`. Returns
/// `""` when none of them holds a non-empty string.
pub fn image_status(payload: &Value) -> String {
    first_status(payload, &["/status", "/data/status", "/generation/status"])
}

/// Lower-cased status of a video job payload: `job.status`, then `status`.
pub fn video_status(payload: &Value) -> String {
    first_status(payload, &["/job/status", "/status"])
}

/// Case-insensitive membership in [`TERMINAL_STATUSES`].
pub fn is_terminal_status(status: &str) -> bool {
    TERMINAL_STATUSES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(status))
}

fn first_status(payload: &Value, pointers: &[&str]) -> String {
    pointers
        .iter()
        .find_map(|p| {
            payload
                .pointer(p)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
        })
        .unwrap_or("")
        .to_lowercase()
}

/// Shallow merge: an extra `input` replaces the nested object wholesale.
fn merge_extra(body: Value, extra: &Map<String, Value>) -> Value {
    match body {
        Value::Object(mut map) => {
            for (k, v) in extra {
                map.insert(k.clone(), v.clone());
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn is_blank(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, str::is_empty)
}

fn is_zero(v: &Option<u32>) -> bool {
    v.map_or(true, |n| n == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_body_only_carries_required_fields_by_default() {
        let body = ImageRequest::new("a cat", "flux").to_body().unwrap();
        assert_eq!(body, json!({"prompt": "a cat", "model": "flux"}));
    }

    #[test]
    fn image_body_nests_google_search_under_input() {
        let body = ImageRequest::new("news today", "nano-banana-pro")
            .size("1024x1024")
            .quality("hd")
            .google_search(true)
            .to_body()
            .unwrap();

        assert_eq!(
            body,
            json!({
                "prompt": "news today",
                "model": "nano-banana-pro",
                "size": "1024x1024",
                "quality": "hd",
                "input": {"google_search": true}
            })
        );
    }

    #[test]
    fn google_search_false_is_still_sent() {
        let body = ImageRequest::new("p", "m")
            .google_search(false)
            .to_body()
            .unwrap();
        assert_eq!(body["input"], json!({"google_search": false}));
    }

    #[test]
    fn blank_optional_strings_are_omitted() {
        let body = ImageRequest::new("p", "m")
            .size("")
            .quality("")
            .to_body()
            .unwrap();
        assert!(body.get("size").is_none());
        assert!(body.get("quality").is_none());
    }

    #[test]
    fn extra_overrides_named_and_required_fields() {
        let body = ImageRequest::new("p", "m")
            .size("1024")
            .google_search(true)
            .extra("size", "override")
            .extra("model", "other-model")
            .extra("input", json!({"reference": "x"}))
            .to_body()
            .unwrap();

        assert_eq!(body["size"], "override");
        assert_eq!(body["model"], "other-model");
        assert_eq!(body["input"], json!({"reference": "x"}));
    }

    #[test]
    fn video_body_skips_zero_duration() {
        let body = VideoRequest::new("veo-3", "a drone shot")
            .aspect_ratio("16:9")
            .duration_seconds(0)
            .quality_mode("fast")
            .to_body()
            .unwrap();

        assert_eq!(
            body,
            json!({
                "model_slug": "veo-3",
                "prompt": "a drone shot",
                "aspect_ratio": "16:9",
                "quality_mode": "fast"
            })
        );
    }

    #[test]
    fn video_extra_fields_win() {
        let mut fields = Map::new();
        fields.insert("duration_seconds".into(), json!(10));
        fields.insert("audio".into(), json!(true));

        let body = VideoRequest::new("kling", "waves")
            .duration_seconds(5)
            .extra_fields(fields)
            .to_body()
            .unwrap();

        assert_eq!(body["duration_seconds"], 10);
        assert_eq!(body["audio"], true);
    }

    #[test]
    fn image_status_follows_lookup_order() {
        assert_eq!(image_status(&json!({"status": "Completed"})), "completed");
        assert_eq!(
            image_status(&json!({"data": {"status": "PROCESSING"}})),
            "processing"
        );
        assert_eq!(
            image_status(&json!({"generation": {"status": "failed"}})),
            "failed"
        );
        assert_eq!(
            image_status(&json!({
                "status": "queued",
                "data": {"status": "completed"}
            })),
            "queued"
        );
    }

    #[test]
    fn image_status_skips_empty_and_non_string_values() {
        let payload = json!({
            "status": "",
            "data": {"status": null},
            "generation": {"status": "completed"}
        });
        assert_eq!(image_status(&payload), "completed");
        assert_eq!(image_status(&json!({"data": "oops"})), "");
        assert_eq!(image_status(&json!([1, 2, 3])), "");
    }

    #[test]
    fn video_status_prefers_nested_job() {
        assert_eq!(
            video_status(&json!({"status": "ok", "job": {"status": "COMPLETED"}})),
            "completed"
        );
        assert_eq!(video_status(&json!({"status": "failed"})), "failed");
        assert_eq!(video_status(&json!({"job": {}})), "");
    }

    #[test]
    fn terminal_statuses_match_case_insensitively() {
        assert!(is_terminal_status("completed"));
        assert!(is_terminal_status("FAILED"));
        assert!(!is_terminal_status("processing"));
        assert!(!is_terminal_status(""));
    }

    #[test]
    fn wait_defaults() {
        let image = WaitOptions::image();
        assert_eq!(image.timeout, Duration::from_secs(300));
        assert_eq!(image.poll_interval, Duration::from_secs(2));

        let video = WaitOptions::video().poll_interval(Duration::from_millis(500));
        assert_eq!(video.timeout, Duration::from_secs(600));
        assert_eq!(video.poll_interval, Duration::from_millis(500));
    }
}
