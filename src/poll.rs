use std::future::Future;

use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::{Result, UlazAiError};
use crate::models::WaitOptions;

/// Call `fetch` every `poll_interval` until `status_of` yields one of
/// `terminal`, or fail with [`UlazAiError::Timeout`] once the deadline passes.
///
/// The deadline is checked before each fetch, so a zero timeout never hits
/// the network. Errors from `fetch` end the wait immediately.
pub(crate) async fn poll_until_terminal<F, Fut>(
    id: &str,
    mut fetch: F,
    status_of: impl Fn(&Value) -> String,
    terminal: &[&str],
    opts: &WaitOptions,
) -> Result<Value>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let deadline = Instant::now() + opts.timeout;

    loop {
        if Instant::now() >= deadline {
            warn!(id, timeout_secs = opts.timeout.as_secs_f64(), "poll deadline elapsed");
            return Err(UlazAiError::Timeout {
                id: id.to_string(),
                timeout: opts.timeout,
            });
        }

        let payload = fetch().await?;

        if let Some(ref cb) = opts.on_progress {
            cb(&payload);
        }

        let status = status_of(&payload);
        debug!(id, status = status.as_str(), "polled job status");

        if terminal.iter().any(|t| t.eq_ignore_ascii_case(&status)) {
            return Ok(payload);
        }

        tokio::time::sleep(opts.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::models::{image_status, video_status, TERMINAL_STATUSES};

    fn opts(timeout_secs: u64, interval_secs: u64) -> WaitOptions {
        WaitOptions::image()
            .timeout(Duration::from_secs(timeout_secs))
            .poll_interval(Duration::from_secs(interval_secs))
    }

    #[tokio::test(start_paused = true)]
    async fn returns_on_third_fetch_after_two_sleeps() {
        let mut responses = vec![
            json!({"status": "processing"}),
            json!({"status": "processing"}),
            json!({"status": "completed", "url": "https://cdn/x.png"}),
        ]
        .into_iter();
        let mut calls = 0;
        let start = Instant::now();

        let payload = poll_until_terminal(
            "gen_1",
            || {
                calls += 1;
                let next = responses.next().unwrap_or(Value::Null);
                async move { Ok(next) }
            },
            image_status,
            TERMINAL_STATUSES,
            &opts(300, 2),
        )
        .await
        .unwrap();

        assert_eq!(calls, 3);
        assert_eq!(payload["url"], "https://cdn/x.png");
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(4), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(6), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn failed_is_terminal_and_case_insensitive() {
        let payload = poll_until_terminal(
            "job_9",
            || async { Ok(json!({"job": {"status": "FAILED"}, "error": "nsfw"})) },
            video_status,
            TERMINAL_STATUSES,
            &opts(600, 3),
        )
        .await
        .unwrap();

        assert_eq!(payload["error"], "nsfw");
    }

    #[tokio::test(start_paused = true)]
    async fn times_out_with_id_and_timeout() {
        let calls = AtomicUsize::new(0);

        let err = poll_until_terminal(
            "gen_slow",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(json!({"status": "processing"})) }
            },
            image_status,
            TERMINAL_STATUSES,
            &opts(5, 2),
        )
        .await
        .unwrap_err();

        // fetches at t=0, 2 and 4; the check at t=6 is past the deadline
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match &err {
            UlazAiError::Timeout { id, timeout } => {
                assert_eq!(id, "gen_slow");
                assert_eq!(*timeout, Duration::from_secs(5));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        let msg = err.to_string();
        assert!(msg.contains("gen_slow"));
        assert!(msg.contains("5s"));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_timeout_never_fetches() {
        let calls = AtomicUsize::new(0);

        let result = poll_until_terminal(
            "gen_0",
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(json!({"status": "completed"})) }
            },
            image_status,
            TERMINAL_STATUSES,
            &opts(0, 1),
        )
        .await;

        assert!(matches!(result, Err(UlazAiError::Timeout { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_error_stops_the_wait() {
        let result = poll_until_terminal(
            "gen_404",
            || async {
                Err(UlazAiError::Api {
                    status_code: 404,
                    message: "Not found".into(),
                    payload: Default::default(),
                })
            },
            image_status,
            TERMINAL_STATUSES,
            &opts(300, 2),
        )
        .await;

        assert_eq!(result.unwrap_err().status_code(), Some(404));
    }

    #[tokio::test(start_paused = true)]
    async fn progress_callback_sees_every_payload() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let wait = opts(60, 1).on_progress(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut n = 0;

        poll_until_terminal(
            "gen_cb",
            || {
                n += 1;
                let status = if n < 4 { "queued" } else { "completed" };
                async move { Ok(json!({"data": {"status": status}})) }
            },
            image_status,
            TERMINAL_STATUSES,
            &wait,
        )
        .await
        .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 4);
    }
}
