// src/api/retry.rs
//! Reliable execution of one logical Graph call.
//!
//! Each attempt runs under its own deadline. A failed attempt is classified:
//! terminal failures surface immediately, retryable ones are attempted again
//! after an exponential backoff with jitter, up to the attempt limit.

use super::request::GraphRequest;
use super::responses::GraphErrorBody;
use super::transport::{HttpTransport, RawResponse};
use crate::constants::{
    BASE_RETRY_DELAY, ERROR_BODY_PREVIEW_LENGTH, MAX_RETRIES, MAX_RETRY_JITTER, REQUEST_TIMEOUT,
};
use crate::error::AppError;
use rand::Rng;
use serde_json::Value;
use std::time::Duration;

/// Retry configuration for resilient requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_jitter: Duration,
    /// Deadline of a single attempt.
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            base_delay: BASE_RETRY_DELAY,
            max_jitter: MAX_RETRY_JITTER,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`: `base * 2^(attempt-1)` plus jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self.base_delay.saturating_mul(1u32 << exponent);
        base.saturating_add(self.jitter())
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::rng().random_range(0..=max_ms))
    }
}

/// Issues `request` until it succeeds, fails terminally or runs out of
/// attempts, and returns the parsed JSON body.
pub async fn execute_with_retry(
    transport: &dyn HttpTransport,
    request: &GraphRequest,
    base_url: &str,
    policy: &RetryPolicy,
) -> Result<Value, AppError> {
    let prepared = request.prepare(base_url)?;
    let shown_url = prepared.redacted_url();
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let outcome = match tokio::time::timeout(policy.timeout, transport.send(&prepared)).await
        {
            Ok(Ok(raw)) => interpret_response(raw),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AppError::Timeout {
                url: shown_url.clone(),
                after: policy.timeout,
            }),
        };

        let error = match outcome {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if !error.is_retryable() {
            log::warn!(
                "{} {} failed with a {:?} error, not retrying: {}",
                prepared.method,
                shown_url,
                error.class(),
                error
            );
            return Err(error);
        }

        if attempt >= max_attempts {
            log::warn!(
                "{} {} failed after {} attempts: {}",
                prepared.method,
                shown_url,
                attempt,
                error
            );
            return Err(error);
        }

        let delay = policy.backoff(attempt);
        log::warn!(
            "Attempt {}/{} of {} {} failed ({}), retrying in {:?}",
            attempt,
            max_attempts,
            prepared.method,
            shown_url,
            error,
            delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

/// Turns a raw exchange into the response JSON or a classified error.
///
/// The transport status alone does not decide success: some Graph paths
/// answer 200 with an `error` object in the body.
pub fn interpret_response(raw: RawResponse) -> Result<Value, AppError> {
    let parsed = if raw.body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(&raw.body)
    };

    match parsed {
        Ok(value) => {
            if let Some(error) = value.get("error").filter(|e| e.is_object()) {
                let body: GraphErrorBody = serde_json::from_value(error.clone())?;
                return Err(AppError::from_graph(body.into_failure(Some(raw.status))));
            }
            if !raw.status.is_success() {
                return Err(status_error(&raw));
            }
            Ok(value)
        }
        Err(_) if !raw.status.is_success() => Err(status_error(&raw)),
        Err(e) => Err(AppError::MalformedResponse(format!(
            "{} from {}: {}",
            e,
            raw.url,
            preview(&raw.body)
        ))),
    }
}

fn status_error(raw: &RawResponse) -> AppError {
    AppError::HttpStatus {
        status: raw.status,
        url: raw.url.clone(),
        preview: preview(&raw.body),
    }
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect()
}
