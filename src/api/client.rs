// src/api/client.rs
//! The Graph client: transport, rate limiter and retry policy in one handle.
//!
//! Every request an endpoint helper issues goes through [`GraphClient::send`],
//! which admits it through the shared limiter and then runs the retry loop
//! inside the admitted slot. Retries therefore never jump the queue.

use super::pagination::fetch_all_pages;
use super::rate_limiter::{
    settle_in_chunks, BatchOptions, LimiterStats, Pace, RateLimitConfig, RateLimiter,
};
use super::request::{GraphRequest, RequestOptions};
use super::retry::{execute_with_retry, RetryPolicy};
use super::transport::{HttpTransport, ReqwestTransport};
use crate::constants::{GRAPH_API_BASE_URL, MAX_PAGES, PAGE_DELAY};
use crate::error::AppError;
use crate::types::AccessToken;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Tunables of a [`GraphClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Versioned API root, e.g. `https://graph.facebook.com/v19.0`.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub retry: RetryPolicy,
    pub rate_limit: RateLimitConfig,
    /// Hard cap on pages followed by one paginated read.
    pub max_pages: usize,
    /// Pause before each continuation page.
    pub page_delay: Duration,
    pub batch: BatchOptions,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: GRAPH_API_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            rate_limit: RateLimitConfig::default(),
            max_pages: MAX_PAGES,
            page_delay: PAGE_DELAY,
            batch: BatchOptions::default(),
        }
    }
}

impl ClientSettings {
    /// Settings without pacing or backoff, for local mock servers.
    ///
    /// Limits, page cap and timeouts keep their production values.
    pub fn unpaced(base_url: impl Into<String>) -> Self {
        let defaults = Self::default();
        Self {
            base_url: base_url.into(),
            retry: RetryPolicy {
                base_delay: Duration::from_millis(1),
                max_jitter: Duration::ZERO,
                ..defaults.retry
            },
            rate_limit: RateLimitConfig {
                delay: Duration::ZERO,
                burst_delay: Duration::ZERO,
                ..defaults.rate_limit
            },
            page_delay: Duration::ZERO,
            batch: BatchOptions {
                delay: Duration::ZERO,
                ..defaults.batch
            },
            ..defaults
        }
    }
}

/// Shared handle for talking to the Graph API.
///
/// Cloning is cheap and clones share the limiter, so concurrency and pacing
/// hold across every clone.
#[derive(Clone)]
pub struct GraphClient {
    transport: Arc<dyn HttpTransport>,
    limiter: RateLimiter,
    settings: ClientSettings,
}

impl GraphClient {
    /// Creates a client backed by a pooled reqwest transport.
    pub fn new(settings: ClientSettings) -> Result<Self, AppError> {
        let transport = ReqwestTransport::new(settings.connect_timeout)?;
        Ok(Self::with_transport(Arc::new(transport), settings))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>, settings: ClientSettings) -> Self {
        let limiter = RateLimiter::new(settings.rate_limit.clone());
        Self {
            transport,
            limiter,
            settings,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn stats(&self) -> LimiterStats {
        self.limiter.stats()
    }

    /// Runs one logical call: admission, pacing, then the retry loop.
    pub async fn send(&self, request: &GraphRequest, pace: Pace) -> Result<Value, AppError> {
        self.limiter
            .execute(
                execute_with_retry(
                    self.transport.as_ref(),
                    request,
                    &self.settings.base_url,
                    &self.settings.retry,
                ),
                pace,
            )
            .await
    }

    /// Fetches a URL the API handed out, such as a `paging.next` cursor.
    ///
    /// The URL already carries its parameters and token and is sent as is.
    pub async fn follow_url(&self, url: &str, pace: Pace) -> Result<Value, AppError> {
        self.send(&GraphRequest::absolute(url), pace).await
    }

    /// Calls `endpoint` with the given options and token, returning raw JSON.
    pub async fn make_request(
        &self,
        endpoint: &str,
        options: RequestOptions,
        token: &AccessToken,
    ) -> Result<Value, AppError> {
        let request = GraphRequest::endpoint(endpoint, options, token);
        self.send(&request, Pace::Normal).await
    }

    /// Like [`make_request`](Self::make_request), deserializing the body.
    pub async fn make_request_as<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        token: &AccessToken,
    ) -> Result<T, AppError> {
        let value = self.make_request(endpoint, options, token).await?;
        serde_json::from_value(value).map_err(|e| {
            AppError::MalformedResponse(format!("unexpected response from {}: {}", endpoint, e))
        })
    }

    /// Reads every page of a list endpoint, up to `max_items` items.
    pub async fn get_paginated_data<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
        token: &AccessToken,
        max_items: Option<usize>,
    ) -> Result<Vec<T>, AppError> {
        let first = GraphRequest::endpoint(endpoint, options, token);
        fetch_all_pages(self, first, max_items).await
    }

    /// Runs composite calls in chunks, using the batch settings.
    ///
    /// Each item is expected to issue its requests through this client, so
    /// every request is admitted by the limiter on its own and the item as a
    /// whole holds no slot. Failures are logged and dropped; see
    /// [`settle_in_chunks`].
    pub async fn batch<I, Fut, T, E>(&self, work: I) -> Vec<T>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        settle_in_chunks(work, self.settings.batch).await
    }
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("base_url", &self.settings.base_url)
            .field("stats", &self.limiter.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::{Scripted, ScriptedTransport};
    use serde::Deserialize;
    use serde_json::json;

    fn token() -> AccessToken {
        AccessToken::new("EAAtesttokenvalue123").unwrap()
    }

    #[test]
    fn test_default_settings_follow_constants() {
        let settings = ClientSettings::default();
        assert_eq!(settings.base_url, GRAPH_API_BASE_URL);
        assert_eq!(settings.max_pages, 10);
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.retry.timeout, Duration::from_secs(30));
        assert_eq!(settings.rate_limit.concurrent_limit, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_make_request_sends_token_and_params() {
        let transport = Arc::new(ScriptedTransport::new([Scripted::json(
            200,
            json!({ "id": "1", "name": "Acme" }),
        )]));
        let client =
            GraphClient::with_transport(transport.clone(), ClientSettings::unpaced("https://g.test/v1"));

        let value = client
            .make_request("me", RequestOptions::get().fields(&["id", "name"]), &token())
            .await
            .unwrap();

        assert_eq!(value["name"], "Acme");
        assert_eq!(transport.requests()[0].url.path(), "/v1/me");
        assert_eq!(transport.query_param(0, "fields").as_deref(), Some("id,name"));
        assert_eq!(
            transport.query_param(0, "access_token").as_deref(),
            Some("EAAtesttokenvalue123")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_make_request_as_reports_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Named {
            #[allow(dead_code)]
            name: String,
        }

        let transport = Arc::new(ScriptedTransport::new([Scripted::json(200, json!({ "id": "1" }))]));
        let client = GraphClient::with_transport(transport, ClientSettings::unpaced("https://g.test/v1"));

        let err = client
            .make_request_as::<Named>("me", RequestOptions::get(), &token())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_calls_are_spaced_by_the_limiter() {
        let transport = Arc::new(ScriptedTransport::new([
            Scripted::json(200, json!({})),
            Scripted::json(200, json!({})),
        ]));
        let mut settings = ClientSettings::unpaced("https://g.test/v1");
        settings.rate_limit.delay = Duration::from_millis(200);
        let client = GraphClient::with_transport(transport.clone(), settings);

        client.make_request("a", RequestOptions::get(), &token()).await.unwrap();
        client.make_request("b", RequestOptions::get(), &token()).await.unwrap();

        let times = transport.call_times();
        assert!(times[1] - times[0] >= Duration::from_millis(200));
        assert_eq!(client.stats(), LimiterStats { active: 0, queued: 0 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_happen_inside_the_admitted_slot() {
        let transport = Arc::new(ScriptedTransport::new([
            Scripted::text(500, "boom"),
            Scripted::json(200, json!({ "ok": true })),
        ]));
        let client =
            GraphClient::with_transport(transport.clone(), ClientSettings::unpaced("https://g.test/v1"));

        let value = client.make_request("x", RequestOptions::get(), &token()).await.unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(transport.calls(), 2);
    }
}
