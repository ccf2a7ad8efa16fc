// src/api/test_support.rs
//! Scripted transport double for exercising the access layer offline.

use super::request::PreparedRequest;
use super::transport::{HttpTransport, RawResponse};
use crate::error::AppError;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// One canned reaction of the transport.
pub enum Scripted {
    Respond(RawResponse),
    /// Never answers; only a timeout ends the attempt.
    Hang,
}

impl Scripted {
    pub fn json(status: u16, body: Value) -> Self {
        Self::Respond(RawResponse::new(status, body.to_string()))
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::Respond(RawResponse::new(status, body))
    }

    pub fn graph_error(code: i64, message: &str) -> Self {
        Self::json(
            400,
            serde_json::json!({
                "error": { "message": message, "type": "OAuthException", "code": code }
            }),
        )
    }
}

/// Replays queued responses in order and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    seen: Mutex<Vec<(Instant, PreparedRequest)>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn requests(&self) -> Vec<PreparedRequest> {
        self.seen.lock().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.seen.lock().iter().map(|(at, _)| *at).collect()
    }

    /// Value of query parameter `key` on request number `index`.
    pub fn query_param(&self, index: usize, key: &str) -> Option<String> {
        self.seen.lock().get(index).and_then(|(_, r)| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.into_owned())
        })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, AppError> {
        self.seen.lock().push((Instant::now(), request.clone()));
        let step = self.script.lock().pop_front();
        match step {
            Some(Scripted::Respond(mut raw)) => {
                raw.url = request.redacted_url();
                Ok(raw)
            }
            Some(Scripted::Hang) => std::future::pending().await,
            None => panic!("no scripted response left for {}", request.url),
        }
    }
}

/// Answers by URL path, repeating the same response for every hit.
///
/// With a latency set, every answer is held back on the tokio clock, and the
/// highest number of requests pending at once is recorded.
#[derive(Default)]
pub struct RoutedTransport {
    routes: Vec<(String, Scripted)>,
    latency: Duration,
    seen: Mutex<Vec<PreparedRequest>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RoutedTransport {
    pub fn route(mut self, path: &str, step: Scripted) -> Self {
        self.routes.push((path.to_string(), step));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn hits(&self, path: &str) -> usize {
        self.seen
            .lock()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HttpTransport for RoutedTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, AppError> {
        self.seen.lock().push(request.clone());
        let pending = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(pending, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let step = self
            .routes
            .iter()
            .find(|(path, _)| path == request.url.path())
            .map(|(_, step)| step);
        match step {
            Some(Scripted::Respond(raw)) => {
                let mut raw = raw.clone();
                raw.url = request.redacted_url();
                Ok(raw)
            }
            Some(Scripted::Hang) => std::future::pending().await,
            None => panic!("no route for {}", request.url.path()),
        }
    }
}
