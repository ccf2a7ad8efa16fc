// src/api/rate_limiter.rs
//! Request admission for one Graph API client.
//!
//! A [`RateLimiter`] bounds how many requests are in flight and how closely
//! their starts follow each other. Callers beyond the concurrency ceiling
//! wait in FIFO order; the limiter only ever delays work, it never fails it.
//!
//! The state is shared by every clone of a limiter, so all calls made
//! through one client throttle against one quota. Separate limiters never
//! interact.

use crate::constants::{
    BATCH_DELAY, BATCH_MAX_CONCURRENT, BURST_DELAY, CONCURRENT_LIMIT, RATE_LIMIT_DELAY,
};
use futures::future::join_all;
use parking_lot::Mutex;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::time::Instant;

/// Spacing applied before a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pace {
    /// Regular spacing for fresh requests.
    #[default]
    Normal,
    /// Short spacing for pagination continuations.
    Burst,
}

/// Tunables of a [`RateLimiter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub delay: Duration,
    pub burst_delay: Duration,
    pub concurrent_limit: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            delay: RATE_LIMIT_DELAY,
            burst_delay: BURST_DELAY,
            concurrent_limit: CONCURRENT_LIMIT,
        }
    }
}

/// How [`RateLimiter::execute_batch`] chunks its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    pub max_concurrent: usize,
    pub delay: Duration,
    pub pace: Pace,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: BATCH_MAX_CONCURRENT,
            delay: BATCH_DELAY,
            pace: Pace::Normal,
        }
    }
}

/// Point-in-time view of the limiter, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterStats {
    pub active: usize,
    pub queued: usize,
}

struct RateLimiterState {
    config: RateLimitConfig,
    /// Tokio's semaphore hands released permits to waiters in arrival order.
    slots: Semaphore,
    /// Scheduled start of the most recent request.
    last_start: Mutex<Option<Instant>>,
    active: AtomicUsize,
    queued: AtomicUsize,
}

/// Shared throttle for every request issued by one client.
#[derive(Clone)]
pub struct RateLimiter {
    state: Arc<RateLimiterState>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        let limit = config.concurrent_limit.max(1);
        Self {
            state: Arc::new(RateLimiterState {
                slots: Semaphore::new(limit),
                config,
                last_start: Mutex::new(None),
                active: AtomicUsize::new(0),
                queued: AtomicUsize::new(0),
            }),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.state.config
    }

    pub fn stats(&self) -> LimiterStats {
        LimiterStats {
            active: self.state.active.load(Ordering::SeqCst),
            queued: self.state.queued.load(Ordering::SeqCst),
        }
    }

    /// Runs `work` once a slot is free and the spacing for `pace` has passed.
    ///
    /// Whatever `work` resolves to is handed back to the caller unchanged.
    /// Dropping the returned future frees the slot.
    pub async fn execute<Fut, T>(&self, work: Fut, pace: Pace) -> T
    where
        Fut: Future<Output = T>,
    {
        let _permit = self.admit().await;
        self.wait_for_spacing(pace).await;

        let _active = Counted::enter(&self.state.active);
        work.await
    }

    /// Runs `work` in chunks of `options.max_concurrent`, pausing
    /// `options.delay` between chunks.
    ///
    /// Each item is admitted through [`execute`](Self::execute) with
    /// `options.pace`, so items must be single requests that do not touch
    /// this limiter themselves. Failed items are logged and left out of the
    /// result; see [`settle_in_chunks`].
    pub async fn execute_batch<I, Fut, T, E>(&self, work: I, options: BatchOptions) -> Vec<T>
    where
        I: IntoIterator<Item = Fut>,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let pace = options.pace;
        settle_in_chunks(
            work.into_iter().map(move |item| self.execute(item, pace)),
            options,
        )
        .await
    }

    async fn admit(&self) -> SemaphorePermit<'_> {
        if let Ok(permit) = self.state.slots.try_acquire() {
            return permit;
        }

        let _queued = Counted::enter(&self.state.queued);
        log::debug!(
            "Concurrency ceiling ({}) reached, request queued",
            self.state.config.concurrent_limit
        );
        match self.state.slots.acquire().await {
            Ok(permit) => permit,
            // `slots` is private and nothing calls `close` on it.
            Err(_) => unreachable!("rate limiter semaphore closed"),
        }
    }

    /// Reserves the next start time and sleeps until it arrives.
    async fn wait_for_spacing(&self, pace: Pace) {
        let delay = match pace {
            Pace::Normal => self.state.config.delay,
            Pace::Burst => self.state.config.burst_delay,
        };

        let start_at = {
            let mut last = self.state.last_start.lock();
            let now = Instant::now();
            let at = match *last {
                Some(previous) => (previous + delay).max(now),
                None => now,
            };
            *last = Some(at);
            at
        };

        if start_at > Instant::now() {
            tokio::time::sleep_until(start_at).await;
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Settles `work` in chunks of `options.max_concurrent` without admission.
///
/// Every item of a chunk settles before the next chunk starts, with
/// `options.delay` between chunks. Failed items are logged and left out of
/// the result; the successes keep their relative order.
///
/// Use this for composite items, such as a cascade of calls each of which
/// goes through a client's limiter on its own. Holding a slot for the whole
/// item would starve its inner requests.
pub async fn settle_in_chunks<I, Fut, T, E>(work: I, options: BatchOptions) -> Vec<T>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let chunk_size = options.max_concurrent.max(1);
    let mut pending = work.into_iter().enumerate().peekable();
    let mut results = Vec::new();
    let mut failed = 0usize;

    while pending.peek().is_some() {
        let (indices, chunk): (Vec<usize>, Vec<Fut>) =
            pending.by_ref().take(chunk_size).unzip();
        let settled = join_all(chunk).await;

        for (index, outcome) in indices.into_iter().zip(settled) {
            match outcome {
                Ok(value) => results.push(value),
                Err(e) => {
                    failed += 1;
                    log::warn!("Batch item {} failed and was dropped: {}", index, e);
                }
            }
        }

        if pending.peek().is_some() && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
    }

    if failed > 0 {
        log::info!(
            "Batch finished with {} succeeded, {} dropped",
            results.len(),
            failed
        );
    }
    results
}

/// Holds a counter incremented for as long as it lives.
struct Counted<'a>(&'a AtomicUsize);

impl<'a> Counted<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Counted<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
