// src/constants.rs
//! Domain constants that define the operational boundaries of the client.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you how the client
//! behaves towards the Graph API: how long it waits, how often it retries,
//! how fast it issues requests and how far it follows pagination.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Graph API endpoint
// ---------------------------------------------------------------------------

/// Versioned root of every Graph API call.
pub const GRAPH_API_BASE_URL: &str = "https://graph.facebook.com/v19.0";

/// Query parameter that carries the access token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

// ---------------------------------------------------------------------------
// Retry boundaries
// ---------------------------------------------------------------------------

/// How long a single HTTP attempt may take before it is cancelled.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Attempts made for one logical call before the last error surfaces.
pub const MAX_RETRIES: u32 = 3;

/// Backoff before the second attempt. Doubles for every further attempt.
pub const BASE_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound of the random jitter added on top of each backoff.
pub const MAX_RETRY_JITTER: Duration = Duration::from_millis(1000);

// ---------------------------------------------------------------------------
// Request pacing
// ---------------------------------------------------------------------------

/// Minimum spacing between the starts of two ordinary requests.
pub const RATE_LIMIT_DELAY: Duration = Duration::from_millis(200);

/// Spacing used for pagination continuations.
///
/// The next-page URL was handed out by the server for work it already
/// admitted, so follow-up pages may be requested faster.
pub const BURST_DELAY: Duration = Duration::from_millis(50);

/// Maximum number of requests in flight at once for one client.
pub const CONCURRENT_LIMIT: usize = 5;

// ---------------------------------------------------------------------------
// Pagination boundaries
// ---------------------------------------------------------------------------

/// Hard cap on pages followed for one list call.
///
/// Bounds the cost of a list call even if the server keeps returning a
/// `next` cursor forever.
pub const MAX_PAGES: usize = 10;

/// Pause inserted before each continuation page.
pub const PAGE_DELAY: Duration = Duration::from_millis(100);

/// Page size requested from list endpoints.
pub const GRAPH_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Batch execution
// ---------------------------------------------------------------------------

/// Items started together in one batch chunk.
pub const BATCH_MAX_CONCURRENT: usize = 3;

/// Pause between two batch chunks.
pub const BATCH_DELAY: Duration = Duration::from_millis(1000);

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

/// Length of the explicit time range tried last by the insights cascade.
pub const INSIGHTS_FALLBACK_RANGE_DAYS: i64 = 90;

/// Fields requested for campaign insights.
pub const CAMPAIGN_INSIGHT_FIELDS: &[&str] = &[
    "campaign_id",
    "campaign_name",
    "impressions",
    "reach",
    "clicks",
    "spend",
    "ctr",
    "cpc",
    "cpm",
    "frequency",
    "actions",
    "date_start",
    "date_stop",
];

// ---------------------------------------------------------------------------
// Error display
// ---------------------------------------------------------------------------

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Sync snapshots older than this are treated as missing.
pub const SYNC_SNAPSHOT_TTL_SECS: u64 = 6 * 60 * 60;
