// src/lib.rs
//! graphdesk library: a paced, retrying access layer for the Facebook Graph API.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `AppError`, `ErrorClass`, `ValidationError`
//! - **Configuration**: `AppConfig`, `ClientSettings`
//! - **Access layer**: `GraphClient`, `RateLimiter`, `RetryPolicy`, pagination
//! - **Endpoints**: `GraphRepository` and the model types it returns
//! - **Notices and sync**: `Notifier`, `CampaignSync`, `SyncStore`

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod model;
pub mod notify;
pub mod sync;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, ErrorClass, GraphErrorCode, GraphFailure};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{Action, AppConfig, CommandLineInput};

// --- Access Layer ---
pub use crate::api::{
    BatchOptions, ClientSettings, GraphClient, GraphRepository, GraphRequest, HttpTransport,
    LimiterStats, Pace, RateLimitConfig, RateLimiter, RawResponse, ReqwestTransport,
    RequestOptions, RetryPolicy,
};

// --- Domain Model ---
pub use crate::model::{
    ActionStat, AdAccount, Campaign, CampaignInsights, Conversation, InsightsRow, InsightsWindow,
    NewPost, PagePost, PhotoReceipt, PhotoUpload, PostReceipt, StatusUpdate,
};

// --- Domain Types ---
pub use crate::types::{
    AccessToken, AdAccountId, CampaignId, CampaignStatus, Id, PageId, PhotoId,
};

// --- Notices and Sync ---
pub use crate::notify::{report_error, LogNotifier, NoticeKind, Notifier};
pub use crate::sync::{CampaignSync, DiskSyncStore, MemorySyncStore, SyncSnapshot, SyncStore};
