// src/api/mod.rs
//! Graph API access: pacing, retries, pagination and typed endpoint calls.
//!
//! Callers depend on [`GraphRepository`]; HTTP details stay behind
//! [`HttpTransport`] so every layer above it can be exercised offline.

pub mod client;
mod endpoints;
pub mod pagination;
pub mod rate_limiter;
pub mod request;
pub mod responses;
pub mod retry;
#[cfg(test)]
pub(crate) mod test_support;
pub mod transport;

use crate::error::AppError;
use crate::model::{
    AdAccount, Campaign, CampaignInsights, Conversation, NewPost, PagePost, PhotoReceipt,
    PhotoUpload, PostReceipt, StatusUpdate,
};
use crate::types::{AccessToken, AdAccountId, CampaignId, PageId};

/// The Graph calls the dashboard needs.
///
/// Business logic depends on this trait, never on HTTP details.
#[async_trait::async_trait]
pub trait GraphRepository: Send + Sync {
    async fn ad_accounts(&self, token: &AccessToken) -> Result<Vec<AdAccount>, AppError>;

    async fn campaigns(
        &self,
        account: &AdAccountId,
        token: &AccessToken,
    ) -> Result<Vec<Campaign>, AppError>;

    /// Sets a campaign to `ACTIVE` or `PAUSED`.
    ///
    /// Any other status is rejected before a request is made.
    async fn update_campaign_status(
        &self,
        campaign: &CampaignId,
        status: &str,
        token: &AccessToken,
    ) -> Result<StatusUpdate, AppError>;

    async fn upload_photo(
        &self,
        page: &PageId,
        upload: PhotoUpload,
        token: &AccessToken,
    ) -> Result<PhotoReceipt, AppError>;

    async fn create_post(
        &self,
        page: &PageId,
        post: &NewPost,
        token: &AccessToken,
    ) -> Result<PostReceipt, AppError>;

    /// Insights over the first date window that has data, or a placeholder.
    async fn campaign_insights(
        &self,
        campaign: &CampaignId,
        token: &AccessToken,
    ) -> Result<CampaignInsights, AppError>;

    /// Insights for many campaigns. Campaigns whose lookup fails are left out.
    async fn campaign_insights_batch(
        &self,
        campaigns: &[CampaignId],
        token: &AccessToken,
    ) -> Result<Vec<CampaignInsights>, AppError>;

    async fn page_posts(
        &self,
        page: &PageId,
        max_items: Option<usize>,
        token: &AccessToken,
    ) -> Result<Vec<PagePost>, AppError>;

    /// Inbox threads of a page, most recently updated first.
    async fn page_conversations(
        &self,
        page: &PageId,
        max_items: Option<usize>,
        token: &AccessToken,
    ) -> Result<Vec<Conversation>, AppError>;
}

pub use client::{ClientSettings, GraphClient};
pub use rate_limiter::{
    settle_in_chunks, BatchOptions, LimiterStats, Pace, RateLimitConfig, RateLimiter,
};
pub use request::{GraphRequest, RequestOptions};
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, RawResponse, ReqwestTransport};
