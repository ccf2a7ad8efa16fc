// src/api/endpoints.rs
//! Typed Graph calls used by the dashboard.
//!
//! Each helper builds one request shape, sends it through the client and
//! maps the JSON into a model type. Inputs are validated before any network
//! traffic.

use super::client::GraphClient;
use super::request::RequestOptions;
use super::responses::PagedResponse;
use super::GraphRepository;
use crate::constants::{CAMPAIGN_INSIGHT_FIELDS, GRAPH_PAGE_SIZE};
use crate::error::AppError;
use crate::model::{
    AdAccount, Campaign, CampaignInsights, Conversation, InsightsRow, InsightsWindow, NewPost,
    PagePost, PhotoReceipt, PhotoUpload, PostReceipt, StatusUpdate,
};
use crate::types::{AccessToken, AdAccountId, CampaignId, CampaignStatus, PageId};
use futures::future::{BoxFuture, FutureExt};

fn page_limit(max_items: Option<usize>) -> usize {
    max_items.map_or(GRAPH_PAGE_SIZE, |max| max.clamp(1, GRAPH_PAGE_SIZE))
}

impl GraphClient {
    /// Fetches a campaign's insights, trying `windows` in order.
    ///
    /// The first window whose first row has any non-zero metric wins and no
    /// later window is requested. An auth failure aborts at once; other
    /// failures skip to the next window. If every window fails the last
    /// error is returned, otherwise an exhausted cascade yields a
    /// zero-filled placeholder marked as having no data.
    pub async fn campaign_insights_with(
        &self,
        campaign: &CampaignId,
        windows: &[InsightsWindow],
        token: &AccessToken,
    ) -> Result<CampaignInsights, AppError> {
        let endpoint = format!("{}/insights", campaign);
        let mut last_error = None;
        let mut answered = 0usize;

        for window in windows {
            let (key, value) = window.params();
            let options = RequestOptions::get()
                .fields(CAMPAIGN_INSIGHT_FIELDS)
                .param(key, value);

            let page: PagedResponse<InsightsRow> =
                match self.make_request_as(&endpoint, options, token).await {
                    Ok(page) => page,
                    Err(e) if e.is_token_error() => return Err(e),
                    Err(e) => {
                        log::warn!(
                            "Insights for campaign {} over {} failed: {}",
                            campaign,
                            window,
                            e
                        );
                        last_error = Some(e);
                        continue;
                    }
                };
            answered += 1;

            match page.data.into_iter().next() {
                Some(row) if row.is_meaningful() => {
                    log::debug!("Insights for campaign {} found over {}", campaign, window);
                    return Ok(CampaignInsights::found(campaign.clone(), row, window));
                }
                _ => log::debug!("No insights for campaign {} over {}", campaign, window),
            }
        }

        match last_error {
            Some(e) if answered == 0 => Err(e),
            _ => {
                log::info!(
                    "Campaign {} has no insights in any of {} windows",
                    campaign,
                    windows.len()
                );
                Ok(CampaignInsights::placeholder(campaign.clone()))
            }
        }
    }
}

#[async_trait::async_trait]
impl GraphRepository for GraphClient {
    async fn ad_accounts(&self, token: &AccessToken) -> Result<Vec<AdAccount>, AppError> {
        let options = RequestOptions::get()
            .fields(AdAccount::FIELDS)
            .param("limit", GRAPH_PAGE_SIZE);
        self.get_paginated_data("me/adaccounts", options, token, None)
            .await
    }

    async fn campaigns(
        &self,
        account: &AdAccountId,
        token: &AccessToken,
    ) -> Result<Vec<Campaign>, AppError> {
        let options = RequestOptions::get()
            .fields(Campaign::FIELDS)
            .param("limit", GRAPH_PAGE_SIZE);
        self.get_paginated_data(&format!("{}/campaigns", account), options, token, None)
            .await
    }

    async fn update_campaign_status(
        &self,
        campaign: &CampaignId,
        status: &str,
        token: &AccessToken,
    ) -> Result<StatusUpdate, AppError> {
        let status = CampaignStatus::parse(status)?;
        log::info!("Setting campaign {} to {}", campaign, status);

        let options = RequestOptions::post().param("status", status.as_str());
        self.make_request_as(campaign.as_str(), options, token).await
    }

    async fn upload_photo(
        &self,
        page: &PageId,
        upload: PhotoUpload,
        token: &AccessToken,
    ) -> Result<PhotoReceipt, AppError> {
        upload.validate()?;
        log::info!(
            "Uploading {} ({} bytes) to page {}",
            upload.file_name,
            upload.bytes.len(),
            page
        );

        let options = RequestOptions::post().multipart(upload);
        self.make_request_as(&format!("{}/photos", page), options, token)
            .await
    }

    async fn create_post(
        &self,
        page: &PageId,
        post: &NewPost,
        token: &AccessToken,
    ) -> Result<PostReceipt, AppError> {
        post.validate()?;
        let options = RequestOptions::post().json(post.to_body());
        self.make_request_as(&format!("{}/feed", page), options, token)
            .await
    }

    async fn campaign_insights(
        &self,
        campaign: &CampaignId,
        token: &AccessToken,
    ) -> Result<CampaignInsights, AppError> {
        let today = chrono::Utc::now().date_naive();
        self.campaign_insights_with(campaign, &InsightsWindow::default_cascade(today), token)
            .await
    }

    async fn campaign_insights_batch(
        &self,
        campaigns: &[CampaignId],
        token: &AccessToken,
    ) -> Result<Vec<CampaignInsights>, AppError> {
        let windows = InsightsWindow::default_cascade(chrono::Utc::now().date_naive());
        let work: Vec<BoxFuture<'_, Result<CampaignInsights, AppError>>> = campaigns
            .iter()
            .map(|id| self.campaign_insights_with(id, &windows, token).boxed())
            .collect();
        let results = self.batch(work).await;

        if results.len() < campaigns.len() {
            log::warn!(
                "Insights missing for {} of {} campaigns",
                campaigns.len() - results.len(),
                campaigns.len()
            );
        }
        Ok(results)
    }

    async fn page_posts(
        &self,
        page: &PageId,
        max_items: Option<usize>,
        token: &AccessToken,
    ) -> Result<Vec<PagePost>, AppError> {
        let options = RequestOptions::get()
            .fields(PagePost::FIELDS)
            .param("limit", page_limit(max_items));
        self.get_paginated_data(&format!("{}/posts", page), options, token, max_items)
            .await
    }

    async fn page_conversations(
        &self,
        page: &PageId,
        max_items: Option<usize>,
        token: &AccessToken,
    ) -> Result<Vec<Conversation>, AppError> {
        let options = RequestOptions::get()
            .fields(Conversation::FIELDS)
            .param("limit", page_limit(max_items));
        self.get_paginated_data(&format!("{}/conversations", page), options, token, max_items)
            .await
    }
}
