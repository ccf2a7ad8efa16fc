// src/sync.rs
//! Campaign snapshots: fetch a page's campaigns with their insights and keep
//! the latest result around for the dashboard.

use crate::api::GraphRepository;
use crate::constants::SYNC_SNAPSHOT_TTL_SECS;
use crate::error::AppError;
use crate::model::{Campaign, CampaignInsights};
use crate::notify::{report_error, NoticeKind, Notifier};
use crate::types::{AccessToken, AdAccountId, CampaignId, PageId};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Campaigns and their insights as of one sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub page_id: PageId,
    pub account_id: AdAccountId,
    pub synced_at: DateTime<Utc>,
    pub campaigns: Vec<Campaign>,
    pub insights: Vec<CampaignInsights>,
}

impl SyncSnapshot {
    pub fn age(&self) -> chrono::Duration {
        Utc::now().signed_duration_since(self.synced_at)
    }

    pub fn insights_for(&self, campaign: &CampaignId) -> Option<&CampaignInsights> {
        self.insights.iter().find(|i| &i.campaign_id == campaign)
    }
}

/// Where snapshots are kept between runs.
///
/// Stores are best-effort: a failed read is a miss and a failed write is
/// logged, never surfaced.
#[async_trait::async_trait]
pub trait SyncStore: Send + Sync {
    async fn get(&self, page: &PageId) -> Option<SyncSnapshot>;
    async fn put(&self, snapshot: &SyncSnapshot);
}

// ---------------------------------------------------------------------------
// Disk store
// ---------------------------------------------------------------------------

/// JSON snapshot files with TTL-based expiry.
pub struct DiskSyncStore {
    dir: PathBuf,
    ttl_secs: u64,
}

impl DiskSyncStore {
    /// Opens the store in `$XDG_CACHE_HOME/graphdesk` (or `~/.cache/graphdesk`).
    pub async fn new() -> Result<Self, std::io::Error> {
        Self::in_dir(Self::default_dir(), SYNC_SNAPSHOT_TTL_SECS).await
    }

    pub async fn in_dir(dir: PathBuf, ttl_secs: u64) -> Result<Self, std::io::Error> {
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir, ttl_secs })
    }

    fn default_dir() -> PathBuf {
        std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".cache")
            })
            .join("graphdesk")
    }

    fn path_for(&self, page: &PageId) -> PathBuf {
        self.dir.join(format!("snapshot_{}.json", page.as_str()))
    }

    fn is_expired(&self, snapshot: &SyncSnapshot) -> bool {
        snapshot.age().num_seconds().max(0) as u64 > self.ttl_secs
    }
}

#[async_trait::async_trait]
impl SyncStore for DiskSyncStore {
    async fn get(&self, page: &PageId) -> Option<SyncSnapshot> {
        let path = self.path_for(page);
        let content = tokio::fs::read_to_string(&path).await.ok()?;
        let snapshot: SyncSnapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("Ignoring unreadable snapshot {}: {}", path.display(), e);
                return None;
            }
        };
        if self.is_expired(&snapshot) {
            let _ = tokio::fs::remove_file(&path).await;
            return None;
        }
        Some(snapshot)
    }

    async fn put(&self, snapshot: &SyncSnapshot) {
        let path = self.path_for(&snapshot.page_id);
        match serde_json::to_string(snapshot) {
            Ok(json) => {
                if let Err(e) = tokio::fs::write(&path, json).await {
                    log::warn!("Could not write snapshot {}: {}", path.display(), e);
                }
            }
            Err(e) => log::warn!("Could not encode snapshot: {}", e),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySyncStore {
    snapshots: Mutex<HashMap<PageId, SyncSnapshot>>,
}

#[async_trait::async_trait]
impl SyncStore for MemorySyncStore {
    async fn get(&self, page: &PageId) -> Option<SyncSnapshot> {
        self.snapshots.lock().get(page).cloned()
    }

    async fn put(&self, snapshot: &SyncSnapshot) {
        self.snapshots
            .lock()
            .insert(snapshot.page_id.clone(), snapshot.clone());
    }
}

// ---------------------------------------------------------------------------
// Sync job
// ---------------------------------------------------------------------------

/// Refreshes a page's campaign snapshot and tells the user how it went.
pub struct CampaignSync {
    repository: Arc<dyn GraphRepository>,
    store: Arc<dyn SyncStore>,
    notifier: Arc<dyn Notifier>,
}

impl CampaignSync {
    pub fn new(
        repository: Arc<dyn GraphRepository>,
        store: Arc<dyn SyncStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repository,
            store,
            notifier,
        }
    }

    /// The stored snapshot of `page`, if one is still fresh.
    pub async fn last_sync(&self, page: &PageId) -> Option<SyncSnapshot> {
        self.store.get(page).await
    }

    /// Fetches the account's campaigns and their insights, then stores the
    /// result as `page`'s snapshot.
    ///
    /// Failures are reported through the notifier before being returned.
    pub async fn sync_page(
        &self,
        page: &PageId,
        account: &AdAccountId,
        token: &AccessToken,
    ) -> Result<SyncSnapshot, AppError> {
        match self.fetch(page, account, token).await {
            Ok(snapshot) => {
                self.store.put(&snapshot).await;
                self.notifier.notify(
                    NoticeKind::Success,
                    &format!(
                        "Synced {} campaigns ({} with insights) for page {}",
                        snapshot.campaigns.len(),
                        snapshot.insights.iter().filter(|i| !i.no_data).count(),
                        page
                    ),
                );
                Ok(snapshot)
            }
            Err(e) => {
                report_error(self.notifier.as_ref(), "Campaign sync failed", &e);
                Err(e)
            }
        }
    }

    async fn fetch(
        &self,
        page: &PageId,
        account: &AdAccountId,
        token: &AccessToken,
    ) -> Result<SyncSnapshot, AppError> {
        let campaigns = self.repository.campaigns(account, token).await?;
        log::info!("Fetched {} campaigns for {}", campaigns.len(), account);

        let ids: Vec<CampaignId> = campaigns.iter().map(|c| c.id.clone()).collect();
        let insights = self
            .repository
            .campaign_insights_batch(&ids, token)
            .await?;

        Ok(SyncSnapshot {
            page_id: page.clone(),
            account_id: account.clone(),
            synced_at: Utc::now(),
            campaigns,
            insights,
        })
    }
}
