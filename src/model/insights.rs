//! Campaign performance metrics and the date windows they are requested for.

use super::common::{loose_f64, loose_u64};
use crate::constants::INSIGHTS_FALLBACK_RANGE_DAYS;
use crate::types::CampaignId;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

/// The date configuration one insights request is made with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightsWindow {
    /// A Graph `date_preset` such as `last_30d` or `yesterday`.
    Preset(String),
    /// An explicit inclusive `time_range`.
    TimeRange { since: NaiveDate, until: NaiveDate },
}

impl InsightsWindow {
    pub fn preset(name: impl Into<String>) -> Self {
        Self::Preset(name.into())
    }

    /// Windows tried in order until one yields meaningful metrics.
    pub fn default_cascade(today: NaiveDate) -> Vec<Self> {
        vec![
            Self::preset("last_30d"),
            Self::preset("last_7d"),
            Self::preset("yesterday"),
            Self::preset("this_month"),
            Self::TimeRange {
                since: today - Duration::days(INSIGHTS_FALLBACK_RANGE_DAYS),
                until: today,
            },
        ]
    }

    /// Query parameters selecting this window.
    pub fn params(&self) -> (&'static str, Value) {
        match self {
            Self::Preset(name) => ("date_preset", json!(name)),
            Self::TimeRange { since, until } => (
                "time_range",
                json!({
                    "since": since.format("%Y-%m-%d").to_string(),
                    "until": until.format("%Y-%m-%d").to_string(),
                }),
            ),
        }
    }
}

impl fmt::Display for InsightsWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Preset(name) => f.write_str(name),
            Self::TimeRange { since, until } => write!(f, "{}..{}", since, until),
        }
    }
}

/// One `action_type` counter inside an insights row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStat {
    pub action_type: String,
    #[serde(default, deserialize_with = "loose_f64")]
    pub value: f64,
}

/// One row of `/<campaign>/insights` output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InsightsRow {
    #[serde(default, deserialize_with = "loose_u64")]
    pub impressions: u64,
    #[serde(default, deserialize_with = "loose_u64")]
    pub reach: u64,
    #[serde(default, deserialize_with = "loose_u64")]
    pub clicks: u64,
    #[serde(default, deserialize_with = "loose_f64")]
    pub spend: f64,
    #[serde(default, deserialize_with = "loose_f64")]
    pub ctr: f64,
    #[serde(default, deserialize_with = "loose_f64")]
    pub cpc: f64,
    #[serde(default, deserialize_with = "loose_f64")]
    pub cpm: f64,
    #[serde(default, deserialize_with = "loose_f64")]
    pub frequency: f64,
    #[serde(default)]
    pub actions: Vec<ActionStat>,
    #[serde(default)]
    pub date_start: Option<String>,
    #[serde(default)]
    pub date_stop: Option<String>,
}

impl InsightsRow {
    /// True when at least one metric is non-zero or non-empty.
    ///
    /// A campaign whose metrics are genuinely zero for every window cannot
    /// be told apart from a window the API had no data for.
    pub fn is_meaningful(&self) -> bool {
        self.impressions > 0
            || self.reach > 0
            || self.clicks > 0
            || [self.spend, self.ctr, self.cpc, self.cpm, self.frequency]
                .iter()
                .any(|v| *v != 0.0)
            || !self.actions.is_empty()
    }
}

/// Campaign metrics as handed to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignInsights {
    pub campaign_id: CampaignId,
    #[serde(flatten)]
    pub metrics: InsightsRow,
    /// The window that produced the metrics; `None` for placeholders.
    pub window: Option<String>,
    /// Set when every window came back empty and the metrics are zero-filled.
    #[serde(rename = "_no_data", default)]
    pub no_data: bool,
}

impl CampaignInsights {
    pub fn found(campaign_id: CampaignId, metrics: InsightsRow, window: &InsightsWindow) -> Self {
        Self {
            campaign_id,
            metrics,
            window: Some(window.to_string()),
            no_data: false,
        }
    }

    pub fn placeholder(campaign_id: CampaignId) -> Self {
        Self {
            campaign_id,
            metrics: InsightsRow::default(),
            window: None,
            no_data: true,
        }
    }
}
