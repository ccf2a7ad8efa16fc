use super::common::loose_f64;
use crate::types::{AdAccountId, CampaignId};
use serde::{Deserialize, Serialize};

/// An ad account the token can manage (`/me/adaccounts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdAccount {
    pub id: AdAccountId,
    #[serde(default)]
    pub name: String,
    /// 1 = active, 2 = disabled, 3 = unsettled, 7..=9 = pending/grace states.
    #[serde(default)]
    pub account_status: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub timezone_name: Option<String>,
    /// Lifetime spend in the account currency's minor unit.
    #[serde(default, deserialize_with = "loose_f64")]
    pub amount_spent: f64,
}

impl AdAccount {
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "account_status",
        "currency",
        "timezone_name",
        "amount_spent",
    ];

    pub fn is_active(&self) -> bool {
        self.account_status == Some(1)
    }
}

/// A campaign inside an ad account (`/act_<id>/campaigns`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    #[serde(default)]
    pub name: String,
    /// Configured status: ACTIVE, PAUSED, DELETED or ARCHIVED.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub effective_status: Option<String>,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default, deserialize_with = "loose_f64")]
    pub daily_budget: f64,
    #[serde(default, deserialize_with = "loose_f64")]
    pub lifetime_budget: f64,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub stop_time: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
}

impl Campaign {
    pub const FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "status",
        "effective_status",
        "objective",
        "daily_budget",
        "lifetime_budget",
        "start_time",
        "stop_time",
        "created_time",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_campaign_from_graph_payload() {
        let campaign: Campaign = serde_json::from_value(json!({
            "id": "23851234567890",
            "name": "Spring sale",
            "status": "ACTIVE",
            "objective": "OUTCOME_TRAFFIC",
            "daily_budget": "5000",
            "created_time": "2024-03-01T10:00:00+0000"
        }))
        .unwrap();

        assert_eq!(campaign.id.as_str(), "23851234567890");
        assert_eq!(campaign.daily_budget, 5000.0);
        assert_eq!(campaign.lifetime_budget, 0.0);
        assert_eq!(campaign.effective_status, None);
    }

    #[test]
    fn test_ad_account_status() {
        let account: AdAccount = serde_json::from_value(json!({
            "id": "act_1001",
            "name": "Main",
            "account_status": 1,
            "amount_spent": "123456"
        }))
        .unwrap();

        assert!(account.is_active());
        assert_eq!(account.id.as_str(), "act_1001");
        assert_eq!(account.amount_spent, 123456.0);
    }
}
