// src/model/mod.rs
//! Typed views of the Graph API payloads this client works with.

mod account;
pub mod common;
mod insights;
mod page;
mod publishing;

pub use account::{AdAccount, Campaign};
pub use insights::{ActionStat, CampaignInsights, InsightsRow, InsightsWindow};
pub use page::{Conversation, PagePost};
pub use publishing::{NewPost, PhotoReceipt, PhotoUpload, PostReceipt, StatusUpdate};
