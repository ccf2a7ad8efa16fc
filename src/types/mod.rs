// src/types/mod.rs
//! Validated domain newtypes shared by the API layer and its callers.

use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid {kind} ID: {input} - {reason}")]
    InvalidId {
        kind: &'static str,
        input: String,
        reason: String,
    },

    #[error("Invalid access token: {reason}")]
    InvalidAccessToken { reason: String },

    #[error("Invalid campaign status '{0}': expected ACTIVE or PAUSED")]
    InvalidCampaignStatus(String),

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Invalid URL: {url} - {reason}")]
    InvalidUrl { url: String, reason: String },
}
