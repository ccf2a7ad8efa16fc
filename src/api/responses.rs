// src/api/responses.rs
//! Wire shapes shared by Graph API responses.

use crate::error::{GraphErrorCode, GraphFailure};
use serde::{Deserialize, Serialize};

/// The `{ data, paging }` envelope of every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl<T> PagedResponse<T> {
    /// The opaque URL of the next page, if the server offered one.
    pub fn next_url(&self) -> Option<&str> {
        self.paging
            .as_ref()
            .and_then(|p| p.next.as_deref())
            .filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

/// The `error` object of a failed call:
/// `{ "error": { "message", "type", "code", "error_subcode", "fbtrace_id" } }`.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

impl GraphErrorBody {
    pub fn into_failure(self, status: Option<reqwest::StatusCode>) -> GraphFailure {
        GraphFailure {
            code: GraphErrorCode::from_code(self.code),
            subcode: self.error_subcode,
            message: self.message,
            error_type: self.error_type,
            trace_id: self.fbtrace_id,
            status,
        }
    }
}
