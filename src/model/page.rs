use serde::{Deserialize, Serialize};

/// A post on the page feed (`/<page>/posts`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagePost {
    /// `<page>_<post>` compound ID
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub permalink_url: Option<String>,
    #[serde(default)]
    pub full_picture: Option<String>,
}

impl PagePost {
    pub const FIELDS: &'static [&'static str] =
        &["id", "message", "created_time", "permalink_url", "full_picture"];
}

/// An inbox thread (`/<page>/conversations`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    #[serde(default)]
    pub updated_time: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub unread_count: u64,
    #[serde(default)]
    pub message_count: u64,
}

impl Conversation {
    pub const FIELDS: &'static [&'static str] =
        &["id", "updated_time", "snippet", "unread_count", "message_count"];

    pub fn has_unread(&self) -> bool {
        self.unread_count > 0
    }
}
