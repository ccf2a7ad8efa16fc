//! Inputs and receipts for content publishing calls.

use crate::types::{PhotoId, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// A binary photo sent to `/<page>/photos` as `multipart/form-data`.
#[derive(Clone, PartialEq)]
pub struct PhotoUpload {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    pub caption: Option<String>,
    /// Unpublished photos can be attached to a later feed post.
    pub published: bool,
}

impl PhotoUpload {
    pub fn new(bytes: Vec<u8>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for(&file_name).to_string();
        Self {
            bytes,
            file_name,
            mime_type,
            caption: None,
            published: true,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.bytes.is_empty() {
            return Err(ValidationError::EmptyField("photo bytes"));
        }
        if self.file_name.trim().is_empty() {
            return Err(ValidationError::EmptyField("photo file name"));
        }
        Ok(())
    }

    /// Text fields sent next to the `source` file part.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![("published".to_string(), self.published.to_string())];
        if let Some(caption) = &self.caption {
            fields.push(("caption".to_string(), caption.clone()));
        }
        fields
    }
}

impl fmt::Debug for PhotoUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoUpload")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("caption", &self.caption)
            .field("published", &self.published)
            .finish()
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// A feed post sent as JSON to `/<page>/feed`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewPost {
    pub message: Option<String>,
    pub link: Option<String>,
    pub attached_media: Vec<PhotoId>,
    pub published: bool,
    /// Unix timestamp; requires `published == false`.
    pub scheduled_publish_time: Option<i64>,
}

impl NewPost {
    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            published: true,
            ..Self::default()
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn with_media(mut self, photo: PhotoId) -> Self {
        self.attached_media.push(photo);
        self
    }

    pub fn scheduled_at(mut self, unix_time: i64) -> Self {
        self.scheduled_publish_time = Some(unix_time);
        self.published = false;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let has_message = self
            .message
            .as_deref()
            .is_some_and(|m| !m.trim().is_empty());
        if !has_message && self.link.is_none() && self.attached_media.is_empty() {
            return Err(ValidationError::EmptyField("post message, link or media"));
        }
        if let Some(link) = &self.link {
            if let Err(e) = url::Url::parse(link) {
                return Err(ValidationError::InvalidUrl {
                    url: link.clone(),
                    reason: e.to_string(),
                });
            }
        }
        Ok(())
    }

    /// JSON body for the feed endpoint.
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        if let Some(message) = &self.message {
            body.insert("message".into(), json!(message));
        }
        if let Some(link) = &self.link {
            body.insert("link".into(), json!(link));
        }
        if !self.attached_media.is_empty() {
            let media: Vec<Value> = self
                .attached_media
                .iter()
                .map(|id| json!({ "media_fbid": id.as_str() }))
                .collect();
            body.insert("attached_media".into(), Value::Array(media));
        }
        body.insert("published".into(), json!(self.published));
        if let Some(at) = self.scheduled_publish_time {
            body.insert("scheduled_publish_time".into(), json!(at));
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoReceipt {
    pub id: String,
    #[serde(default)]
    pub post_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostReceipt {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub success: bool,
}
