// src/api/request.rs
//! Request descriptors and their encoding into concrete HTTP requests.
//!
//! A [`GraphRequest`] is built once per logical call and lives until the
//! call resolves. The retry loop resolves it into one [`PreparedRequest`]
//! and hands that to the transport for every attempt; the transport builds
//! the wire body (multipart included) afresh each time.

use crate::constants::ACCESS_TOKEN_PARAM;
use crate::error::AppError;
use crate::model::PhotoUpload;
use crate::types::AccessToken;
use indexmap::IndexMap;
use reqwest::Method;
use serde_json::Value;
use url::Url;

/// Where a request goes.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A path below the versioned base URL, e.g. `me/adaccounts`.
    Endpoint(String),
    /// A complete URL handed out by the API, e.g. a `paging.next` cursor.
    /// It already carries every parameter, the token included.
    Absolute(String),
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(PhotoUpload),
}

/// Method, parameters and body of a call, without its target or token.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub params: IndexMap<String, Value>,
    pub body: RequestBody,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            params: IndexMap::new(),
            body: RequestBody::Empty,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }

    pub fn delete() -> Self {
        Self {
            method: Method::DELETE,
            ..Self::default()
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Requests a comma-joined field list.
    pub fn fields(self, fields: &[&str]) -> Self {
        self.param("fields", fields.join(","))
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, upload: PhotoUpload) -> Self {
        self.body = RequestBody::Multipart(upload);
        self
    }
}

/// Transient description of one logical Graph call.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphRequest {
    pub target: Target,
    pub options: RequestOptions,
    pub access_token: Option<AccessToken>,
}

impl GraphRequest {
    pub fn endpoint(
        endpoint: impl Into<String>,
        options: RequestOptions,
        access_token: &AccessToken,
    ) -> Self {
        Self {
            target: Target::Endpoint(endpoint.into()),
            options,
            access_token: Some(access_token.clone()),
        }
    }

    pub fn absolute(url: impl Into<String>) -> Self {
        Self {
            target: Target::Absolute(url.into()),
            options: RequestOptions::get(),
            access_token: None,
        }
    }

    /// Resolves the final URL against `base_url`.
    ///
    /// Parameters are appended in insertion order, followed by the token.
    pub fn prepare(&self, base_url: &str) -> Result<PreparedRequest, AppError> {
        let mut url = match &self.target {
            Target::Endpoint(endpoint) => Url::parse(&format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                endpoint.trim_start_matches('/')
            ))?,
            Target::Absolute(url) => Url::parse(url)?,
        };

        if !self.options.params.is_empty() || self.access_token.is_some() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &self.options.params {
                if let Some(encoded) = encode_param(value) {
                    query.append_pair(key, &encoded);
                }
            }
            if let Some(token) = &self.access_token {
                query.append_pair(ACCESS_TOKEN_PARAM, token.as_str());
            }
        }

        Ok(PreparedRequest {
            method: self.options.method.clone(),
            url,
            body: self.options.body.clone(),
        })
    }
}

/// Encodes one parameter value for the query string.
///
/// Arrays are joined by commas, nested objects are JSON-encoded and `null`
/// drops the parameter entirely.
pub fn encode_param(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::Object(_) | Value::Array(_) => Some(item.to_string()),
                    other => encode_param(other),
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// A request ready for the transport: absolute URL, method and body.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub body: RequestBody,
}

impl PreparedRequest {
    /// The URL with the token value masked, for logging.
    pub fn redacted_url(&self) -> String {
        redact_token(&self.url)
    }
}

/// Masks the `access_token` query value of a URL.
pub fn redact_token(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == ACCESS_TOKEN_PARAM) {
        return url.to_string();
    }
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == ACCESS_TOKEN_PARAM {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
