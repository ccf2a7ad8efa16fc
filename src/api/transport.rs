// src/api/transport.rs
//! Pure HTTP transport for Graph API requests.
//!
//! The transport sends one prepared request and hands back the status and
//! body text. It makes no decision about success, retries or parsing;
//! that belongs to the retry executor.

use super::request::{PreparedRequest, RequestBody};
use crate::error::AppError;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Raw outcome of one HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
    pub url: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.into(),
            url: String::new(),
        }
    }
}

/// The ability to perform one HTTP exchange.
///
/// The retry executor, pagination walker and endpoint helpers depend on
/// this trait, never on reqwest directly.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, AppError>;
}

/// A thin wrapper around reqwest for Graph API requests.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with pooled connections.
    ///
    /// Per-attempt deadlines are enforced by the retry executor; the client
    /// only bounds connection setup.
    pub fn new(connect_timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(10)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .user_agent(concat!("graphdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn build_form(upload: &crate::model::PhotoUpload) -> Result<Form, AppError> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)?;
        let form = upload
            .form_fields()
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        Ok(form.part("source", part))
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &PreparedRequest) -> Result<RawResponse, AppError> {
        log::debug!("{} {}", request.method, request.redacted_url());

        let builder = self
            .client
            .request(request.method.clone(), request.url.clone());
        let builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart(upload) => builder.multipart(Self::build_form(upload)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let url = super::request::redact_token(response.url());
        let body = response.text().await?;

        log::debug!("{} {} -> {}", request.method, url, status);

        Ok(RawResponse { status, body, url })
    }
}
