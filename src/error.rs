// src/error.rs
//! Application error types with structured error handling.
//!
//! Every failure the Graph API access layer can produce is an [`AppError`].
//! The one decision the layer makes about a failure is its [`ErrorClass`]:
//! whether waiting and trying again can help, or whether the caller has to
//! be told right away.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// How a failure must be handled by the retry loop and its callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Network failure, timeout, 5xx or an unrecognized API error.
    Retryable,
    /// The access token is invalid or expired; the user must sign in again.
    Auth,
    /// The token lacks a permission required by the call.
    Permission,
    /// The request itself is wrong and will be rejected every time.
    InvalidParameter,
    /// A user, app or account quota is exhausted. It resets on the scale of
    /// hours, so backing off for seconds cannot help.
    RateLimit,
}

impl ErrorClass {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Retryable)
    }
}

/// Graph API error codes as a typed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphErrorCode {
    /// 190: access token invalid, expired or revoked
    InvalidToken,
    /// 102: API session invalid
    SessionExpired,
    /// 10 and 200..=299: missing permission
    PermissionDenied(i64),
    /// 100: invalid parameter
    InvalidParameter,
    /// 4: application request limit reached
    AppRateLimit,
    /// 17: user request limit reached
    UserRateLimit,
    /// 32: page request limit reached
    PageRateLimit,
    /// 613: custom rate limit
    CustomRateLimit,
    /// 80000..=80014: business use case rate limit
    BusinessRateLimit(i64),
    /// 1 and 2: unknown or temporary server-side issue
    Temporary(i64),
    /// A code this client doesn't classify
    Other(i64),
}

impl GraphErrorCode {
    /// Maps the numeric `error.code` of a Graph response into the vocabulary.
    pub fn from_code(code: i64) -> Self {
        match code {
            190 => Self::InvalidToken,
            102 => Self::SessionExpired,
            10 | 200..=299 => Self::PermissionDenied(code),
            100 => Self::InvalidParameter,
            4 => Self::AppRateLimit,
            17 => Self::UserRateLimit,
            32 => Self::PageRateLimit,
            613 => Self::CustomRateLimit,
            80000..=80014 => Self::BusinessRateLimit(code),
            1 | 2 => Self::Temporary(code),
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Self::InvalidToken => 190,
            Self::SessionExpired => 102,
            Self::InvalidParameter => 100,
            Self::AppRateLimit => 4,
            Self::UserRateLimit => 17,
            Self::PageRateLimit => 32,
            Self::CustomRateLimit => 613,
            Self::PermissionDenied(code)
            | Self::BusinessRateLimit(code)
            | Self::Temporary(code)
            | Self::Other(code) => *code,
        }
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidToken | Self::SessionExpired => ErrorClass::Auth,
            Self::PermissionDenied(_) => ErrorClass::Permission,
            Self::InvalidParameter => ErrorClass::InvalidParameter,
            Self::AppRateLimit
            | Self::UserRateLimit
            | Self::PageRateLimit
            | Self::CustomRateLimit
            | Self::BusinessRateLimit(_) => ErrorClass::RateLimit,
            Self::Temporary(_) | Self::Other(_) => ErrorClass::Retryable,
        }
    }
}

impl fmt::Display for GraphErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code {}", self.code())
    }
}

/// The `error` object the Graph API returns, with its HTTP context.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphFailure {
    pub code: GraphErrorCode,
    pub subcode: Option<i64>,
    pub message: String,
    pub error_type: Option<String>,
    pub trace_id: Option<String>,
    pub status: Option<reqwest::StatusCode>,
}

impl fmt::Display for GraphFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)?;
        if let Some(subcode) = self.subcode {
            write!(f, "/{}", subcode)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Access token rejected ({0})")]
    TokenExpired(GraphFailure),

    #[error("Permission denied ({0})")]
    PermissionDenied(GraphFailure),

    #[error("Invalid parameter ({0})")]
    InvalidParameter(GraphFailure),

    #[error("Request limit reached ({0})")]
    RateLimited(GraphFailure),

    #[error("Graph API returned an error ({0})")]
    GraphService(GraphFailure),

    #[error("HTTP {status} from {url}: {preview}")]
    HttpStatus {
        status: reqwest::StatusCode,
        url: String,
        preview: String,
    },

    #[error("Request to {url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AppError {
    /// Wraps a Graph `error` object into the variant its code calls for.
    pub fn from_graph(failure: GraphFailure) -> Self {
        match failure.code.class() {
            ErrorClass::Auth => Self::TokenExpired(failure),
            ErrorClass::Permission => Self::PermissionDenied(failure),
            ErrorClass::InvalidParameter => Self::InvalidParameter(failure),
            ErrorClass::RateLimit => Self::RateLimited(failure),
            ErrorClass::Retryable => Self::GraphService(failure),
        }
    }

    /// Classifies this error for the retry loop.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::TokenExpired(_) => ErrorClass::Auth,
            Self::PermissionDenied(_) => ErrorClass::Permission,
            Self::InvalidParameter(_) | Self::ValidationError(_) | Self::InvalidUrl(_) => {
                ErrorClass::InvalidParameter
            }
            Self::RateLimited(_) => ErrorClass::RateLimit,
            Self::HttpStatus { status, .. } => match status.as_u16() {
                401 => ErrorClass::Auth,
                403 => ErrorClass::Permission,
                429 => ErrorClass::RateLimit,
                _ => ErrorClass::Retryable,
            },
            Self::MissingConfiguration(_) | Self::Io(_) | Self::InternalError { .. } => {
                ErrorClass::InvalidParameter
            }
            Self::GraphService(_)
            | Self::Timeout { .. }
            | Self::NetworkFailure(_)
            | Self::MalformedResponse(_) => ErrorClass::Retryable,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Retryable
    }

    /// The distinguished token-error signal: the caller must force the user
    /// through authentication again.
    pub fn is_token_error(&self) -> bool {
        self.class() == ErrorClass::Auth
    }

    /// The Graph error object behind this error, if the API produced one.
    pub fn graph_failure(&self) -> Option<&GraphFailure> {
        match self {
            Self::TokenExpired(f)
            | Self::PermissionDenied(f)
            | Self::InvalidParameter(f)
            | Self::RateLimited(f)
            | Self::GraphService(f) => Some(f),
            _ => None,
        }
    }

    /// Message suitable for showing to the person using the dashboard.
    pub fn user_message(&self) -> String {
        match self {
            Self::ValidationError(err) => err.to_string(),
            Self::MissingConfiguration(what) => format!("Configuration is incomplete: {}", what),
            _ => match self.class() {
                ErrorClass::Auth => {
                    "Your Facebook session has expired. Please sign in again.".to_string()
                }
                ErrorClass::Permission => format!(
                    "Facebook denied access to this resource. Check that the required permissions were granted. ({})",
                    self.api_message()
                ),
                ErrorClass::InvalidParameter => {
                    format!("Facebook rejected the request: {}", self.api_message())
                }
                ErrorClass::RateLimit => {
                    "The Facebook API request quota is exhausted. Please try again later."
                        .to_string()
                }
                ErrorClass::Retryable => {
                    format!("Could not reach Facebook. Please try again. ({})", self)
                }
            },
        }
    }

    fn api_message(&self) -> String {
        self.graph_failure()
            .map(|f| f.message.clone())
            .unwrap_or_else(|| self.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
