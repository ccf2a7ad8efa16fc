// src/notify.rs
//! User-facing notices and the re-authentication signal.
//!
//! The access layer never decides how a failure is shown. It hands errors
//! to a [`Notifier`]: token failures become a re-authentication request,
//! everything else a readable error notice.

use crate::error::AppError;
use std::fmt;

/// Severity of a notice shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// The ability to tell the user what happened.
///
/// Implementations must not fail or block; a notice that cannot be shown
/// is dropped.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);

    /// Asks the user to sign in again because the access token is no longer
    /// accepted.
    fn request_reauth(&self, reason: &str);
}

/// Writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        match kind {
            NoticeKind::Info | NoticeKind::Success => log::info!("[{}] {}", kind, message),
            NoticeKind::Warning => log::warn!("{}", message),
            NoticeKind::Error => log::error!("{}", message),
        }
    }

    fn request_reauth(&self, reason: &str) {
        log::error!("Re-authentication required: {}", reason);
    }
}

/// Routes `error` to the right notice.
///
/// Token errors trigger [`Notifier::request_reauth`] so the caller can send
/// the user back through sign-in; all other errors become an error notice
/// prefixed with `context`.
pub fn report_error(notifier: &dyn Notifier, context: &str, error: &AppError) {
    log::debug!("{}: {:?}", context, error);
    if error.is_token_error() {
        notifier.request_reauth(&error.user_message());
    } else {
        notifier.notify(
            NoticeKind::Error,
            &format!("{}: {}", context, error.user_message()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GraphErrorCode, GraphFailure};
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        notices: Mutex<Vec<(NoticeKind, String)>>,
        reauth: Mutex<Vec<String>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, kind: NoticeKind, message: &str) {
            self.notices.lock().push((kind, message.to_string()));
        }

        fn request_reauth(&self, reason: &str) {
            self.reauth.lock().push(reason.to_string());
        }
    }

    fn graph(code: i64, message: &str) -> AppError {
        AppError::from_graph(GraphFailure {
            code: GraphErrorCode::from_code(code),
            subcode: None,
            message: message.to_string(),
            error_type: Some("OAuthException".to_string()),
            trace_id: None,
            status: None,
        })
    }

    #[test]
    fn test_token_error_requests_reauth() {
        let recorder = Recorder::default();
        report_error(&recorder, "Loading campaigns", &graph(190, "Session has expired"));

        assert_eq!(recorder.reauth.lock().len(), 1);
        assert!(recorder.notices.lock().is_empty());
    }

    #[test]
    fn test_other_errors_become_error_notices() {
        let recorder = Recorder::default();
        report_error(&recorder, "Loading campaigns", &graph(100, "Unknown field"));

        let notices = recorder.notices.lock();
        assert!(recorder.reauth.lock().is_empty());
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].0, NoticeKind::Error);
        assert!(notices[0].1.starts_with("Loading campaigns: "));
    }

    #[test]
    fn test_log_notifier_accepts_every_kind() {
        for kind in [
            NoticeKind::Info,
            NoticeKind::Success,
            NoticeKind::Warning,
            NoticeKind::Error,
        ] {
            LogNotifier.notify(kind, "hello");
        }
        LogNotifier.request_reauth("expired");
    }
}
