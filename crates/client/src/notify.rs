//! Transient user-facing notices.
//!
//! The dispatcher never notifies on its own. Callers that want the
//! "show once, then hand back" behavior wrap a result in [`surface`].

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::warn;

/// How long a notice stays visible before it dismisses itself.
pub const DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Danger,
}

impl NoticeLevel {
    /// Lowercase label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message shown to the user for a short time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub dismiss_after: Duration,
}

impl Notice {
    /// Create a notice with the standard dismiss delay.
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            dismiss_after: DISMISS_AFTER,
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    #[must_use]
    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Danger, message)
    }
}

/// Something that can show a [`Notice`] to the user.
pub trait Notifier: Send + Sync {
    /// Show `notice`.
    fn notify(&self, notice: Notice);
}

/// Show a failed result's error once at danger level, then return the result
/// unchanged.
///
/// # Errors
///
/// Returns the same error `result` carried.
pub fn surface<T, E>(result: Result<T, E>, notifier: &dyn Notifier) -> Result<T, E>
where
    E: fmt::Display,
{
    if let Err(e) = &result {
        warn!(error = %e, "Request failed");
        notifier.notify(Notice::danger(e.to_string()));
    }
    result
}

/// Notifier that records every notice it is given.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    /// Create an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything shown so far, oldest first.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    #[test]
    fn test_surface_notifies_once_on_failure() {
        let notifier = MemoryNotifier::new();
        let result: Result<(), ClientError> = Err(ClientError::api(404, None));

        let returned = surface(result, &notifier);

        assert!(matches!(returned, Err(ClientError::Api { status: 404, .. })));
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Danger);
        assert_eq!(notices[0].message, "HTTP 404");
        assert_eq!(notices[0].dismiss_after, Duration::from_secs(5));
    }

    #[test]
    fn test_surface_is_silent_on_success() {
        let notifier = MemoryNotifier::new();
        let returned = surface(Ok::<_, ClientError>(7), &notifier);

        assert_eq!(returned.ok(), Some(7));
        assert!(notifier.notices().is_empty());
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(NoticeLevel::Warning.to_string(), "warning");
        assert_eq!(Notice::success("ok").level, NoticeLevel::Success);
    }
}
