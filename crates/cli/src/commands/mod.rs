//! Command implementations, one module per harness section.
//!
//! Every command gets a [`Context`] holding the client, the remembered
//! session, and the output settings. API failures go through
//! [`Context::surface`] so the user sees each one exactly once.

pub mod analytics;
pub mod auth;
pub mod banners;
pub mod cart;
pub mod hours;
pub mod integrations;
pub mod menu;
pub mod orders;
pub mod promo;

use std::io::{self, Write};

use appetit_client::{
    ApiClient, ClientError, ConfigError, FileStore, Notice, Notifier, Session,
    StoreError, surface,
};
use serde::Serialize;
use thiserror::Error;

/// Errors a command can end with.
#[derive(Debug, Error)]
pub enum CliError {
    /// An API call failed. Already shown to the user.
    #[error(transparent)]
    Api(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not write output: {0}")]
    Io(#[from] io::Error),

    #[error("Could not encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// The user's input was rejected before any request was made.
    #[error("{0}")]
    Input(String),

    /// Some of a batch of calls failed. Each failure was already shown.
    #[error("{failed} of {total} reports failed to load")]
    Partial { failed: usize, total: usize },
}

impl CliError {
    /// Whether the user has already been shown this error.
    #[must_use]
    pub const fn is_surfaced(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Partial { .. })
    }
}

pub type CommandResult = Result<(), CliError>;

/// Notices go to stderr, tagged with their level.
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        let _ = writeln!(io::stderr().lock(), "[{}] {}", notice.level, notice.message);
    }
}

/// Everything a command needs.
#[derive(Debug)]
pub struct Context {
    pub client: ApiClient,
    pub store: FileStore,
    pub session: Option<Session>,
    pub notifier: TerminalNotifier,
    pub json: bool,
}

impl Context {
    /// The remembered session, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Show an API failure once, then hand it back.
    ///
    /// # Errors
    ///
    /// Returns the error `result` carried.
    pub fn surface<T>(&self, result: Result<T, ClientError>) -> Result<T, CliError> {
        let result = surface(result, &self.notifier);
        if let Some(hint) = result.as_ref().err().and_then(|e| self.hint(e)) {
            self.notify(hint);
        }
        Ok(result?)
    }

    /// A follow-up for failures the user can fix themselves.
    fn hint(&self, error: &ClientError) -> Option<Notice> {
        if error.is_transport() {
            Some(Notice::info(format!(
                "Is the API running at {}?",
                self.client.base_url()
            )))
        } else if error.is_unauthorized() && self.session.is_none() {
            Some(Notice::info("Not logged in; run `appetit auth login` first"))
        } else {
            None
        }
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.notify(notice);
    }

    /// Print `value` as pretty JSON when `--json` is set, otherwise run
    /// `text` to render it for humans.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn render<T, F>(&self, value: &T, text: F) -> CommandResult
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut dyn Write, &T) -> io::Result<()>,
    {
        let mut out = io::stdout().lock();
        if self.json {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        } else {
            text(&mut out, value)?;
        }
        Ok(())
    }

    /// Report a successful action. With `--json` the response body is
    /// printed as well.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn done<T: Serialize + ?Sized>(&self, message: &str, response: &T) -> CommandResult {
        self.notify(Notice::success(message));
        if self.json {
            let mut out = io::stdout().lock();
            serde_json::to_writer_pretty(&mut out, response)?;
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Placeholder for absent optional text.
fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use appetit_client::{ClientConfig, Request};
    use appetit_integration_tests::{temp_state_file, unreachable_base_url};

    use super::*;

    #[tokio::test]
    async fn test_transport_failure_hints_at_api_base() {
        let base = unreachable_base_url().await.unwrap();
        let config = ClientConfig::default().with_api_base(&base).unwrap();
        let ctx = Context {
            client: ApiClient::new(&config).unwrap(),
            store: FileStore::new(temp_state_file("cli-hint")),
            session: None,
            notifier: TerminalNotifier,
            json: false,
        };

        let err = ctx
            .client
            .dispatch(None, Request::get("/menu/items"))
            .await
            .unwrap_err();

        let hint = ctx.hint(&err).unwrap();
        assert!(hint.message.contains(&base));
        assert!(ctx.hint(&ClientError::api(404, None)).is_none());
        assert!(ctx.hint(&ClientError::api(401, None)).is_some());
    }

    #[test]
    fn test_partial_failure_is_already_surfaced() {
        let err = CliError::Partial {
            failed: 5,
            total: 5,
        };
        assert!(err.is_surfaced());
        assert!(!CliError::Input("bad".to_owned()).is_surfaced());
    }
}
