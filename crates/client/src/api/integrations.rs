//! Third-party integration checks: SMS, email, push, maps.

use std::collections::BTreeMap;

use appetit_core::{DevicePlatform, PushTarget};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::session::Session;

/// Service names the status report is expected to cover.
pub const KNOWN_SERVICES: &[&str] = &["sms", "email", "push", "maps"];

/// Push notification to broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub target: PushTarget,
}

/// A geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub place_id: Option<String>,
}

/// Counts across every integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationSummary {
    pub configured: u32,
    pub total: u32,
    pub all_ready: bool,
}

/// Health of every integration.
///
/// Each service reports its own shape; only the `status` field is shared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationStatusReport {
    #[serde(default)]
    pub summary: Option<IntegrationSummary>,
    #[serde(default)]
    pub services: BTreeMap<String, Value>,
}

impl IntegrationStatusReport {
    /// Whether `service` reports itself configured.
    ///
    /// A bare `true` also counts, as does any status object whose `status`
    /// is `configured`.
    #[must_use]
    pub fn is_connected(&self, service: &str) -> bool {
        match self.services.get(service) {
            Some(Value::Bool(connected)) => *connected,
            Some(Value::Object(details)) => {
                details.get("status").and_then(Value::as_str) == Some("configured")
            }
            _ => false,
        }
    }
}

impl ApiClient {
    /// Send a test SMS (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, message))]
    pub async fn test_sms(
        &self,
        session: Option<&Session>,
        phone: &str,
        message: &str,
    ) -> Result<Value, ClientError> {
        let body = json!({"phone": phone, "message": message});
        self.dispatch(
            session,
            Request::post("/admin/integrations/sms/test").with_body(body),
        )
        .await
    }

    /// Send a test email (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, message))]
    pub async fn test_email(
        &self,
        session: Option<&Session>,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<Value, ClientError> {
        let body = json!({"email": email, "subject": subject, "message": message});
        self.dispatch(
            session,
            Request::post("/admin/integrations/email/test").with_body(body),
        )
        .await
    }

    /// Broadcast a push notification (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, push), fields(target = %push.target))]
    pub async fn send_push(
        &self,
        session: Option<&Session>,
        push: &PushMessage,
    ) -> Result<Value, ClientError> {
        self.dispatch(session, Request::post("/admin/push/send").json(push)?)
            .await
    }

    /// Register a device for push notifications.
    ///
    /// Callers are expected to reject a blank token before getting here.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, fcm_token))]
    pub async fn register_device(
        &self,
        session: Option<&Session>,
        fcm_token: &str,
        platform: DevicePlatform,
    ) -> Result<Value, ClientError> {
        let body = json!({"fcm_token": fcm_token, "platform": platform});
        self.dispatch(session, Request::post("/devices/register").with_body(body))
            .await
    }

    /// Resolve an address to coordinates.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn geocode(
        &self,
        session: Option<&Session>,
        address: &str,
    ) -> Result<GeocodeResult, ClientError> {
        let body = json!({"address": address});
        self.call(session, Request::post("/maps/geocode").with_body(body))
            .await
    }

    /// Resolve coordinates to an address.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn reverse_geocode(
        &self,
        session: Option<&Session>,
        lat: f64,
        lng: f64,
    ) -> Result<GeocodeResult, ClientError> {
        let body = json!({"lat": lat, "lng": lng});
        self.call(session, Request::post("/maps/reverse-geocode").with_body(body))
            .await
    }

    /// Health of every integration (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn integration_status(
        &self,
        session: Option<&Session>,
    ) -> Result<IntegrationStatusReport, ClientError> {
        self.call(session, Request::get("/admin/integrations/status"))
            .await
    }
}
