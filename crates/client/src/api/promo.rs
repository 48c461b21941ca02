//! Promocodes: admin management and checkout validation.

use appetit_core::{Money, PromoKind, discounted_total};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::segment;
use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::session::Session;

/// A promocode as the admin API lists it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promocode {
    pub code: String,
    pub kind: PromoKind,
    pub value: f64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub valid_from: Option<NaiveDateTime>,
    #[serde(default)]
    pub valid_to: Option<NaiveDateTime>,
    #[serde(default)]
    pub max_redemptions: Option<u32>,
    #[serde(default)]
    pub per_user_limit: Option<u32>,
    #[serde(default)]
    pub min_subtotal: Option<Money>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Limits shared by single and batch promocode creation. Unset limits are
/// left out of the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PromoLimits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_redemptions: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_user_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_subtotal: Option<Money>,
}

/// A single new promocode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPromocode {
    pub code: String,
    pub kind: PromoKind,
    pub value: f64,
    pub active: bool,
    #[serde(flatten)]
    pub limits: PromoLimits,
}

/// A batch of random codes sharing a prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromoBatchRequest {
    pub prefix: String,
    pub length: u32,
    pub count: u32,
    pub kind: PromoKind,
    pub value: f64,
    pub active: bool,
    #[serde(flatten)]
    pub limits: PromoLimits,
}

impl PromoBatchRequest {
    /// Batch with the backend's defaults: 10 codes of 6 random characters,
    /// 10 percent off, active.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            length: 6,
            count: 10,
            kind: PromoKind::Percent,
            value: 10.0,
            active: true,
            limits: PromoLimits::default(),
        }
    }
}

/// Summary of a generated batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoBatch {
    pub batch_id: i64,
    pub generated: u32,
    pub prefix: String,
    pub length: u32,
}

/// Outcome of validating a code against a subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoValidation {
    #[serde(default)]
    pub code: Option<String>,
    pub discount: Money,
    #[serde(default)]
    pub valid: Option<bool>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl PromoValidation {
    /// `subtotal - discount`.
    #[must_use]
    pub fn new_total(&self, subtotal: Money) -> Money {
        discounted_total(subtotal, self.discount)
    }
}

impl ApiClient {
    /// List every promocode (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn list_promocodes(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<Promocode>, ClientError> {
        self.call(session, Request::get("/admin/promo/codes")).await
    }

    /// Create a promocode (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, promo), fields(code = %promo.code))]
    pub async fn create_promocode(
        &self,
        session: Option<&Session>,
        promo: &NewPromocode,
    ) -> Result<Value, ClientError> {
        self.dispatch(session, Request::post("/admin/promo/codes").json(promo)?)
            .await
    }

    /// Check a code against a subtotal.
    ///
    /// # Errors
    ///
    /// Returns error if the code is rejected or the request fails.
    #[instrument(skip(self, session), fields(subtotal = %subtotal))]
    pub async fn validate_promocode(
        &self,
        session: Option<&Session>,
        code: &str,
        subtotal: Money,
    ) -> Result<PromoValidation, ClientError> {
        let body = json!({"code": code, "subtotal": subtotal});
        self.call(session, Request::post("/promo/validate").with_body(body))
            .await
    }

    /// Activate or deactivate a code (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn set_promocode_active(
        &self,
        session: Option<&Session>,
        code: &str,
        active: bool,
    ) -> Result<Value, ClientError> {
        let request = Request::patch(format!("/admin/promo/codes/{}", segment(code)))
            .with_body(json!({"active": active}));
        self.dispatch(session, request).await
    }

    /// Generate a batch of random codes (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, batch), fields(prefix = %batch.prefix, count = batch.count))]
    pub async fn generate_promocodes(
        &self,
        session: Option<&Session>,
        batch: &PromoBatchRequest,
    ) -> Result<PromoBatch, ClientError> {
        self.call(session, Request::post("/admin/promo/generate").json(batch)?)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_total_after_discount() {
        let validation: PromoValidation =
            serde_json::from_value(json!({"code": "SAVE10", "discount": 5.00})).unwrap();

        let total = validation.new_total(Money::parse("50.00").unwrap());
        assert_eq!(total.to_string(), "45.00");
    }

    #[test]
    fn test_validation_without_discount_fails() {
        let result: Result<PromoValidation, _> = serde_json::from_value(json!({"code": "X"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_new_promocode_omits_empty_limits() {
        let promo = NewPromocode {
            code: "WELCOME".to_owned(),
            kind: PromoKind::Amount,
            value: 500.0,
            active: true,
            limits: PromoLimits {
                max_redemptions: Some(100),
                ..PromoLimits::default()
            },
        };

        assert_eq!(
            serde_json::to_value(&promo).unwrap(),
            json!({"code": "WELCOME", "kind": "amount", "value": 500.0, "active": true, "max_redemptions": 100})
        );
    }

    #[test]
    fn test_batch_defaults() {
        let batch = serde_json::to_value(PromoBatchRequest::new("SUMMER")).unwrap();
        assert_eq!(
            batch,
            json!({"prefix": "SUMMER", "length": 6, "count": 10, "kind": "percent", "value": 10.0, "active": true})
        );
    }

    #[test]
    fn test_code_is_escaped_in_path() {
        assert_eq!(segment("A B/C"), "A%20B%2FC");
    }
}
