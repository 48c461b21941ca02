//! Promotional banners shown in the mobile apps.

use appetit_core::{BannerId, BannerType};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::session::Session;

/// A stored banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    #[serde(flatten)]
    pub fields: BannerFields,
}

/// Editable banner fields, used both to create and to replace a banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerFields {
    pub title: String,
    pub banner_type: BannerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub sort_order: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

impl BannerFields {
    /// Active banner of the given type with nothing else set.
    #[must_use]
    pub fn new(title: impl Into<String>, banner_type: BannerType) -> Self {
        Self {
            title: title.into(),
            banner_type,
            description: None,
            image_url: None,
            action_url: None,
            start_date: None,
            end_date: None,
            sort_order: 0,
            is_active: true,
        }
    }
}

impl ApiClient {
    /// List banners (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn list_banners(&self, session: Option<&Session>) -> Result<Vec<Banner>, ClientError> {
        self.call(session, Request::get("/admin/banners")).await
    }

    /// Create a banner (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, banner), fields(title = %banner.title))]
    pub async fn create_banner(
        &self,
        session: Option<&Session>,
        banner: &BannerFields,
    ) -> Result<Value, ClientError> {
        self.dispatch(session, Request::post("/admin/banners").json(banner)?)
            .await
    }

    /// Replace a banner's fields (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, banner), fields(banner_id = %id))]
    pub async fn update_banner(
        &self,
        session: Option<&Session>,
        id: BannerId,
        banner: &BannerFields,
    ) -> Result<Value, ClientError> {
        self.dispatch(
            session,
            Request::put(format!("/admin/banners/{id}")).json(banner)?,
        )
        .await
    }

    /// Delete a banner (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session), fields(banner_id = %id))]
    pub async fn delete_banner(
        &self,
        session: Option<&Session>,
        id: BannerId,
    ) -> Result<Value, ClientError> {
        self.dispatch(session, Request::delete(format!("/admin/banners/{id}")))
            .await
    }
}
