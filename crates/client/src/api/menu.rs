//! Menu categories and items.

use appetit_core::{CategoryId, MenuItemId, Money};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::session::Session;

/// A menu category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub sort: i32,
}

/// A dish on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: MenuItemId,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Money,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

const fn default_active() -> bool {
    true
}

/// New category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub sort: i32,
}

/// New menu item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMenuItem {
    pub category_id: CategoryId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_active: bool,
}

impl ApiClient {
    /// List menu categories.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn list_categories(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<Category>, ClientError> {
        self.call(session, Request::get("/menu/categories")).await
    }

    /// List menu items.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn list_menu_items(
        &self,
        session: Option<&Session>,
    ) -> Result<Vec<MenuItem>, ClientError> {
        self.call(session, Request::get("/menu/items")).await
    }

    /// Create a category (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, category), fields(name = %category.name))]
    pub async fn create_category(
        &self,
        session: Option<&Session>,
        category: &NewCategory,
    ) -> Result<Value, ClientError> {
        self.dispatch(
            session,
            Request::post("/admin/menu/categories").json(category)?,
        )
        .await
    }

    /// Create a menu item (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, item), fields(name = %item.name, price = %item.price))]
    pub async fn create_menu_item(
        &self,
        session: Option<&Session>,
        item: &NewMenuItem,
    ) -> Result<Value, ClientError> {
        self.dispatch(session, Request::post("/admin/menu/items").json(item)?)
            .await
    }
}
