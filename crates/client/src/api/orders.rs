//! Orders and the test-order flow.

use appetit_core::{Fulfillment, MenuItemId, Money, OrderId, OrderStatus, PaymentMethod};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::session::Session;

/// A line on a placed order, priced when the order was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    #[serde(default)]
    pub item_id: Option<MenuItemId>,
    pub name_snapshot: String,
    pub qty: u32,
    pub price_at_moment: Money,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub number: String,
    pub status: OrderStatus,
    pub fulfillment: Fulfillment,
    #[serde(default)]
    pub address_text: Option<String>,
    pub subtotal: Money,
    #[serde(default)]
    pub discount: Money,
    pub total: Money,
    #[serde(default)]
    pub paid: bool,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub promocode_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

/// Checkout details for a new order built from the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    pub fulfillment: Fulfillment,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
}

/// Result of [`ApiClient::create_test_order`].
#[derive(Debug, Clone, PartialEq)]
pub enum TestOrderOutcome {
    /// The menu is empty, so nothing could be ordered.
    NoMenuItems,
    /// The first menu item was ordered.
    Created {
        item_id: MenuItemId,
        order: Value,
    },
}

impl ApiClient {
    /// List orders visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn list_orders(&self, session: Option<&Session>) -> Result<Vec<Order>, ClientError> {
        self.call(session, Request::get("/orders")).await
    }

    /// Fetch one order.
    ///
    /// # Errors
    ///
    /// Returns error if the order does not exist or the request fails.
    #[instrument(skip(self, session), fields(order_id = %id))]
    pub async fn get_order(
        &self,
        session: Option<&Session>,
        id: OrderId,
    ) -> Result<Order, ClientError> {
        self.call(session, Request::get(format!("/orders/{id}")))
            .await
    }

    /// Place an order from the current cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session, order), fields(fulfillment = %order.fulfillment))]
    pub async fn create_order(
        &self,
        session: Option<&Session>,
        order: &NewOrder,
    ) -> Result<Value, ClientError> {
        self.dispatch(session, Request::post("/orders").json(order)?)
            .await
    }

    /// Move an order to a new status (admin).
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        session: Option<&Session>,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Value, ClientError> {
        let request = Request::patch(format!("/admin/orders/{id}/status"))
            .with_body(json!({"status": status}));
        self.dispatch(session, request).await
    }

    /// Put the first menu item in the cart, then place an order.
    ///
    /// Stops before touching the cart when the menu is empty.
    ///
    /// # Errors
    ///
    /// Returns the first failing call's error.
    #[instrument(skip(self, session, order))]
    pub async fn create_test_order(
        &self,
        session: Option<&Session>,
        order: &NewOrder,
    ) -> Result<TestOrderOutcome, ClientError> {
        let items = self.list_menu_items(session).await?;
        let Some(first) = items.first() else {
            return Ok(TestOrderOutcome::NoMenuItems);
        };

        self.add_to_cart(session, first.id, 1).await?;
        let created = self.create_order(session, order).await?;

        info!(item_id = %first.id, "Test order created");
        Ok(TestOrderOutcome::Created {
            item_id: first.id,
            order: created,
        })
    }
}
