//! Shopping cart.

use appetit_core::{CartItemId, LineAmount, MenuItemId, Money, subtotal};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;

use super::MenuItem;
use crate::dispatcher::{ApiClient, Request};
use crate::error::ClientError;
use crate::session::Session;

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub qty: u32,
    pub menu_item: MenuItem,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.amount().total()
    }

    const fn amount(&self) -> LineAmount {
        LineAmount::new(self.menu_item.price, self.qty)
    }
}

/// The caller's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartLine>,
}

impl Cart {
    /// Sum of price times quantity over every line, computed locally.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        subtotal(self.items.iter().map(CartLine::amount))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ApiClient {
    /// Fetch the cart. A `null` body is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn get_cart(&self, session: Option<&Session>) -> Result<Cart, ClientError> {
        let cart: Option<Cart> = self.call(session, Request::get("/cart")).await?;
        Ok(cart.unwrap_or_default())
    }

    /// Add `qty` units of a menu item.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn add_to_cart(
        &self,
        session: Option<&Session>,
        item_id: MenuItemId,
        qty: u32,
    ) -> Result<Value, ClientError> {
        let body = json!({"item_id": item_id, "qty": qty});
        self.dispatch(session, Request::post("/cart/add").with_body(body))
            .await
    }

    /// Change a line's quantity. Zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn set_cart_qty(
        &self,
        session: Option<&Session>,
        line_id: CartItemId,
        qty: u32,
    ) -> Result<Value, ClientError> {
        if qty == 0 {
            return self.remove_from_cart(session, line_id).await;
        }

        let request =
            Request::patch(format!("/cart/items/{line_id}")).with_body(json!({"qty": qty}));
        self.dispatch(session, request).await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn remove_from_cart(
        &self,
        session: Option<&Session>,
        line_id: CartItemId,
    ) -> Result<Value, ClientError> {
        self.dispatch(session, Request::delete(format!("/cart/items/{line_id}")))
            .await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, session))]
    pub async fn clear_cart(&self, session: Option<&Session>) -> Result<Value, ClientError> {
        self.dispatch(session, Request::delete("/cart/clear")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i64, price: f64, qty: u32) -> Value {
        json!({
            "id": id,
            "qty": qty,
            "menu_item": {"id": id * 10, "name": format!("dish {id}"), "price": price, "is_active": true}
        })
    }

    #[test]
    fn test_subtotal_over_lines() {
        let cart: Cart =
            serde_json::from_value(json!({"items": [line(1, 10.0, 2), line(2, 7.5, 1)]})).unwrap();

        assert_eq!(cart.subtotal().to_string(), "27.50");
        assert_eq!(cart.items[0].line_total().to_string(), "20.00");
    }

    #[test]
    fn test_empty_cart() {
        let cart: Cart = serde_json::from_value(json!({})).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::ZERO);
    }

    #[test]
    fn test_float_prices_sum_exactly() {
        let cart: Cart =
            serde_json::from_value(json!({"items": [line(1, 0.1, 1), line(2, 0.2, 1)]})).unwrap();
        assert_eq!(cart.subtotal().to_string(), "0.30");
    }
}
