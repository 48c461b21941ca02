//! Status and option enums shared with the backend.
//!
//! Every enum here travels over the wire as a fixed string. The
//! `wire_enum!` macro keeps the serde name, `Display`, and `FromStr` in one
//! place so the three can never drift apart.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($label:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $wire)] $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The wire representation.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(needle))
                    .ok_or_else(|| {
                        let expected = Self::ALL
                            .iter()
                            .map(Self::as_str)
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("invalid {}: {needle} (expected one of: {expected})", $label)
                    })
            }
        }
    };
}

wire_enum! {
    /// Order lifecycle status.
    #[derive(Default)]
    OrderStatus("order status") {
        #[default]
        New => "NEW",
        Cooking => "COOKING",
        OnWay => "ON_WAY",
        Delivered => "DELIVERED",
        Cancelled => "CANCELLED",
    }
}

impl OrderStatus {
    /// Returns `true` once the order can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }
}

wire_enum! {
    /// How an order reaches the customer.
    #[derive(Default)]
    Fulfillment("fulfillment") {
        #[default]
        Delivery => "delivery",
        Pickup => "pickup",
    }
}

wire_enum! {
    /// How an order is paid.
    #[derive(Default)]
    PaymentMethod("payment method") {
        /// Cash on delivery.
        #[default]
        Cod => "cod",
        Online => "online",
    }
}

wire_enum! {
    /// Discount calculation applied by a promocode.
    #[derive(Default)]
    PromoKind("promo kind") {
        /// Percentage of the subtotal.
        #[default]
        Percent => "percent",
        /// Fixed amount off.
        Amount => "amount",
    }
}

wire_enum! {
    /// Platform a push device registers from.
    DevicePlatform("platform") {
        Android => "android",
        Ios => "ios",
        Web => "web",
    }
}

wire_enum! {
    /// Audience for an admin push notification.
    #[derive(Default)]
    PushTarget("push target") {
        #[default]
        All => "all",
        Test => "test",
    }
}

wire_enum! {
    /// Grouping period for order analytics.
    #[derive(Default)]
    AnalyticsPeriod("period") {
        #[default]
        Day => "day",
        Week => "week",
        Month => "month",
    }
}

wire_enum! {
    /// Sort field for the dish popularity report.
    #[derive(Default)]
    DishSortField("sort field") {
        #[default]
        Qty => "qty",
        Revenue => "revenue",
        Orders => "orders",
        AvgPrice => "avg_price",
        Name => "name",
    }
}

wire_enum! {
    /// Sort direction.
    #[derive(Default)]
    SortOrder("sort order") {
        Asc => "asc",
        #[default]
        Desc => "desc",
    }
}

wire_enum! {
    /// Banner category shown in the mobile apps.
    #[derive(Default)]
    BannerType("banner type") {
        #[default]
        Promo => "promo",
        Info => "info",
        Event => "event",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        assert_eq!(OrderStatus::OnWay.to_string(), "ON_WAY");
        assert_eq!(
            serde_json::to_string(&OrderStatus::Cancelled).unwrap(),
            "\"CANCELLED\""
        );
        let parsed: OrderStatus = serde_json::from_str("\"COOKING\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cooking);
    }

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!("on_way".parse::<OrderStatus>().unwrap(), OrderStatus::OnWay);
        assert_eq!(" Pickup ".parse::<Fulfillment>().unwrap(), Fulfillment::Pickup);
    }

    #[test]
    fn test_from_str_lists_expected_values() {
        let err = "teleport".parse::<Fulfillment>().unwrap_err();
        assert!(err.contains("fulfillment"));
        assert!(err.contains("delivery, pickup"));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::New.is_terminal());
    }

    #[test]
    fn test_defaults_match_harness_defaults() {
        assert_eq!(DishSortField::default(), DishSortField::Qty);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!(AnalyticsPeriod::default(), AnalyticsPeriod::Day);
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cod);
    }
}
