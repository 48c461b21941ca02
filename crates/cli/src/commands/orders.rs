//! Order commands.

use std::io::Write;

use appetit_client::{NewOrder, Notice, Order, TestOrderOutcome};
use appetit_core::{Fulfillment, OrderId, OrderStatus, PaymentMethod};
use clap::{Args, Subcommand};

use super::{CommandResult, Context, or_dash};

#[derive(Subcommand)]
pub enum OrderCommands {
    /// List orders
    List,

    /// Show one order with its lines
    Show { id: OrderId },

    /// Place an order from the current cart
    Create(Checkout),

    /// Put the first menu item in the cart and place an order
    Test(Checkout),

    /// Move an order to a new status (admin)
    Status {
        id: OrderId,

        /// NEW, COOKING, ON_WAY, DELIVERED or CANCELLED
        status: OrderStatus,
    },
}

#[derive(Args)]
pub struct Checkout {
    /// delivery or pickup
    #[arg(long, default_value_t = Fulfillment::Delivery)]
    fulfillment: Fulfillment,

    /// cod or online
    #[arg(long, default_value_t = PaymentMethod::Cod)]
    payment: PaymentMethod,

    /// Delivery address
    #[arg(long)]
    address: Option<String>,

    #[arg(long)]
    promo: Option<String>,

    /// Attribution source recorded with the order
    #[arg(long)]
    utm_source: Option<String>,
}

impl From<Checkout> for NewOrder {
    fn from(checkout: Checkout) -> Self {
        Self {
            fulfillment: checkout.fulfillment,
            payment_method: checkout.payment,
            address_text: checkout.address,
            promo_code: checkout.promo,
            utm_source: checkout.utm_source,
        }
    }
}

/// Run an order command.
///
/// # Errors
///
/// Returns an error if a request fails.
pub async fn run(ctx: &Context, command: OrderCommands) -> CommandResult {
    match command {
        OrderCommands::List => {
            let orders = ctx.surface(ctx.client.list_orders(ctx.session()).await)?;
            ctx.render(&orders, |out, orders| {
                if orders.is_empty() {
                    return writeln!(out, "No orders.");
                }
                for order in orders {
                    write_order_line(out, order)?;
                }
                Ok(())
            })
        }
        OrderCommands::Show { id } => {
            let order = ctx.surface(ctx.client.get_order(ctx.session(), id).await)?;
            ctx.render(&order, |out, order| {
                write_order_line(out, order)?;
                writeln!(out, "  address: {}", or_dash(order.address_text.as_deref()))?;
                writeln!(out, "  promo:   {}", or_dash(order.promocode_code.as_deref()))?;
                for line in &order.items {
                    writeln!(
                        out,
                        "  {:>3} x {:<32} {:>10}",
                        line.qty,
                        line.name_snapshot,
                        line.price_at_moment.to_string()
                    )?;
                }
                writeln!(
                    out,
                    "  subtotal {}  discount {}  total {}",
                    order.subtotal, order.discount, order.total
                )
            })
        }
        OrderCommands::Create(checkout) => {
            let order = NewOrder::from(checkout);
            let response = ctx.surface(ctx.client.create_order(ctx.session(), &order).await)?;
            ctx.done("Order placed", &response)
        }
        OrderCommands::Test(checkout) => {
            let order = NewOrder::from(checkout);
            match ctx.surface(ctx.client.create_test_order(ctx.session(), &order).await)? {
                TestOrderOutcome::NoMenuItems => {
                    ctx.notify(Notice::warning("No menu items found. Create a menu item first."));
                    Ok(())
                }
                TestOrderOutcome::Created { item_id, order } => {
                    ctx.done(&format!("Test order placed with menu item #{item_id}"), &order)
                }
            }
        }
        OrderCommands::Status { id, status } => {
            let response = ctx.surface(
                ctx.client
                    .update_order_status(ctx.session(), id, status)
                    .await,
            )?;
            let closed = if status.is_terminal() { " (closed)" } else { "" };
            ctx.done(&format!("Order #{id} is now {status}{closed}"), &response)
        }
    }
}

fn write_order_line(out: &mut dyn Write, order: &Order) -> std::io::Result<()> {
    writeln!(
        out,
        "#{} {:<10} {:<10} {:<9} {:>10} {} {}",
        order.id,
        order.number,
        order.status.as_str(),
        order.fulfillment.as_str(),
        order.total.to_string(),
        if order.paid { "paid" } else { "unpaid" },
        order.created_at.as_deref().unwrap_or_default()
    )
}
