//! Cart commands. The subtotal shown is computed locally from the lines.

use appetit_core::{CartItemId, MenuItemId};
use clap::Subcommand;

use super::{CommandResult, Context};

#[derive(Subcommand)]
pub enum CartCommands {
    /// Show the cart and its subtotal
    Show,

    /// Add a menu item
    Add {
        item: MenuItemId,

        #[arg(long, default_value_t = 1)]
        qty: u32,
    },

    /// Change a line's quantity; 0 removes the line
    Set { line: CartItemId, qty: u32 },

    /// Remove a line
    Remove { line: CartItemId },

    /// Empty the cart
    Clear,
}

/// Run a cart command.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn run(ctx: &Context, command: CartCommands) -> CommandResult {
    match command {
        CartCommands::Show => {
            let cart = ctx.surface(ctx.client.get_cart(ctx.session()).await)?;
            ctx.render(&cart, |out, cart| {
                if cart.is_empty() {
                    return writeln!(out, "Cart is empty.");
                }
                for line in &cart.items {
                    writeln!(
                        out,
                        "line {:<5} {:<32} {:>3} x {:>10} = {:>10}",
                        line.id.to_string(),
                        line.menu_item.name,
                        line.qty,
                        line.menu_item.price.to_string(),
                        line.line_total().to_string()
                    )?;
                }
                writeln!(out, "subtotal {}", cart.subtotal())
            })
        }
        CartCommands::Add { item, qty } => {
            let response = ctx.surface(ctx.client.add_to_cart(ctx.session(), item, qty).await)?;
            ctx.done("Added to cart", &response)
        }
        CartCommands::Set { line, qty } => {
            let response = ctx.surface(ctx.client.set_cart_qty(ctx.session(), line, qty).await)?;
            if qty == 0 {
                ctx.done("Removed from cart", &response)
            } else {
                ctx.done("Cart updated", &response)
            }
        }
        CartCommands::Remove { line } => {
            let response = ctx.surface(ctx.client.remove_from_cart(ctx.session(), line).await)?;
            ctx.done("Removed from cart", &response)
        }
        CartCommands::Clear => {
            let response = ctx.surface(ctx.client.clear_cart(ctx.session()).await)?;
            ctx.done("Cart cleared", &response)
        }
    }
}
