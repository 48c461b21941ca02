//! Menu commands.

use appetit_client::{NewCategory, NewMenuItem};
use appetit_core::{CategoryId, Money};
use clap::Subcommand;

use super::{CommandResult, Context};

#[derive(Subcommand)]
pub enum MenuCommands {
    /// List menu items
    Items,

    /// List categories
    Categories,

    /// Create a category (admin)
    AddCategory {
        name: String,

        /// Position in the menu
        #[arg(long, default_value_t = 0)]
        sort: i32,
    },

    /// Create a menu item (admin)
    AddItem {
        #[arg(long)]
        category: CategoryId,

        #[arg(long)]
        name: String,

        /// Price, e.g. 1990 or 12.50
        #[arg(long)]
        price: Money,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image_url: Option<String>,

        /// Create the item hidden from customers
        #[arg(long)]
        inactive: bool,
    },
}

/// Run a menu command.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn run(ctx: &Context, command: MenuCommands) -> CommandResult {
    match command {
        MenuCommands::Items => {
            let items = ctx.surface(ctx.client.list_menu_items(ctx.session()).await)?;
            ctx.render(&items, |out, items| {
                if items.is_empty() {
                    return writeln!(out, "No menu items.");
                }
                for item in items {
                    let category = item
                        .category_id
                        .map_or_else(|| "-".to_owned(), |id| id.to_string());
                    writeln!(
                        out,
                        "#{} {:<32} {:>10}  category {} {}",
                        item.id,
                        item.name,
                        item.price.to_string(),
                        category,
                        if item.is_active { "" } else { "(inactive)" }
                    )?;
                }
                Ok(())
            })
        }
        MenuCommands::Categories => {
            let categories = ctx.surface(ctx.client.list_categories(ctx.session()).await)?;
            ctx.render(&categories, |out, categories| {
                if categories.is_empty() {
                    return writeln!(out, "No categories.");
                }
                for category in categories {
                    writeln!(out, "#{} {:<32} sort {}", category.id, category.name, category.sort)?;
                }
                Ok(())
            })
        }
        MenuCommands::AddCategory { name, sort } => {
            let category = NewCategory { name, sort };
            let response = ctx.surface(ctx.client.create_category(ctx.session(), &category).await)?;
            ctx.done(&format!("Category '{}' created", category.name), &response)
        }
        MenuCommands::AddItem {
            category,
            name,
            price,
            description,
            image_url,
            inactive,
        } => {
            let item = NewMenuItem {
                category_id: category,
                name,
                description,
                price,
                image_url,
                is_active: !inactive,
            };
            let response = ctx.surface(ctx.client.create_menu_item(ctx.session(), &item).await)?;
            ctx.done(&format!("Menu item '{}' created", item.name), &response)
        }
    }
}
