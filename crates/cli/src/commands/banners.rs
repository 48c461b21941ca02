//! Banner commands (admin).

use appetit_client::BannerFields;
use appetit_core::{BannerId, BannerType};
use chrono::NaiveDateTime;
use clap::{Args, Subcommand};

use super::{CommandResult, Context, or_dash};

#[derive(Subcommand)]
pub enum BannerCommands {
    /// List banners
    List,

    /// Create a banner
    Create(BannerArgs),

    /// Replace a banner's fields
    Update {
        id: BannerId,

        #[command(flatten)]
        banner: BannerArgs,
    },

    /// Delete a banner
    Delete { id: BannerId },
}

#[derive(Args)]
pub struct BannerArgs {
    #[arg(long)]
    title: String,

    /// promo, info or event
    #[arg(long = "type", default_value_t = BannerType::Promo)]
    banner_type: BannerType,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    image_url: Option<String>,

    /// Link opened when the banner is tapped
    #[arg(long)]
    action_url: Option<String>,

    /// Show from (YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    start: Option<NaiveDateTime>,

    /// Show until (YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    end: Option<NaiveDateTime>,

    #[arg(long, default_value_t = 0)]
    sort_order: u32,

    /// Create the banner hidden
    #[arg(long)]
    inactive: bool,
}

impl From<BannerArgs> for BannerFields {
    fn from(args: BannerArgs) -> Self {
        Self {
            description: args.description,
            image_url: args.image_url,
            action_url: args.action_url,
            start_date: args.start,
            end_date: args.end,
            sort_order: args.sort_order,
            is_active: !args.inactive,
            ..Self::new(args.title, args.banner_type)
        }
    }
}

/// Run a banner command.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn run(ctx: &Context, command: BannerCommands) -> CommandResult {
    match command {
        BannerCommands::List => {
            let banners = ctx.surface(ctx.client.list_banners(ctx.session()).await)?;
            ctx.render(&banners, |out, banners| {
                if banners.is_empty() {
                    return writeln!(out, "No banners.");
                }
                for banner in banners {
                    let fields = &banner.fields;
                    writeln!(
                        out,
                        "#{} [{}] {:<32} sort {} {}",
                        banner.id,
                        fields.banner_type,
                        fields.title,
                        fields.sort_order,
                        if fields.is_active { "active" } else { "inactive" }
                    )?;
                    writeln!(out, "    {}", or_dash(fields.action_url.as_deref()))?;
                }
                Ok(())
            })
        }
        BannerCommands::Create(args) => {
            let banner = BannerFields::from(args);
            let response = ctx.surface(ctx.client.create_banner(ctx.session(), &banner).await)?;
            ctx.done(&format!("Banner '{}' created", banner.title), &response)
        }
        BannerCommands::Update { id, banner } => {
            let banner = BannerFields::from(banner);
            let response = ctx.surface(ctx.client.update_banner(ctx.session(), id, &banner).await)?;
            ctx.done(&format!("Banner #{id} updated"), &response)
        }
        BannerCommands::Delete { id } => {
            let response = ctx.surface(ctx.client.delete_banner(ctx.session(), id).await)?;
            ctx.done(&format!("Banner #{id} deleted"), &response)
        }
    }
}
