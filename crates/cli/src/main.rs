//! Glyca CLI - database migrations and operational tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! glyca-cli migrate
//!
//! # List recorded orders, newest first
//! glyca-cli orders list
//! glyca-cli orders list --status pending --sort price --asc
//!
//! # Verify the Shopify Admin API token
//! glyca-cli shopify check
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};
use glyca_core::OrderStatus;
use glyca_storefront::db::{OrderFilter, OrderSort, SortDirection};

mod commands;

#[derive(Parser)]
#[command(name = "glyca-cli")]
#[command(author, version, about = "Glyca CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Inspect recorded orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Shopify Admin API tools
    Shopify {
        #[command(subcommand)]
        action: ShopifyAction,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders
    List {
        /// Only orders with this status
        #[arg(short, long)]
        status: Option<StatusArg>,

        /// Sort key
        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort: SortArg,

        /// Sort ascending (default is descending)
        #[arg(long)]
        asc: bool,
    },
}

#[derive(Subcommand)]
enum ShopifyAction {
    /// Check that the configured access token can read the shop
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Shipped,
    Delivered,
    Error,
}

impl From<StatusArg> for OrderStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Shipped => Self::Shipped,
            StatusArg::Delivered => Self::Delivered,
            StatusArg::Error => Self::Error,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Date,
    Price,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Orders { action } => match action {
            OrdersAction::List { status, sort, asc } => {
                let filter = OrderFilter {
                    status: status.map(OrderStatus::from),
                    sort: match sort {
                        SortArg::Date => OrderSort::Date,
                        SortArg::Price => OrderSort::Price,
                    },
                    direction: if asc {
                        SortDirection::Asc
                    } else {
                        SortDirection::Desc
                    },
                };
                commands::orders::list(&filter).await?;
            }
        },
        Commands::Shopify { action } => match action {
            ShopifyAction::Check => commands::shopify::check().await?,
        },
    }
    Ok(())
}
