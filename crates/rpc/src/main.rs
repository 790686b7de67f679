//! Fourmiz CLI - Main entry point

use clap::{Parser, Subcommand};
use fourmiz_roles::ProfileUpdate;
use fourmiz_rpc::{commands, AppContext};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fourmiz")]
#[command(about = "Fourmiz - dual-role accounts and wallet ledger", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a role (client or fourmiz) to an account
    AddRole {
        /// Account ID
        account: String,
        /// Role to add: client or fourmiz
        role: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        postal_code: Option<String>,
        /// Payout destination identity (fourmiz only)
        #[arg(long)]
        payout_account: Option<String>,
        /// Identity document reference (fourmiz only)
        #[arg(long)]
        id_document: Option<String>,
    },

    /// Show the capability view of an account
    Capabilities {
        /// Account ID
        account: String,
    },

    /// Recompute and show the wallet balance
    Balance {
        /// Account ID
        account: String,
    },

    /// Credit a referral bonus
    GrantBonus {
        account: String,
        amount: Decimal,
        /// Idempotency reference of the originating event
        #[arg(long)]
        source_ref: String,
    },

    /// Credit a referral commission
    GrantCommission {
        account: String,
        amount: Decimal,
        #[arg(long)]
        source_ref: String,
    },

    /// Credit a reward
    GrantReward {
        account: String,
        amount: Decimal,
        #[arg(long)]
        source_ref: String,
    },

    /// Record a manual adjustment, positive or negative (back-office)
    Adjust {
        account: String,
        /// Signed amount, e.g. -5 to correct an overcredit
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
    },

    /// Record a payout request
    RequestPayout {
        account: String,
        amount: Decimal,
        /// paypal, gift_card or voucher
        method: String,
        destination: String,
    },

    /// Settle a pending payout request (back-office)
    SettlePayout {
        /// Payout request ID
        request: String,
    },

    /// Reject a pending payout request (back-office)
    RejectPayout {
        /// Payout request ID
        request: String,
    },

    /// Create a wallet-funded order
    CreateOrder {
        /// Client account ID
        client: String,
        /// Proposed amount
        amount: Decimal,
        /// Urgency surcharge
        #[arg(long, default_value = "0")]
        surcharge: Decimal,
        /// What the fourmiz earns on completion
        #[arg(long)]
        fourmiz_amount: Decimal,
    },

    /// Claim a pending order
    AcceptOrder {
        order: String,
        /// Claiming fourmiz account ID
        fourmiz: String,
    },

    /// Start the work on an accepted order
    StartOrder {
        order: String,
        /// Assigned fourmiz account ID
        fourmiz: String,
    },

    /// Record a completion validation
    ValidateOrder {
        order: String,
        /// Validating party: client or fourmiz
        by: String,
        /// Acting account ID
        account: String,
    },

    /// Cancel a not-yet-started order
    CancelOrder {
        order: String,
        /// Cancelling actor: client or system
        #[arg(long, default_value = "client")]
        by: String,
        /// Acting account ID (required for client cancellations)
        #[arg(long)]
        account: Option<String>,
    },

    /// List an account's transactions
    Transactions {
        account: String,
    },

    /// List an account's payout requests
    Payouts {
        account: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Create application context
    let mut ctx = AppContext::new(&cli.data).await?;

    let result = run(&ctx, cli.command).await;
    ctx.shutdown().await;
    result
}

async fn run(ctx: &AppContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::AddRole {
            account,
            role,
            first_name,
            last_name,
            phone,
            address,
            city,
            postal_code,
            payout_account,
            id_document,
        } => {
            let fields = ProfileUpdate {
                first_name,
                last_name,
                phone,
                address,
                city,
                postal_code,
                payout_account,
                id_document,
            };
            commands::add_role(ctx, &account, &role, fields).await
        }

        Commands::Capabilities { account } => commands::capabilities(ctx, &account).await,

        Commands::Balance { account } => commands::balance(ctx, &account).await,

        Commands::GrantBonus {
            account,
            amount,
            source_ref,
        } => commands::grant_bonus(ctx, &account, amount, &source_ref).await,

        Commands::GrantCommission {
            account,
            amount,
            source_ref,
        } => commands::grant_commission(ctx, &account, amount, &source_ref).await,

        Commands::GrantReward {
            account,
            amount,
            source_ref,
        } => commands::grant_reward(ctx, &account, amount, &source_ref).await,

        Commands::Adjust { account, amount } => commands::adjust(ctx, &account, amount).await,

        Commands::RequestPayout {
            account,
            amount,
            method,
            destination,
        } => commands::request_payout(ctx, &account, amount, &method, &destination).await,

        Commands::SettlePayout { request } => commands::settle_payout(ctx, &request).await,

        Commands::RejectPayout { request } => commands::reject_payout(ctx, &request).await,

        Commands::CreateOrder {
            client,
            amount,
            surcharge,
            fourmiz_amount,
        } => commands::create_order(ctx, &client, amount, surcharge, fourmiz_amount).await,

        Commands::AcceptOrder { order, fourmiz } => {
            commands::accept_order(ctx, &order, &fourmiz).await
        }

        Commands::StartOrder { order, fourmiz } => {
            commands::start_order(ctx, &order, &fourmiz).await
        }

        Commands::ValidateOrder { order, by, account } => {
            commands::validate_order(ctx, &order, &by, &account).await
        }

        Commands::CancelOrder { order, by, account } => {
            commands::cancel_order(ctx, &order, &by, account.as_deref()).await
        }

        Commands::Transactions { account } => commands::transactions(ctx, &account).await,

        Commands::Payouts { account } => commands::payouts(ctx, &account).await,
    }
}
