//! CLI commands

use crate::context::AppContext;
use fourmiz_core::{Amount, Role};
use fourmiz_orders::{CancelActor, OrderParty, OrderSpec};
use fourmiz_payouts::PayoutMethod;
use fourmiz_roles::ProfileUpdate;
use fourmiz_wallet::GrantOutcome;
use rust_decimal::Decimal;

fn parse_role(role: &str) -> Result<Role, anyhow::Error> {
    role.parse()
        .map_err(|_| anyhow::anyhow!("unknown role: {role} (expected client or fourmiz)"))
}

fn parse_amount(amount: Decimal) -> Result<Amount, anyhow::Error> {
    Ok(Amount::new(amount)?)
}

/// Add a role to an account, merging the supplied profile fields
pub async fn add_role(
    ctx: &AppContext,
    account_id: &str,
    role: &str,
    fields: ProfileUpdate,
) -> Result<(), anyhow::Error> {
    let role = parse_role(role)?;
    let outcome = ctx.mutator.add_role(account_id, role, &fields).await?;

    if outcome.noop {
        println!("✅ {account_id} already holds the {role} role (no-op)");
    } else {
        println!(
            "✅ Added {role} to {account_id} (roles: {}, profile complete: {})",
            outcome.account.roles, outcome.account.profile_complete
        );
    }
    Ok(())
}

/// Show the capability view of an account
pub async fn capabilities(ctx: &AppContext, account_id: &str) -> Result<(), anyhow::Error> {
    let caps = ctx.resolver.resolve(account_id).await?;

    println!("Capabilities for {account_id}:");
    if caps.roles.is_empty() {
        println!("  roles: (none)");
    } else {
        println!("  roles: {}", caps.roles);
    }
    println!("  basic info: {}", caps.has_basic_info);
    println!("  fourmiz info: {}", caps.has_fourmiz_info);
    println!("  profile complete: {}", caps.profile_complete);

    for role in [Role::Client, Role::Fourmiz] {
        if caps.can_add_role(role) {
            let missing = caps.missing_fields(role);
            if missing.is_empty() {
                println!("  may add {role}: yes");
            } else {
                let names: Vec<String> = missing.iter().map(|f| f.to_string()).collect();
                println!("  may add {role}: missing {}", names.join(", "));
            }
        }
    }
    Ok(())
}

/// Recompute and show the wallet balance
pub async fn balance(ctx: &AppContext, account_id: &str) -> Result<(), anyhow::Error> {
    let balance = ctx.ledger.compute_balance(account_id).await?;

    println!("Balance for {account_id}:");
    println!("  available: {}", balance.available_balance);
    println!("  pending:   {}", balance.pending_balance);
    println!("  earned:    {}", balance.total_earned);
    println!("  withdrawn: {}", balance.total_withdrawn);
    for (kind, total) in &balance.by_kind {
        println!("    {kind}: {total}");
    }
    Ok(())
}

/// Credit a referral bonus
pub async fn grant_bonus(
    ctx: &AppContext,
    account_id: &str,
    amount: Decimal,
    source_ref: &str,
) -> Result<(), anyhow::Error> {
    let outcome = ctx
        .earnings
        .grant_referral_bonus(account_id, parse_amount(amount)?, source_ref)
        .await?;
    print_grant(account_id, amount, outcome);
    Ok(())
}

/// Credit a referral commission
pub async fn grant_commission(
    ctx: &AppContext,
    account_id: &str,
    amount: Decimal,
    source_ref: &str,
) -> Result<(), anyhow::Error> {
    let outcome = ctx
        .earnings
        .grant_referral_commission(account_id, parse_amount(amount)?, source_ref)
        .await?;
    print_grant(account_id, amount, outcome);
    Ok(())
}

/// Credit a reward
pub async fn grant_reward(
    ctx: &AppContext,
    account_id: &str,
    amount: Decimal,
    source_ref: &str,
) -> Result<(), anyhow::Error> {
    let outcome = ctx
        .earnings
        .grant_reward(account_id, parse_amount(amount)?, source_ref)
        .await?;
    print_grant(account_id, amount, outcome);
    Ok(())
}

fn print_grant(account_id: &str, amount: Decimal, outcome: GrantOutcome) {
    match outcome {
        GrantOutcome::Created(tx) => {
            println!("✅ Credited {amount} to {account_id} ({})", tx.id);
        }
        GrantOutcome::AlreadyGranted => {
            println!("✅ Already credited (no-op)");
        }
    }
}

/// Record a manual adjustment, positive or negative (back-office)
pub async fn adjust(
    ctx: &AppContext,
    account_id: &str,
    amount: Decimal,
) -> Result<(), anyhow::Error> {
    let tx = ctx.earnings.append_manual(account_id, amount).await?;
    println!("✅ Recorded manual adjustment of {amount} for {account_id} ({})", tx.id);
    Ok(())
}

/// Record a payout request
pub async fn request_payout(
    ctx: &AppContext,
    account_id: &str,
    amount: Decimal,
    method: &str,
    destination: &str,
) -> Result<(), anyhow::Error> {
    let method: PayoutMethod = method
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown payout method: {method}"))?;

    let request = ctx
        .payouts
        .request(account_id, parse_amount(amount)?, method, destination)
        .await?;
    println!(
        "✅ Payout request {} recorded: {} via {} to {}",
        request.id, request.amount, request.method, request.destination
    );
    Ok(())
}

/// Settle a pending payout request (back-office)
pub async fn settle_payout(ctx: &AppContext, request_id: &str) -> Result<(), anyhow::Error> {
    use fourmiz_payouts::SettleOutcome;

    match ctx.settlement.settle(request_id).await? {
        SettleOutcome::Settled(request) => {
            println!("✅ Settled {} ({} withdrawn)", request.id, request.amount);
        }
        SettleOutcome::AlreadySettled(request) => {
            println!("✅ {} was already settled (no-op)", request.id);
        }
    }
    Ok(())
}

/// Reject a pending payout request (back-office)
pub async fn reject_payout(ctx: &AppContext, request_id: &str) -> Result<(), anyhow::Error> {
    let request = ctx.settlement.reject(request_id).await?;
    println!("✅ Rejected {}", request.id);
    Ok(())
}

/// Create a wallet-funded order
pub async fn create_order(
    ctx: &AppContext,
    client_id: &str,
    proposed: Decimal,
    surcharge: Decimal,
    fourmiz_amount: Decimal,
) -> Result<(), anyhow::Error> {
    let spec = OrderSpec {
        proposed_amount: parse_amount(proposed)?,
        urgency_surcharge: parse_amount(surcharge)?,
        fourmiz_amount: parse_amount(fourmiz_amount)?,
    };

    let order = ctx.bridge.create_wallet_order(client_id, &spec).await?;
    println!(
        "✅ Order {} created for {} ({} debited from wallet)",
        order.id,
        client_id,
        order.total()
    );
    Ok(())
}

/// Claim a pending order
pub async fn accept_order(
    ctx: &AppContext,
    order_id: &str,
    fourmiz_id: &str,
) -> Result<(), anyhow::Error> {
    let order = ctx.bridge.accept_order(order_id, fourmiz_id).await?;
    println!("✅ Order {} accepted by {fourmiz_id}", order.id);
    Ok(())
}

/// Start the work on an accepted order
pub async fn start_order(
    ctx: &AppContext,
    order_id: &str,
    fourmiz_id: &str,
) -> Result<(), anyhow::Error> {
    let order = ctx.bridge.start_order(order_id, fourmiz_id).await?;
    println!("✅ Order {} in progress", order.id);
    Ok(())
}

/// Record one party's completion validation
pub async fn validate_order(
    ctx: &AppContext,
    order_id: &str,
    by: &str,
    account_id: &str,
) -> Result<(), anyhow::Error> {
    let party: OrderParty = by
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown party: {by} (expected client or fourmiz)"))?;

    let order = ctx.bridge.validate_completion(order_id, party, account_id).await?;
    println!(
        "✅ {party} validation recorded on {} (status: {})",
        order.id, order.status
    );
    Ok(())
}

/// Cancel a not-yet-started order
pub async fn cancel_order(
    ctx: &AppContext,
    order_id: &str,
    by: &str,
    account_id: Option<&str>,
) -> Result<(), anyhow::Error> {
    let actor: CancelActor = by
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown cancel actor: {by} (expected client or system)"))?;

    let order = ctx.bridge.cancel_order(order_id, actor, account_id).await?;
    println!("✅ Order {} cancelled by {actor}", order.id);
    Ok(())
}

/// List an account's transactions
pub async fn transactions(ctx: &AppContext, account_id: &str) -> Result<(), anyhow::Error> {
    let listed = ctx.ledger.transactions(account_id).await?;

    if listed.is_empty() {
        println!("No transactions for {account_id}");
        return Ok(());
    }
    println!("Transactions for {account_id}:");
    for tx in listed {
        let reference = tx.source_ref.as_deref().unwrap_or("-");
        println!(
            "  {}  {:>12}  {:<20} {:<10} {}",
            tx.id, tx.amount, tx.kind, tx.status, reference
        );
    }
    Ok(())
}

/// List an account's payout requests
pub async fn payouts(ctx: &AppContext, account_id: &str) -> Result<(), anyhow::Error> {
    let listed = ctx.payout_requests.list_by_account(account_id).await?;

    if listed.is_empty() {
        println!("No payout requests for {account_id}");
        return Ok(());
    }
    println!("Payout requests for {account_id}:");
    for request in listed {
        println!(
            "  {}  {:>12}  {:<10} {:<10} {}",
            request.id, request.amount, request.method, request.status, request.destination
        );
    }
    Ok(())
}
