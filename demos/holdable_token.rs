//! Walk through the hold lifecycle on an in-memory ledger
//!
//! Run with `RUST_LOG=holdable_ledger=debug` to see every commit.

use holdable_ledger::{
    format_units, parse_units, Address, Ledger, LedgerConfig, LedgerResult, MemoryStorage,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logging(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .init();
}

#[tokio::main]
async fn main() -> LedgerResult<()> {
    init_logging("info");

    println!("=== Holdable Token Example ===\n");

    let owner = Address::from("owner");
    let buyer = Address::from("buyer");
    let shop = Address::from("shop");
    let marketplace = Address::from("marketplace");

    let config = LedgerConfig::new("Holdable Token", "htkn", owner.clone(), 0)
        .with_initial_supply_tokens("1000")?;
    let mut ledger = Ledger::create(MemoryStorage::new(), config).await?;

    ledger
        .transfer(&owner, &buyer, parse_units("100")?)
        .await?;
    println!(
        "Buyer balance: {} {}",
        format_units(ledger.balance_of(&buyer).await?),
        ledger.symbol().await?
    );

    // The buyer reserves 40 tokens for the shop while the order is prepared
    ledger
        .hold(&buyer, "order-1001", &shop, parse_units("40")?)
        .await?;
    print_account(&ledger, &buyer, "after placing order-1001").await?;

    // A marketplace holds on the buyer's behalf within an allowance
    ledger
        .approve(&buyer, &marketplace, parse_units("25")?)
        .await?;
    ledger
        .hold_from(&marketplace, "order-1002", &buyer, &shop, parse_units("25")?)
        .await?;
    print_account(&ledger, &buyer, "after marketplace order-1002").await?;

    // Order 1001 ships: the buyer completes the hold
    ledger.execute_hold(&buyer, &"order-1001".into()).await?;

    // Order 1002 is cancelled by the ledger owner
    ledger.remove_hold(&owner, &"order-1002".into()).await?;
    print_account(&ledger, &buyer, "after settlement").await?;

    println!(
        "Shop balance: {}",
        format_units(ledger.balance_of(&shop).await?)
    );

    let report = ledger.validate_integrity().await?;
    println!(
        "\nIntegrity at version {}: {}",
        report.version,
        if report.is_valid { "valid" } else { "INVALID" }
    );

    Ok(())
}

async fn print_account(
    ledger: &Ledger<MemoryStorage>,
    account: &Address,
    label: &str,
) -> LedgerResult<()> {
    println!(
        "{} {}: balance {}, held {}, available {}",
        account,
        label,
        format_units(ledger.balance_of(account).await?),
        format_units(ledger.held_balance_of(account).await?),
        format_units(ledger.available_balance_of(account).await?),
    );
    Ok(())
}
