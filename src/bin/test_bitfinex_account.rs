//! Test script to read a Bitfinex account
//!
//! Usage: cargo run --bin test_bitfinex_account
//!
//! Requires `BITFINEX_API_KEY` and `BITFINEX_API_SECRET` (in `.env` or the
//! environment). Read-only: balances, margin info, active orders and
//! positions are fetched and logged, nothing is placed or cancelled.
//! Set `BITFINEX_NONCE_SEED` if the key rejects calls with "Nonce is too small.".
//!
//! # Logging
//! - Uses LOG_FORMAT env var: `json` (default) or `pretty`
//! - For human-readable output, set LOG_FORMAT=pretty

use bitfinex_api::adapters::bitfinex::{BitfinexClient, HistoryRequest};
use bitfinex_api::adapters::types::unix_timestamp_secs;
use tracing::{info, warn};

/// Ledger lookback for the history section
const HISTORY_DAYS: i64 = 7;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Shared init (dotenv + logging only, no config.yaml needed)
    bitfinex_api::bin_utils::boot_minimal();

    info!(event_type = "TEST_START", "=== Bitfinex Account Test Script ===");

    let client = BitfinexClient::from_env()?;
    info!(key = %client.config().key_hint(), base_url = %client.config().base_url, "Client ready");

    let balances = client.get_balances().await?;
    if balances.is_empty() {
        info!(event_type = "BALANCES", "No balances");
    }
    for balance in &balances {
        info!(
            event_type = "BALANCE",
            wallet = %balance.wallet,
            currency = %balance.currency,
            amount = %balance.amount,
            available = %balance.available,
            "Balance"
        );
    }

    match client.get_margin_information().await? {
        Some(margin) => info!(
            event_type = "MARGIN",
            margin_balance = %margin.margin_balance,
            tradable_balance = %margin.tradable_balance,
            net_value = %margin.net_value,
            required_margin = %margin.required_margin,
            "Margin information"
        ),
        None => warn!(event_type = "MARGIN", "No margin information returned"),
    }

    let orders = client.get_active_orders().await?;
    info!(event_type = "ORDERS", count = orders.len(), "Active orders");
    for order in &orders {
        info!(event_type = "ORDER", "{}", order);
    }

    let positions = client.get_active_positions().await?;
    info!(event_type = "POSITIONS", count = positions.len(), "Active positions");
    for position in &positions {
        info!(
            event_type = "POSITION",
            id = position.id,
            symbol = %position.symbol,
            amount = %position.amount,
            base = %position.base,
            pl = %position.pl,
            "Position"
        );
    }

    let since = unix_timestamp_secs(chrono::Utc::now() - chrono::Duration::days(HISTORY_DAYS));
    for currency in balances
        .iter()
        .map(|b| b.currency.to_uppercase())
        .collect::<std::collections::BTreeSet<_>>()
    {
        match client
            .get_history(HistoryRequest::new(&currency).since(since).limit(20))
            .await
        {
            Ok(entries) => {
                info!(event_type = "HISTORY", currency = %currency, count = entries.len(), "Ledger entries");
                for entry in &entries {
                    info!(
                        event_type = "HISTORY_ENTRY",
                        amount = %entry.amount,
                        balance = %entry.balance,
                        description = %entry.description,
                        "Ledger entry"
                    );
                }
            }
            Err(e) => warn!(event_type = "HISTORY", currency = %currency, error = %e, "History unavailable"),
        }
    }

    info!(event_type = "TEST_END", "=== Done ===");
    Ok(())
}
