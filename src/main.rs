//! Bitfinex market snapshot
//!
//! Usage: cargo run -- [config.yaml]
//!
//! Prints ticker, top of book and 24h volume for every configured pair.
//! Only public endpoints are used; no credentials needed.
//!
//! # Logging
//! - Uses LOG_FORMAT env var: `json` (default) or `pretty`

use std::path::PathBuf;

use bitfinex_api::bin_utils::{self, CONFIG_PATH};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH));
    let cfg = bin_utils::boot(&path)?;
    let client = bin_utils::public_client(&cfg);

    info!(event_type = "SNAPSHOT_START", pairs = cfg.pairs.len(), "=== Bitfinex market snapshot ===");

    for pair in &cfg.pairs {
        let ticker = match client.get_public_ticker(pair).await {
            Ok(ticker) => ticker,
            Err(e) => {
                error!(event_type = "SNAPSHOT_ERROR", pair = %pair, error = %e, "Ticker unavailable");
                continue;
            }
        };

        let book = client.get_order_book(pair).await.unwrap_or_default();
        let daily_volume = client
            .get_pair_stats(pair)
            .await
            .ok()
            .and_then(|stats| stats.into_iter().find(|s| s.period == 1))
            .map(|s| s.volume.to_string())
            .unwrap_or_else(|| "-".to_string());

        info!(
            event_type = "SNAPSHOT",
            pair = %pair,
            last = %ticker.last_price,
            bid = %ticker.bid,
            ask = %ticker.ask,
            best_bid = ?book.best_bid(),
            best_ask = ?book.best_ask(),
            volume_24h = %daily_volume,
            "Market snapshot"
        );
    }

    Ok(())
}
