use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::chain::ChainClient;

use super::event::FeedEvent;

/// Bridges one pool's chain subscription into the feed loop.
///
/// History is fetched first so the chart seeds before live updates; a slow
/// or failing fetch degrades to an empty seed instead of stalling the feed.
/// Returns when the subscription closes; the chain client owns reconnects.
pub async fn run_price_feed<C: ChainClient>(
    chain: &C,
    pool: &str,
    feed_tx: mpsc::Sender<FeedEvent>,
    now: i64,
    bootstrap_timeout: Duration,
) -> anyhow::Result<()> {
    let candles = match timeout(bootstrap_timeout, chain.fetch_history(pool)).await {
        Ok(Ok(candles)) => candles,
        Ok(Err(e)) => {
            warn!("history fetch failed for {pool}: {e:?}");
            Vec::new()
        }
        Err(_) => {
            warn!("history fetch timed out for {pool}");
            Vec::new()
        }
    };
    feed_tx.send(FeedEvent::Bootstrap { candles, now }).await?;

    // Prime the feed with the current reserves so quoting works before the
    // first on-chain change arrives.
    match timeout(bootstrap_timeout, chain.fetch_reserves(pool)).await {
        Ok(Ok(reserves)) => {
            feed_tx
                .send(FeedEvent::ReservesChanged {
                    reserves,
                    observed_at: now,
                })
                .await?;
        }
        Ok(Err(e)) => warn!("reserve fetch failed for {pool}: {e:?}"),
        Err(_) => warn!("reserve fetch timed out for {pool}"),
    }

    let (sub_id, mut rx) = chain.subscribe(pool);
    info!("subscribed to pool {pool}");

    loop {
        match rx.recv().await {
            Ok(update) => {
                feed_tx
                    .send(FeedEvent::ReservesChanged {
                        reserves: update.reserves,
                        observed_at: update.observed_at,
                    })
                    .await?;
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("subscription for {pool} lagged, skipped {skipped} updates");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    chain.unsubscribe(sub_id);
    warn!("chain stream ended for {pool}");
    Ok(())
}
