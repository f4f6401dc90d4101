use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use crate::candles::aggregator::CandleAggregator;
use crate::candles::types::{CandleEvent, PriceObservation};
use crate::chain::types::PoolReserves;
use crate::curve::BondingCurve;
use crate::error::EngineError;

use super::event::FeedEvent;

/// Handle to one pool's running feed loop.
pub struct FeedRuntime {
    sender: mpsc::Sender<FeedEvent>,
    events: broadcast::Sender<CandleEvent>,
}

impl FeedRuntime {
    pub fn sender(&self) -> mpsc::Sender<FeedEvent> {
        self.sender.clone()
    }

    /// Chart subscription. Dropping the receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<CandleEvent> {
        self.events.subscribe()
    }
}

/// Spawns the feed loop for one pool.
///
/// A single task owns the aggregator and the latest reserve snapshot;
/// quotes and reserve notifications are serialized through one queue, so
/// a quote always sees a full snapshot and candle mutation has a single
/// writer.
pub fn start_feed(curve: BondingCurve, mut aggregator: CandleAggregator) -> FeedRuntime {
    let (tx, mut rx) = mpsc::channel::<FeedEvent>(1024);
    let (event_tx, _) = broadcast::channel::<CandleEvent>(4096);
    let events = event_tx.clone();

    tokio::spawn(async move {
        let mut latest: Option<PoolReserves> = None;

        info!("feed started");

        while let Some(event) = rx.recv().await {
            match event {
                FeedEvent::Bootstrap { candles, now } => {
                    let count = candles.len();
                    aggregator.seed(candles, now);
                    info!("seeded {count} historical candles");
                }

                FeedEvent::ReservesChanged {
                    reserves,
                    observed_at,
                } => {
                    latest = Some(reserves);
                    let price = match curve.spot_price(&reserves) {
                        Ok(price) => price,
                        Err(e) => {
                            warn!("dropping unpriceable reserve snapshot: {e}");
                            continue;
                        }
                    };
                    let obs = PriceObservation {
                        timestamp: observed_at,
                        price,
                    };
                    if let Some(chart_event) = aggregator.apply(obs) {
                        // No chart subscribers is fine.
                        let _ = event_tx.send(chart_event);
                    }
                }

                FeedEvent::Quote {
                    direction,
                    amount_in,
                    reply,
                } => {
                    let result = match latest {
                        Some(reserves) => curve.quote(&reserves, direction, amount_in),
                        None => Err(EngineError::FeedUnavailable("no reserves observed yet")),
                    };
                    let _ = reply.send(result);
                }

                FeedEvent::GetReserves { reply } => {
                    let _ = reply.send(latest);
                }

                FeedEvent::GetChart { reply } => {
                    let _ = reply.send(aggregator.snapshot());
                }
            }
        }

        info!("feed channel closed, exiting");
    });

    FeedRuntime { sender: tx, events }
}
