pub mod sim;
pub mod types;

use std::future::Future;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::candles::types::Candle;
use crate::chain::types::{PoolReserves, ReserveUpdate};

/// Handle for one live pool subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

/// On-chain data source abstraction.
///
/// Delivery contract: at-least-once, with `observed_at` non-decreasing per
/// subscription. Reconnects and retries are the implementation's problem;
/// consumers only ever re-bootstrap and resume.
pub trait ChainClient: Send + Sync {
    /// One-shot fetch of the pool's current reserves.
    fn fetch_reserves(
        &self,
        pool: &str,
    ) -> impl Future<Output = anyhow::Result<PoolReserves>> + Send;

    /// Sealed candle history for bootstrap, ascending by bucket.
    fn fetch_history(&self, pool: &str) -> impl Future<Output = anyhow::Result<Vec<Candle>>> + Send;

    /// Subscribe to reserve changes for a pool.
    fn subscribe(&self, pool: &str) -> (SubscriptionId, broadcast::Receiver<ReserveUpdate>);

    fn unsubscribe(&self, id: SubscriptionId);

    /// Start the client (spawn tasks, connect sockets, etc.)
    fn start(&self);
}
