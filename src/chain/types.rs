use serde::{Deserialize, Serialize};

/// Exact integer balances of the pool's two sides. Snapshots are immutable;
/// the chain owns the live values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReserves {
    pub reserve_native: u128,
    pub reserve_token: u128,
}

/// One on-chain pool change, as delivered by the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReserveUpdate {
    pub reserves: PoolReserves,
    pub observed_at: i64,
}
