use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time::sleep;
use tracing::{debug, info};

use crate::candles::types::Candle;
use crate::chain::types::{PoolReserves, ReserveUpdate};
use crate::chain::{ChainClient, SubscriptionId};
use crate::curve::{BondingCurve, Direction, CURVE_NORM};

struct SimState {
    reserves: PoolReserves,
    clock: i64,
    trade_no: u128,
}

/// In-process chain stand-in.
///
/// Settles a deterministic trade tape through the same curve the quote
/// path uses and publishes the resulting reserve snapshots, which is
/// exactly the relationship the real chain program has to the quote API.
pub struct SimChain {
    curve: BondingCurve,
    state: Arc<Mutex<SimState>>,
    history: Vec<Candle>,
    tx: broadcast::Sender<ReserveUpdate>,
    tick: Duration,
}

impl SimChain {
    pub fn new(curve: BondingCurve, reserves: PoolReserves, start_at: i64, tick: Duration) -> Self {
        let (tx, _) = broadcast::channel(4096);
        Self {
            curve,
            state: Arc::new(Mutex::new(SimState {
                reserves,
                clock: start_at,
                trade_no: 0,
            })),
            history: Vec::new(),
            tx,
            tick,
        }
    }

    /// Pre-seeds the bootstrap history returned by `fetch_history`.
    pub fn with_history(mut self, history: Vec<Candle>) -> Self {
        self.history = history;
        self
    }

    /// Settles the next scripted trade. Two buys of varying size, then one
    /// sell of a third of the holdings, repeating.
    fn settle_next(curve: &BondingCurve, state: &mut SimState) -> Option<ReserveUpdate> {
        state.clock += 7;
        let trade_no = state.trade_no;
        state.trade_no += 1;

        let reserves = state.reserves;
        if trade_no % 3 == 2 {
            let sold = curve.config().total_supply.checked_sub(reserves.reserve_token)?;
            let amount_in = sold / 3 / CURVE_NORM * CURVE_NORM;
            if amount_in == 0 {
                return None;
            }
            let q = curve.quote(&reserves, Direction::Sell, amount_in).ok()?;
            // Fee leaves the pool together with the payout.
            let payout = q.amount_out.checked_add(q.fee_applied)?;
            state.reserves = PoolReserves {
                reserve_native: reserves.reserve_native.checked_sub(payout)?,
                reserve_token: reserves.reserve_token.checked_add(amount_in)?,
            };
        } else {
            let amount_in = 500_000_000 + (trade_no % 5) * 300_000_000;
            let q = curve.quote(&reserves, Direction::Buy, amount_in).ok()?;
            if q.amount_out > reserves.reserve_token {
                debug!("sim pool out of inventory, skipping buy");
                return None;
            }
            // Fee is taken outside the pool; only the net amount lands.
            state.reserves = PoolReserves {
                reserve_native: reserves
                    .reserve_native
                    .checked_add(amount_in - q.fee_applied)?,
                reserve_token: reserves.reserve_token - q.amount_out,
            };
        }

        Some(ReserveUpdate {
            reserves: state.reserves,
            observed_at: state.clock,
        })
    }
}

impl ChainClient for SimChain {
    fn fetch_reserves(
        &self,
        _pool: &str,
    ) -> impl Future<Output = anyhow::Result<PoolReserves>> + Send {
        let state = self.state.clone();
        async move { Ok(state.lock().await.reserves) }
    }

    fn fetch_history(
        &self,
        _pool: &str,
    ) -> impl Future<Output = anyhow::Result<Vec<Candle>>> + Send {
        let history = self.history.clone();
        async move { Ok(history) }
    }

    fn subscribe(&self, pool: &str) -> (SubscriptionId, broadcast::Receiver<ReserveUpdate>) {
        let id = SubscriptionId::new();
        debug!("sim subscription {id:?} for {pool}");
        (id, self.tx.subscribe())
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        debug!("sim subscription {id:?} dropped");
    }

    fn start(&self) {
        let curve = self.curve;
        let state = self.state.clone();
        let tx = self.tx.clone();
        let tick = self.tick;

        tokio::spawn(async move {
            info!("sim chain started");
            loop {
                sleep(tick).await;
                let update = {
                    let mut state = state.lock().await;
                    SimChain::settle_next(&curve, &mut state)
                };
                if let Some(update) = update {
                    let _ = tx.send(update);
                }
            }
        });
    }
}
