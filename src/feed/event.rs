use tokio::sync::oneshot;

use crate::candles::types::Candle;
use crate::chain::types::PoolReserves;
use crate::curve::{Direction, QuoteResult};
use crate::error::EngineError;

/// Everything the feed loop reacts to. Chain notifications and UI
/// requests go through the same queue, so reserve reads are never torn.
#[derive(Debug)]
pub enum FeedEvent {
    // chain -> feed
    ReservesChanged {
        reserves: PoolReserves,
        observed_at: i64,
    },

    /// Sealed history delivered once on (re)connect, before live updates.
    Bootstrap {
        candles: Vec<Candle>,
        now: i64,
    },

    // UI -> feed
    Quote {
        direction: Direction,
        amount_in: u128,
        reply: oneshot::Sender<Result<QuoteResult, EngineError>>,
    },

    GetReserves {
        reply: oneshot::Sender<Option<PoolReserves>>,
    },

    /// Full candle series for a chart (re)load.
    GetChart {
        reply: oneshot::Sender<Vec<Candle>>,
    },
}
