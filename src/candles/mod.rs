pub mod aggregator;
pub mod types;

pub use aggregator::CandleAggregator;
pub use types::{Candle, CandleEvent, PriceObservation};
