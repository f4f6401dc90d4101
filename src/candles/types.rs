use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single chart point derived from a reserve snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceObservation {
    pub timestamp: i64,
    pub price: Decimal,
}

/// One OHLC bucket. Wire keys match the chart history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(rename = "t")]
    pub bucket_start: i64,
    #[serde(rename = "o")]
    pub open: Decimal,
    #[serde(rename = "h")]
    pub high: Decimal,
    #[serde(rename = "l")]
    pub low: Decimal,
    #[serde(rename = "c")]
    pub close: Decimal,
}

impl Candle {
    /// Fresh bucket seeded from its first observation.
    pub fn opening(bucket_start: i64, price: Decimal) -> Self {
        Self {
            bucket_start,
            open: price,
            high: price,
            low: price,
            close: price,
        }
    }

    /// Folds another observation from the same bucket into this candle.
    pub(crate) fn absorb(&mut self, price: Decimal) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
    }
}

/// What the chart consumer receives per processed observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandleEvent {
    /// A bucket boundary was crossed; `candle` is the newly opened bucket.
    Append { candle: Candle },
    /// The open bucket changed in place.
    Update { candle: Candle },
}
