use super::types::{Candle, CandleEvent, PriceObservation};

/// Default chart bucket width in seconds.
pub const DEFAULT_BUCKET_SECS: i64 = 30;

/// Folds a price observation stream into fixed-width OHLC buckets.
///
/// Exactly one candle is mutable at a time: the open bucket. Everything
/// before it is sealed and never rewritten, so chart history stays
/// monotonic even when the notification stream delivers stale reads.
#[derive(Debug)]
pub struct CandleAggregator {
    width: i64,
    sealed: Vec<Candle>,
    open: Option<Candle>,
}

impl CandleAggregator {
    pub fn new(width_secs: i64) -> Self {
        debug_assert!(width_secs > 0);
        Self {
            width: width_secs,
            sealed: Vec::new(),
            open: None,
        }
    }

    pub fn bucket_start(&self, timestamp: i64) -> i64 {
        timestamp.div_euclid(self.width) * self.width
    }

    /// Seeds sealed history before live observations are applied.
    ///
    /// The bulk fetch is expected sorted ascending and deduplicated by
    /// bucket, but both are enforced here anyway. The last candle becomes
    /// the open bucket when it covers `now`, otherwise everything seeds as
    /// sealed history.
    pub fn seed(&mut self, mut history: Vec<Candle>, now: i64) {
        history.sort_by_key(|c| c.bucket_start);
        history.dedup_by_key(|c| c.bucket_start);

        self.open = match history.last() {
            Some(last) if last.bucket_start == self.bucket_start(now) => history.pop(),
            _ => None,
        };
        self.sealed = history;
    }

    /// Applies one observation, returning the chart event it produced.
    /// Observations older than the open bucket are dropped.
    pub fn apply(&mut self, obs: PriceObservation) -> Option<CandleEvent> {
        let bucket = self.bucket_start(obs.timestamp);

        match &mut self.open {
            Some(candle) if bucket == candle.bucket_start => {
                candle.absorb(obs.price);
                Some(CandleEvent::Update { candle: *candle })
            }
            Some(candle) if bucket > candle.bucket_start => {
                self.sealed.push(*candle);
                let next = Candle::opening(bucket, obs.price);
                *candle = next;
                Some(CandleEvent::Append { candle: next })
            }
            Some(_) => None,
            None => {
                if self.sealed.last().is_some_and(|s| bucket <= s.bucket_start) {
                    return None;
                }
                let candle = Candle::opening(bucket, obs.price);
                self.open = Some(candle);
                Some(CandleEvent::Append { candle })
            }
        }
    }

    pub fn open_candle(&self) -> Option<&Candle> {
        self.open.as_ref()
    }

    pub fn sealed(&self) -> &[Candle] {
        &self.sealed
    }

    /// Full series for a chart (re)load: sealed history plus the open
    /// bucket, ascending.
    pub fn snapshot(&self) -> Vec<Candle> {
        let mut series = self.sealed.clone();
        series.extend(self.open);
        series
    }
}
