pub mod coingecko;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tokio::time::{interval, timeout};
use tracing::{debug, warn};

use crate::error::EngineError;

/// Freshness window for a cached exchange rate.
pub const RATE_TTL: Duration = Duration::from_secs(600);

/// Upper bound on a single rate fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCurrency {
    Native,
    Usd,
}

/// External exchange-rate source (native asset to USD).
pub trait RateSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = anyhow::Result<Decimal>> + Send;
}

#[derive(Debug, Clone, Copy)]
struct CachedRate {
    rate: Decimal,
    fetched_at: Instant,
}

/// Converts native-asset prices into a display currency from a cached,
/// periodically refreshed exchange rate. Source failures degrade to the
/// last known rate and never reach the trading path.
pub struct CurrencyConverter<S> {
    source: S,
    ttl: Duration,
    fetch_timeout: Duration,
    cache: Mutex<Option<CachedRate>>,
}

impl<S: RateSource> CurrencyConverter<S> {
    pub fn new(source: S) -> Self {
        Self::with_ttl(source, RATE_TTL, FETCH_TIMEOUT)
    }

    pub fn with_ttl(source: S, ttl: Duration, fetch_timeout: Duration) -> Self {
        Self {
            source,
            ttl,
            fetch_timeout,
            cache: Mutex::new(None),
        }
    }

    /// Forces a fetch. On failure the cache keeps its last value and the
    /// caller gets `StaleRate`.
    pub async fn refresh(&self) -> Result<Decimal, EngineError> {
        match timeout(self.fetch_timeout, self.source.fetch()).await {
            Ok(Ok(rate)) => {
                let mut cache = self.cache.lock().await;
                *cache = Some(CachedRate {
                    rate,
                    fetched_at: Instant::now(),
                });
                debug!("exchange rate refreshed: {rate}");
                Ok(rate)
            }
            Ok(Err(e)) => {
                warn!("exchange rate refresh failed: {e:?}");
                Err(EngineError::StaleRate)
            }
            Err(_) => {
                warn!("exchange rate refresh timed out");
                Err(EngineError::StaleRate)
            }
        }
    }

    /// Current native-to-USD rate.
    ///
    /// Serves the cache while fresh; refreshes once expired; falls back to
    /// the last cached value, however stale, when the source is down. 1.0
    /// only before any fetch has ever succeeded.
    pub async fn rate(&self) -> Decimal {
        if let Some(cached) = *self.cache.lock().await {
            if cached.fetched_at.elapsed() < self.ttl {
                return cached.rate;
            }
        }

        match self.refresh().await {
            Ok(rate) => rate,
            Err(_) => match *self.cache.lock().await {
                Some(cached) => cached.rate,
                None => Decimal::ONE,
            },
        }
    }

    /// Display conversion. Rounding happens here and nowhere earlier.
    pub async fn convert(&self, price_native: Decimal, currency: DisplayCurrency) -> Decimal {
        match currency {
            DisplayCurrency::Native => price_native,
            DisplayCurrency::Usd => (price_native * self.rate().await).round_dp(2),
        }
    }
}

/// Background refresh on a timer, independent of the trading path.
pub fn spawn_refresher<S: RateSource>(
    converter: Arc<CurrencyConverter<S>>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.tick().await; // immediate first tick
        loop {
            ticker.tick().await;
            let _ = converter.refresh().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use rust_decimal_macros::dec;

    use super::*;

    struct FlakySource {
        rate: Decimal,
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl FlakySource {
        fn new(rate: Decimal) -> Self {
            Self {
                rate,
                fail: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl RateSource for Arc<FlakySource> {
        fn fetch(&self) -> impl Future<Output = anyhow::Result<Decimal>> + Send {
            let src = self.clone();
            async move {
                src.calls.fetch_add(1, Ordering::SeqCst);
                if src.fail.load(Ordering::SeqCst) {
                    anyhow::bail!("source down");
                }
                Ok(src.rate)
            }
        }
    }

    #[tokio::test]
    async fn serves_the_fetched_rate() {
        let source = Arc::new(FlakySource::new(dec!(145.32)));
        let converter = CurrencyConverter::new(source.clone());
        assert_eq!(converter.rate().await, dec!(145.32));
    }

    #[tokio::test]
    async fn fresh_cache_skips_the_source() {
        let source = Arc::new(FlakySource::new(dec!(100)));
        let converter = CurrencyConverter::new(source.clone());
        converter.rate().await;
        converter.rate().await;
        converter.rate().await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_refresh_serves_the_stale_cache() {
        let source = Arc::new(FlakySource::new(dec!(100)));
        // Zero TTL: every call is a refresh attempt.
        let converter =
            CurrencyConverter::with_ttl(source.clone(), Duration::ZERO, FETCH_TIMEOUT);

        assert_eq!(converter.rate().await, dec!(100));
        source.fail.store(true, Ordering::SeqCst);

        // Expired cache plus failing source: still the last known value,
        // never the neutral default.
        assert_eq!(converter.rate().await, dec!(100));
        assert_eq!(converter.rate().await, dec!(100));
    }

    #[tokio::test]
    async fn never_fetched_falls_back_to_identity() {
        let source = Arc::new(FlakySource::new(dec!(100)));
        source.fail.store(true, Ordering::SeqCst);
        let converter = CurrencyConverter::new(source.clone());
        assert_eq!(converter.rate().await, Decimal::ONE);
    }

    #[tokio::test]
    async fn refresh_failure_is_reported_as_stale() {
        let source = Arc::new(FlakySource::new(dec!(100)));
        source.fail.store(true, Ordering::SeqCst);
        let converter = CurrencyConverter::new(source.clone());
        assert_eq!(converter.refresh().await, Err(EngineError::StaleRate));
    }

    #[tokio::test]
    async fn convert_is_identity_for_native() {
        let source = Arc::new(FlakySource::new(dec!(150)));
        let converter = CurrencyConverter::new(source.clone());
        assert_eq!(
            converter.convert(dec!(25.5), DisplayCurrency::Native).await,
            dec!(25.5)
        );
        // Source untouched for native display.
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn convert_multiplies_and_rounds_for_usd() {
        let source = Arc::new(FlakySource::new(dec!(150.1)));
        let converter = CurrencyConverter::new(source.clone());
        assert_eq!(
            converter.convert(dec!(2.333), DisplayCurrency::Usd).await,
            dec!(350.18)
        );
    }
}
