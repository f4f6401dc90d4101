use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::oneshot;
use tokio::time::sleep;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use curvefeed::candles::aggregator::{CandleAggregator, DEFAULT_BUCKET_SECS};
use curvefeed::candles::types::CandleEvent;
use curvefeed::chain::sim::SimChain;
use curvefeed::chain::types::PoolReserves;
use curvefeed::chain::ChainClient;
use curvefeed::curve::{BondingCurve, CurveConfig, Direction};
use curvefeed::feed::driver::run_price_feed;
use curvefeed::feed::event::FeedEvent;
use curvefeed::feed::runtime::start_feed;
use curvefeed::fx::coingecko::CoinGeckoSource;
use curvefeed::fx::{spawn_refresher, CurrencyConverter, DisplayCurrency, RATE_TTL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("starting curvefeed");

    let cfg = CurveConfig::default();
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

    // Fresh pool: nothing sold yet, the whole supply sits in the pool.
    let chain = Arc::new(SimChain::new(
        BondingCurve::new(cfg),
        PoolReserves {
            reserve_native: 0,
            reserve_token: cfg.total_supply,
        },
        now,
        Duration::from_millis(500),
    ));
    chain.start();

    let feed = start_feed(
        BondingCurve::new(cfg),
        CandleAggregator::new(DEFAULT_BUCKET_SECS),
    );
    let feed_tx = feed.sender();

    // Chart consumer.
    let mut chart = feed.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = chart.recv().await {
            match event {
                CandleEvent::Append { candle } => {
                    info!(
                        "chart append t={} o={} c={}",
                        candle.bucket_start, candle.open, candle.close
                    );
                }
                CandleEvent::Update { candle } => {
                    info!(
                        "chart update t={} h={} l={} c={}",
                        candle.bucket_start, candle.high, candle.low, candle.close
                    );
                }
            }
        }
    });

    // Display-currency conversion runs off the trading path.
    let converter = Arc::new(CurrencyConverter::new(CoinGeckoSource::new()?));
    spawn_refresher(converter.clone(), RATE_TTL);

    let driver_chain = chain.clone();
    let driver_tx = feed_tx.clone();
    tokio::spawn(async move {
        if let Err(e) = run_price_feed(
            driver_chain.as_ref(),
            "demo-pool",
            driver_tx,
            now,
            Duration::from_secs(5),
        )
        .await
        {
            warn!("price feed stopped: {e:?}");
        }
    });

    // Let a few trades settle.
    sleep(Duration::from_secs(3)).await;

    // Pre-trade preview for buying with 1 native unit.
    let (reply, rx) = oneshot::channel();
    feed_tx
        .send(FeedEvent::Quote {
            direction: Direction::Buy,
            amount_in: 1_000_000_000,
            reply,
        })
        .await?;
    match rx.await? {
        Ok(quote) => info!(
            "buy 1 native -> {} token base units (fee {})",
            quote.amount_out, quote.fee_applied
        ),
        Err(e) => warn!("quote unavailable: {e}"),
    }

    // Market-cap label in the display currency.
    let (reply, rx) = oneshot::channel();
    feed_tx.send(FeedEvent::GetReserves { reply }).await?;
    if let Some(reserves) = rx.await? {
        let mcap = BondingCurve::new(cfg).spot_price(&reserves)?;
        let usd = converter.convert(mcap, DisplayCurrency::Usd).await;
        info!("market cap {mcap} native (~{usd} usd)");
    }

    sleep(Duration::from_secs(2)).await;
    info!("exiting");
    Ok(())
}
