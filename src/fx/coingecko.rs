use std::future::Future;

use anyhow::Context;
use rust_decimal::Decimal;

use super::RateSource;

const SIMPLE_PRICE_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=solana&vs_currencies=usd";

/// CoinGecko simple-price endpoint. Response shape:
/// `{"solana":{"usd":<rate>}}`.
pub struct CoinGeckoSource {
    http: reqwest::Client,
    url: String,
}

impl CoinGeckoSource {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_url(SIMPLE_PRICE_URL)
    }

    pub fn with_url(url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("curvefeed")
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

impl RateSource for CoinGeckoSource {
    fn fetch(&self) -> impl Future<Output = anyhow::Result<Decimal>> + Send {
        let request = self.http.get(&self.url);
        async move {
            let body: serde_json::Value = request
                .send()
                .await
                .context("rate request failed")?
                .error_for_status()
                .context("rate request rejected")?
                .json()
                .await
                .context("rate response is not json")?;

            let rate = body["solana"]["usd"]
                .as_f64()
                .context("malformed rate response")?;
            Decimal::from_f64_retain(rate).context("rate not representable")
        }
    }
}
