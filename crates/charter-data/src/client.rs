//! REST snapshot client with ordered endpoint fallback.

use std::time::Duration;

use charter_core::Timeframe;
use reqwest::Client;
use url::Url;

use crate::error::{FeedError, Result};
use crate::snapshot::{MarketSnapshot, Snapshot};

/// Provider routing class for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    /// 24/7 markets served by the crypto provider.
    Crypto,
    /// Equities, commodities and forex.
    Traditional,
}

impl AssetClass {
    /// Classify by suffix, e.g. `BTCUSDT` or `ETH-USD`.
    pub fn classify(symbol: &str, crypto_suffixes: &[String]) -> Self {
        let upper = symbol.to_uppercase();
        if crypto_suffixes
            .iter()
            .any(|suffix| upper.len() > suffix.len() && upper.ends_with(&suffix.to_uppercase()))
        {
            AssetClass::Crypto
        } else {
            AssetClass::Traditional
        }
    }

    /// Whether a push-price stream is expected to exist.
    pub fn trades_around_the_clock(&self) -> bool {
        matches!(self, AssetClass::Crypto)
    }
}

/// Endpoint templates per asset class.
#[derive(Debug, Clone, Default)]
pub struct Endpoints {
    pub traditional: Vec<String>,
    pub crypto: Vec<String>,
}

/// Substitute `{symbol}` and `{timeframe}` into a URL template.
pub fn expand_template(template: &str, symbol: &str, timeframe: Timeframe) -> Result<Url> {
    let raw = template
        .replace("{symbol}", symbol)
        .replace("{timeframe}", timeframe.label());
    Ok(Url::parse(&raw)?)
}

/// HTTP client for market snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    http: Client,
    endpoints: Endpoints,
    crypto_suffixes: Vec<String>,
}

impl SnapshotClient {
    pub fn new(endpoints: Endpoints, crypto_suffixes: Vec<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("charter/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoints,
            crypto_suffixes,
        })
    }

    pub fn asset_class(&self, symbol: &str) -> AssetClass {
        AssetClass::classify(symbol, &self.crypto_suffixes)
    }

    /// Endpoint templates that will be tried for `symbol`, in order.
    pub fn endpoints_for(&self, symbol: &str) -> &[String] {
        match self.asset_class(symbol) {
            AssetClass::Crypto => &self.endpoints.crypto,
            AssetClass::Traditional => &self.endpoints.traditional,
        }
    }

    /// Fetch a snapshot, trying every endpoint for the symbol's asset class
    /// until one succeeds.
    pub async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Snapshot> {
        let templates = self.endpoints_for(symbol);
        if templates.is_empty() {
            return Err(FeedError::NoEndpoints(symbol.to_string()));
        }

        let mut last_error = None;
        for template in templates {
            let url = match expand_template(template, symbol, timeframe) {
                Ok(url) => url,
                Err(e) => {
                    log::warn!("skipping endpoint {}: {}", template, e);
                    last_error = Some(e);
                    continue;
                }
            };

            match self.fetch_from(url.clone(), symbol).await {
                Ok(snapshot) => {
                    log::debug!(
                        "fetched {} candles for {} from {}",
                        snapshot.series.len(),
                        symbol,
                        url
                    );
                    return Ok(snapshot);
                }
                Err(e) => {
                    log::warn!("snapshot endpoint {} failed: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(FeedError::AllEndpointsFailed {
            symbol: symbol.to_string(),
            attempts: templates.len(),
            last: last_error.map(|e| e.to_string()).unwrap_or_default(),
        })
    }

    async fn fetch_from(&self, url: Url, symbol: &str) -> Result<Snapshot> {
        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let wire: MarketSnapshot = serde_json::from_str(&body)?;
        let snapshot = wire.into_snapshot();
        if snapshot.series.is_empty() {
            return Err(FeedError::EmptySnapshot(symbol.to_string()));
        }
        Ok(snapshot)
    }
}
