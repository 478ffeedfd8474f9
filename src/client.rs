//! Network data sources
//!
//! Fetches hashrate, difficulty, tip height, fee and price data from a
//! mempool.space-compatible REST API and assembles a [`NetworkSnapshot`].
//! An offline source and a caching wrapper implement the same trait.

use crate::cache::{Clock, SnapshotCache};
use crate::calc::subsidy_at_height;
use crate::utils::ExponentialBackoff;
use crate::{DifficultyAdjustment, Error, NetworkSnapshot, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Public mempool.space API root
pub const DEFAULT_API_URL: &str = "https://mempool.space/api/v1";

/// Blocks averaged when estimating per-block fees (about one day)
pub const FEE_SAMPLE_BLOCKS: u64 = 144;

/// Anything that can produce a network snapshot
#[async_trait]
pub trait NetworkDataSource: Send + Sync {
    /// Short name for logging
    fn source_name(&self) -> &'static str;

    /// Produce a snapshot of current network state
    async fn fetch_snapshot(&self) -> Result<NetworkSnapshot>;
}

/// Retry policy for API requests
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub max_retries: usize,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
            max_retries: 3,
        }
    }
}

/// `GET /mining/hashrate/3d`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningStats {
    pub current_hashrate: f64,
    pub current_difficulty: f64,
}

/// `GET /difficulty-adjustment`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DifficultyAdjustmentResponse {
    progress_percent: f64,
    difficulty_change: f64,
    #[serde(default)]
    estimated_retarget_date: Option<i64>,
    remaining_blocks: u64,
    remaining_time: u64,
    next_retarget_height: u64,
}

impl From<DifficultyAdjustmentResponse> for DifficultyAdjustment {
    fn from(response: DifficultyAdjustmentResponse) -> Self {
        Self {
            progress_percent: response.progress_percent,
            difficulty_change: response.difficulty_change,
            remaining_blocks: response.remaining_blocks,
            remaining_time_ms: response.remaining_time,
            next_retarget_height: response.next_retarget_height,
            estimated_retarget_date: response
                .estimated_retarget_date
                .and_then(DateTime::<Utc>::from_timestamp_millis),
        }
    }
}

/// `GET /prices`
#[derive(Debug, Clone, Deserialize)]
struct PricesResponse {
    #[serde(rename = "USD")]
    usd: f64,
}

/// `GET /mining/reward-stats/:blocks`; amounts in sats, sometimes as strings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RewardStatsResponse {
    #[serde(deserialize_with = "number_or_string")]
    start_block: f64,
    #[serde(deserialize_with = "number_or_string")]
    end_block: f64,
    #[serde(deserialize_with = "number_or_string")]
    total_fee: f64,
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl RewardStatsResponse {
    /// Average fee per block in BTC
    fn avg_fee_per_block_btc(&self) -> f64 {
        let blocks = self.end_block - self.start_block + 1.0;
        let blocks = if blocks >= 1.0 {
            blocks
        } else {
            FEE_SAMPLE_BLOCKS as f64
        };
        self.total_fee / blocks / crate::calc::SATS_PER_BTC
    }
}

/// Client for the mempool.space REST API
pub struct MempoolClient {
    client: Client,
    base_url: Url,
    backoff_config: BackoffConfig,
}

impl MempoolClient {
    /// Create a new client rooted at `base_url` (e.g. `https://mempool.space/api/v1`)
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let mut raw = base_url.as_ref().trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url =
            Url::parse(&raw).map_err(|e| Error::config(format!("Invalid API URL: {}", e)))?;

        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::from)?;

        Ok(Self {
            client,
            base_url,
            backoff_config: BackoffConfig::default(),
        })
    }

    /// Set custom backoff configuration
    pub fn with_backoff_config(mut self, config: BackoffConfig) -> Self {
        self.backoff_config = config;
        self
    }

    /// Root URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current network hashrate and difficulty
    #[instrument(skip(self))]
    pub async fn fetch_mining_stats(&self) -> Result<MiningStats> {
        self.get_json("mining/hashrate/3d").await
    }

    /// Progress of the current difficulty epoch
    #[instrument(skip(self))]
    pub async fn fetch_difficulty_adjustment(&self) -> Result<DifficultyAdjustment> {
        let response: DifficultyAdjustmentResponse = self.get_json("difficulty-adjustment").await?;
        Ok(response.into())
    }

    /// Height of the chain tip
    #[instrument(skip(self))]
    pub async fn fetch_block_height(&self) -> Result<u64> {
        self.get_json("blocks/tip/height").await
    }

    /// BTC price in USD
    #[instrument(skip(self))]
    pub async fn fetch_btc_price(&self) -> Result<f64> {
        let response: PricesResponse = self.get_json("prices").await?;
        Ok(response.usd)
    }

    /// Average tx fees per block in BTC over the last day of blocks
    #[instrument(skip(self))]
    pub async fn fetch_avg_block_fees(&self) -> Result<f64> {
        let path = format!("mining/reward-stats/{}", FEE_SAMPLE_BLOCKS);
        let response: RewardStatsResponse = self.get_json(&path).await?;
        Ok(response.avg_fee_per_block_btc())
    }

    /// GET `path` and decode the JSON body
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::network(format!("Failed to build URL for {}: {}", path, e)))?;

        debug!("Fetching {}", url);
        let body = self.get_with_retry(&url, path).await?;

        serde_json::from_str(&body)
            .map_err(|e| Error::api(path, format!("unexpected response body: {}", e)))
    }

    /// GET request with exponential backoff retry
    async fn get_with_retry(&self, url: &Url, endpoint: &str) -> Result<String> {
        let mut backoff = ExponentialBackoff::new(
            self.backoff_config.initial_delay,
            self.backoff_config.max_delay,
            self.backoff_config.multiplier,
        );

        loop {
            let attempt = backoff.attempt() as usize;
            let error = match self.client.get(url.clone()).send().await {
                Ok(response) if response.status().is_success() => {
                    return response.text().await.map_err(Error::from);
                }
                Ok(response) => {
                    let status = response.status();
                    let error = Error::api(endpoint, format!("HTTP {}", status));
                    if !status.is_server_error() && status != reqwest::StatusCode::TOO_MANY_REQUESTS {
                        return Err(error);
                    }
                    error
                }
                Err(e) => {
                    let error = Error::from(e);
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    error
                }
            };

            if attempt >= self.backoff_config.max_retries {
                return Err(error);
            }

            let delay = backoff.next_delay();
            warn!(
                "Request to {} failed ({}), retrying in {:?} (attempt {}/{})",
                endpoint,
                error,
                delay,
                attempt + 1,
                self.backoff_config.max_retries
            );
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl NetworkDataSource for MempoolClient {
    fn source_name(&self) -> &'static str {
        "mempool"
    }

    #[instrument(skip(self))]
    async fn fetch_snapshot(&self) -> Result<NetworkSnapshot> {
        let (stats, adjustment, height, price, fees) = futures::try_join!(
            self.fetch_mining_stats(),
            self.fetch_difficulty_adjustment(),
            self.fetch_block_height(),
            self.fetch_btc_price(),
            self.fetch_avg_block_fees(),
        )?;

        let snapshot = NetworkSnapshot {
            network_hashrate: stats.current_hashrate,
            difficulty: stats.current_difficulty,
            block_height: height,
            block_subsidy: subsidy_at_height(height),
            avg_block_fees: fees,
            btc_price_usd: price,
            observed_at: Utc::now(),
            difficulty_adjustment: Some(adjustment),
        };

        info!(
            height = snapshot.block_height,
            hashrate = snapshot.network_hashrate,
            difficulty = snapshot.difficulty,
            "Fetched network snapshot"
        );
        Ok(snapshot)
    }
}

/// Fixed snapshot, for offline runs and tests
#[derive(Debug, Clone)]
pub struct StaticSource {
    snapshot: NetworkSnapshot,
}

impl StaticSource {
    pub fn new(snapshot: NetworkSnapshot) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl NetworkDataSource for StaticSource {
    fn source_name(&self) -> &'static str {
        "static"
    }

    async fn fetch_snapshot(&self) -> Result<NetworkSnapshot> {
        Ok(self.snapshot.clone())
    }
}

/// Serves snapshots from a TTL cache, refreshing from `inner` when expired
pub struct CachedSource<S> {
    inner: S,
    cache: Mutex<SnapshotCache>,
}

impl<S: NetworkDataSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            cache: Mutex::new(SnapshotCache::new(ttl, clock)),
        }
    }

    /// Most recent snapshot even if expired; used to keep rendering after a failed refresh
    pub fn last_known(&self) -> Option<NetworkSnapshot> {
        self.cache.lock().get_stale().cloned()
    }

    /// Age of the cached snapshot
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache.lock().age()
    }
}

#[async_trait]
impl<S: NetworkDataSource> NetworkDataSource for CachedSource<S> {
    fn source_name(&self) -> &'static str {
        self.inner.source_name()
    }

    async fn fetch_snapshot(&self) -> Result<NetworkSnapshot> {
        if let Some(snapshot) = self.cache.lock().get().cloned() {
            debug!("Serving cached network snapshot");
            return Ok(snapshot);
        }

        let ttl = self.cache.lock().ttl();
        debug!(source = self.inner.source_name(), ?ttl, "Refreshing network snapshot");

        let snapshot = self.inner.fetch_snapshot().await?;
        self.cache.lock().set(snapshot.clone());
        Ok(snapshot)
    }
}

#[async_trait]
impl NetworkDataSource for Box<dyn NetworkDataSource> {
    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }

    async fn fetch_snapshot(&self) -> Result<NetworkSnapshot> {
        (**self).fetch_snapshot().await
    }
}
