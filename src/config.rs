//! Configuration management for the pool revenue calculator
//!
//! Supports configuration via command line arguments, environment variables,
//! and configuration files (YAML/JSON) with validation and defaults.
//! Values given on the command line always win over the file.

use crate::calc::payout::{DEFAULT_LUCK_FACTOR, DEFAULT_TX_FEE_RATIO};
use crate::calc::{subsidy_at_height, BlockReward, PayoutOptions, ProjectionParams};
use crate::client::{BackoffConfig, DEFAULT_API_URL};
use crate::{
    DisplayUnit, Error, FormulaType, Granularity, HashRate, HashrateUnit, NetworkSnapshot,
    PayoutModel, PoolInputs, Result,
};
use chrono::{Months, NaiveDate, Utc};
use clap::parser::ValueSource;
use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Complete configuration for the calculator
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(
    name = "pool-revenue-calc",
    version = env!("CARGO_PKG_VERSION"),
    about = "Bitcoin mining pool revenue calculator",
    long_about = "Estimates a mining pool operator's fee revenue from live or offline network data, and projects it forward under compound hashrate growth"
)]
pub struct Config {
    /// Print program info and exit
    #[arg(long)]
    #[serde(default)]
    pub info: bool,

    /// Print the parsed configuration and exit
    #[arg(long)]
    #[serde(default)]
    pub print_config: bool,

    /// Configuration file path (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    #[serde(default)]
    pub config_file: Option<PathBuf>,

    // Network data
    /// Root of the mempool.space compatible API
    #[arg(long, env = "POOL_REVENUE_API_URL", default_value = DEFAULT_API_URL)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// HTTP request timeout (e.g. "10s")
    #[arg(long, default_value = "30s")]
    #[serde(default = "default_http_timeout")]
    pub http_timeout: String,

    /// Maximum retry attempts for HTTP requests
    #[arg(long, default_value = "3")]
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// How long fetched network data stays fresh
    #[arg(long, default_value = "30s")]
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    /// Refresh period in watch mode
    #[arg(long, default_value = "60s")]
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    /// Keep refreshing and re-rendering until interrupted
    #[arg(short = 'w', long)]
    #[serde(default)]
    pub watch: bool,

    /// Use the network values given below instead of the API
    #[arg(long)]
    #[serde(default)]
    pub offline: bool,

    /// Offline network hashrate (e.g. "650EH" or "6.5e20")
    #[arg(long, default_value = "650EH")]
    #[serde(default = "default_network_hashrate")]
    pub network_hashrate: String,

    /// Offline network difficulty
    #[arg(long, default_value = "110000000000000")]
    #[serde(default = "default_difficulty")]
    pub difficulty: f64,

    /// Offline block height (determines the subsidy)
    #[arg(long, default_value = "870000")]
    #[serde(default = "default_block_height")]
    pub block_height: u64,

    /// Offline average tx fees per block in BTC
    #[arg(long, default_value = "0.02")]
    #[serde(default = "default_avg_block_fees")]
    pub avg_block_fees: f64,

    /// Offline BTC price in USD
    #[arg(long, default_value = "0")]
    #[serde(default)]
    pub btc_price: f64,

    // Pool
    /// Pool hashrate; a bare number is in --hashrate-unit
    #[arg(short = 'r', long, default_value = "100")]
    #[serde(default = "default_hashrate")]
    pub hashrate: String,

    /// Unit for a bare --hashrate (H, KH, MH, GH, TH, PH, EH)
    #[arg(short = 'u', long, default_value = "PH")]
    #[serde(default = "default_hashrate_unit")]
    pub hashrate_unit: String,

    /// Pool fee in percent
    #[arg(short = 'f', long, default_value = "2")]
    #[serde(default = "default_pool_fee")]
    pub pool_fee: f64,

    /// Formula for the current-period estimate
    #[arg(long, value_enum, default_value = "hashrate-ratio")]
    #[serde(default = "default_formula")]
    pub formula: FormulaType,

    /// Average tx fees per block in BTC, replacing the observed value
    #[arg(long)]
    #[serde(default)]
    pub tx_fee_override: Option<f64>,

    /// Payout model for the headline operator revenue
    #[arg(short = 'p', long, value_enum, default_value = "fpps")]
    #[serde(default = "default_payout_model")]
    pub payout_model: PayoutModel,

    /// Share of block rewards coming from tx fees (PPS+)
    #[arg(long, default_value = "0.03")]
    #[serde(default = "default_tx_fee_ratio")]
    pub tx_fee_ratio: f64,

    /// Luck multiplier (PPLNS)
    #[arg(long, default_value = "1.0")]
    #[serde(default = "default_luck_factor")]
    pub luck_factor: f64,

    // Projection
    /// Pool hashrate growth in percent per month
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    #[serde(default)]
    pub pool_growth: f64,

    /// Network hashrate growth in percent per month
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    #[serde(default)]
    pub network_growth: f64,

    /// Projection start (YYYY-MM-DD, default today)
    #[arg(long)]
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Projection end (YYYY-MM-DD, default start + --horizon-months)
    #[arg(long)]
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Horizon used when no end date is given
    #[arg(long, default_value = "12")]
    #[serde(default = "default_horizon_months")]
    pub horizon_months: u32,

    /// Projection bucket size
    #[arg(short = 'g', long, value_enum, default_value = "monthly")]
    #[serde(default = "default_granularity")]
    pub granularity: Granularity,

    // Output
    /// Denomination for BTC amounts
    #[arg(long, value_enum, default_value = "btc")]
    #[serde(default)]
    pub display_unit: DisplayUnit,

    /// Projection table page (1-based)
    #[arg(long, default_value = "1")]
    #[serde(default = "default_page")]
    pub page: usize,

    /// Projection table rows per page
    #[arg(long, default_value = "12")]
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Write the projection as CSV to this path instead of printing a report
    #[arg(short = 'o', long, value_name = "FILE")]
    #[serde(default)]
    pub export: Option<PathBuf>,

    /// Print the estimate and projection as JSON
    #[arg(long)]
    #[serde(default)]
    pub json: bool,

    // Logging
    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "warn")]
    #[serde(default = "default_log_level")]
    pub log_level: LogLevel,

    /// Log line format
    #[arg(long, value_enum, default_value = "text")]
    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Also append logs to this file
    #[arg(long, value_name = "FILE")]
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

/// Copy each listed field from the file config unless the user set it explicitly
macro_rules! merge_unset {
    ($config:ident, $file:ident, $matches:ident, [$($field:ident),* $(,)?]) => {
        $(
            if !explicitly_set(&$matches, stringify!($field)) {
                $config.$field = $file.$field;
            }
        )*
    };
}

fn explicitly_set(matches: &ArgMatches, id: &str) -> bool {
    matches!(
        matches.value_source(id),
        Some(ValueSource::CommandLine) | Some(ValueSource::EnvVariable)
    )
}

impl Config {
    /// Load configuration from the process arguments, exiting on usage errors
    pub async fn load() -> Result<Self> {
        Self::from_matches(Self::command().get_matches()).await
    }

    /// Load configuration from explicit arguments, merging the config file if given
    pub async fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command()
            .try_get_matches_from(args)
            .map_err(|e| Error::config(e.to_string()))?;
        Self::from_matches(matches).await
    }

    async fn from_matches(matches: ArgMatches) -> Result<Self> {
        let mut config =
            Self::from_arg_matches(&matches).map_err(|e| Error::config(e.to_string()))?;

        if let Some(config_file) = config.config_file.clone() {
            let file_config = Self::load_from_file(&config_file).await?;
            config.merge_with_file(file_config, &matches);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;

        if path.extension().and_then(|s| s.to_str()) == Some("json") {
            serde_json::from_str(&content).map_err(Error::from)
        } else {
            serde_yaml::from_str(&content).map_err(Error::from)
        }
    }

    /// Merge CLI config with file config (explicit CLI values take precedence)
    fn merge_with_file(&mut self, file_config: Self, matches: &ArgMatches) {
        let config = self;
        let file = file_config;
        merge_unset!(
            config,
            file,
            matches,
            [
                api_url,
                http_timeout,
                max_retries,
                cache_ttl,
                refresh_interval,
                watch,
                offline,
                network_hashrate,
                difficulty,
                block_height,
                avg_block_fees,
                btc_price,
                hashrate,
                hashrate_unit,
                pool_fee,
                formula,
                tx_fee_override,
                payout_model,
                tx_fee_ratio,
                luck_factor,
                pool_growth,
                network_growth,
                start_date,
                end_date,
                horizon_months,
                granularity,
                display_unit,
                page,
                page_size,
                export,
                json,
                log_level,
                log_format,
                log_file,
            ]
        );
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_url)
            .map_err(|e| Error::config(format!("Invalid API URL: {}", e)))?;

        self.pool_hashrate()?;
        if self.offline {
            self.offline_network_hashrate()?;
        }

        if self.pool_fee.is_nan() || self.pool_fee < 0.0 {
            return Err(Error::invalid_input(
                "pool_fee",
                format!("must be a non-negative percentage, got {}", self.pool_fee),
            ));
        }

        if let Some(fees) = self.tx_fee_override {
            if fees.is_nan() || fees < 0.0 {
                return Err(Error::invalid_input(
                    "tx_fee_override",
                    format!("must be non-negative, got {}", fees),
                ));
            }
        }

        let (start, end) = self.date_range()?;
        if end < start {
            return Err(Error::invalid_input(
                "end_date",
                format!("{} is before start date {}", end, start),
            ));
        }

        if self.http_timeout()?.is_zero() {
            return Err(Error::config("HTTP timeout must be greater than 0"));
        }
        if self.cache_ttl()?.is_zero() {
            return Err(Error::config("Cache TTL must be greater than 0"));
        }
        if self.refresh_interval()?.is_zero() {
            return Err(Error::config("Refresh interval must be greater than 0"));
        }

        if self.page == 0 || self.page_size == 0 {
            return Err(Error::config("Page and page size must be greater than 0"));
        }

        Ok(())
    }

    /// Unit for bare hashrate numbers; unknown labels fall back to H/s
    pub fn hashrate_unit(&self) -> HashrateUnit {
        match self.hashrate_unit.parse() {
            Ok(unit) => unit,
            Err(_) => {
                warn!(
                    "Unknown hashrate unit '{}', treating value as H/s",
                    self.hashrate_unit
                );
                HashrateUnit::H
            }
        }
    }

    /// Get parsed pool hashrate
    pub fn pool_hashrate(&self) -> Result<HashRate> {
        HashRate::from_str_with_units(&self.hashrate, self.hashrate_unit())
    }

    /// Get parsed offline network hashrate
    pub fn offline_network_hashrate(&self) -> Result<HashRate> {
        HashRate::from_str_with_units(&self.network_hashrate, HashrateUnit::H)
    }

    /// Pool parameters for the current-period estimate
    pub fn pool_inputs(&self) -> Result<PoolInputs> {
        Ok(PoolInputs {
            hashrate: self.pool_hashrate()?.value(),
            hashrate_unit: HashrateUnit::H,
            pool_fee_percent: self.pool_fee,
            formula: self.formula,
            tx_fee_override: self.tx_fee_override,
        })
    }

    /// Payout model knobs
    pub fn payout_options(&self) -> PayoutOptions {
        PayoutOptions {
            tx_fee_ratio: self.tx_fee_ratio,
            luck_factor: self.luck_factor,
        }
    }

    /// Projection start and end dates, defaulting to today and today + horizon
    pub fn date_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = self.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let end = match self.end_date {
            Some(end) => end,
            None => start
                .checked_add_months(Months::new(self.horizon_months))
                .ok_or_else(|| {
                    Error::invalid_input(
                        "horizon_months",
                        format!("{} months from {} is out of range", self.horizon_months, start),
                    )
                })?,
        };
        Ok((start, end))
    }

    /// Projection parameters anchored on a snapshot
    pub fn projection_params(&self, snapshot: &NetworkSnapshot) -> Result<ProjectionParams> {
        let inputs = self.pool_inputs()?;
        let reward = BlockReward::from_snapshot(snapshot, inputs.tx_fee_override);
        let (start_date, end_date) = self.date_range()?;

        Ok(ProjectionParams {
            pool_hashrate_hps: inputs.hashrate_hps(),
            network_hashrate_hps: snapshot.network_hashrate,
            block_reward: reward.total,
            pool_fee_percent: inputs.pool_fee_percent,
            pool_growth_percent_per_month: self.pool_growth,
            network_growth_percent_per_month: self.network_growth,
            start_date,
            end_date,
            granularity: self.granularity,
        })
    }

    /// Snapshot built from the offline network values
    pub fn offline_snapshot(&self) -> Result<NetworkSnapshot> {
        Ok(NetworkSnapshot {
            network_hashrate: self.offline_network_hashrate()?.value(),
            difficulty: self.difficulty,
            block_height: self.block_height,
            block_subsidy: subsidy_at_height(self.block_height),
            avg_block_fees: self.avg_block_fees,
            btc_price_usd: self.btc_price,
            observed_at: Utc::now(),
            difficulty_adjustment: None,
        })
    }

    /// Get HTTP timeout duration
    pub fn http_timeout(&self) -> Result<Duration> {
        parse_duration("http_timeout", &self.http_timeout)
    }

    /// Get cache TTL duration
    pub fn cache_ttl(&self) -> Result<Duration> {
        parse_duration("cache_ttl", &self.cache_ttl)
    }

    /// Get watch-mode refresh interval
    pub fn refresh_interval(&self) -> Result<Duration> {
        parse_duration("refresh_interval", &self.refresh_interval)
    }

    /// Retry policy for API requests
    pub fn backoff_config(&self) -> BackoffConfig {
        BackoffConfig {
            max_retries: self.max_retries,
            ..BackoffConfig::default()
        }
    }
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| Error::invalid_input(field, format!("'{}': {}", value, e)))
}

// Default value functions for serde
fn default_api_url() -> String { DEFAULT_API_URL.to_string() }
fn default_http_timeout() -> String { "30s".to_string() }
fn default_max_retries() -> usize { 3 }
fn default_cache_ttl() -> String { "30s".to_string() }
fn default_refresh_interval() -> String { "60s".to_string() }
fn default_network_hashrate() -> String { "650EH".to_string() }
fn default_difficulty() -> f64 { 110_000_000_000_000.0 }
fn default_block_height() -> u64 { 870_000 }
fn default_avg_block_fees() -> f64 { 0.02 }
fn default_hashrate() -> String { "100".to_string() }
fn default_hashrate_unit() -> String { "PH".to_string() }
fn default_pool_fee() -> f64 { 2.0 }
fn default_formula() -> FormulaType { FormulaType::HashrateRatio }
fn default_payout_model() -> PayoutModel { PayoutModel::Fpps }
fn default_tx_fee_ratio() -> f64 { DEFAULT_TX_FEE_RATIO }
fn default_luck_factor() -> f64 { DEFAULT_LUCK_FACTOR }
fn default_horizon_months() -> u32 { 12 }
fn default_granularity() -> Granularity { Granularity::Monthly }
fn default_page() -> usize { 1 }
fn default_page_size() -> usize { 12 }
fn default_log_level() -> LogLevel { LogLevel::Warn }
fn default_log_format() -> LogFormat { LogFormat::Text }
