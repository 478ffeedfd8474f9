//! Pool Revenue Calculator - Main Application
//!
//! Fetches network state, estimates pool operator revenue and renders a
//! report, a CSV export or JSON, once or on a refresh interval.

use pool_revenue_calc::{
    cache::SystemClock,
    calc::{
        estimate_current, project, summarize, CurrentEstimate, PayoutOptions, ProjectionParams,
        ProjectionPoint, QuarterSummary,
    },
    client::{CachedSource, MempoolClient, NetworkDataSource, StaticSource},
    config::Config,
    export::export_to_file,
    logging::init_logging,
    report::Report,
    Error, NetworkSnapshot, PoolInputs, Result, APP_DESCRIPTION, APP_NAME, APP_VERSION,
};

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Everything computed from one snapshot
#[derive(Debug, Serialize)]
struct Calculation {
    snapshot: NetworkSnapshot,
    estimate: CurrentEstimate,
    projection: ProjectionParams,
    points: Vec<ProjectionPoint>,
    quarters: Vec<QuarterSummary>,
}

/// Drives fetch, calculate and render cycles
struct Calculator {
    config: Config,
    inputs: PoolInputs,
    payout_options: PayoutOptions,
    source: CachedSource<Box<dyn NetworkDataSource>>,
}

impl Calculator {
    /// Create a calculator with a live or offline data source
    fn new(config: Config) -> Result<Self> {
        let inner: Box<dyn NetworkDataSource> = if config.offline {
            Box::new(StaticSource::new(config.offline_snapshot()?))
        } else {
            Box::new(
                MempoolClient::new(&config.api_url, config.http_timeout()?)?
                    .with_backoff_config(config.backoff_config()),
            )
        };

        let source = CachedSource::new(inner, config.cache_ttl()?, Arc::new(SystemClock));

        Ok(Self {
            inputs: config.pool_inputs()?,
            payout_options: config.payout_options(),
            config,
            source,
        })
    }

    /// Fetch a snapshot, falling back to the last one seen if the source fails
    async fn refresh(&self) -> Result<NetworkSnapshot> {
        match self.source.fetch_snapshot().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => match self.source.last_known() {
                Some(stale) => {
                    warn!(
                        category = e.category(),
                        age = ?self.source.cache_age(),
                        "Refresh from {} failed, keeping previous data: {}",
                        self.source.source_name(),
                        e
                    );
                    Ok(stale)
                }
                None => Err(e),
            },
        }
    }

    /// Run the calculation engine against a snapshot
    fn calculate(&self, snapshot: NetworkSnapshot) -> Result<Calculation> {
        let estimate = estimate_current(
            &snapshot,
            &self.inputs,
            self.config.payout_model,
            &self.payout_options,
        );
        let projection = self.config.projection_params(&snapshot)?;
        let points = project(&projection);
        let quarters = summarize(&points);

        debug!(
            periods = points.len(),
            quarters = quarters.len(),
            daily_btc = estimate.daily_btc,
            "Calculation complete"
        );

        Ok(Calculation {
            snapshot,
            estimate,
            projection,
            points,
            quarters,
        })
    }

    /// Write the calculation in the configured output mode
    fn emit(&self, calculation: &Calculation) -> Result<()> {
        if let Some(path) = &self.config.export {
            export_to_file(path, &calculation.projection, &calculation.points, Utc::now())?;
            println!("Wrote {} periods to {}", calculation.points.len(), path.display());
            return Ok(());
        }

        if self.config.json {
            println!("{}", serde_json::to_string_pretty(calculation)?);
            return Ok(());
        }

        let report = Report {
            snapshot: &calculation.snapshot,
            inputs: &self.inputs,
            estimate: &calculation.estimate,
            payout_model: self.config.payout_model,
            display_unit: self.config.display_unit,
            points: &calculation.points,
            quarters: &calculation.quarters,
            page: self.config.page,
            page_size: self.config.page_size,
        };
        println!("{}", report.render());
        Ok(())
    }

    /// Single fetch, calculate and render pass
    async fn run_once(&self) -> Result<()> {
        let snapshot = self.refresh().await?;
        let calculation = self.calculate(snapshot)?;
        self.emit(&calculation)
    }

    /// Refresh on an interval until cancelled
    async fn watch(&self, cancellation_token: CancellationToken) -> Result<()> {
        let period = self.config.refresh_interval()?;
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Watching network data every {:?}", period);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    info!("Watch mode stopped");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_once().await {
                        error!(category = e.category(), "Refresh failed: {}", e);
                        eprintln!("Network data unavailable: {}", e);
                    }
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load and validate configuration
    let config = Config::load().await?;

    // Handle special commands
    if config.info {
        print_info();
        return Ok(());
    }

    if config.print_config {
        print_configuration(&config)?;
        return Ok(());
    }

    let _log_guard = init_logging(config.log_level, config.log_format, config.log_file.as_deref())?;

    info!("Starting {} v{}", APP_NAME, APP_VERSION);
    info!(
        "Configuration: offline={}, formula={}, payout={}, granularity={}",
        config.offline, config.formula, config.payout_model, config.granularity
    );

    let watch = config.watch;
    let calculator = Calculator::new(config)?;

    if !watch {
        return calculator.run_once().await;
    }

    let cancellation_token = CancellationToken::new();
    let signal_token = cancellation_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_token.cancel(),
            Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    calculator.watch(cancellation_token).await
}

/// Print basic program information
fn print_info() {
    println!("{} v{}", APP_NAME, APP_VERSION);
    println!("{}", APP_DESCRIPTION);
}

/// Print current configuration
fn print_configuration(config: &Config) -> Result<()> {
    let config_yaml = serde_yaml::to_string(config).map_err(Error::from)?;
    println!("{}", config_yaml);
    Ok(())
}
