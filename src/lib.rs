//! Pool Revenue Calculator
//!
//! Estimates what a Bitcoin mining pool operator earns from fees:
//! - Current-period revenue from network hashrate or difficulty
//! - Operator revenue under PPS+, FPPS, PPLNS and proportional payouts
//! - Forward projections with compound pool and network growth
//! - Calendar-quarter roll-ups and CSV export
//!
//! The calculation engine in [`calc`] is pure; network data, configuration
//! and rendering live in the surrounding modules.

pub mod cache;
pub mod calc;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod format;
pub mod logging;
pub mod report;
pub mod types;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;

/// Application information
pub const APP_NAME: &str = "pool-revenue-calc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
