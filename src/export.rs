//! Delimited-text export of a projection
//!
//! The format is a fixed column set preceded by `#` metadata lines recording
//! the parameters that produced it. Given the same params, points and
//! generation timestamp the output is byte-for-byte identical.

use crate::calc::{ProjectionParams, ProjectionPoint};
use crate::format::to_exponential;
use crate::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Column header row
pub const HEADER: &str = "Date,Period,Pool Hashrate (H/s),Network Hashrate (H/s),Share %,Period Revenue (BTC),Cumulative Revenue (BTC)";

/// Render the export as a string
pub fn to_csv_string(
    params: &ProjectionParams,
    points: &[ProjectionPoint],
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_metadata(&mut out, params, points.len(), generated_at);
    out.push_str(HEADER);
    out.push('\n');

    for point in points {
        let _ = writeln!(
            out,
            "{},{},{},{},{:.6},{:.8},{:.8}",
            point.date.format("%Y-%m-%d"),
            point.period,
            to_exponential(point.pool_hashrate, 3),
            to_exponential(point.network_hashrate, 3),
            point.share_percent,
            point.period_revenue,
            point.cumulative_revenue,
        );
    }

    out
}

fn write_metadata(
    out: &mut String,
    params: &ProjectionParams,
    period_count: usize,
    generated_at: DateTime<Utc>,
) -> std::fmt::Result {
    writeln!(out, "# Pool Revenue Projection")?;
    writeln!(
        out,
        "# Generated: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )?;
    writeln!(
        out,
        "# Pool Hashrate: {} H/s",
        to_exponential(params.pool_hashrate_hps, 3)
    )?;
    writeln!(
        out,
        "# Network Hashrate: {} H/s",
        to_exponential(params.network_hashrate_hps, 3)
    )?;
    writeln!(out, "# Block Reward: {} BTC", params.block_reward)?;
    writeln!(out, "# Pool Fee: {}%", params.pool_fee_percent)?;
    writeln!(
        out,
        "# Pool Growth: {}%/month",
        params.pool_growth_percent_per_month
    )?;
    writeln!(
        out,
        "# Network Growth: {}%/month",
        params.network_growth_percent_per_month
    )?;
    writeln!(out, "# Start Date: {}", params.start_date.format("%Y-%m-%d"))?;
    writeln!(out, "# End Date: {}", params.end_date.format("%Y-%m-%d"))?;
    writeln!(out, "# Granularity: {}", params.granularity)?;
    writeln!(out, "# Periods: {}", period_count)
}

/// Write the export to `writer`
pub fn write_csv<W: Write>(
    writer: &mut W,
    params: &ProjectionParams,
    points: &[ProjectionPoint],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    writer.write_all(to_csv_string(params, points, generated_at).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write the export to a file, replacing it if present
pub fn export_to_file(
    path: &Path,
    params: &ProjectionParams,
    points: &[ProjectionPoint],
    generated_at: DateTime<Utc>,
) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_csv(&mut file, params, points, generated_at)?;
    info!(path = %path.display(), rows = points.len(), "wrote projection export");
    Ok(())
}
