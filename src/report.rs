//! Plain-text rendering of estimates and projections
//!
//! Everything here builds `String`s from already-computed values. Nothing in
//! this module calculates revenue.

use crate::calc::projection::total_revenue;
use crate::calc::{btc_to_usd, units, CurrentEstimate, ProjectionPoint, QuarterSummary};
use crate::format::{
    format_btc, format_difficulty, format_hashrate, format_number, format_optional,
    format_percent, format_usd, format_value, to_exponential, to_fixed, PLACEHOLDER,
};
use crate::utils::format_duration;
use crate::{DifficultyAdjustment, DisplayUnit, FormulaType, NetworkSnapshot, PayoutModel, PoolInputs};
use std::collections::HashMap;
use std::fmt::{self, Write as _};

/// Network state as reported by the data source
pub struct NetworkView<'a>(pub &'a NetworkSnapshot);

impl fmt::Display for NetworkView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.0;
        writeln!(f, "Network")?;
        writeln!(f, "  Block height:      {}", format_number(snapshot.block_height as f64))?;
        writeln!(f, "  Hashrate:          {}", format_hashrate(snapshot.network_hashrate))?;
        writeln!(f, "  Difficulty:        {}", format_difficulty(snapshot.difficulty))?;
        writeln!(f, "  Block subsidy:     {} BTC", format_btc(snapshot.block_subsidy))?;
        writeln!(f, "  Avg fees / block:  {} BTC", format_btc(snapshot.avg_block_fees))?;
        let price = (snapshot.btc_price_usd > 0.0).then_some(snapshot.btc_price_usd);
        writeln!(f, "  BTC price:         {}", format_optional(price, format_usd))?;
        writeln!(
            f,
            "  Observed at:       {}",
            snapshot.observed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}

/// Progress of the current difficulty epoch
pub struct DifficultyAdjustmentView<'a>(pub &'a DifficultyAdjustment);

impl fmt::Display for DifficultyAdjustmentView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let adjustment = self.0;
        writeln!(f, "Difficulty adjustment")?;
        writeln!(f, "  Epoch progress:    {:.2}%", adjustment.progress_percent)?;
        writeln!(f, "  Expected change:   {:+.2}%", adjustment.difficulty_change)?;
        writeln!(
            f,
            "  Remaining:         {} blocks (~{})",
            format_number(adjustment.remaining_blocks as f64),
            format_duration(adjustment.remaining_time_ms / 1000)
        )?;
        writeln!(
            f,
            "  Retarget height:   {}",
            format_number(adjustment.next_retarget_height as f64)
        )?;
        if let Some(date) = adjustment.estimated_retarget_date {
            writeln!(f, "  Estimated date:    {}", date.format("%Y-%m-%d %H:%M UTC"))?;
        }
        Ok(())
    }
}

/// Current-period numbers with the formula spelled out
pub struct EstimateView<'a> {
    pub snapshot: &'a NetworkSnapshot,
    pub inputs: &'a PoolInputs,
    pub estimate: &'a CurrentEstimate,
    pub payout_model: PayoutModel,
    pub display_unit: DisplayUnit,
}

impl EstimateView<'_> {
    fn amount(&self, btc: f64) -> String {
        let value = format_value(btc, self.display_unit);
        let mut out = format!("{} {}", value, self.display_unit);
        if self.snapshot.btc_price_usd > 0.0 {
            let usd = btc_to_usd(btc, self.snapshot.btc_price_usd);
            let _ = write!(out, " (≈ {})", format_usd(usd));
        }
        out
    }

    /// One-line derivation of the daily BTC figure
    pub fn walkthrough(&self) -> String {
        let estimate = self.estimate;
        match self.inputs.formula {
            FormulaType::Difficulty => format!(
                "({} H/s × {} BTC × 86,400) ÷ ({} × 2^32) = {} BTC/day",
                to_exponential(estimate.pool_hashrate_hps, 3),
                estimate.reward.total,
                to_exponential(self.snapshot.difficulty, 3),
                format_btc(estimate.daily_btc)
            ),
            FormulaType::HashrateRatio => format!(
                "({} H/s ÷ {} H/s) × 144 × {} BTC = {} BTC/day",
                to_exponential(estimate.pool_hashrate_hps, 3),
                to_exponential(self.snapshot.network_hashrate, 3),
                estimate.reward.total,
                format_btc(estimate.daily_btc)
            ),
        }
    }
}

impl fmt::Display for EstimateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let estimate = self.estimate;
        writeln!(f, "Pool")?;
        writeln!(f, "  Hashrate:          {}", format_hashrate(estimate.pool_hashrate_hps))?;
        writeln!(f, "  Network share:     {}", format_percent(estimate.share_percent))?;
        writeln!(
            f,
            "  Blocks / day:      {} (one every {:.1} days)",
            to_fixed(estimate.expected_blocks_per_day, 4),
            if estimate.expected_blocks_per_day > 0.0 {
                1.0 / estimate.expected_blocks_per_day
            } else {
                f64::INFINITY
            }
        )?;
        writeln!(
            f,
            "  Block reward:      {} BTC ({} subsidy + {} fees)",
            format_btc(estimate.reward.total),
            format_btc(estimate.reward.subsidy),
            format_btc(estimate.reward.tx_fees)
        )?;
        writeln!(f, "  Formula:           {}", self.inputs.formula)?;
        writeln!(f, "  {}", self.walkthrough())?;
        writeln!(f)?;

        writeln!(
            f,
            "Operator revenue at {}% fee",
            format_number(self.inputs.pool_fee_percent)
        )?;
        for (label, btc) in estimate.horizons.rows() {
            writeln!(f, "  {:<9} {}", label, self.amount(btc))?;
        }
        writeln!(f)?;

        writeln!(f, "Payout models (daily operator revenue)")?;
        for (model, btc) in estimate.payouts.iter() {
            let marker = if model == self.payout_model { "*" } else { " " };
            writeln!(f, "{} {:<13} {}", marker, model.to_string(), self.amount(btc))?;
        }
        Ok(())
    }
}

/// Projection table split into pages, rendered on first request
pub struct ProjectionPages<'a> {
    points: &'a [ProjectionPoint],
    page_size: usize,
    display_unit: DisplayUnit,
    rendered: HashMap<usize, String>,
}

impl<'a> ProjectionPages<'a> {
    pub fn new(points: &'a [ProjectionPoint], page_size: usize, display_unit: DisplayUnit) -> Self {
        Self {
            points,
            page_size: page_size.max(1),
            display_unit,
            rendered: HashMap::new(),
        }
    }

    /// Number of pages; an empty projection has none
    pub fn page_count(&self) -> usize {
        self.points.len().div_ceil(self.page_size)
    }

    /// Points on a 1-based page
    pub fn rows(&self, page: usize) -> Option<&'a [ProjectionPoint]> {
        if page == 0 || page > self.page_count() {
            return None;
        }
        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.points.len());
        Some(&self.points[start..end])
    }

    /// Rendered table for a 1-based page
    pub fn page(&mut self, page: usize) -> Option<&str> {
        let rows = self.rows(page)?;
        let page_count = self.page_count();
        let display_unit = self.display_unit;
        let rendered = self
            .rendered
            .entry(page)
            .or_insert_with(|| render_rows(rows, page, page_count, display_unit));
        Some(rendered.as_str())
    }

    /// Pages rendered so far
    pub fn cached_pages(&self) -> usize {
        self.rendered.len()
    }
}

/// One-decimal hashrate for table cells
fn table_hashrate(hashes_per_sec: f64) -> String {
    if hashes_per_sec.is_nan() {
        PLACEHOLDER.to_string()
    } else {
        units::format_compact(hashes_per_sec, 1)
    }
}

fn render_rows(
    rows: &[ProjectionPoint],
    page: usize,
    page_count: usize,
    display_unit: DisplayUnit,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Projection (page {} of {})", page, page_count);
    let _ = writeln!(
        out,
        "  {:<10} {:<14} {:>14} {:>14} {:>12} {:>16} {:>16}",
        "Period", "Date", "Pool", "Network", "Share", "Revenue", "Cumulative"
    );
    for point in rows {
        let _ = writeln!(
            out,
            "  {:<10} {:<14} {:>14} {:>14} {:>12} {:>16} {:>16}",
            point.label,
            point.display_date,
            table_hashrate(point.pool_hashrate),
            table_hashrate(point.network_hashrate),
            format_percent(point.share_percent),
            format_value(point.period_revenue, display_unit),
            format_value(point.cumulative_revenue, display_unit),
        );
    }
    out
}

/// Quarterly roll-up table
pub struct QuarterlyView<'a> {
    pub quarters: &'a [QuarterSummary],
    pub display_unit: DisplayUnit,
}

impl fmt::Display for QuarterlyView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quarterly summary ({})", self.display_unit)?;
        if self.quarters.is_empty() {
            return writeln!(f, "  (no periods in range)");
        }

        writeln!(
            f,
            "  {:<8} {:>7} {:>16} {:>14} {:>12} {:>16}",
            "Quarter", "Periods", "Revenue", "End pool", "End share", "Cumulative"
        )?;
        for quarter in self.quarters {
            writeln!(
                f,
                "  {:<8} {:>7} {:>16} {:>14} {:>12} {:>16}",
                quarter.label,
                quarter.period_count,
                format_value(quarter.revenue, self.display_unit),
                table_hashrate(quarter.end_pool_hashrate),
                format_percent(quarter.end_share_percent),
                format_value(quarter.cumulative_at_end, self.display_unit),
            )?;
        }
        Ok(())
    }
}

/// Full text report for one refresh
pub struct Report<'a> {
    pub snapshot: &'a NetworkSnapshot,
    pub inputs: &'a PoolInputs,
    pub estimate: &'a CurrentEstimate,
    pub payout_model: PayoutModel,
    pub display_unit: DisplayUnit,
    pub points: &'a [ProjectionPoint],
    pub quarters: &'a [QuarterSummary],
    pub page: usize,
    pub page_size: usize,
}

impl Report<'_> {
    /// Render every section into one string
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", NetworkView(self.snapshot));
        if let Some(adjustment) = &self.snapshot.difficulty_adjustment {
            let _ = writeln!(out, "{}", DifficultyAdjustmentView(adjustment));
        }
        let _ = writeln!(
            out,
            "{}",
            EstimateView {
                snapshot: self.snapshot,
                inputs: self.inputs,
                estimate: self.estimate,
                payout_model: self.payout_model,
                display_unit: self.display_unit,
            }
        );

        let mut pages = ProjectionPages::new(self.points, self.page_size, self.display_unit);
        let page_count = pages.page_count();
        match pages.page(self.page) {
            Some(table) => {
                let _ = writeln!(
                    out,
                    "{}  Total over {} periods: {} {}\n",
                    table,
                    self.points.len(),
                    format_value(total_revenue(self.points), self.display_unit),
                    self.display_unit
                );
            }
            None if page_count == 0 => {
                let _ = writeln!(out, "Projection\n  (no periods in range)\n");
            }
            None => {
                let _ = writeln!(
                    out,
                    "Projection\n  page {} is out of range (1-{})\n",
                    self.page,
                    page_count
                );
            }
        }

        let _ = write!(
            out,
            "{}",
            QuarterlyView {
                quarters: self.quarters,
                display_unit: self.display_unit,
            }
        );
        out
    }
}
