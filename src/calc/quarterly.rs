//! Calendar-quarter roll-up of a projection

use super::projection::ProjectionPoint;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Revenue and closing state of one calendar quarter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterSummary {
    pub year: i32,
    /// 1 through 4
    pub quarter: u32,
    pub label: String,
    pub revenue: f64,
    pub end_share_percent: f64,
    pub end_pool_hashrate: f64,
    pub cumulative_at_end: f64,
    pub period_count: usize,
}

/// Calendar quarter (1-4) of a month given as 0-11
pub fn quarter_of_month0(month0: u32) -> u32 {
    month0 / 3 + 1
}

/// Group points by (year, quarter) in first-seen order.
///
/// End-of-quarter fields come from the last member of each group.
pub fn summarize(points: &[ProjectionPoint]) -> Vec<QuarterSummary> {
    let mut summaries: Vec<QuarterSummary> = Vec::new();
    let mut index_by_key: HashMap<(i32, u32), usize> = HashMap::new();

    for point in points {
        let year = point.date.year();
        let quarter = quarter_of_month0(point.date.month0());

        let index = *index_by_key.entry((year, quarter)).or_insert_with(|| {
            summaries.push(QuarterSummary {
                year,
                quarter,
                label: format!("Q{} {}", quarter, year),
                revenue: 0.0,
                end_share_percent: 0.0,
                end_pool_hashrate: 0.0,
                cumulative_at_end: 0.0,
                period_count: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[index];
        summary.revenue += point.period_revenue;
        summary.end_share_percent = point.share_percent;
        summary.end_pool_hashrate = point.pool_hashrate;
        summary.cumulative_at_end = point.cumulative_revenue;
        summary.period_count += 1;
    }

    summaries
}
