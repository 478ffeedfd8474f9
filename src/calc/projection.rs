//! Forward revenue projection
//!
//! A bounded single-pass generator: one point per period between the start
//! and end dates, with pool and network hashrate compounding monthly at their
//! own rates. Months are fixed 30-day units for growth purposes.
//!
//! Growth is anchored at period 1, not period 0: the first point already
//! carries one period's worth of growth. Projections always use the
//! hashrate-ratio formula since difficulty has no projected value.

use super::formula::{daily_btc_by_hashrate_ratio, network_share_percent};
use crate::Granularity;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Inputs for a projection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParams {
    /// Starting pool hashrate in H/s
    pub pool_hashrate_hps: f64,
    /// Starting network hashrate in H/s
    pub network_hashrate_hps: f64,
    /// Block reward in BTC, held constant over the horizon
    pub block_reward: f64,
    pub pool_fee_percent: f64,
    pub pool_growth_percent_per_month: f64,
    pub network_growth_percent_per_month: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub granularity: Granularity,
}

/// One projected period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    /// 1-based, sequential
    pub period: u32,
    pub date: NaiveDate,
    pub label: String,
    pub display_date: String,
    pub pool_hashrate: f64,
    pub network_hashrate: f64,
    pub share_percent: f64,
    pub daily_btc: f64,
    pub period_btc: f64,
    pub period_revenue: f64,
    pub cumulative_revenue: f64,
    pub months_elapsed: f64,
}

/// `base × (1 + rate%)^months`
pub fn compound(base: f64, percent_per_month: f64, months: f64) -> f64 {
    base * (1.0 + percent_per_month / 100.0).powf(months)
}

/// Number of periods the range asks for, before the cap
pub fn requested_periods(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> u32 {
    let total_days = (end - start).num_days();
    if total_days <= 0 {
        return 0;
    }

    let period_days = i64::from(granularity.period_days());
    let periods = (total_days + period_days - 1) / period_days;
    u32::try_from(periods).unwrap_or(u32::MAX)
}

/// Project pool revenue period by period
pub fn project(params: &ProjectionParams) -> Vec<ProjectionPoint> {
    let granularity = params.granularity;
    let period_days = granularity.period_days();
    let month_fraction = granularity.month_fraction();

    let requested = requested_periods(params.start_date, params.end_date, granularity);
    let period_count = requested.min(granularity.max_periods());
    if period_count < requested {
        trace!(
            requested,
            cap = period_count,
            %granularity,
            "projection truncated at period cap"
        );
    }

    let mut points = Vec::with_capacity(period_count as usize);
    let mut cumulative_revenue = 0.0;

    for period in 1..=period_count {
        let offset = Days::new(u64::from((period - 1) * period_days));
        let date = match params.start_date.checked_add_days(offset) {
            Some(date) if date <= params.end_date => date,
            _ => break,
        };

        let months_elapsed = f64::from(period) * month_fraction;
        let pool_hashrate = compound(
            params.pool_hashrate_hps,
            params.pool_growth_percent_per_month,
            months_elapsed,
        );
        let network_hashrate = compound(
            params.network_hashrate_hps,
            params.network_growth_percent_per_month,
            months_elapsed,
        );

        let share_percent = network_share_percent(pool_hashrate, network_hashrate);
        let daily_btc =
            daily_btc_by_hashrate_ratio(pool_hashrate, network_hashrate, params.block_reward);
        let period_btc = daily_btc * f64::from(period_days);
        let period_revenue = period_btc * (params.pool_fee_percent / 100.0);
        cumulative_revenue += period_revenue;

        points.push(ProjectionPoint {
            period,
            date,
            label: format!("{} {}", granularity.period_label(), period),
            display_date: date.format("%b %-d, %Y").to_string(),
            pool_hashrate,
            network_hashrate,
            share_percent,
            daily_btc,
            period_btc,
            period_revenue,
            cumulative_revenue,
            months_elapsed,
        });
    }

    points
}

/// Final cumulative revenue of a projection, 0 when empty
pub fn total_revenue(points: &[ProjectionPoint]) -> f64 {
    points.last().map_or(0.0, |p| p.cumulative_revenue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> ProjectionParams {
        ProjectionParams {
            pool_hashrate_hps: 1e17,
            network_hashrate_hps: 5e20,
            block_reward: 3.125,
            pool_fee_percent: 2.0,
            pool_growth_percent_per_month: 5.0,
            network_growth_percent_per_month: 3.0,
            start_date: start,
            end_date: end,
            granularity,
        }
    }

    #[test]
    fn test_requested_periods() {
        let start = date(2025, 1, 1);
        assert_eq!(requested_periods(start, start, Granularity::Daily), 0);
        assert_eq!(requested_periods(start, date(2024, 12, 1), Granularity::Daily), 0);
        assert_eq!(requested_periods(start, date(2025, 1, 11), Granularity::Daily), 10);
        assert_eq!(requested_periods(start, date(2025, 1, 11), Granularity::Weekly), 2);
        assert_eq!(requested_periods(start, date(2025, 3, 31), Granularity::Monthly), 3);
    }

    #[test]
    fn test_empty_ranges() {
        let start = date(2025, 1, 1);
        assert!(project(&params(start, date(2024, 6, 1), Granularity::Daily)).is_empty());
        assert!(project(&params(start, start, Granularity::Monthly)).len() <= 1);
    }

    #[test]
    fn test_monthly_growth_scenario() {
        let points = project(&params(date(2025, 1, 1), date(2025, 3, 31), Granularity::Monthly));
        assert_eq!(points.len(), 3);

        let third = &points[2];
        assert_eq!(third.period, 3);
        assert_eq!(third.months_elapsed, 3.0);
        assert_relative_eq!(third.pool_hashrate, 1e17 * 1.05f64.powi(3), max_relative = 1e-12);
        assert_relative_eq!(third.network_hashrate, 5e20 * 1.03f64.powi(3), max_relative = 1e-12);
        assert_eq!(third.date, date(2025, 3, 2));
        assert_eq!(third.label, "Month 3");
    }

    #[test]
    fn test_growth_anchored_at_first_period() {
        let points = project(&params(date(2025, 1, 1), date(2025, 2, 1), Granularity::Weekly));
        let first = &points[0];
        assert_eq!(first.date, date(2025, 1, 1));
        assert_relative_eq!(first.months_elapsed, 7.0 / 30.0);
        assert!(first.pool_hashrate > 1e17);
        assert_relative_eq!(
            first.pool_hashrate,
            1e17 * 1.05f64.powf(7.0 / 30.0),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_zero_growth_keeps_hashrate_flat() {
        let mut p = params(date(2025, 1, 1), date(2025, 1, 31), Granularity::Daily);
        p.pool_growth_percent_per_month = 0.0;
        p.network_growth_percent_per_month = 0.0;

        let points = project(&p);
        assert_eq!(points.len(), 30);
        for point in &points {
            assert_eq!(point.pool_hashrate, 1e17);
            assert_relative_eq!(point.share_percent, 0.02, max_relative = 1e-12);
            assert_relative_eq!(point.daily_btc, 0.09, max_relative = 1e-12);
            assert_relative_eq!(point.period_revenue, 0.0018, max_relative = 1e-12);
        }
        assert_relative_eq!(total_revenue(&points), 0.054, max_relative = 1e-9);
    }

    #[test]
    fn test_caps() {
        let start = date(2020, 1, 1);
        let end = date(2040, 1, 1);
        assert_eq!(project(&params(start, end, Granularity::Daily)).len(), 365);
        assert_eq!(project(&params(start, end, Granularity::Weekly)).len(), 104);
        assert_eq!(project(&params(start, end, Granularity::Monthly)).len(), 36);
    }

    #[test]
    fn test_labels_and_dates() {
        let points = project(&params(date(2025, 1, 30), date(2025, 2, 20), Granularity::Weekly));
        let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Week 1", "Week 2", "Week 3"]);
        assert_eq!(points[0].display_date, "Jan 30, 2025");
        assert_eq!(points[1].display_date, "Feb 6, 2025");
    }

    #[test]
    fn test_cumulative_is_running_sum() {
        let points = project(&params(date(2025, 1, 1), date(2025, 12, 31), Granularity::Weekly));
        let mut running = 0.0;
        for (index, point) in points.iter().enumerate() {
            running += point.period_revenue;
            assert_eq!(point.period as usize, index + 1);
            assert_eq!(point.cumulative_revenue, running);
            assert_relative_eq!(point.period_btc, point.daily_btc * 7.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_zero_network_hashrate() {
        let mut p = params(date(2025, 1, 1), date(2025, 1, 5), Granularity::Daily);
        p.network_hashrate_hps = 0.0;
        let points = project(&p);
        assert!(points.iter().all(|point| point.share_percent == 0.0 && point.daily_btc == 0.0));
        assert_eq!(total_revenue(&points), 0.0);
    }

    #[test]
    fn test_non_finite_propagates() {
        let mut p = params(date(2025, 1, 1), date(2025, 1, 5), Granularity::Daily);
        p.pool_growth_percent_per_month = f64::NAN;
        let points = project(&p);
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|point| point.cumulative_revenue.is_nan()));
    }
}
