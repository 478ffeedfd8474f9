//! Property tests for the projection engine and quarterly roll-up

use chrono::{Days, NaiveDate};
use pool_revenue_calc::calc::formula::{
    daily_btc_by_difficulty, daily_btc_by_hashrate_ratio, implied_network_hashrate,
};
use pool_revenue_calc::calc::{project, summarize, ProjectionParams};
use pool_revenue_calc::Granularity;
use proptest::prelude::*;

fn granularity() -> impl Strategy<Value = Granularity> {
    prop_oneof![
        Just(Granularity::Daily),
        Just(Granularity::Weekly),
        Just(Granularity::Monthly),
    ]
}

fn params() -> impl Strategy<Value = ProjectionParams> {
    (
        1e12f64..1e19,
        1e18f64..1e22,
        0.0f64..50.0,
        0.0f64..10.0,
        -5.0f64..20.0,
        -5.0f64..20.0,
        0u64..3650,
        0u64..2000,
        granularity(),
    )
        .prop_map(
            |(pool, network, reward, fee, pool_growth, network_growth, offset, span, granularity)| {
                let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
                let start = base + Days::new(offset);
                ProjectionParams {
                    pool_hashrate_hps: pool,
                    network_hashrate_hps: network,
                    block_reward: reward,
                    pool_fee_percent: fee,
                    pool_growth_percent_per_month: pool_growth,
                    network_growth_percent_per_month: network_growth,
                    start_date: start,
                    end_date: start + Days::new(span),
                    granularity,
                }
            },
        )
}

proptest! {
    #[test]
    fn periods_are_sequential_and_bounded(params in params()) {
        let points = project(&params);
        prop_assert!(points.len() as u32 <= params.granularity.max_periods());

        for (index, point) in points.iter().enumerate() {
            prop_assert_eq!(point.period as usize, index + 1);
            prop_assert!(point.date >= params.start_date);
            prop_assert!(point.date <= params.end_date);
        }
    }

    #[test]
    fn cumulative_is_monotone_and_sums(params in params()) {
        let points = project(&params);

        let mut previous = 0.0;
        let mut running = 0.0;
        for point in &points {
            prop_assert!(point.period_revenue >= 0.0);
            prop_assert!(point.cumulative_revenue >= previous);
            previous = point.cumulative_revenue;
            running += point.period_revenue;
        }

        if let Some(last) = points.last() {
            prop_assert!((last.cumulative_revenue - running).abs() <= 1e-12 * running.max(1.0));
        }
    }

    #[test]
    fn quarters_conserve_revenue(params in params()) {
        let points = project(&params);
        let quarters = summarize(&points);

        let total: f64 = points.iter().map(|p| p.period_revenue).sum();
        let quarter_total: f64 = quarters.iter().map(|q| q.revenue).sum();
        prop_assert!((total - quarter_total).abs() <= 1e-9 * total.max(1.0));

        let count: usize = quarters.iter().map(|q| q.period_count).sum();
        prop_assert_eq!(count, points.len());
    }

    #[test]
    fn formulas_agree_on_consistent_inputs(
        hashrate in 1e12f64..1e20,
        difficulty in 1e6f64..1e16,
        reward in 0.1f64..50.0,
    ) {
        let network = implied_network_hashrate(difficulty);
        let by_difficulty = daily_btc_by_difficulty(hashrate, difficulty, reward);
        let by_ratio = daily_btc_by_hashrate_ratio(hashrate, network, reward);
        prop_assert!((by_difficulty - by_ratio).abs() <= 1e-9 * by_ratio.abs());
    }
}
