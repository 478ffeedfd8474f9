//! Performance benchmarks for projection and roll-up

use chrono::NaiveDate;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pool_revenue_calc::calc::{project, summarize, ProjectionParams};
use pool_revenue_calc::export::to_csv_string;
use pool_revenue_calc::Granularity;
use std::hint::black_box;

fn params(granularity: Granularity) -> ProjectionParams {
    ProjectionParams {
        pool_hashrate_hps: 1e17,
        network_hashrate_hps: 6.5e20,
        block_reward: 3.145,
        pool_fee_percent: 2.0,
        pool_growth_percent_per_month: 5.0,
        network_growth_percent_per_month: 3.0,
        start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        granularity,
    }
}

fn bench_project(c: &mut Criterion) {
    let mut group = c.benchmark_group("project");

    for granularity in [Granularity::Daily, Granularity::Weekly, Granularity::Monthly] {
        let params = params(granularity);
        group.throughput(Throughput::Elements(u64::from(granularity.max_periods())));
        group.bench_with_input(
            BenchmarkId::from_parameter(granularity),
            &params,
            |b, params| {
                b.iter(|| black_box(project(black_box(params))));
            },
        );
    }

    group.finish();
}

fn bench_summarize(c: &mut Criterion) {
    let points = project(&params(Granularity::Daily));

    c.bench_function("summarize_daily", |b| {
        b.iter(|| black_box(summarize(black_box(&points))));
    });
}

fn bench_export(c: &mut Criterion) {
    let params = params(Granularity::Daily);
    let points = project(&params);
    let generated_at = chrono::Utc::now();

    c.bench_function("csv_export_daily", |b| {
        b.iter(|| black_box(to_csv_string(&params, black_box(&points), generated_at)));
    });
}

criterion_group!(benches, bench_project, bench_summarize, bench_export);
criterion_main!(benches);
