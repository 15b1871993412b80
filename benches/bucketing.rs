use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ghact::calendar::{attribute_months, moving_average, TREND_WINDOW};

fn decade_of_days() -> Vec<(NaiveDate, u64)> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    start
        .iter_days()
        .take(3653)
        .enumerate()
        .map(|(i, d)| (d, (i as u64 * 7) % 13))
        .collect()
}

fn bucketing_benchmark(c: &mut Criterion) {
    let days = decade_of_days();

    c.bench_function("attribute_months_decade", |b| {
        b.iter(|| attribute_months(black_box(days.iter().copied())))
    });

    let averages: Vec<f64> = attribute_months(days.iter().copied())
        .iter()
        .map(|m| m.total as f64 / m.week_fraction)
        .collect();
    c.bench_function("moving_average_trend", |b| {
        b.iter(|| moving_average(black_box(&averages), TREND_WINDOW))
    });
}

criterion_group!(benches, bucketing_benchmark);
criterion_main!(benches);
