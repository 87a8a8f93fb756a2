// ABOUTME: Criterion benchmarks for plan date partitioning and skeleton validation
// ABOUTME: Measures week window tiling, day slot expansion and schema checks across plan lengths
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the plan calendar.
//!
//! Plan lengths range from a single week to a full year so the cost of
//! partitioning and validating the skeleton can be compared per plan size.

#![allow(
    clippy::missing_docs_in_private_items,
    clippy::unwrap_used,
    missing_docs
)]

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use stride_planner::models::{
    Distance, DistanceUnit, DurationVolume, Phase, PhaseObjective, Skeleton, Week, WeekFocus,
    WeekWindow,
};
use stride_planner::training_plan::schema::{OutputSchema, SkeletonSchema};
use stride_planner::training_plan::{compute_day_slots, compute_week_windows, window_day_slots};

/// Plan lengths in days
const PLAN_LENGTHS: [i64; 4] = [7, 84, 180, 365];

fn plan_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn week_from_window(window: &WeekWindow) -> Week {
    Week {
        week_number: window.week_number,
        start_date: window.start_date,
        end_date: window.end_date,
        focus: WeekFocus::Endurance,
        description: "Aerobic volume".to_owned(),
        volume_distance: Distance {
            value: 40.0,
            unit: DistanceUnit::Kilometers,
        },
        volume_duration: DurationVolume { minutes: 300.0 },
    }
}

/// Single-phase skeleton covering every window
fn skeleton_for(windows: &[WeekWindow]) -> Skeleton {
    Skeleton {
        phases: vec![Phase {
            name: "Base".to_owned(),
            start_date: windows[0].start_date,
            end_date: windows[windows.len() - 1].end_date,
            objective: PhaseObjective::Base,
            description: "Aerobic base".to_owned(),
            weeks: windows.iter().map(week_from_window).collect(),
        }],
    }
}

fn bench_week_windows(c: &mut Criterion) {
    let mut group = c.benchmark_group("week_windows");
    let start = plan_start();

    for days in PLAN_LENGTHS {
        let race = start + Duration::days(days - 1);
        group.throughput(Throughput::Elements(days.unsigned_abs()));
        group.bench_with_input(BenchmarkId::from_parameter(days), &race, |b, race| {
            b.iter(|| compute_week_windows(black_box(start), black_box(*race)).unwrap());
        });
    }

    group.finish();
}

fn bench_day_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("day_slots");
    let start = plan_start();

    group.bench_function("single_week", |b| {
        let end = start + Duration::days(6);
        b.iter(|| compute_day_slots(black_box(start), black_box(end)));
    });

    for days in PLAN_LENGTHS {
        let windows = compute_week_windows(start, start + Duration::days(days - 1)).unwrap();
        group.bench_with_input(
            BenchmarkId::new("all_windows", days),
            &windows,
            |b, windows| {
                b.iter(|| {
                    windows
                        .iter()
                        .map(|window| window_day_slots(black_box(window)).len())
                        .sum::<usize>()
                });
            },
        );
    }

    group.finish();
}

fn bench_skeleton_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("skeleton_validation");
    let start = plan_start();

    for days in PLAN_LENGTHS {
        let windows = compute_week_windows(start, start + Duration::days(days - 1)).unwrap();
        let candidate = serde_json::to_value(skeleton_for(&windows)).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(days),
            &candidate,
            |b, candidate| {
                b.iter(|| SkeletonSchema::validate(black_box(candidate.clone())).unwrap());
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_week_windows,
    bench_day_slots,
    bench_skeleton_validation
);
criterion_main!(benches);
