//! Director planning benchmarks.
//!
//! Run: cargo bench -p gsm-logic -- plan_next

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gsm_logic::context::{MistakeEntry, PlanInput};
use gsm_logic::events::{Event, MeterImpact};
use gsm_logic::meters::{names, MeterSnapshot};
use gsm_logic::pack::load_director_config;
use gsm_logic::Director;

const CORE_PACK: &str = include_str!("../../../data/core_pack.json");

fn busy_input(day: i64) -> PlanInput {
    let mut input = PlanInput::for_day(day);
    input.meter_states = MeterSnapshot::default().to_meter_states();
    input.recent_mistakes = ["NJLAD", "Deposits", "Rent"]
        .iter()
        .map(|t| MistakeEntry::from(*t))
        .collect();
    input.mastery_by_topic.insert("NJLAD".to_string(), 0.3);
    input
}

fn synthetic_events(n: usize) -> Vec<Event> {
    (0..n)
        .map(|i| {
            let mut event = Event::new(format!("event.{i}"), format!("topic-{}", i % 7), (i % 6) as u32)
                .with_impact(
                    MeterImpact::new("synthetic")
                        .with(names::COMPLIANCE, (i % 5) as f64 - 2.0)
                        .with(names::RISK, (i % 3) as f64 - 1.0),
                );
            if i % 3 == 0 {
                event = event.with_question(format!("q.{i}"));
            }
            event
        })
        .collect()
}

/// One plan over the bundled core pack.
fn bench_plan_core_pack(c: &mut Criterion) {
    let config = load_director_config(CORE_PACK, Some(42)).expect("core pack parses");
    let mut director = Director::new(config);
    let input = busy_input(6);

    c.bench_function("plan_next_core_pack", |b| {
        b.iter(|| black_box(director.plan_next(black_box(&input))))
    });
}

/// Planning cost as the event pool grows.
fn bench_plan_pool_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan_next_pool");
    for size in [10usize, 100, 1000] {
        let mut director = Director::new(gsm_logic::DirectorConfig {
            events: synthetic_events(size),
            seed: Some(7),
            ..Default::default()
        });
        let input = busy_input(12);
        group.bench_with_input(BenchmarkId::from_parameter(size), &input, |b, input| {
            b.iter(|| black_box(director.plan_next(input)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_plan_core_pack, bench_plan_pool_sizes);
criterion_main!(benches);
