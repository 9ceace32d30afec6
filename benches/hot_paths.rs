use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dicepot::config::MotionConfig;
use dicepot::game::dice::DiceRoller;
use dicepot::game::economy::settle;
use dicepot::game::motion::{MotionDetector, MotionSample};
use dicepot::game::types::{DicePolicy, PlayerId};

fn bench_settle(c: &mut Criterion) {
    let others: Vec<PlayerId> = (2u32..=8).map(PlayerId).collect();
    c.bench_function("settle_take", |b| {
        b.iter(|| settle(black_box(10), 10, black_box(2000), &others))
    });
    c.bench_function("settle_bounce_back", |b| {
        b.iter(|| settle(black_box(30), 10, black_box(150), &others))
    });
    c.bench_function("settle_exact_win", |b| {
        b.iter(|| settle(black_box(10), 10, black_box(100), &others))
    });
}

fn bench_roll(c: &mut Criterion) {
    let mut standard = DiceRoller::seeded(DicePolicy::Standard, 1);
    c.bench_function("roll_six_standard", |b| b.iter(|| standard.roll_six()));
    let mut sparse = DiceRoller::seeded(DicePolicy::Sparse, 1);
    c.bench_function("roll_six_sparse", |b| b.iter(|| sparse.roll_six()));
}

fn bench_motion(c: &mut Criterion) {
    c.bench_function("motion_stream_1k_samples", |b| {
        b.iter(|| {
            let mut detector = MotionDetector::new(MotionConfig::default());
            for i in 0..1000u64 {
                // Mostly idle with a throw spike every 50th sample.
                let x = if i % 50 == 0 { 50.0 } else { 0.0 };
                black_box(detector.on_sample(MotionSample {
                    x,
                    y: 0.0,
                    z: 0.0,
                    timestamp_ms: i * 120,
                }));
            }
        })
    });
}

criterion_group!(benches, bench_settle, bench_roll, bench_motion);
criterion_main!(benches);
