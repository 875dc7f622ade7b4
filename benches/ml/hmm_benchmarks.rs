use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logspace_hmm::HiddenMarkovModel;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

fn random_observations(len: usize, symbols: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen_range(0..symbols)).collect()
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("forward");
    for &states in &[4, 16, 64] {
        let hmm = HiddenMarkovModel::builder(states, 32)
            .with_seed(1)
            .build()
            .unwrap();
        let observations = random_observations(1_000, 32, 2);
        group.bench_with_input(BenchmarkId::from_parameter(states), &states, |b, _| {
            b.iter(|| hmm.forward(black_box(observations.as_slice())).unwrap())
        });
    }
    group.finish();
}

fn bench_reestimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("reestimate");
    for &states in &[4, 16] {
        let template = HiddenMarkovModel::builder(states, 32)
            .with_seed(3)
            .build()
            .unwrap();
        let observations = random_observations(500, 32, 4);
        group.bench_with_input(BenchmarkId::from_parameter(states), &states, |b, _| {
            b.iter(|| {
                let mut hmm = template.clone();
                hmm.reestimate(black_box(observations.as_slice())).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_streaming_decode(c: &mut Criterion) {
    let hmm = HiddenMarkovModel::builder(16, 32)
        .with_seed(5)
        .build()
        .unwrap();
    let observations = random_observations(500, 32, 6);
    c.bench_function("streaming_decode_token_by_token", |b| {
        b.iter(|| {
            let mut decoder = hmm.decoder();
            for &symbol in &observations {
                decoder.extend(black_box(&[symbol])).unwrap();
            }
            decoder.snapshot()
        })
    });
}

criterion_group!(benches, bench_forward, bench_reestimate, bench_streaming_decode);
criterion_main!(benches);
