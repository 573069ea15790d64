use biosim_core::brain::BrainLogic;
use biosim_core::config::GenomeConfig;
use biosim_core::genome::crossover::breed_with_rng;
use biosim_core::genome::{GenomeLayout, GenomeLogic};
use biosim_data::{Brain, Genome};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Benchmark decoding a genome and building its brain.
fn bench_brain_build(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let layout = GenomeLayout::from_config(&GenomeConfig::default());
    let genome = Genome::random_with_rng(&layout, &mut rng);

    c.bench_function("brain_build", |b| {
        b.iter(|| {
            let brain = Brain::from_genome(black_box(&genome), &layout);
            black_box(brain)
        })
    });
}

/// Benchmark one compute + distribute step.
fn bench_brain_step(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let layout = GenomeLayout::from_config(&GenomeConfig::default());
    let genome = Genome::random_with_rng(&layout, &mut rng);
    let mut brain = Brain::from_genome(&genome, &layout).expect("random genome builds");

    c.bench_function("brain_step", |b| {
        b.iter(|| {
            let outputs = brain.step(|_| black_box(0.5));
            black_box(outputs)
        })
    });
}

fn bench_breed(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let layout = GenomeLayout::from_config(&GenomeConfig::default());
    let a = Genome::random_with_rng(&layout, &mut rng);
    let b = Genome::random_with_rng(&layout, &mut rng);

    c.bench_function("genome_breed", |bench| {
        bench.iter(|| {
            let child = breed_with_rng(&a, &b, 0.001, &mut rng);
            black_box(child)
        })
    });
}

criterion_group!(benches, bench_brain_build, bench_brain_step, bench_breed);
criterion_main!(benches);
