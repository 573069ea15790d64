mod common;

use biosim_lib::model::brain::forward;
use biosim_lib::model::evolution::organism_rng;
use biosim_lib::model::sensors::SensorContext;
use biosim_lib::model::{
    ActionRole, Brain, BrainLogic, Genome, GenomeLayout, GenomeLogic, NeuronKind, NeuronRole,
    Organism, SensorRole,
};
use common::SimBuilder;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Plans one tick for every organism visiting them in `order`, returning the
/// organisms (back in arena order) and their chosen steps.
fn plan_in_order(
    organisms: &[Organism],
    ctx: &SensorContext<'_>,
    seed: u64,
    tick: u64,
    order: &[usize],
) -> (Vec<Organism>, Vec<(i32, i32)>) {
    let mut out = organisms.to_vec();
    let mut steps = vec![(0, 0); organisms.len()];
    for &i in order {
        let mut rng = organism_rng(seed, tick, out[i].id);
        steps[i] = out[i].plan(ctx, &mut rng);
    }
    (out, steps)
}

#[test]
fn test_think_order_does_not_matter() {
    let state = SimBuilder::new()
        .with_seed(314)
        .with_barrier(10, 30, 50, 31)
        .with_config(|c| c.evolution.population = 300)
        .with_random_population()
        .build();
    let ctx = SensorContext {
        grid: &state.grid,
        genomes: state.genomes(),
        config: &state.config.sensors,
        tick: 17,
        generation_tick: 17,
        ticks_per_generation: state.config.evolution.ticks_per_generation,
    };

    let forward_order: Vec<usize> = (0..state.organisms.len()).collect();
    let reverse_order: Vec<usize> = forward_order.iter().rev().copied().collect();
    let mut shuffled = forward_order.clone();
    shuffled.sort_by_key(|&i| (i * 7919) % 301);

    let (a, steps_a) = plan_in_order(&state.organisms, &ctx, state.seed(), 17, &forward_order);
    let (b, steps_b) = plan_in_order(&state.organisms, &ctx, state.seed(), 17, &reverse_order);
    let (c, steps_c) = plan_in_order(&state.organisms, &ctx, state.seed(), 17, &shuffled);

    assert_eq!(steps_a, steps_b);
    assert_eq!(steps_a, steps_c);
    for i in 0..a.len() {
        assert_eq!(a[i].brain, b[i].brain, "Brain buffers differ at index {}", i);
        assert_eq!(a[i].brain, c[i].brain, "Brain buffers differ at index {}", i);
        assert_eq!(a[i].direction, b[i].direction);
        assert_eq!(a[i].oscillator_period, c[i].oscillator_period);
    }
}

fn random_brain(seed: u64) -> Brain {
    let layout = GenomeLayout::from_config(&Default::default());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let genome = Genome::random_with_rng(&layout, &mut rng);
    Brain::from_genome(&genome, &layout).expect("random genome builds")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn internal_outputs_stay_in_tanh_range(seed in any::<u64>(), inputs in prop::collection::vec(0.0f32..=1.0, 1..8)) {
        let mut brain = random_brain(seed);
        for &value in &inputs {
            forward::step(&mut brain, |_| value);
            for neuron in &brain.neurons {
                match neuron.role.kind() {
                    NeuronKind::Internal => prop_assert!((-1.0..=1.0).contains(&neuron.output)),
                    NeuronKind::Sensory => prop_assert_eq!(neuron.output, value),
                    NeuronKind::Action => prop_assert!(neuron.output.is_finite()),
                }
            }
        }
    }

    #[test]
    fn action_outputs_cover_exactly_the_action_neurons(seed in any::<u64>()) {
        let mut brain = random_brain(seed);
        let outputs = forward::step(&mut brain, |_| 0.5);
        for role in ActionRole::ALL {
            let present = brain.find(NeuronRole::Action(role)).is_some();
            prop_assert_eq!(outputs.get(role).is_some(), present);
        }
    }

    #[test]
    fn compute_without_distribute_is_idempotent(seed in any::<u64>()) {
        let mut brain = random_brain(seed);
        forward::step(&mut brain, |r| r.index() as f32 / SensorRole::COUNT as f32);
        let mut again = brain.clone();
        brain.compute_outputs(|_| 0.25);
        again.compute_outputs(|_| 0.25);
        again.compute_outputs(|_| 0.25);
        prop_assert_eq!(brain, again);
    }
}
