pub mod macros;

use biosim_lib::model::{
    AppConfig, BarrierRect, Direction, Genome, GenomeLayout, NeuronRole, Organism, OrganismId,
    Position, SimulationState,
};
use std::sync::Arc;

/// Genome whose genes wire each `(source, sink, weight)` triple.
#[allow(dead_code)]
pub fn wired_genome(layout: &GenomeLayout, genes: &[(NeuronRole, NeuronRole, f32)]) -> Genome {
    let tokens = genes
        .iter()
        .map(|&(source, sink, weight)| {
            let record = layout
                .wire(source, sink, weight)
                .expect("gene must be expressible");
            biosim_lib::model::genome::encode_gene(layout, &record)
        })
        .collect();
    Genome::new(tokens, layout.gene_bits)
}

struct Placement {
    genes: Vec<(NeuronRole, NeuronRole, f32)>,
    position: Position,
    direction: Direction,
}

#[allow(dead_code)]
pub struct SimBuilder {
    config: AppConfig,
    placements: Vec<Placement>,
    random_population: bool,
}

#[allow(dead_code)]
impl SimBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.width = 64;
        config.world.height = 64;
        config.world.seed = Some(42);
        config.evolution.population = 100;
        config.evolution.ticks_per_generation = 50;
        config.evolution.generations = 2;
        config.progress_interval = 0;
        Self {
            config,
            placements: Vec::new(),
            random_population: false,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_size(mut self, width: u16, height: u16) -> Self {
        self.config.world.width = width;
        self.config.world.height = height;
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_barrier(mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        self.config
            .world
            .barriers
            .push(BarrierRect { x0, y0, x1, y1 });
        self
    }

    /// Places an organism wired by `genes` at `(x, y)` heading `direction`.
    pub fn with_organism(
        mut self,
        genes: &[(NeuronRole, NeuronRole, f32)],
        x: i32,
        y: i32,
        direction: Direction,
    ) -> Self {
        self.placements.push(Placement {
            genes: genes.to_vec(),
            position: Position::new(x, y),
            direction,
        });
        self
    }

    /// Fills the world with the configured random population on build.
    pub fn with_random_population(mut self) -> Self {
        self.random_population = true;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> SimulationState {
        let mut state = SimulationState::new(self.config).expect("test config must be valid");
        if self.random_population {
            state.populate(Vec::new()).expect("room for the population");
        }
        for placement in self.placements {
            let genome = wired_genome(&state.layout, &placement.genes);
            let organism = Organism::with_direction(
                OrganismId(0),
                Arc::new(genome),
                &state.layout,
                state.config.sensors.oscillator_start_period,
                placement.direction,
            )
            .expect("brain builds");
            state
                .insert_organism(organism, placement.position)
                .expect("placement cell must be empty");
        }
        state
    }
}
