//! Generation loop.
//!
//! A run cycles through
//!
//! ```text
//! Populate -> Simulate (N ticks) -> FilterSurvivors -> Breed -> Populate ...
//! ```
//!
//! and ends in `Finished` after the last generation has been filtered.
//! Organisms leave the world only in FilterSurvivors: survivors stay on the
//! grid and live on next to the children placed by the following Populate.
//!
//! Each tick has two stages. In the think stage every organism senses the
//! grid as it stood at the end of the previous tick, runs its brain and
//! decides on a step; this stage only reads shared state and runs in parallel
//! with rayon. In the move stage the steps are applied one by one in arena
//! order, so conflicts over a target cell go to the lower index.
//!
//! Randomness inside the think stage comes from a stream derived from
//! `(seed, tick, organism index)`, everything else from the run RNG, so a
//! seed reproduces the whole run regardless of thread count.

use crate::config::AppConfig;
use crate::error::{Result, SimError};
use crate::genome::crossover::breed_with_rng;
use crate::genome::{GenomeLayout, GenomeLogic};
use crate::grid::WorldGrid;
use crate::metrics::{GenerationReport, Metrics};
use crate::organism::Organism;
use crate::selection::SurvivalPredicate;
use crate::sensors::SensorContext;
use biosim_data::{Genome, OrganismId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "std")]
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GenerationPhase {
    Populate,
    Simulate,
    FilterSurvivors,
    Breed,
    Finished,
}

/// Hooks for renderers and loggers. Both are called with the state after
/// the event.
pub trait SimulationObserver {
    fn on_tick(&mut self, _state: &SimulationState) {}
    fn on_generation(&mut self, _report: &GenerationReport, _state: &SimulationState) {}
}

impl SimulationObserver for () {}

/// Per-organism RNG for one tick.
#[must_use]
pub fn organism_rng(seed: u64, tick: u64, id: OrganismId) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    rng.set_stream(id.0 as u64);
    rng
}

/// Mean normalized Hamming distance between successive genomes.
#[must_use]
pub fn diversity(organisms: &[Organism]) -> f32 {
    if organisms.len() < 2 {
        return 0.0;
    }
    let total: f32 = organisms
        .windows(2)
        .map(|pair| {
            let bits = pair[0].genome.total_bits().max(1);
            pair[0].genome.hamming_distance(&pair[1].genome) as f32 / bits as f32
        })
        .sum();
    total / (organisms.len() - 1) as f32
}

/// Everything a run needs: grid, organisms, counters and the run RNG.
pub struct SimulationState {
    pub config: AppConfig,
    pub layout: GenomeLayout,
    pub grid: WorldGrid,
    /// Organism arena. `OrganismId(i)` is the organism at index `i`.
    pub organisms: Vec<Organism>,
    /// Global tick counter, never reset.
    pub tick: u64,
    pub generation: u32,
    /// Ticks elapsed in the current generation.
    pub generation_tick: u32,
    pub phase: GenerationPhase,
    pub metrics: Metrics,
    /// Genomes by `OrganismId`, read by the genetic similarity sensor.
    genomes: Vec<Arc<Genome>>,
    /// Children waiting for the next Populate.
    pending: Vec<Organism>,
    seed: u64,
    rng: ChaCha8Rng,
    generation_started: Instant,
    last_report: Option<GenerationReport>,
}

impl SimulationState {
    /// Validates `config` and prepares an empty world with its barriers.
    /// Without a configured seed one is drawn at random and logged.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let seed = match config.world.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random();
                tracing::info!(seed, "No seed configured, using a random one");
                seed
            }
        };
        let layout = GenomeLayout::from_config(&config.genome);
        let grid = WorldGrid::with_barriers(
            config.world.width,
            config.world.height,
            &config.world.barriers,
        );
        let phase = if config.evolution.generations == 0 {
            GenerationPhase::Finished
        } else {
            GenerationPhase::Populate
        };
        let metrics = Metrics::new(config.progress_interval);
        Ok(Self {
            layout,
            grid,
            organisms: Vec::new(),
            tick: 0,
            generation: 0,
            generation_tick: 0,
            phase,
            metrics,
            genomes: Vec::new(),
            pending: Vec::new(),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            generation_started: Instant::now(),
            last_report: None,
            config,
        })
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn genomes(&self) -> &[Arc<Genome>] {
        &self.genomes
    }

    #[must_use]
    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.last_report.as_ref()
    }

    /// Queues organisms for the next Populate instead of random ones.
    pub fn set_pending(&mut self, organisms: Vec<Organism>) {
        self.pending = organisms;
    }

    /// Organisms with random genomes, one per population slot.
    pub fn random_population(&mut self) -> Result<Vec<Organism>> {
        let period = self.config.sensors.oscillator_start_period;
        (0..self.config.evolution.population)
            .map(|i| {
                let genome = Genome::random_with_rng(&self.layout, &mut self.rng);
                Organism::new(OrganismId(i), Arc::new(genome), &self.layout, period, &mut self.rng)
            })
            .collect()
    }

    /// Places `organisms` on random empty cells next to whoever is already
    /// on the grid (the survivors of the previous generation). An empty list
    /// places a fresh random population.
    pub fn populate(&mut self, organisms: Vec<Organism>) -> Result<()> {
        let organisms = if organisms.is_empty() {
            self.random_population()?
        } else {
            organisms
        };

        let carried = self.organisms.len();
        self.organisms.reserve(organisms.len());
        self.genomes.reserve(organisms.len());
        for (i, mut organism) in organisms.into_iter().enumerate() {
            let position = self.grid.random_empty_cell(&mut self.rng)?;
            organism.id = OrganismId(carried + i);
            organism.position = position;
            self.grid.place(organism.id, position)?;
            self.genomes.push(Arc::clone(&organism.genome));
            self.organisms.push(organism);
        }
        self.generation_tick = 0;
        tracing::debug!(
            generation = self.generation,
            carried,
            organisms = self.organisms.len(),
            "Populated world"
        );
        Ok(())
    }

    /// Adds one organism at `position` on top of the current population and
    /// enters the Simulate phase.
    pub fn insert_organism(
        &mut self,
        mut organism: Organism,
        position: biosim_data::Position,
    ) -> Result<OrganismId> {
        let id = OrganismId(self.organisms.len());
        self.grid.place(id, position)?;
        organism.id = id;
        organism.position = position;
        self.genomes.push(Arc::clone(&organism.genome));
        self.organisms.push(organism);
        if self.phase == GenerationPhase::Populate {
            self.phase = GenerationPhase::Simulate;
        }
        Ok(id)
    }

    /// Runs one tick for every organism. Returns the number of accepted moves.
    pub fn step_tick(&mut self) -> Result<usize> {
        let started = Instant::now();
        let steps: Vec<(i32, i32)> = {
            let ctx = SensorContext {
                grid: &self.grid,
                genomes: &self.genomes,
                config: &self.config.sensors,
                tick: self.tick,
                generation_tick: self.generation_tick,
                ticks_per_generation: self.config.evolution.ticks_per_generation,
            };
            let (seed, tick) = (self.seed, self.tick);

            #[cfg(feature = "std")]
            let iter = self.organisms.par_iter_mut();
            #[cfg(not(feature = "std"))]
            let iter = self.organisms.iter_mut();

            iter.map(|organism| {
                let mut rng = organism_rng(seed, tick, organism.id);
                organism.plan(&ctx, &mut rng)
            })
            .collect()
        };

        let mut accepted = 0;
        for (organism, step) in self.organisms.iter_mut().zip(steps) {
            match organism.apply_move(&mut self.grid, step) {
                Ok(true) => accepted += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(error = %e, tick = self.tick, "Move failed");
                    return Err(e);
                }
            }
        }

        self.tick += 1;
        self.generation_tick += 1;
        self.metrics
            .record_tick(started.elapsed(), self.organisms.len(), accepted);
        Ok(accepted)
    }

    /// Runs the remaining ticks of the current generation.
    pub fn simulate_generation<O>(&mut self, observer: &mut O) -> Result<()>
    where
        O: SimulationObserver + ?Sized,
    {
        while self.generation_tick < self.config.evolution.ticks_per_generation {
            self.step_tick()?;
            observer.on_tick(self);
        }
        if self.phase == GenerationPhase::Simulate {
            self.phase = GenerationPhase::FilterSurvivors;
        }
        Ok(())
    }

    /// Removes every organism whose cell fails `predicate` and compacts the
    /// arena so ids stay equal to indices.
    pub fn filter_survivors<P>(&mut self, predicate: &P) -> Result<GenerationReport>
    where
        P: SurvivalPredicate + ?Sized,
    {
        let population = self.organisms.len();
        for organism in &self.organisms {
            if self.grid.organism_at(organism.position) != Some(organism.id) {
                let err = SimError::GridDesync {
                    id: organism.id,
                    position: organism.position,
                };
                tracing::error!(error = %err, "Grid out of sync before selection");
                return Err(err);
            }
        }

        let (survivors, culled): (Vec<_>, Vec<_>) = std::mem::take(&mut self.organisms)
            .into_iter()
            .partition(|o| predicate.survives(o.position.x, o.position.y));
        for organism in &culled {
            self.grid.clear(organism.position);
        }
        self.organisms = survivors;
        self.compact();

        let survivors = self.organisms.len();
        let report = GenerationReport {
            generation: self.generation,
            tick: self.tick,
            population,
            survivors,
            survival_rate: if population == 0 {
                0.0
            } else {
                survivors as f32 / population as f32
            },
            diversity: diversity(&self.organisms),
            reseeded: survivors < 2,
        };
        tracing::debug!(
            generation = self.generation,
            survivors,
            culled = culled.len(),
            "Filtered survivors"
        );
        Ok(report)
    }

    fn compact(&mut self) {
        for (i, organism) in self.organisms.iter_mut().enumerate() {
            let id = OrganismId(i);
            if organism.id != id {
                self.grid.relabel(organism.position, id);
                organism.id = id;
            }
        }
        self.genomes = self
            .organisms
            .iter()
            .map(|o| Arc::clone(&o.genome))
            .collect();
    }

    /// Produces the next generation's organisms from the current survivors.
    /// The survivors stay on the grid; the children join them at the next
    /// Populate.
    ///
    /// With fewer than two survivors there is nobody to pair, so a fresh
    /// random population is returned instead.
    pub fn breed(&mut self) -> Result<Vec<Organism>> {
        let survivors = &self.organisms;
        if survivors.len() < 2 {
            tracing::warn!(
                generation = self.generation,
                survivors = survivors.len(),
                "Too few survivors to breed, reseeding with random genomes"
            );
            return self.random_population();
        }

        let rate = self.config.evolution.mutation_rate;
        let period = self.config.sensors.oscillator_start_period;
        let mut children = Vec::with_capacity(self.config.evolution.population);
        for i in 0..self.config.evolution.population {
            let parents = rand::seq::index::sample(&mut self.rng, survivors.len(), 2);
            let (a, b) = (&survivors[parents.index(0)], &survivors[parents.index(1)]);
            let genome = breed_with_rng(&a.genome, &b.genome, rate, &mut self.rng);
            children.push(Organism::new(
                OrganismId(i),
                Arc::new(genome),
                &self.layout,
                period,
                &mut self.rng,
            )?);
        }
        tracing::debug!(
            generation = self.generation,
            survivors = survivors.len(),
            children = children.len(),
            "Bred next generation"
        );
        Ok(children)
    }

    /// Performs one step of the state machine: a whole phase, or a single
    /// tick while simulating. Returns the phase now current.
    pub fn advance<P, O>(&mut self, predicate: &P, observer: &mut O) -> Result<GenerationPhase>
    where
        P: SurvivalPredicate + ?Sized,
        O: SimulationObserver + ?Sized,
    {
        match self.phase {
            GenerationPhase::Populate => {
                let pending = std::mem::take(&mut self.pending);
                self.populate(pending)?;
                self.generation_started = Instant::now();
                self.phase = GenerationPhase::Simulate;
            }
            GenerationPhase::Simulate => {
                if self.generation_tick < self.config.evolution.ticks_per_generation {
                    self.step_tick()?;
                    observer.on_tick(self);
                }
                if self.generation_tick >= self.config.evolution.ticks_per_generation {
                    self.phase = GenerationPhase::FilterSurvivors;
                }
            }
            GenerationPhase::FilterSurvivors => {
                let report = self.filter_survivors(predicate)?;
                self.metrics
                    .record_generation(&report, self.generation_started.elapsed());
                observer.on_generation(&report, self);
                self.last_report = Some(report);
                self.phase = if self.generation + 1 >= self.config.evolution.generations {
                    GenerationPhase::Finished
                } else {
                    GenerationPhase::Breed
                };
            }
            GenerationPhase::Breed => {
                self.pending = self.breed()?;
                self.generation += 1;
                self.phase = GenerationPhase::Populate;
            }
            GenerationPhase::Finished => {}
        }
        Ok(self.phase)
    }

    /// Runs until `Finished`, returning one report per generation.
    pub fn run<P, O>(&mut self, predicate: &P, observer: &mut O) -> Result<Vec<GenerationReport>>
    where
        P: SurvivalPredicate + ?Sized,
        O: SimulationObserver + ?Sized,
    {
        let mut reports = Vec::new();
        while self.phase != GenerationPhase::Finished {
            let before = self.phase;
            self.advance(predicate, observer)?;
            if before == GenerationPhase::FilterSurvivors {
                if let Some(report) = &self.last_report {
                    reports.push(report.clone());
                }
            }
        }
        tracing::info!(
            generations = reports.len(),
            ticks = self.tick,
            elapsed_ms = self.metrics.elapsed().as_millis() as u64,
            "Run finished"
        );
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::CornerSurvival;
    use biosim_data::Position;
    use rand::Rng;

    fn small_config(seed: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.world.width = 32;
        config.world.height = 32;
        config.world.seed = Some(seed);
        config.evolution.population = 60;
        config.evolution.ticks_per_generation = 20;
        config.evolution.generations = 3;
        config.selection.corner_size = 16;
        config.progress_interval = 0;
        config
    }

    fn assert_in_sync(state: &SimulationState) {
        assert_eq!(state.grid.population(), state.organisms.len());
        for (i, o) in state.organisms.iter().enumerate() {
            assert_eq!(o.id, OrganismId(i));
            assert_eq!(state.grid.organism_at(o.position), Some(o.id));
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = small_config(1);
        config.genome.id_bits = 12;
        assert!(SimulationState::new(config).is_err());
    }

    #[test]
    fn test_populate_and_ticks_keep_grid_in_sync() {
        let mut state = SimulationState::new(small_config(42)).expect("valid config");
        state.populate(Vec::new()).expect("room for everyone");
        assert_eq!(state.organisms.len(), 60);
        assert_in_sync(&state);

        for _ in 0..10 {
            state.step_tick().expect("tick succeeds");
            assert_in_sync(&state);
        }
        assert_eq!(state.tick, 10);
        assert_eq!(state.generation_tick, 10);
        assert_eq!(state.metrics.tick_count(), 10);
    }

    #[test]
    fn test_filter_keeps_only_predicate_cells() {
        let mut state = SimulationState::new(small_config(7)).expect("valid config");
        state.populate(Vec::new()).expect("room for everyone");
        let corner = CornerSurvival::new(16);
        let expected = state
            .organisms
            .iter()
            .filter(|o| o.position.x < 16 && o.position.y < 16)
            .count();

        let report = state.filter_survivors(&corner).expect("in sync");
        assert_eq!(report.survivors, expected);
        assert_eq!(report.population, 60);
        assert_in_sync(&state);
        assert!(state
            .organisms
            .iter()
            .all(|o| o.position.x < 16 && o.position.y < 16));
    }

    #[test]
    fn test_breed_reseeds_next_to_lone_survivor() {
        let mut state = SimulationState::new(small_config(3)).expect("valid config");
        state.populate(Vec::new()).expect("room for everyone");
        let lone = state.organisms[17].position;
        let report = state
            .filter_survivors(&move |x: i32, y: i32| (x, y) == (lone.x, lone.y))
            .expect("in sync");
        assert_eq!(report.survivors, 1);
        assert!(report.reseeded);

        let children = state.breed().expect("reseed succeeds");
        assert_eq!(children.len(), 60);
        assert_eq!(state.grid.population(), 1);

        state.populate(children).expect("room for everyone");
        assert_eq!(state.organisms.len(), 61);
        assert_eq!(state.organisms[0].position, lone);
        assert_in_sync(&state);
    }

    #[test]
    fn test_survivors_outlive_breeding() {
        let mut state = SimulationState::new(small_config(21)).expect("valid config");
        let everyone = |_x: i32, _y: i32| true;
        while state.phase != GenerationPhase::Breed {
            state.advance(&everyone, &mut ()).expect("advance succeeds");
        }
        let survivors: Vec<(Position, Arc<Genome>)> = state
            .organisms
            .iter()
            .map(|o| (o.position, Arc::clone(&o.genome)))
            .collect();
        assert_eq!(survivors.len(), 60);

        assert_eq!(
            state.advance(&everyone, &mut ()).expect("breeds"),
            GenerationPhase::Populate
        );
        assert_eq!(state.grid.population(), 60);
        assert_eq!(
            state.advance(&everyone, &mut ()).expect("populates"),
            GenerationPhase::Simulate
        );

        assert_eq!(state.organisms.len(), 120);
        assert_in_sync(&state);
        for (i, (position, genome)) in survivors.iter().enumerate() {
            let o = &state.organisms[i];
            assert_eq!(o.position, *position, "Survivor {} moved during Breed", i);
            assert!(Arc::ptr_eq(&o.genome, genome));
        }
    }

    #[test]
    fn test_breed_children_descend_from_survivors() {
        let mut config = small_config(11);
        config.evolution.mutation_rate = 0.0;
        let mut state = SimulationState::new(config).expect("valid config");
        state.populate(Vec::new()).expect("room for everyone");
        state
            .filter_survivors(&|x: i32, _y: i32| x < 16)
            .expect("in sync");
        let parents: Vec<Arc<Genome>> = state.genomes().to_vec();
        assert!(parents.len() >= 2);

        let children = state.breed().expect("breeds");
        assert_eq!(children.len(), 60);
        assert_eq!(state.organisms.len(), parents.len());
        assert_in_sync(&state);
        for child in &children {
            // Without mutation only the gene holding the cut point can differ
            // from every survivor.
            let novel = (0..child.genome.len())
                .filter(|&j| parents.iter().all(|p| p.tokens[j] != child.genome.tokens[j]))
                .count();
            assert!(novel <= 1);
        }
    }

    #[test]
    fn test_run_finishes_with_one_report_per_generation() {
        let mut state = SimulationState::new(small_config(99)).expect("valid config");
        let reports = state
            .run(&CornerSurvival::new(16), &mut ())
            .expect("run succeeds");
        assert_eq!(reports.len(), 3);
        assert_eq!(state.phase, GenerationPhase::Finished);
        assert_eq!(state.tick, 60);
        assert_eq!(state.generation, 2);
        assert_eq!(
            reports.iter().map(|r| r.generation).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_barriers_survive_generations() {
        let mut config = small_config(5);
        config.world.barriers = vec![crate::config::BarrierRect {
            x0: 10,
            y0: 10,
            x1: 12,
            y1: 12,
        }];
        let mut state = SimulationState::new(config).expect("valid config");
        state.run(&CornerSurvival::new(16), &mut ()).expect("run succeeds");
        assert!(state.grid.is_barrier(Position::new(11, 11)));
        assert_eq!(state.grid.barrier_cells().count(), 9);
    }

    #[test]
    fn test_observer_sees_every_tick() {
        struct Counter {
            ticks: usize,
            generations: usize,
        }
        impl SimulationObserver for Counter {
            fn on_tick(&mut self, _state: &SimulationState) {
                self.ticks += 1;
            }
            fn on_generation(&mut self, _report: &GenerationReport, _state: &SimulationState) {
                self.generations += 1;
            }
        }
        let mut counter = Counter {
            ticks: 0,
            generations: 0,
        };
        let mut state = SimulationState::new(small_config(8)).expect("valid config");
        state
            .run(&CornerSurvival::new(16), &mut counter)
            .expect("run succeeds");
        assert_eq!(counter.ticks, 60);
        assert_eq!(counter.generations, 3);
    }

    #[test]
    fn test_organism_streams_differ() {
        let mut a = organism_rng(1, 0, OrganismId(0));
        let mut b = organism_rng(1, 0, OrganismId(1));
        let mut c = organism_rng(1, 1, OrganismId(0));
        let x: u64 = a.gen();
        assert_ne!(x, b.gen::<u64>());
        assert_ne!(x, c.gen::<u64>());
        assert_eq!(x, organism_rng(1, 0, OrganismId(0)).gen::<u64>());
    }
}
