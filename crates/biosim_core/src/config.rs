//! Configuration management for simulation parameters.
//!
//! This module provides strongly-typed configuration structures that map to
//! the `config.toml` file. The configuration is immutable for the lifetime of
//! a run; every component receives it by reference.
//!
//! ## Configuration Hierarchy
//!
//! 1. Default values (the reference constants, hardcoded in `Default` impls)
//! 2. `config.toml` file (overrides defaults, missing keys fall back)
//! 3. Command-line overrides applied by the driver
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 128
//! height = 128
//! seed = 42
//!
//! [genome]
//! genes = 16
//!
//! [evolution]
//! population = 500
//! ticks_per_generation = 300
//! generations = 50
//! mutation_rate = 0.001
//! ```

use serde::{Deserialize, Serialize};

/// Axis-aligned barrier rectangle, inclusive of both corners.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BarrierRect {
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (self.y0..=self.y1).flat_map(move |y| (self.x0..=self.x1).map(move |x| (x, y)))
    }

    #[must_use]
    pub fn area(&self) -> usize {
        let w = (self.x1 - self.x0 + 1).max(0) as usize;
        let h = (self.y1 - self.y0 + 1).max(0) as usize;
        w * h
    }
}

/// World-level simulation configuration.
///
/// Defines the grid dimensions, the run seed and the static barrier layout.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub width: u16,
    pub height: u16,
    /// Run seed. `None` draws one from the OS at startup (and logs it).
    pub seed: Option<u64>,
    pub barriers: Vec<BarrierRect>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            seed: None,
            barriers: Vec::new(),
        }
    }
}

/// Genome encoding parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenomeConfig {
    /// Number of genes per genome.
    pub genes: usize,
    /// Width of each gene in bits.
    pub gene_bits: u8,
    /// Width of the source and sink id fields.
    pub id_bits: u8,
    /// Approximate magnitude of the largest decodable weight.
    pub max_weight: f32,
    /// Size of the internal neuron catalog.
    pub internal_neurons: u8,
}

impl Default for GenomeConfig {
    fn default() -> Self {
        Self {
            genes: 24,
            gene_bits: 24,
            id_bits: 5,
            max_weight: 4.0,
            internal_neurons: 3,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population: usize,
    pub ticks_per_generation: u32,
    pub generations: u32,
    /// Per-bit flip probability applied to every child genome.
    pub mutation_rate: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population: 10_000,
            ticks_per_generation: 10_000,
            generations: 5_000,
            mutation_rate: 0.001,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SensorConfig {
    /// Half-width of the square scanned by the population density sensors.
    pub population_radius: i32,
    /// Reach of the long-range forward probes.
    pub long_probe_distance: i32,
    /// Reach of the short barrier probes.
    pub short_probe_distance: i32,
    /// Oscillator period every organism starts with.
    pub oscillator_start_period: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            population_radius: 2,
            long_probe_distance: 24,
            short_probe_distance: 4,
            oscillator_start_period: 32.0,
        }
    }
}

/// Parameters of the built-in survival predicate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    /// Organisms survive when both coordinates are below this value.
    pub corner_size: i32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { corner_size: 30 }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub genome: GenomeConfig,
    pub evolution: EvolutionConfig,
    pub sensors: SensorConfig,
    pub selection: SelectionConfig,
    /// Log simulation progress every this many ticks (0 disables).
    pub progress_interval: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            genome: GenomeConfig::default(),
            evolution: EvolutionConfig::default(),
            sensors: SensorConfig::default(),
            selection: SelectionConfig::default(),
            progress_interval: 1000,
        }
    }
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    ///
    /// # Validation Rules
    /// - Gene layout must leave a non-negative weight field:
    ///   `2 * id_bits + 2 <= gene_bits`
    /// - Gene width must be whole hex bytes that fit a `u32` (8, 16, 24, 32)
    /// - The grid must have room for twice the population next to the
    ///   barriers, so children fit next to a full set of survivors
    /// - Rates must be in [0.0, 1.0], distances and counts positive
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(self.world.width > 0, "World width must be positive");
        anyhow::ensure!(self.world.height > 0, "World height must be positive");
        for rect in &self.world.barriers {
            anyhow::ensure!(
                rect.x0 <= rect.x1 && rect.y0 <= rect.y1,
                "Barrier {:?} has inverted corners",
                rect
            );
            anyhow::ensure!(
                rect.x0 >= 0
                    && rect.y0 >= 0
                    && rect.x1 < i32::from(self.world.width)
                    && rect.y1 < i32::from(self.world.height),
                "Barrier {:?} lies outside the world",
                rect
            );
        }

        // Genome validation
        let g = &self.genome;
        anyhow::ensure!(g.genes > 0, "Genome must have at least one gene");
        anyhow::ensure!(
            g.gene_bits % 8 == 0 && (8..=32).contains(&g.gene_bits),
            "Gene width must be 8, 16, 24 or 32 bits (got {})",
            g.gene_bits
        );
        anyhow::ensure!(g.id_bits > 0, "Id width must be positive");
        anyhow::ensure!(
            2 * u32::from(g.id_bits) + 2 <= u32::from(g.gene_bits),
            "Gene layout overflow: 2 * id_bits + 2 = {} exceeds gene_bits = {}",
            2 * u32::from(g.id_bits) + 2,
            g.gene_bits
        );
        anyhow::ensure!(
            g.internal_neurons > 0,
            "At least one internal neuron is required"
        );
        anyhow::ensure!(
            g.max_weight.is_finite() && g.max_weight > 0.0,
            "Max weight must be positive"
        );

        // Evolution validation
        let e = &self.evolution;
        anyhow::ensure!(e.population > 0, "Population must be positive");
        anyhow::ensure!(
            e.ticks_per_generation > 0,
            "Ticks per generation must be positive"
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&e.mutation_rate),
            "Mutation rate must be in [0.0, 1.0]"
        );
        let cells = usize::from(self.world.width) * usize::from(self.world.height);
        let blocked: usize = self.world.barriers.iter().map(BarrierRect::area).sum();
        // Survivors stay on the grid while the children are placed, and a
        // generation keeps at most `population` of them on the first pass.
        anyhow::ensure!(
            e.population.saturating_mul(2) <= cells.saturating_sub(blocked),
            "Population {} and its survivors do not fit into {} free cells",
            e.population,
            cells.saturating_sub(blocked)
        );

        // Sensor validation
        let s = &self.sensors;
        anyhow::ensure!(s.population_radius > 0, "Population radius must be positive");
        anyhow::ensure!(
            s.long_probe_distance > 1,
            "Long probe distance must be at least 2"
        );
        anyhow::ensure!(
            s.short_probe_distance > 0,
            "Short probe distance must be positive"
        );
        anyhow::ensure!(
            s.oscillator_start_period.is_finite() && s.oscillator_start_period > 0.0,
            "Oscillator period must be positive"
        );

        anyhow::ensure!(
            self.selection.corner_size >= 0,
            "Corner size must be non-negative"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// SHA-256 digest of every parameter that influences the simulation.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.genome).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(format!("{:?}", self.sensors).as_bytes());
        hasher.update(format!("{:?}", self.selection).as_bytes());
        hex::encode(hasher.finalize())
    }
}
