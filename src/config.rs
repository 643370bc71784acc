use crate::constants::*;
use crate::error::{Error, Result};
use std::time::Duration;

/// Tunables for one simulation run. All fields have working defaults; a
/// config is validated once at startup, before the tick thread launches.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Initial population seeded before the first publish.
    pub particle_count: usize,
    /// Sleep interval of the tick loop; simulation time advances by this
    /// amount per tick.
    pub tick_interval_ms: u32,
    /// Particle lifetime in simulated seconds. 0 disables aging entirely:
    /// nothing expires and colors never decay.
    pub lifespan_secs: f64,
    /// Capacity of the injection ring; pushes beyond it are dropped.
    pub injection_queue_capacity: usize,
    /// Per-tick decrement applied to one color channel while fading.
    pub color_decay_step: u8,
    /// Seed positions are drawn uniformly from [-seed_extent, seed_extent)
    /// on each axis.
    pub seed_extent: f32,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when None.
    pub rng_seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            lifespan_secs: DEFAULT_LIFESPAN_SECS,
            injection_queue_capacity: DEFAULT_INJECTION_CAPACITY,
            color_decay_step: DEFAULT_COLOR_DECAY_STEP,
            seed_extent: DEFAULT_SEED_EXTENT,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Default config with a pinned RNG seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng_seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }

    /// Simulated seconds that pass per tick.
    pub fn tick_secs(&self) -> f64 {
        f64::from(self.tick_interval_ms) / 1000.0
    }

    pub fn aging_enabled(&self) -> bool {
        self.lifespan_secs > 0.0
    }

    /// Checked once by `SimulationHandle::start`. An empty initial
    /// population is fine (particles can arrive by injection alone); what
    /// gets rejected are values the tick loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig("tick_interval_ms must be > 0"));
        }
        if self.injection_queue_capacity == 0 {
            return Err(Error::InvalidConfig(
                "injection_queue_capacity must be > 0",
            ));
        }
        if !self.lifespan_secs.is_finite() || self.lifespan_secs < 0.0 {
            return Err(Error::InvalidConfig(
                "lifespan_secs must be finite and >= 0",
            ));
        }
        if !self.seed_extent.is_finite() || self.seed_extent < 0.0 {
            return Err(Error::InvalidConfig(
                "seed_extent must be finite and >= 0",
            ));
        }
        if self.particle_count > MAX_PARTICLES {
            return Err(Error::InvalidConfig(
                "particle_count must not exceed MAX_PARTICLES",
            ));
        }
        if self.aging_enabled() && self.color_decay_step == 0 {
            return Err(Error::InvalidConfig(
                "color_decay_step must be > 0 when aging is enabled",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_initial_population_is_valid() {
        let config = SimulationConfig {
            particle_count: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_queue_capacity_is_rejected() {
        let config = SimulationConfig {
            injection_queue_capacity: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let config = SimulationConfig {
            tick_interval_ms: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_lifespan_is_rejected() {
        let config = SimulationConfig {
            lifespan_secs: -1.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_lifespan_disables_aging() {
        let config = SimulationConfig {
            lifespan_secs: 0.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
        assert!(!config.aging_enabled());
    }

    #[test]
    fn zero_decay_step_is_rejected_only_while_aging() {
        let config = SimulationConfig {
            color_decay_step: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());

        // Without aging the step is never applied, so 0 is acceptable.
        let config = SimulationConfig {
            color_decay_step: 0,
            lifespan_secs: 0.0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
