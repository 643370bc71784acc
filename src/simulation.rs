use crate::config::SimulationConfig;
use crate::constants::*;
use crate::injection::InjectionConsumer;
use crate::particle::{self, Particle};
use crate::snapshot::SnapshotWriter;
use glam::Vec3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

pub type SimRng = StdRng;

/// One explicit Euler step of the Lorenz system:
/// `dx = s(y-x)`, `dy = x(r-z) - y`, `dz = xy - bz`.
pub fn lorenz_step(p: Vec3) -> Vec3 {
    let dx = LORENZ_S * (p.y - p.x);
    let dy = p.x * (LORENZ_R - p.z) - p.y;
    let dz = p.x * p.y - LORENZ_B * p.z;
    p + Vec3::new(dx, dy, dz) * INTEGRATION_DT
}

/// Owns the canonical live particle set and advances it one tick at a time.
///
/// The engine is deliberately clock-free: `step` takes the current
/// simulation time as a parameter, so every property of a tick can be
/// tested synchronously. The tick loop that feeds it wall-clock cadence
/// lives in `runtime`.
pub struct SimulationEngine {
    config: SimulationConfig,
    rng: SimRng,
    injections: InjectionConsumer,
    snapshots: SnapshotWriter,
    live: Vec<Particle>,
    // Reused every tick; advance() writes survivors here, then swaps.
    scratch: Vec<Particle>,
    tick: u64,
}

impl SimulationEngine {
    pub fn new(
        config: SimulationConfig,
        injections: InjectionConsumer,
        snapshots: SnapshotWriter,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => SimRng::seed_from_u64(seed),
            None => SimRng::from_entropy(),
        };
        let initial_capacity = config.particle_count.max(256);
        Self {
            config,
            rng,
            injections,
            snapshots,
            live: Vec::with_capacity(initial_capacity),
            scratch: Vec::with_capacity(initial_capacity),
            tick: 0,
        }
    }

    /// Populate the live set with the configured initial particle count,
    /// everything expiring one lifespan after `now`.
    pub fn seed(&mut self, now: f64) {
        let expires_at = self.expiry_for(now);
        let extent = self.config.seed_extent;
        self.live.clear();
        self.live.reserve(self.config.particle_count);
        for _ in 0..self.config.particle_count {
            self.live
                .push(particle::spawn_seeded(&mut self.rng, extent, expires_at));
        }
    }

    /// Advance one tick at simulation time `now`: integrate and fade the
    /// survivors, admit everything waiting in the injection queue, publish.
    pub fn step(&mut self, now: f64) {
        self.advance(now);
        self.drain(now);
        self.tick += 1;
        self.publish(now);
    }

    /// Copy the live set into the write slot and hand it to the reader
    /// side. Also used once at startup so the first frame pull can succeed
    /// before any tick has run.
    pub fn publish(&mut self, now: f64) {
        let slot = self.snapshots.begin_write();
        slot.particles.clear();
        slot.particles.extend_from_slice(&self.live);
        slot.time = now;
        slot.tick = self.tick;
        self.snapshots.publish();
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    // Integrate, expire and fade in one pass, live -> scratch, then swap.
    // The per-particle work is independent, so the pass runs in parallel;
    // rayon's extend keeps the survivors in their original order.
    fn advance(&mut self, now: f64) {
        let aging = self.config.aging_enabled();
        let decay_step = self.config.color_decay_step;
        self.scratch.clear();
        self.scratch
            .par_extend(self.live.par_iter().filter_map(|p| {
                if aging && now >= p.expires_at {
                    return None;
                }
                let mut next = *p;
                next.position = lorenz_step(p.position);
                if aging {
                    next.decay_color(decay_step);
                }
                Some(next)
            }));
        std::mem::swap(&mut self.live, &mut self.scratch);
    }

    // Admit pending injections, oldest first, until the queue is empty or
    // the live set reaches the particle cap; anything still queued at the
    // cap waits for a later tick, so an accepted push is never destroyed.
    // Each admitted particle keeps its position and color but gets a fresh
    // expiry, so a seed that sat in the queue for a while still enters
    // with its full lifespan.
    fn drain(&mut self, now: f64) {
        let expires_at = self.expiry_for(now);
        let mut drained = 0usize;
        while self.live.len() < MAX_PARTICLES {
            let Some(mut p) = self.injections.try_pop() else {
                break;
            };
            p.expires_at = expires_at;
            self.live.push(p);
            drained += 1;
        }
        if drained > 0 {
            log::debug!("admitted {} injected particles at t={:.3}", drained, now);
        }
        if self.live.len() == MAX_PARTICLES && !self.injections.is_empty() {
            log::warn!(
                "live set at the {} particle cap, {} injections deferred",
                MAX_PARTICLES,
                self.injections.len()
            );
        }
    }

    fn expiry_for(&self, now: f64) -> f64 {
        if self.config.aging_enabled() {
            now + self.config.lifespan_secs
        } else {
            f64::INFINITY
        }
    }
}
