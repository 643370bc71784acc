// --- Global Simulation Constants ---

// Classic Lorenz parameters: s (sigma), r (rho), b (beta = 8/3).
pub const LORENZ_S: f32 = 10.0;
pub const LORENZ_R: f32 = 28.0;
pub const LORENZ_B: f32 = 8.0 / 3.0;

// Explicit Euler step applied once per tick. Kept small for visual
// smoothness at ~60 ticks/sec, deliberately not adaptive.
pub const INTEGRATION_DT: f32 = 0.003;

// --- Default Configuration Values ---

pub const DEFAULT_PARTICLE_COUNT: usize = 100;
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 16; // ~60 ticks/sec
pub const DEFAULT_LIFESPAN_SECS: f64 = 10.0;
pub const DEFAULT_INJECTION_CAPACITY: usize = 100;
pub const DEFAULT_COLOR_DECAY_STEP: u8 = 1;
pub const DEFAULT_SEED_EXTENT: f32 = 20.0;

// Hard cap on the live set. Injection admissions pause (and warn) while
// the population stands at it; accepted pushes stay queued.
pub const MAX_PARTICLES: usize = 50_000;

// --- Spawn Color Policy ---

// Freshly spawned particles start bright so the green->red->blue fade has
// somewhere to go. Channels are drawn uniformly from [SEED_COLOR_MIN, 255].
pub const SEED_COLOR_MIN: u8 = 64;
pub const SEED_ALPHA: u8 = 255;

// --- Logging Cadence ---

// Tick-loop heartbeat interval; once every ~10s at the default tick rate.
pub const TICK_LOG_INTERVAL: u64 = 600;
