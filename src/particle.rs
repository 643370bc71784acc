use crate::constants::{SEED_ALPHA, SEED_COLOR_MIN};
use glam::Vec3;
use rand::Rng;

/// One particle of the attractor flow.
///
/// A plain value type: each tick the engine derives a new value from the old
/// one, so a particle that is visible to the consumer is never mutated in
/// place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    /// RGBA. Fading drains green, then red, then blue; alpha stays put.
    pub color: [u8; 4],
    /// Absolute simulation time at which the particle leaves the live set.
    pub expires_at: f64,
}

impl Particle {
    /// Fade one step, `step` per tick, saturating at zero. The
    /// green->red->blue order is a visual choice, not an invariant anything
    /// else relies on.
    pub fn decay_color(&mut self, step: u8) {
        if self.color[1] > 0 {
            self.color[1] = self.color[1].saturating_sub(step);
        } else if self.color[0] > 0 {
            self.color[0] = self.color[0].saturating_sub(step);
        } else {
            self.color[2] = self.color[2].saturating_sub(step);
        }
    }
}

/// Bright random color for a freshly spawned particle. Every channel starts
/// at `SEED_COLOR_MIN` or above so the fade has somewhere to go.
pub fn spawn_color<R: Rng + ?Sized>(rng: &mut R) -> [u8; 4] {
    [
        rng.gen_range(SEED_COLOR_MIN..=u8::MAX),
        rng.gen_range(SEED_COLOR_MIN..=u8::MAX),
        rng.gen_range(SEED_COLOR_MIN..=u8::MAX),
        SEED_ALPHA,
    ]
}

/// Particle at a caller-chosen position, colored by the spawn policy. The
/// expiry is a placeholder; the engine stamps the real one at admission.
pub fn spawn_at<R: Rng + ?Sized>(rng: &mut R, position: Vec3) -> Particle {
    Particle {
        position,
        color: spawn_color(rng),
        expires_at: f64::INFINITY,
    }
}

/// Random particle inside the seeding cube.
pub fn spawn_seeded<R: Rng + ?Sized>(rng: &mut R, extent: f32, expires_at: f64) -> Particle {
    let position = if extent > 0.0 {
        Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    } else {
        Vec3::ZERO
    };
    Particle {
        position,
        color: spawn_color(rng),
        expires_at,
    }
}
