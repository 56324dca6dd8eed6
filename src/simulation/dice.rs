//! Injected randomness. Every stochastic rule draws from a `&mut dyn RngCore`
//! handed in by the caller, never from a thread-local generator.

use bevy_ecs::prelude::Resource;
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// The simulation's random source, owned by the world so scheduled systems can reach it.
#[derive(Resource)]
pub struct Dice(pub Box<dyn RngCore + Send + Sync>);

impl Dice {
    pub fn seeded(seed: u64) -> Self {
        Self(Box::new(SmallRng::seed_from_u64(seed)))
    }

    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.0
    }
}

/// Uniform draw in `[0, 1)`.
pub fn roll(rng: &mut dyn RngCore) -> f64 {
    rng.r#gen::<f64>()
}

/// True with probability `p`; `p` outside `[0, 1]` saturates.
pub fn chance(rng: &mut dyn RngCore, p: f64) -> bool {
    roll(rng) < p
}

/// Uniform index into a non-empty collection of `len` items.
pub fn pick_index(rng: &mut dyn RngCore, len: usize) -> usize {
    ((roll(rng) * len as f64) as usize).min(len.saturating_sub(1))
}
