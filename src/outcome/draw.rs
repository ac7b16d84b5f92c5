//! Uniform draw sources
//!
//! The orchestrator never calls a random generator directly; it pulls draws
//! from a [`DrawSource`] so tests can script outcomes and durations.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform values in `[0, 1)`
pub trait DrawSource: Send {
    fn next_draw(&mut self) -> f64;
}

/// Draws backed by a seedable PRNG
pub struct RandomDraws {
    rng: StdRng,
}

impl RandomDraws {
    /// Seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map(Self::seeded).unwrap_or_default()
    }
}

impl Default for RandomDraws {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawSource for RandomDraws {
    fn next_draw(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted
#[cfg(test)]
pub struct ScriptedDraws {
    values: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl ScriptedDraws {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "scripted draws need at least one value");
        Self { values, next: 0 }
    }
}

#[cfg(test)]
impl DrawSource for ScriptedDraws {
    fn next_draw(&mut self) -> f64 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_draws_in_unit_interval() {
        let mut draws = RandomDraws::new();
        for _ in 0..1000 {
            let d = draws.next_draw();
            assert!((0.0..1.0).contains(&d));
        }
    }

    #[test]
    fn test_seeded_draws_are_reproducible() {
        let mut a = RandomDraws::seeded(42);
        let mut b = RandomDraws::from_seed(Some(42));
        for _ in 0..16 {
            assert_eq!(a.next_draw(), b.next_draw());
        }
    }

    #[test]
    fn test_scripted_draws_cycle() {
        let mut draws = ScriptedDraws::new(vec![0.1, 0.2]);
        assert_eq!(draws.next_draw(), 0.1);
        assert_eq!(draws.next_draw(), 0.2);
        assert_eq!(draws.next_draw(), 0.1);
    }
}
