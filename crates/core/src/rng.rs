//! RNG module - random sources for tile spawning
//!
//! Spawning is the only nondeterministic step in the game, so the random source
//! is a small capability trait handed to the session. Two implementations:
//!
//! - [`SimpleRng`]: a seedable LCG for deterministic games and tests
//! - [`RandSource`]: adapts any `rand::RngCore` (e.g. `StdRng`, `ThreadRng`)

use rand::{Rng, RngCore};

/// Random source consumed by tile spawning.
///
/// Implementations must be infallible.
pub trait TileRng {
    /// Uniform float in `[0, 1)`
    fn next_float(&mut self) -> f64;

    /// Uniform index in `[0, n)`; `n` is never zero
    fn next_index(&mut self, n: usize) -> usize;
}

impl<T: TileRng + ?Sized> TileRng for &mut T {
    fn next_float(&mut self) -> f64 {
        (**self).next_float()
    }

    fn next_index(&mut self, n: usize) -> usize {
        (**self).next_index(n)
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Current RNG state (restarting from it replays the same sequence)
    pub fn seed(&self) -> u32 {
        self.state
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

impl TileRng for SimpleRng {
    fn next_float(&mut self) -> f64 {
        // The high 24 bits of an LCG are the well-mixed ones.
        (self.next_u32() >> 8) as f64 / (1u32 << 24) as f64
    }

    fn next_index(&mut self, n: usize) -> usize {
        // High bits again; low LCG bits cycle with short periods.
        ((self.next_u32() >> 8) as usize) % n
    }
}

/// Adapter exposing any `rand` generator as a [`TileRng`]
#[derive(Debug, Clone)]
pub struct RandSource<R> {
    inner: R,
}

impl<R: RngCore> RandSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: RngCore> TileRng for RandSource<R> {
    fn next_float(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn next_index(&mut self, n: usize) -> usize {
        self.inner.gen_range(0..n)
    }
}
