// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the hvac-modbus-simulator project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Measurement Jitter
//!
//! Simulated measurements are offset by a small random integer every tick. The
//! offset comes from a [`JitterSource`], which the fan controller and the sensor
//! simulator receive at construction:
//!
//! * [`RandomJitter`] draws uniformly distributed offsets with `rand`.
//! * [`FixedJitter`] always returns the same offset.
//! * [`SequenceJitter`] replays a list of offsets, cycling when exhausted.
//!
//! The deterministic sources ignore the requested bounds, so a test can force
//! an offset far outside the normal range (for instance to hit a clamp).
//!
//! ## Examples
//!
//! ```rust
//! use hvac_modbus_simulator::simulation::jitter::{JitterSource, SequenceJitter};
//!
//! let mut jitter = SequenceJitter::new(vec![3, -4]);
//! assert_eq!(jitter.jitter(-10, 10), 3);
//! assert_eq!(jitter.jitter(-10, 10), -4);
//! assert_eq!(jitter.jitter(-10, 10), 3);
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Provider of bounded integer offsets.
pub trait JitterSource: Send {
    /// Returns an offset, nominally within `low..=high`.
    fn jitter(&mut self, low: i32, high: i32) -> i32;
}

impl<J: JitterSource + ?Sized> JitterSource for Box<J> {
    fn jitter(&mut self, low: i32, high: i32) -> i32 {
        (**self).jitter(low, high)
    }
}

/// Uniform random offsets in `low..=high`.
#[derive(Debug, Clone)]
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    /// Seeded from the operating system entropy source.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl JitterSource for RandomJitter {
    fn jitter(&mut self, low: i32, high: i32) -> i32 {
        if low >= high {
            return low;
        }
        self.rng.random_range(low..=high)
    }
}

/// Always returns the same offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedJitter(pub i32);

impl JitterSource for FixedJitter {
    fn jitter(&mut self, _low: i32, _high: i32) -> i32 {
        self.0
    }
}

/// Replays a fixed list of offsets in order, starting over at the end.
///
/// An empty list behaves like `FixedJitter(0)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceJitter {
    values: Vec<i32>,
    index: usize,
}

impl SequenceJitter {
    pub fn new(values: Vec<i32>) -> Self {
        Self { values, index: 0 }
    }
}

impl JitterSource for SequenceJitter {
    fn jitter(&mut self, _low: i32, _high: i32) -> i32 {
        if self.values.is_empty() {
            return 0;
        }
        if self.index >= self.values.len() {
            self.index = 0;
        }
        let value = self.values[self.index];
        self.index += 1;
        value
    }
}
