//! Deterministic random number generation.
//!
//! RULE: Nothing in the audit may call any platform RNG.
//! All randomness flows through StageRng instances derived
//! from the single master seed of the run.
//!
//! Each draw site gets its own stream, seeded from
//! (master_seed XOR slot_index * golden-ratio constant), so adding
//! a new slot never shifts the values of existing streams.

use crate::error::{AuditError, AuditResult};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single pipeline stream.
pub struct StageRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl StageRng {
    /// Create a stream from the master seed and a stable slot index.
    /// The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Continuous uniform draw in [low, high]. Callers guarantee
    /// `low <= high` and a finite span.
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        self.inner.gen_range(low..=high)
    }

    /// Integer draw in [low, high], both ends inclusive.
    pub fn uniform_int(&mut self, low: i64, high: i64) -> i64 {
        self.inner.gen_range(low..=high)
    }

    pub fn normal(&mut self, mean: f64, std_dev: f64) -> AuditResult<f64> {
        let normal = Normal::new(mean, std_dev).map_err(|e| {
            AuditError::invalid_config(
                "generator",
                format!("normal(mean={mean}, std_dev={std_dev}): {e}"),
            )
        })?;
        Ok(normal.sample(&mut self.inner))
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.inner);
    }
}

/// All stream RNGs for a single run, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_slot(&self, slot: StreamSlot) -> StageRng {
        StageRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StreamSlot {
    Assignment = 0,
    Interface = 1,
    Outcome = 2,
}

impl StreamSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Assignment => "assignment",
            Self::Interface => "interface",
            Self::Outcome => "outcome",
        }
    }
}
