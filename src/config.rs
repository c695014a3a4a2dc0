//! Configuration for subtraction operations.
//!
//! [`CsgConfig`] bundles the iteration caps, the raycast retry budget and the
//! random source used to jitter ambiguous rays.
//!
//! # Example
//!
//! ```
//! use csg_subtract::CsgConfig;
//!
//! // Reproducible perturbation for tests and replays
//! let config = CsgConfig::deterministic(7).with_max_split_passes(50);
//! assert_eq!(config.seed, Some(7));
//! ```

use crate::float_types::Real;
use rand::{SeedableRng, rngs::StdRng};

/// Cap on full split passes per `split_object` call.
pub const DEFAULT_MAX_SPLIT_PASSES: usize = 100;

/// Attempts made by the raycast classifier before it settles.
pub const DEFAULT_MAX_RAYCAST_ATTEMPTS: usize = 5;

/// Magnitude of each component of the random ray jitter.
pub const DEFAULT_PERTURBATION: Real = 0.05;

/// Tunables for one subtraction.
#[derive(Debug, Clone, PartialEq)]
pub struct CsgConfig {
    /// Full passes over an object's polygon list before splitting gives up.
    pub max_split_passes: usize,

    /// Raycast attempts per directly classified polygon.
    pub max_raycast_attempts: usize,

    /// Per-component magnitude of the random vector added to an ambiguous ray.
    pub perturbation: Real,

    /// Seed for the perturbation RNG; `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Insert result vertices lying inside result edges so the output has no
    /// T-junctions.
    pub weld_t_junctions: bool,
}

impl Default for CsgConfig {
    fn default() -> Self {
        Self {
            max_split_passes: DEFAULT_MAX_SPLIT_PASSES,
            max_raycast_attempts: DEFAULT_MAX_RAYCAST_ATTEMPTS,
            perturbation: DEFAULT_PERTURBATION,
            seed: None,
            weld_t_junctions: true,
        }
    }
}

impl CsgConfig {
    /// Default settings with a fixed perturbation seed.
    #[must_use]
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_max_split_passes(mut self, passes: usize) -> Self {
        self.max_split_passes = passes;
        self
    }

    #[must_use]
    pub const fn with_max_raycast_attempts(mut self, attempts: usize) -> Self {
        self.max_raycast_attempts = attempts;
        self
    }

    #[must_use]
    pub const fn with_perturbation(mut self, magnitude: Real) -> Self {
        self.perturbation = magnitude;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub const fn with_weld_t_junctions(mut self, weld: bool) -> Self {
        self.weld_t_junctions = weld;
        self
    }

    /// Build the RNG this configuration asks for.
    pub(crate) fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
