//! HMM training configuration.
//!
//! Baum–Welch only finds a local optimum, so the initialization scheme and
//! its seed are part of the configuration: the same corpus, scheme, seed and
//! iteration budget always reproduce the same parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Schema version for training configuration.
pub const TRAINING_SCHEMA_VERSION: &str = "1.0.0";

/// Default seed for the randomized initialization schemes.
pub const DEFAULT_SEED: u64 = 42;

/// How π, A and B are initialized before EM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum InitScheme {
    /// Every row uniform. All states start identical, which EM cannot break,
    /// so every state converges to the same emission row.
    Uniform,
    /// Seeded random rows, normalized.
    Random { seed: u64 },
    /// Emission rows start from Laplace-smoothed per-label token frequencies,
    /// blended with seeded noise; π and A are seeded random.
    LabelSeeded {
        seed: u64,
        /// Weight of the label frequencies in the blend, in (0, 1].
        #[serde(default = "default_label_weight")]
        label_weight: f64,
    },
}

fn default_label_weight() -> f64 {
    0.7
}

impl Default for InitScheme {
    fn default() -> Self {
        InitScheme::LabelSeeded {
            seed: DEFAULT_SEED,
            label_weight: default_label_weight(),
        }
    }
}

impl InitScheme {
    /// Seed used by this scheme (uniform has none).
    pub fn seed(&self) -> Option<u64> {
        match self {
            InitScheme::Uniform => None,
            InitScheme::Random { seed } | InitScheme::LabelSeeded { seed, .. } => Some(*seed),
        }
    }

    /// Same scheme with a different seed.
    pub fn with_seed(self, seed: u64) -> Self {
        match self {
            InitScheme::Uniform => InitScheme::Uniform,
            InitScheme::Random { .. } => InitScheme::Random { seed },
            InitScheme::LabelSeeded { label_weight, .. } => {
                InitScheme::LabelSeeded { seed, label_weight }
            }
        }
    }
}

/// Baum–Welch training settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TrainingConfig {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Upper bound on EM iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Stop when the total log-likelihood improves by less than this
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Parameter initialization scheme
    #[serde(default)]
    pub init: InitScheme,

    /// A state whose total expected emission count falls to this value or
    /// below is reported as degenerate
    #[serde(default = "default_min_state_mass")]
    pub min_state_mass: f64,
}

fn default_max_iterations() -> usize {
    100
}

fn default_tolerance() -> f64 {
    1e-2
}

fn default_min_state_mass() -> f64 {
    1e-12
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            schema_version: TRAINING_SCHEMA_VERSION.to_string(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            init: InitScheme::default(),
            min_state_mass: default_min_state_mass(),
        }
    }
}

impl TrainingConfig {
    /// Validate the training configuration.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != TRAINING_SCHEMA_VERSION {
            return Err(Error::InvalidTraining(format!(
                "schema version mismatch: expected {}, got {}",
                TRAINING_SCHEMA_VERSION, self.schema_version
            )));
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidTraining(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(Error::InvalidTraining(format!(
                "tolerance must be finite and non-negative (got {})",
                self.tolerance
            )));
        }
        if !self.min_state_mass.is_finite() || self.min_state_mass < 0.0 {
            return Err(Error::InvalidTraining(format!(
                "min_state_mass must be finite and non-negative (got {})",
                self.min_state_mass
            )));
        }
        if let InitScheme::LabelSeeded { label_weight, .. } = self.init {
            if !(label_weight > 0.0 && label_weight <= 1.0) {
                return Err(Error::InvalidTraining(format!(
                    "label_weight must be in (0, 1] (got {})",
                    label_weight
                )));
            }
        }
        Ok(())
    }

    /// Builder-style override of the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Builder-style override of the initialization scheme.
    pub fn with_init(mut self, init: InitScheme) -> Self {
        self.init = init;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_training_is_valid() {
        let cfg = TrainingConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.max_iterations, 100);
        assert_eq!(cfg.init.seed(), Some(DEFAULT_SEED));
    }

    #[test]
    fn init_scheme_serde_is_tagged() {
        let json = serde_json::to_string(&InitScheme::Random { seed: 7 }).unwrap();
        assert_eq!(json, r#"{"scheme":"random","seed":7}"#);
        let parsed: InitScheme =
            serde_json::from_str(r#"{"scheme":"label_seeded","seed":3}"#).unwrap();
        assert_eq!(
            parsed,
            InitScheme::LabelSeeded {
                seed: 3,
                label_weight: 0.7
            }
        );
        let uniform: InitScheme = serde_json::from_str(r#"{"scheme":"uniform"}"#).unwrap();
        assert_eq!(uniform.seed(), None);
    }

    #[test]
    fn with_seed_keeps_scheme() {
        let s = InitScheme::default().with_seed(9);
        assert!(matches!(s, InitScheme::LabelSeeded { seed: 9, .. }));
        assert_eq!(InitScheme::Uniform.with_seed(9), InitScheme::Uniform);
    }

    #[test]
    fn rejects_bad_values() {
        let zero_iter = TrainingConfig::default().with_max_iterations(0);
        assert!(matches!(zero_iter.validate(), Err(Error::InvalidTraining(_))));

        let bad_weight = TrainingConfig::default().with_init(InitScheme::LabelSeeded {
            seed: 1,
            label_weight: 0.0,
        });
        assert!(bad_weight.validate().is_err());

        let bad_tol = TrainingConfig {
            tolerance: f64::NAN,
            ..Default::default()
        };
        assert!(bad_tol.validate().is_err());
    }
}
