//! Hyperparameters and candidate keywords, loaded from a TOML file.
//!
//! ```toml
//! [swarm]
//! dimension = 5
//! swarm_size = 100
//! iterations = 100
//! seed = 42
//!
//! [fitness]
//! polarity = "as-written"
//!
//! [keywords]
//! seed = ["free", "win"]
//! similar = ["prize"]
//! ```
//!
//! Every field is optional; missing ones take the defaults below.

use crate::error::{KeyswarmError, Result};
use crate::fitness::Polarity;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub swarm: SwarmConfig,
    pub fitness: FitnessConfig,
    pub keywords: KeywordLists,
}

/// PSO hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    /// Keyword slots per particle (D).
    pub dimension: usize,
    /// Particles in the swarm (S).
    pub swarm_size: usize,
    /// Maximum number of iterations after initialization.
    pub iterations: usize,
    /// Inertia weight.
    pub omega: f64,
    /// Cognitive coefficient, pull toward the personal best.
    pub c1: f64,
    /// Social coefficient, pull toward the global best.
    pub c2: f64,
    /// Initial velocities are drawn from `±velocity_fraction * (upper - lower)`.
    pub velocity_fraction: f64,
    /// Stop once an accepted global-best improvement is at most this large.
    pub tolerance: f64,
    /// Stop once an accepted global-best move is at most this far.
    pub min_step: f64,
    /// Stop after this many iterations without improvement; 0 disables.
    pub patience: usize,
    pub seed: Option<u64>,
    /// Evaluate the particles of one iteration on the rayon pool.
    pub parallel: bool,
    /// Wall-clock cap in seconds; 0 disables.
    pub max_seconds: f64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            dimension: 5,
            swarm_size: 100,
            iterations: 100,
            omega: 0.5,
            c1: 0.5,
            c2: 0.5,
            velocity_fraction: 1.0,
            tolerance: 1e-8,
            min_step: 1e-8,
            patience: 0,
            seed: None,
            parallel: true,
            max_seconds: 0.0,
        }
    }
}

impl SwarmConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("dimension", self.dimension),
            ("swarm_size", self.swarm_size),
            ("iterations", self.iterations),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(KeyswarmError::InvalidConfig(format!("{name} must be positive")));
            }
        }
        let non_negative = [
            ("omega", self.omega),
            ("c1", self.c1),
            ("c2", self.c2),
            ("tolerance", self.tolerance),
            ("min_step", self.min_step),
            ("max_seconds", self.max_seconds),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(KeyswarmError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Duration::try_from_secs_f64(self.max_seconds).map_err(|_| {
            KeyswarmError::InvalidConfig(format!("max_seconds {} is out of range", self.max_seconds))
        })?;
        if !self.velocity_fraction.is_finite() || self.velocity_fraction <= 0.0 {
            return Err(KeyswarmError::InvalidConfig(format!(
                "velocity_fraction must be positive, got {}",
                self.velocity_fraction
            )));
        }
        Ok(())
    }

    pub fn max_duration(&self) -> Option<Duration> {
        if self.max_seconds > 0.0 {
            Duration::try_from_secs_f64(self.max_seconds).ok()
        } else {
            None
        }
    }

    pub fn patience(&self) -> Option<usize> {
        (self.patience > 0).then_some(self.patience)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    pub polarity: Polarity,
}

/// Seed keywords and similar keywords; the candidate list is their
/// concatenation in that order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordLists {
    pub seed: Vec<String>,
    pub similar: Vec<String>,
}

impl KeywordLists {
    pub fn candidates(&self) -> impl Iterator<Item = &str> {
        self.seed.iter().chain(self.similar.iter()).map(String::as_str)
    }
}

impl SelectorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.swarm.validate()?;
        if self.keywords.candidates().all(|k| k.trim().is_empty()) {
            return Err(KeyswarmError::EmptyCandidateList);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_file() {
        let cfg = SelectorConfig::from_toml_str(
            r#"
            [swarm]
            dimension = 3
            seed = 7

            [fitness]
            polarity = "favor-irrelevant"

            [keywords]
            seed = ["free"]
            similar = ["win", "prize"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.swarm.dimension, 3);
        assert_eq!(cfg.swarm.swarm_size, 100);
        assert_eq!(cfg.swarm.seed, Some(7));
        assert_eq!(cfg.fitness.polarity, Polarity::FavorIrrelevant);
        assert_eq!(cfg.keywords.candidates().collect::<Vec<_>>(), vec!["free", "win", "prize"]);
        cfg.validate().unwrap();
    }

    #[test]
    fn rejects_degenerate_hyperparameters() {
        let mut cfg = SwarmConfig { swarm_size: 0, ..SwarmConfig::default() };
        assert!(matches!(cfg.validate(), Err(KeyswarmError::InvalidConfig(_))));
        cfg.swarm_size = 4;
        cfg.omega = f64::NAN;
        assert!(cfg.validate().is_err());
        cfg.omega = 0.5;
        cfg.velocity_fraction = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn huge_time_cap_rejected_up_front() {
        let cfg = SwarmConfig { max_seconds: 1e20, ..SwarmConfig::default() };
        assert!(matches!(cfg.validate(), Err(KeyswarmError::InvalidConfig(_))));
        assert_eq!(cfg.max_duration(), None);

        let cfg = SwarmConfig { max_seconds: 2.5, ..SwarmConfig::default() };
        cfg.validate().unwrap();
        assert_eq!(cfg.max_duration(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn missing_keywords_is_an_error() {
        let cfg = SelectorConfig::default();
        assert!(matches!(cfg.validate(), Err(KeyswarmError::EmptyCandidateList)));
    }
}
