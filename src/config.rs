//! Runtime configuration for callers assembling verifiers.
//!
//! The field modulus is deliberately absent: it is the fixed
//! [`MODULUS`](crate::MODULUS).  Everything else a caller may want to tune
//! lives in [`EngineConfig`], which can be read from JSON or from
//! `FINGERPRINT_*` environment variables.

use crate::amplify::{Amplifier, Combine, Outcome};
use crate::error::{EngineError, Result};
use crate::rolling::{MatchMode, Matcher, BYTE_RADIX};
use crate::{Field, SimplePrng, MODULUS};
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const ENV_RADIX: &str = "FINGERPRINT_RADIX";
const ENV_MATCH_MODE: &str = "FINGERPRINT_MATCH_MODE";
const ENV_TARGET_ERROR: &str = "FINGERPRINT_TARGET_ERROR";
const ENV_MAX_TRIALS: &str = "FINGERPRINT_MAX_TRIALS";
const ENV_PARALLEL: &str = "FINGERPRINT_PARALLEL";
const ENV_SEED: &str = "FINGERPRINT_SEED";

/// Tunable parameters shared by the verifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Alphabet size `d` for the rolling-hash matcher.
    pub radix: u64,
    /// Monte Carlo or Las Vegas reporting.
    pub match_mode: MatchMode,
    /// Desired one-sided error after amplification.
    pub target_error: f64,
    /// Hard cap on repetitions regardless of `target_error`.
    pub max_trials: usize,
    /// Run amplified trials on the rayon pool.
    pub parallel_trials: bool,
    /// Seed for reproducible runs; fresh entropy when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            radix: BYTE_RADIX,
            match_mode: MatchMode::LasVegas,
            target_error: 1.0 / (1u64 << 20) as f64,
            max_trials: 64,
            parallel_trials: false,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document.  Missing keys take defaults.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|err| EngineError::InvalidConfig(format!("invalid config JSON: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_RADIX) {
            config.radix = parse_var(ENV_RADIX, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MATCH_MODE) {
            let value = serde_json::Value::String(raw.trim().to_string());
            config.match_mode = serde_json::from_value(value).map_err(|_| {
                EngineError::InvalidConfig(format!(
                    "{ENV_MATCH_MODE} must be monte_carlo or las_vegas, got {raw:?}"
                ))
            })?;
        }
        if let Some(raw) = lookup(ENV_TARGET_ERROR) {
            config.target_error = parse_var(ENV_TARGET_ERROR, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_TRIALS) {
            config.max_trials = parse_var(ENV_MAX_TRIALS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PARALLEL) {
            config.parallel_trials = parse_var(ENV_PARALLEL, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SEED) {
            config.seed = Some(parse_var(ENV_SEED, &raw)?);
        }
        config.validate()?;
        Ok(config)
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<()> {
        if self.radix < 2 || self.radix >= MODULUS {
            return Err(EngineError::InvalidConfig(format!(
                "radix {} must lie in [2, {MODULUS})",
                self.radix
            )));
        }
        if !(self.target_error > 0.0 && self.target_error < 1.0) {
            return Err(EngineError::InvalidConfig(format!(
                "target_error {} must lie in (0, 1)",
                self.target_error
            )));
        }
        if self.max_trials == 0 {
            return Err(EngineError::InvalidConfig(
                "max_trials must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the configured matcher over the default field.
    pub fn matcher(&self) -> Result<Matcher> {
        Matcher::with_field(Field::default(), self.radix, self.match_mode)
    }

    /// Builds an amplifier reaching `target_error` from a check whose single
    /// trial errs with probability at most `base_error`, capped at
    /// `max_trials`.  [`Amplifier::error_bound`] reports what the cap allows.
    pub fn amplifier(&self, base_error: f64, rule: Combine) -> Result<Amplifier> {
        Amplifier::for_error(base_error, self.target_error, rule, self.max_trials)
    }

    /// Returns a generator: seeded from `seed` when set, else from entropy.
    pub fn rng(&self) -> SimplePrng {
        match self.seed {
            Some(seed) => SimplePrng::new(seed),
            None => SimplePrng::from_seed(rand::thread_rng().gen()),
        }
    }

    /// Seed for [`Amplifier::run_parallel`].
    pub fn trial_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::thread_rng().gen())
    }

    /// Runs `amplifier` sequentially or on the rayon pool, as configured.
    pub fn run_trials<F>(&self, amplifier: &Amplifier, trial: F) -> Result<Outcome>
    where
        F: Fn(&mut SimplePrng) -> Result<bool> + Sync,
    {
        #[cfg(not(target_arch = "wasm32"))]
        if self.parallel_trials {
            return amplifier.run_parallel(self.trial_seed(), trial);
        }
        let mut rng = self.rng();
        amplifier.run(|_| trial(&mut rng))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| EngineError::InvalidConfig(format!("cannot parse {key}={raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.matcher().unwrap().radix(), 256);
        assert_eq!(config.amplifier(0.5, Combine::All).unwrap().trials(), 20);
    }

    #[test]
    fn test_json_overrides() {
        let config = EngineConfig::from_json_str(
            r#"{"radix": 4, "match_mode": "monte_carlo", "max_trials": 8, "seed": 42}"#,
        )
        .unwrap();
        assert_eq!(config.radix, 4);
        assert_eq!(config.match_mode, MatchMode::MonteCarlo);
        let capped = config.amplifier(0.5, Combine::All).unwrap();
        assert_eq!(capped.trials(), 8);
        assert!(capped.is_capped());
        assert_eq!(capped.error_bound(), Some(1.0 / 256.0));
        let mut a = config.rng();
        let mut b = config.rng();
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
        assert_eq!(config.trial_seed(), 42);
    }

    #[test]
    fn test_json_rejects_bad_values() {
        assert!(EngineConfig::from_json_str(r#"{"radix": 1}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"target_error": 1.5}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"max_trials": 0}"#).is_err());
        assert!(EngineConfig::from_json_str(r#"{"modulus": 7}"#).is_err());
    }

    #[test]
    fn test_env_lookup() {
        let vars: HashMap<&str, &str> = [
            ("FINGERPRINT_RADIX", "26"),
            ("FINGERPRINT_MATCH_MODE", "monte_carlo"),
            ("FINGERPRINT_TARGET_ERROR", "0.001"),
            ("FINGERPRINT_PARALLEL", "true"),
            ("FINGERPRINT_SEED", "7"),
        ]
        .into_iter()
        .collect();
        let config = EngineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.radix, 26);
        assert_eq!(config.match_mode, MatchMode::MonteCarlo);
        assert!(config.parallel_trials);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.amplifier(0.5, Combine::All).unwrap().trials(), 10);

        let bad = EngineConfig::from_lookup(|k| {
            (k == "FINGERPRINT_MATCH_MODE").then(|| "sometimes".to_string())
        });
        assert!(matches!(bad, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_run_trials_sequential_and_parallel() {
        let a = crate::IntMatrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
        let wrong = crate::IntMatrix::from_rows(vec![vec![1, 2], vec![3, 5]]).unwrap();
        let identity = crate::IntMatrix::from_rows(vec![vec![1, 0], vec![0, 1]]).unwrap();
        for parallel in [false, true] {
            let config = EngineConfig {
                parallel_trials: parallel,
                seed: Some(5),
                ..EngineConfig::default()
            };
            let amplifier = config.amplifier(0.5, Combine::All).unwrap();
            let ok = config
                .run_trials(&amplifier, |rng| crate::freivalds::verify_once(&a, &identity, &a, rng))
                .unwrap();
            assert!(ok.verdict);
            let bad = config
                .run_trials(&amplifier, |rng| {
                    crate::freivalds::verify_once(&a, &identity, &wrong, rng)
                })
                .unwrap();
            assert!(!bad.verdict);
        }
    }
}
