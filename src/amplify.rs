//! Error amplification by independent repetition.
//!
//! Every randomized check in this crate is a single-trial primitive with a
//! known error bound.  [`Amplifier`] repeats such a primitive and combines
//! the verdicts, keeping the error arithmetic in one place:
//!
//! * [`Combine::All`] accepts only if every trial accepts.  For a check that
//!   never rejects a true statement and wrongly accepts with probability at
//!   most `ε`, `k` trials wrongly accept with probability at most `εᵏ`.
//! * [`Combine::Any`] accepts if some trial accepts.  This is the dual for
//!   checks that never accept a false statement.
//! * [`Combine::Majority`] takes the majority vote, for two-sided error.
//!
//! Trials must be independent: each draws fresh randomness.

use crate::error::{EngineError, Result};
use crate::SimplePrng;
#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Rule combining per-trial verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Combine {
    /// Accept iff every trial accepts.
    All,
    /// Accept iff at least one trial accepts.
    Any,
    /// Accept iff strictly more than half the trials accept.
    Majority,
}

/// Result of an amplified run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Combined verdict.
    pub verdict: bool,
    /// Trials actually executed (sequential runs stop once decided).
    pub trials_run: usize,
    /// Trials that accepted.
    pub accepted: usize,
}

/// Repeats a single-trial check a fixed number of times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amplifier {
    trials: usize,
    rule: Combine,
    /// Trials the error target asked for, before any cap.
    requested: usize,
    /// Per-trial one-sided error, when built from an error target.
    base_error: Option<f64>,
}

impl Amplifier {
    /// Creates an amplifier running `trials` trials.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidTrials`] if `trials` is zero.
    pub fn new(trials: usize, rule: Combine) -> Result<Self> {
        if trials == 0 {
            return Err(EngineError::InvalidTrials);
        }
        Ok(Self {
            trials,
            rule,
            requested: trials,
            base_error: None,
        })
    }

    /// Creates an amplifier with just enough trials to push a one-sided
    /// error of `base_error` below `target_error`, capped at `max_trials`.
    ///
    /// When the cap bites the amplifier still runs, but
    /// [`Amplifier::is_capped`] is set and [`Amplifier::error_bound`] reports
    /// the weaker bound actually reached.
    pub fn for_error(
        base_error: f64,
        target_error: f64,
        rule: Combine,
        max_trials: usize,
    ) -> Result<Self> {
        let requested = trials_for_error(base_error, target_error)?;
        let mut amplifier = Self::new(requested.min(max_trials), rule)?;
        amplifier.requested = requested;
        amplifier.base_error = Some(base_error);
        if amplifier.is_capped() {
            warn!(
                requested,
                max_trials,
                target_error,
                achieved = residual_error(base_error, amplifier.trials),
                "trial cap prevents reaching the target error"
            );
        }
        Ok(amplifier)
    }

    /// Whether `max_trials` cut the count below what the error target needs.
    pub fn is_capped(&self) -> bool {
        self.requested > self.trials
    }

    /// One-sided error bound after all trials under [`Combine::All`] or
    /// [`Combine::Any`], known only for amplifiers built by
    /// [`Amplifier::for_error`].
    pub fn error_bound(&self) -> Option<f64> {
        self.base_error.map(|e| residual_error(e, self.trials))
    }

    /// Number of trials.
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Combination rule.
    pub fn rule(&self) -> Combine {
        self.rule
    }

    /// Runs trials sequentially, stopping as soon as the verdict is fixed.
    ///
    /// `trial` receives the trial index and must draw fresh randomness on
    /// each call.  The first error aborts the run.
    pub fn run<F>(&self, mut trial: F) -> Result<Outcome>
    where
        F: FnMut(usize) -> Result<bool>,
    {
        let mut accepted = 0usize;
        let mut trials_run = 0usize;
        for index in 0..self.trials {
            if trial(index)? {
                accepted += 1;
            }
            trials_run += 1;
            if self.decided(accepted, trials_run) {
                break;
            }
        }
        let outcome = Outcome {
            verdict: self.combine(accepted, trials_run),
            trials_run,
            accepted,
        };
        debug!(rule = ?self.rule, trials_run, accepted, verdict = outcome.verdict, "amplified run");
        Ok(outcome)
    }

    /// Runs every trial on the rayon pool.
    ///
    /// Trial `t` owns the generator `SimplePrng::for_trial(seed, t)`, so the
    /// outcome is reproducible for a given seed regardless of scheduling.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn run_parallel<F>(&self, seed: u64, trial: F) -> Result<Outcome>
    where
        F: Fn(&mut SimplePrng) -> Result<bool> + Sync,
    {
        let verdicts = (0..self.trials)
            .into_par_iter()
            .map(|t| {
                let mut rng = SimplePrng::for_trial(seed, t as u64);
                trial(&mut rng)
            })
            .collect::<Result<Vec<bool>>>()?;
        let accepted = verdicts.iter().filter(|&&v| v).count();
        let outcome = Outcome {
            verdict: self.combine(accepted, self.trials),
            trials_run: self.trials,
            accepted,
        };
        debug!(rule = ?self.rule, trials_run = self.trials, accepted, verdict = outcome.verdict, "parallel amplified run");
        Ok(outcome)
    }

    fn decided(&self, accepted: usize, run: usize) -> bool {
        let rejected = run - accepted;
        match self.rule {
            Combine::All => rejected > 0,
            Combine::Any => accepted > 0,
            Combine::Majority => {
                accepted > self.trials / 2 || rejected >= self.trials - self.trials / 2
            }
        }
    }

    fn combine(&self, accepted: usize, run: usize) -> bool {
        match self.rule {
            Combine::All => accepted == run,
            Combine::Any => accepted > 0,
            Combine::Majority => accepted > self.trials / 2,
        }
    }
}

/// Smallest `k` with `base_errorᵏ ≤ target_error`.
///
/// # Errors
///
/// [`EngineError::InvalidConfig`] unless `0 ≤ base_error < 1` and
/// `0 < target_error < 1`.
pub fn trials_for_error(base_error: f64, target_error: f64) -> Result<usize> {
    if !(0.0..1.0).contains(&base_error) {
        return Err(EngineError::InvalidConfig(format!(
            "per-trial error {base_error} must lie in [0, 1)"
        )));
    }
    if !(target_error > 0.0 && target_error < 1.0) {
        return Err(EngineError::InvalidConfig(format!(
            "target error {target_error} must lie in (0, 1)"
        )));
    }
    let mut trials = 1usize;
    let mut residual = base_error;
    while residual > target_error {
        residual *= base_error;
        trials += 1;
    }
    Ok(trials)
}

/// One-sided error left after `trials` independent repetitions combined
/// with [`Combine::All`] or [`Combine::Any`].
pub fn residual_error(base_error: f64, trials: usize) -> f64 {
    base_error.powi(trials.min(i32::MAX as usize) as i32)
}
