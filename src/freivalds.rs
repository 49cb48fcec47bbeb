//! Freivalds' randomized check of matrix products.
//!
//! To test `A·B = C` for `n × n` integer matrices, draw `r ∈ {0,1}ⁿ` and
//! compare `A·(B·r)` with `C·r`.  Three matrix-vector products cost `O(n²)`;
//! the product `A·B` is never formed.
//!
//! The check works over the integers, not the field: a correct `C` always
//! passes, and an incorrect `C` passes with probability at most `1/2` over
//! the choice of `r`.  Independent repetitions combined with
//! [`Combine::All`](crate::Combine::All) drive the false-accept rate below
//! `2⁻ᵏ` after `k` trials.

use crate::amplify::{trials_for_error, Amplifier, Combine, Outcome};
use crate::error::Result;
use crate::matrix::IntMatrix;
use crate::sampling;
use rand::Rng;
use tracing::{debug, instrument};

/// Upper bound on the probability that a single trial accepts a wrong `C`.
pub const SINGLE_TRIAL_ERROR: f64 = 0.5;

fn ensure_dimensions(a: &IntMatrix, b: &IntMatrix, c: &IntMatrix) -> Result<()> {
    a.ensure_same_dimension(b)?;
    a.ensure_same_dimension(c)
}

fn check_with_vector(a: &IntMatrix, b: &IntMatrix, c: &IntMatrix, r: &[i128]) -> Result<bool> {
    let br = b.mul_vec(r)?;
    let abr = a.mul_vec(&br)?;
    let cr = c.mul_vec(r)?;
    Ok(abr == cr)
}

/// Runs one Freivalds trial with a fresh random 0/1 vector.
///
/// # Errors
///
/// [`EngineError::DimensionMismatch`](crate::EngineError::DimensionMismatch)
/// if the three matrices differ in size, and
/// [`EngineError::ArithmeticOverflow`](crate::EngineError::ArithmeticOverflow)
/// if integer accumulation leaves `i128`.
pub fn verify_once<R: Rng + ?Sized>(
    a: &IntMatrix,
    b: &IntMatrix,
    c: &IntMatrix,
    rng: &mut R,
) -> Result<bool> {
    ensure_dimensions(a, b, c)?;
    let r: Vec<i128> = sampling::random_bits(a.dimension(), rng)
        .into_iter()
        .map(i128::from)
        .collect();
    check_with_vector(a, b, c, &r)
}

/// Runs `trials` independent trials and accepts only if all of them pass.
///
/// Stops at the first failing trial: a single rejection proves `A·B ≠ C`.
#[instrument(level = "debug", skip_all, fields(n = a.dimension(), trials = trials))]
pub fn verify<R: Rng + ?Sized>(
    a: &IntMatrix,
    b: &IntMatrix,
    c: &IntMatrix,
    trials: usize,
    rng: &mut R,
) -> Result<Outcome> {
    ensure_dimensions(a, b, c)?;
    let amplifier = Amplifier::new(trials, Combine::All)?;
    let outcome = amplifier.run(|_| verify_once(a, b, c, rng))?;
    debug!(verdict = outcome.verdict, trials_run = outcome.trials_run, "freivalds finished");
    Ok(outcome)
}

/// Chooses the trial count from `target_error` (`k = ⌈log₂(1/target)⌉`)
/// and runs [`verify`].  The returned outcome reports the trials used.
pub fn verify_with_confidence<R: Rng + ?Sized>(
    a: &IntMatrix,
    b: &IntMatrix,
    c: &IntMatrix,
    target_error: f64,
    rng: &mut R,
) -> Result<Outcome> {
    let trials = trials_for_error(SINGLE_TRIAL_ERROR, target_error)?;
    verify(a, b, c, trials, rng)
}

/// Parallel variant of [`verify`]: all trials run on the rayon pool, each
/// with its own generator derived from `seed`.
#[cfg(not(target_arch = "wasm32"))]
pub fn verify_parallel(
    a: &IntMatrix,
    b: &IntMatrix,
    c: &IntMatrix,
    trials: usize,
    seed: u64,
) -> Result<Outcome> {
    ensure_dimensions(a, b, c)?;
    Amplifier::new(trials, Combine::All)?.run_parallel(seed, |rng| verify_once(a, b, c, rng))
}
