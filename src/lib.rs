#![deny(missing_docs)]

//! The design philosophy underlying `fingerprint_verify` is pedagogical, yet mathematically rigorous.
//! Each module encapsulates one randomized verification idea, illustrating how a cheap
//! computation over a prime field can stand in for an expensive exact one.
//!
//! This crate aspires to bridge gaps between theoretical exposition and practical engineering,
//! serving both as a didactic resource and a foundation for probabilistic checking.
//! # fingerprint_verify
//!
//! **fingerprint_verify** reduces three exact computations to cheap
//! computations over the prime field `Z_p`, `p = 10⁹ + 7`, trading certainty
//! for a one-sided error that is stated up front and driven down by
//! repetition.
//!
//! ## Features
//!
//! * **Finite field arithmetic** via the [`Field`] type.
//! * **Karp–Rabin matching**: the [`rolling`](rolling/index.html) module
//!   fingerprints every window of a text in `O(1)` amortised time, in a
//!   Monte Carlo mode (may report false positives) or a Las Vegas mode
//!   (verifies every fingerprint hit).
//! * **Freivalds' check**: the [`freivalds`](freivalds/index.html) module
//!   tests `A·B = C` in `O(n²)` per trial with false-accept probability at
//!   most `1/2`.
//! * **Modular determinants**: the [`determinant`](determinant/index.html)
//!   module runs Gaussian elimination over `Z_p` with sign tracking.
//! * **Perfect matchings**: the [`matching`](matching/index.html) module
//!   evaluates a random instance of the Edmonds matrix, which is singular for
//!   every instance when no perfect matching exists.
//! * **Amplification**: the [`amplify`](amplify/index.html) module repeats
//!   any single-trial check and combines the verdicts.
//!
//! Randomness always comes from a caller-owned `rand::Rng`; the crate keeps
//! no global generator.  [`SimplePrng`] gives reproducible streams.
//!
//! ## Usage
//!
//! ```rust
//! use fingerprint_verify::{freivalds, IntMatrix, SimplePrng};
//!
//! let a = IntMatrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
//! let b = IntMatrix::from_rows(vec![vec![5, 6], vec![7, 8]]).unwrap();
//! let c = IntMatrix::from_rows(vec![vec![19, 22], vec![43, 50]]).unwrap();
//!
//! let mut rng = SimplePrng::new(2024);
//! let outcome = freivalds::verify(&a, &b, &c, 20, &mut rng).unwrap();
//! assert!(outcome.verdict);
//! ```

pub mod amplify;
pub mod config;
pub mod determinant;
mod error;
mod field;
pub mod freivalds;
pub mod matching;
mod matrix;
mod prng;
pub mod rolling;
pub mod sampling;

pub use amplify::{residual_error, trials_for_error, Amplifier, Combine, Outcome};
pub use config::EngineConfig;
pub use determinant::{determinant, into_determinant, rank};
pub use error::{EngineError, Result};
pub use field::{Field, MODULUS};
pub use matching::{has_perfect_matching, BipartiteGraph};
pub use matrix::{FieldMatrix, IntMatrix, SquareMatrix};
pub use prng::SimplePrng;
pub use rolling::{fingerprint, naive_find, MatchMode, Matcher, RollingHash, ScanReport};
