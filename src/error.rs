//! Error taxonomy shared by every verifier in the crate.
//!
//! A zero determinant is *not* represented here: singular matrices are a
//! meaningful computational outcome and surface as the value `0`.

use thiserror::Error;

/// Errors raised when a verification call cannot run on its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("dimension mismatch (expected {expected}, got {actual})")]
    /// Matrices or vectors of incompatible size were combined.
    DimensionMismatch {
        /// Dimension required by the operation.
        expected: usize,
        /// Dimension actually supplied.
        actual: usize,
    },
    #[error("ragged matrix: row {row} has length {actual}, expected {expected}")]
    /// A matrix row does not match the square dimension.
    RaggedMatrix {
        /// Index of the offending row.
        row: usize,
        /// Required row length.
        expected: usize,
        /// Observed row length.
        actual: usize,
    },
    #[error("attempted to invert zero modulo p")]
    /// Modular inverse of the additive identity.
    DivisionByZero,
    #[error("pattern must contain at least one symbol")]
    /// The rolling-hash matcher was handed an empty pattern.
    EmptyPattern,
    #[error("symbol {symbol} at position {position} is outside the alphabet of size {radix}")]
    /// A text or pattern symbol does not belong to the configured alphabet.
    SymbolOutOfRange {
        /// Offset of the symbol in its sequence.
        position: usize,
        /// Offending symbol value.
        symbol: u64,
        /// Alphabet size `d`.
        radix: u64,
    },
    #[error("adjacency entry ({row}, {col}) is {value}, expected 0 or 1")]
    /// A bipartite adjacency matrix contained a non-binary entry.
    NonBinaryEntry {
        /// Row (left vertex) of the entry.
        row: usize,
        /// Column (right vertex) of the entry.
        col: usize,
        /// Offending value.
        value: u8,
    },
    #[error("integer accumulation overflowed i128")]
    /// Wide integer accumulation in a matrix-vector product overflowed.
    ArithmeticOverflow,
    #[error("amplification requires at least one trial")]
    /// A repeated-trial combinator was asked to run zero trials.
    InvalidTrials,
    #[error("invalid configuration: {0}")]
    /// Configuration parsing or validation failure.
    InvalidConfig(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
