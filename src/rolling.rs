//! Karp–Rabin substring matching with polynomial fingerprints.
//!
//! A length-`m` window `c₀ … c_{m-1}` is fingerprinted as
//!
//! ```text
//! H = c₀·d^(m-1) + c₁·d^(m-2) + ⋯ + c_{m-1}   (mod p)
//! ```
//!
//! where `d` is the evaluation point (by default the alphabet size).  The
//! pattern fingerprint and the first window are computed once in `O(m)`;
//! every later window is derived from its predecessor in `O(1)` via
//!
//! ```text
//! H' = d·(H − c_j·d^(m-1)) + c_{j+m}   (mod p)
//! ```
//!
//! Equal content always yields equal fingerprints, so neither mode can miss
//! an occurrence.  [`MatchMode::MonteCarlo`] trusts every fingerprint hit and
//! may report false positives; [`MatchMode::LasVegas`] re-checks each hit
//! symbol by symbol and reports exactly the true occurrences.
//!
//! An empty pattern is rejected with [`EngineError::EmptyPattern`] rather
//! than matching at every offset.

use crate::error::{EngineError, Result};
use crate::{sampling, Field};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

/// Alphabet size used for byte strings.
pub const BYTE_RADIX: u64 = 256;

/// How fingerprint hits are turned into reported matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Report every fingerprint hit.  One-sided error: false positives only.
    MonteCarlo,
    /// Verify every fingerprint hit before reporting.  Never wrong.
    #[default]
    LasVegas,
}

/// Computes the polynomial fingerprint of `symbols` by Horner's rule.
pub fn fingerprint(field: &Field, base: u64, symbols: impl IntoIterator<Item = u64>) -> u64 {
    symbols
        .into_iter()
        .fold(0u64, |acc, c| field.add(field.mul(acc, base), c))
}

/// Fingerprint of a window that slides one symbol at a time.
#[derive(Debug, Clone)]
pub struct RollingHash {
    field: Field,
    base: u64,
    len: usize,
    /// `base^(len-1)`, the weight of the outgoing symbol.
    lead: u64,
    value: u64,
}

impl RollingHash {
    /// Fingerprints the initial window in `O(len)`.
    pub fn new(field: Field, base: u64, window: impl IntoIterator<Item = u64>) -> Self {
        let mut len = 0usize;
        let value = fingerprint(&field, base, window.into_iter().inspect(|_| len += 1));
        let lead = field.pow(base, len.saturating_sub(1) as u64);
        Self {
            field,
            base,
            len,
            lead,
            value,
        }
    }

    /// Current fingerprint.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Window length `m`.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the window holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops `outgoing` from the front of the window and appends `incoming`.
    pub fn roll(&mut self, outgoing: u64, incoming: u64) {
        debug_assert!(self.len > 0, "cannot roll an empty window");
        let f = &self.field;
        let stripped = f.sub(self.value, f.mul(outgoing, self.lead));
        self.value = f.add(f.mul(self.base, stripped), incoming);
    }
}

/// Outcome of one scan, with counters describing how it went.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Reported zero-based match offsets, ascending.
    pub offsets: Vec<usize>,
    /// Number of windows whose fingerprint was compared.
    pub windows: usize,
    /// Windows whose fingerprint equalled the pattern's.
    pub hash_hits: usize,
    /// Hits discarded by Las Vegas verification (fingerprint collisions).
    pub rejected: usize,
}

/// Karp–Rabin matcher over a fixed alphabet `[0, radix)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Matcher {
    field: Field,
    radix: u64,
    base: u64,
    mode: MatchMode,
}

impl Matcher {
    /// Builds a matcher over [`Field::default`] evaluating at `d = radix`.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] unless `2 <= radix < p`.
    pub fn new(radix: u64, mode: MatchMode) -> Result<Self> {
        Self::with_field(Field::default(), radix, mode)
    }

    /// Builds a matcher over an explicit field, evaluating at `d = radix`.
    ///
    /// The alphabet must fit below the modulus: with `radix >= p` the
    /// symbols `c` and `c + p` share every fingerprint.
    pub fn with_field(field: Field, radix: u64, mode: MatchMode) -> Result<Self> {
        check_radix(&field, radix)?;
        Ok(Self {
            field,
            radix,
            base: radix,
            mode,
        })
    }

    /// Builds a matcher whose evaluation point is drawn uniformly from
    /// `[1, p-1]`.
    ///
    /// Two distinct windows then collide with probability at most
    /// `(m-1)/(p-1)` over the draw, because their difference is a nonzero
    /// polynomial of degree below `m`.
    pub fn with_random_base<R: Rng + ?Sized>(
        field: Field,
        radix: u64,
        mode: MatchMode,
        rng: &mut R,
    ) -> Result<Self> {
        check_radix(&field, radix)?;
        let base = sampling::random_nonzero_element(&field, rng);
        Ok(Self {
            field,
            radix,
            base,
            mode,
        })
    }

    /// The field fingerprints live in.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Alphabet size `d`.
    pub fn radix(&self) -> u64 {
        self.radix
    }

    /// Evaluation point of the fingerprint polynomial.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Current matching mode.
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Returns the starting offsets of `pattern` in `text`.
    pub fn find<T>(&self, text: &[T], pattern: &[T]) -> Result<Vec<usize>>
    where
        T: Copy + Into<u64>,
    {
        Ok(self.scan(text, pattern)?.offsets)
    }

    /// Byte-string convenience around [`Matcher::find`].
    pub fn find_str(&self, text: &str, pattern: &str) -> Result<Vec<usize>> {
        self.find(text.as_bytes(), pattern.as_bytes())
    }

    /// Scans `text` for `pattern` and reports offsets with scan counters.
    ///
    /// A pattern longer than the text yields an empty report without
    /// scanning.
    ///
    /// # Errors
    ///
    /// [`EngineError::EmptyPattern`] for an empty pattern, and
    /// [`EngineError::SymbolOutOfRange`] if a symbol is not below `radix`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(text_len = text.len(), pattern_len = pattern.len(), mode = ?self.mode)
    )]
    pub fn scan<T>(&self, text: &[T], pattern: &[T]) -> Result<ScanReport>
    where
        T: Copy + Into<u64>,
    {
        let n = text.len();
        let m = pattern.len();
        if m == 0 {
            return Err(EngineError::EmptyPattern);
        }
        self.check_alphabet(pattern)?;
        if m > n {
            return Ok(ScanReport::default());
        }
        self.check_alphabet(text)?;

        let target = fingerprint(
            &self.field,
            self.base,
            pattern.iter().map(|&c| Into::<u64>::into(c)),
        );
        let mut window = RollingHash::new(
            self.field,
            self.base,
            text[..m].iter().map(|&c| Into::<u64>::into(c)),
        );
        let mut report = ScanReport::default();

        for j in 0..=n - m {
            report.windows += 1;
            if window.value() == target {
                report.hash_hits += 1;
                match self.mode {
                    MatchMode::MonteCarlo => report.offsets.push(j),
                    MatchMode::LasVegas => {
                        if symbols_equal(&text[j..j + m], pattern) {
                            report.offsets.push(j);
                        } else {
                            report.rejected += 1;
                            trace!(offset = j, "fingerprint collision rejected");
                        }
                    }
                }
            }
            if j < n - m {
                window.roll(text[j].into(), text[j + m].into());
            }
        }

        debug!(
            matches = report.offsets.len(),
            hash_hits = report.hash_hits,
            rejected = report.rejected,
            "scan finished"
        );
        Ok(report)
    }

    /// Expected number of false positives for a Monte Carlo scan of a
    /// length-`n` text with a length-`m` pattern when the evaluation point
    /// is random: `(n-m+1)·(m-1)/(p-1)`.
    pub fn false_positive_bound(&self, n: usize, m: usize) -> f64 {
        if m == 0 || m > n {
            return 0.0;
        }
        let windows = (n - m + 1) as f64;
        windows * (m - 1) as f64 / (self.field.modulus() - 1) as f64
    }

    fn check_alphabet<T: Copy + Into<u64>>(&self, symbols: &[T]) -> Result<()> {
        match symbols
            .iter()
            .map(|&c| Into::<u64>::into(c))
            .enumerate()
            .find(|&(_, c)| c >= self.radix)
        {
            Some((position, symbol)) => Err(EngineError::SymbolOutOfRange {
                position,
                symbol,
                radix: self.radix,
            }),
            None => Ok(()),
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self {
            field: Field::default(),
            radix: BYTE_RADIX,
            base: BYTE_RADIX,
            mode: MatchMode::default(),
        }
    }
}

fn check_radix(field: &Field, radix: u64) -> Result<()> {
    if radix < 2 || radix >= field.modulus() {
        return Err(EngineError::InvalidConfig(format!(
            "radix {radix} must lie in [2, {})",
            field.modulus()
        )));
    }
    Ok(())
}

fn symbols_equal<T: Copy + Into<u64>>(a: &[T], b: &[T]) -> bool {
    a.iter().zip(b).all(|(&x, &y)| Into::<u64>::into(x) == Into::<u64>::into(y))
}

/// Brute-force `O(n·m)` matcher used as ground truth.
///
/// Shares the empty-pattern policy of [`Matcher`].
pub fn naive_find<T: PartialEq>(text: &[T], pattern: &[T]) -> Result<Vec<usize>> {
    if pattern.is_empty() {
        return Err(EngineError::EmptyPattern);
    }
    if pattern.len() > text.len() {
        return Ok(Vec::new());
    }
    Ok(text
        .windows(pattern.len())
        .enumerate()
        .filter(|(_, w)| *w == pattern)
        .map(|(j, _)| j)
        .collect())
}
