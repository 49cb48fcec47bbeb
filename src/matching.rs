//! Randomized perfect-matching test for bipartite graphs.
//!
//! The Edmonds matrix of a bipartite graph with parts `U = {u₀…u_{n-1}}` and
//! `V = {v₀…v_{n-1}}` holds an indeterminate `x_ij` wherever `(u_i, v_j)` is an
//! edge and `0` elsewhere.  Its determinant is a nonzero polynomial exactly
//! when a perfect matching exists.  Instead of expanding the polynomial we
//! substitute independent uniform values from `[1, p-1]` and evaluate the
//! determinant over `Z_p`:
//!
//! * no perfect matching: the polynomial is identically zero, so every
//!   instantiation gives `0` and the test never reports a matching;
//! * a perfect matching: the polynomial has degree `n`, so by Schwartz–Zippel
//!   a random instantiation vanishes with probability at most `n/p`.
//!
//! Every trial draws a fresh instance, and instances are discarded after one
//! determinant.

use crate::amplify::{Amplifier, Combine, Outcome};
use crate::determinant::{into_determinant, rank};
use crate::error::{EngineError, Result};
use crate::matrix::{FieldMatrix, SquareMatrix};
use crate::{sampling, Field};
use rand::Rng;
use tracing::{debug, instrument};

/// A bipartite graph with `n` left and `n` right vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BipartiteGraph {
    adjacency: SquareMatrix<u8>,
}

impl BipartiteGraph {
    /// Builds a graph from a 0/1 adjacency matrix; `rows[i][j] == 1` means
    /// an edge between left vertex `i` and right vertex `j`.
    ///
    /// # Errors
    ///
    /// [`EngineError::RaggedMatrix`] for a non-square matrix and
    /// [`EngineError::NonBinaryEntry`] for entries other than 0 and 1.
    pub fn from_adjacency(rows: Vec<Vec<u8>>) -> Result<Self> {
        let adjacency = SquareMatrix::from_rows(rows)?;
        for (row, entries) in adjacency.rows().iter().enumerate() {
            if let Some((col, &value)) = entries.iter().enumerate().find(|&(_, &v)| v > 1) {
                return Err(EngineError::NonBinaryEntry { row, col, value });
            }
        }
        Ok(Self { adjacency })
    }

    /// Builds a graph on `n + n` vertices from `(left, right)` edge pairs.
    ///
    /// # Errors
    ///
    /// [`EngineError::DimensionMismatch`] if an endpoint is `>= n`.
    pub fn from_edges(n: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut rows = vec![vec![0u8; n]; n];
        for &(u, v) in edges {
            let far = u.max(v);
            if far >= n {
                return Err(EngineError::DimensionMismatch {
                    expected: n,
                    actual: far + 1,
                });
            }
            rows[u][v] = 1;
        }
        Self::from_adjacency(rows)
    }

    /// Number of vertices on each side.
    pub fn size(&self) -> usize {
        self.adjacency.dimension()
    }

    /// Whether `(u_i, v_j)` is an edge.
    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        *self.adjacency.get(i, j) == 1
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency
            .rows()
            .iter()
            .map(|row| row.iter().filter(|&&e| e == 1).count())
            .sum()
    }

    /// Samples a random instantiation of the Edmonds matrix: a fresh nonzero
    /// field element per edge, `0` per non-edge.
    pub fn edmonds_instance<R: Rng + ?Sized>(&self, field: &Field, rng: &mut R) -> FieldMatrix {
        SquareMatrix::from_fn(self.size(), |i, j| {
            if self.has_edge(i, j) {
                sampling::random_nonzero_element(field, rng)
            } else {
                0
            }
        })
    }

    /// One trial over the default field.  `false` is always correct; `true`
    /// is wrong with probability at most `n/p`.
    ///
    /// The empty graph (`n = 0`) has the empty matching, and its `0 × 0`
    /// Edmonds matrix has determinant `1`, so it reports `true`.
    pub fn has_perfect_matching<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        self.has_perfect_matching_in(&Field::default(), rng)
    }

    /// One trial over an explicit field.
    pub fn has_perfect_matching_in<R: Rng + ?Sized>(&self, field: &Field, rng: &mut R) -> bool {
        let instance = self.edmonds_instance(field, rng);
        into_determinant(field, instance) != 0
    }

    /// Repeats the single trial up to `trials` times and reports a matching
    /// as soon as one instance has a nonzero determinant.
    ///
    /// A graph with a perfect matching is missed with probability at most
    /// `(n/p)^trials`.
    #[instrument(level = "debug", skip_all, fields(n = self.size(), trials = trials))]
    pub fn has_perfect_matching_amplified<R: Rng + ?Sized>(
        &self,
        field: &Field,
        trials: usize,
        rng: &mut R,
    ) -> Result<Outcome> {
        let outcome = Amplifier::new(trials, Combine::Any)?
            .run(|_| Ok(self.has_perfect_matching_in(field, rng)))?;
        debug!(verdict = outcome.verdict, trials_run = outcome.trials_run, "matching test finished");
        Ok(outcome)
    }

    /// Upper bound `n/p` on the chance one trial misses an existing matching.
    pub fn single_trial_error(&self, field: &Field) -> f64 {
        self.size() as f64 / field.modulus() as f64
    }

    /// Estimates the size of a maximum matching as the rank of a random
    /// Edmonds instance.  Never overestimates; exact with probability at
    /// least `1 − n/p`.
    pub fn estimate_matching_size<R: Rng + ?Sized>(&self, field: &Field, rng: &mut R) -> usize {
        rank(field, &self.edmonds_instance(field, rng))
    }

    /// Size of a maximum matching by augmenting paths, `O(n³)`.
    ///
    /// Deterministic; used as ground truth for the randomized test.
    pub fn max_matching_size(&self) -> usize {
        let n = self.size();
        let mut match_right: Vec<Option<usize>> = vec![None; n];
        let mut size = 0;
        for u in 0..n {
            let mut seen = vec![false; n];
            if self.augment(u, &mut seen, &mut match_right) {
                size += 1;
            }
        }
        size
    }

    fn augment(&self, u: usize, seen: &mut [bool], match_right: &mut [Option<usize>]) -> bool {
        for v in 0..self.size() {
            if !self.has_edge(u, v) || seen[v] {
                continue;
            }
            seen[v] = true;
            let free = match match_right[v] {
                None => true,
                Some(w) => self.augment(w, seen, match_right),
            };
            if free {
                match_right[v] = Some(u);
                return true;
            }
        }
        false
    }
}

/// Tests a 0/1 adjacency matrix for a perfect matching with a single
/// randomized trial over the default field.
pub fn has_perfect_matching<R: Rng + ?Sized>(adjacency: &[Vec<u8>], rng: &mut R) -> Result<bool> {
    let graph = BipartiteGraph::from_adjacency(adjacency.to_vec())?;
    Ok(graph.has_perfect_matching(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimplePrng;
    use proptest::prelude::*;

    fn with_matching() -> Vec<Vec<u8>> {
        vec![vec![1, 1, 0], vec![0, 0, 1], vec![0, 1, 1]]
    }

    fn hall_violation() -> Vec<Vec<u8>> {
        vec![vec![0, 1, 0], vec![0, 1, 0], vec![1, 0, 1]]
    }

    #[test]
    fn test_graph_with_matching_detected() {
        let mut rng = SimplePrng::new(10);
        let trials = 2_000;
        let hits = (0..trials)
            .filter(|_| has_perfect_matching(&with_matching(), &mut rng).unwrap())
            .count();
        // Miss probability per trial is at most 3/p ≈ 3e-9.
        assert_eq!(hits, trials);
    }

    #[test]
    fn test_hall_violation_never_reports_matching() {
        let graph = BipartiteGraph::from_adjacency(hall_violation()).unwrap();
        let field = Field::default();
        let mut rng = SimplePrng::new(11);
        for _ in 0..2_000 {
            let instance = graph.edmonds_instance(&field, &mut rng);
            assert_eq!(into_determinant(&field, instance), 0);
        }
        let outcome = graph.has_perfect_matching_amplified(&field, 50, &mut rng).unwrap();
        assert!(!outcome.verdict);
        assert_eq!(outcome.trials_run, 50);
        assert_eq!(graph.max_matching_size(), 2);
    }

    #[test]
    fn test_instance_shape() {
        let graph = BipartiteGraph::from_adjacency(with_matching()).unwrap();
        let field = Field::default();
        let mut rng = SimplePrng::new(12);
        let instance = graph.edmonds_instance(&field, &mut rng);
        for i in 0..3 {
            for j in 0..3 {
                let x = *instance.get(i, j);
                assert_eq!(x != 0, graph.has_edge(i, j));
                assert!(field.is_canonical(x));
            }
        }
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_invalid_adjacency() {
        assert_eq!(
            BipartiteGraph::from_adjacency(vec![vec![1, 2], vec![0, 1]]),
            Err(EngineError::NonBinaryEntry {
                row: 0,
                col: 1,
                value: 2
            })
        );
        assert!(matches!(
            BipartiteGraph::from_adjacency(vec![vec![1, 0]]),
            Err(EngineError::RaggedMatrix { .. })
        ));
        assert_eq!(
            BipartiteGraph::from_edges(2, &[(0, 2)]),
            Err(EngineError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_empty_graph_has_empty_matching() {
        let graph = BipartiteGraph::from_edges(0, &[]).unwrap();
        let mut rng = SimplePrng::new(13);
        assert!(graph.has_perfect_matching(&mut rng));
        assert_eq!(graph.max_matching_size(), 0);
    }

    #[test]
    fn test_small_field_error_is_one_sided() {
        // With p = 3 a matching graph is sometimes missed, but a graph
        // without one is never reported.
        let field = Field::new(3);
        let yes = BipartiteGraph::from_adjacency(vec![vec![1, 1], vec![1, 1]]).unwrap();
        let no = BipartiteGraph::from_adjacency(vec![vec![1, 1], vec![0, 0]]).unwrap();
        let mut rng = SimplePrng::new(14);
        let mut misses = 0;
        for _ in 0..1_000 {
            if !yes.has_perfect_matching_in(&field, &mut rng) {
                misses += 1;
            }
            assert!(!no.has_perfect_matching_in(&field, &mut rng));
        }
        assert!(misses > 0);
        let amplified = yes.has_perfect_matching_amplified(&field, 40, &mut rng).unwrap();
        assert!(amplified.verdict);
    }

    #[test]
    fn test_matching_size_estimate() {
        let graph = BipartiteGraph::from_adjacency(hall_violation()).unwrap();
        let mut rng = SimplePrng::new(15);
        assert_eq!(graph.estimate_matching_size(&Field::default(), &mut rng), 2);
        assert!(graph.single_trial_error(&Field::default()) < 1e-8);
    }

    proptest! {
        #[test]
        fn prop_agrees_with_augmenting_paths(
            n in 1usize..6,
            bits in prop::collection::vec(any::<bool>(), 36),
            seed in any::<u64>(),
        ) {
            let rows: Vec<Vec<u8>> = (0..n)
                .map(|i| (0..n).map(|j| u8::from(bits[i * 6 + j])).collect())
                .collect();
            let graph = BipartiteGraph::from_adjacency(rows).unwrap();
            let mut rng = SimplePrng::new(seed);
            let exact = graph.max_matching_size() == n;
            let outcome = graph
                .has_perfect_matching_amplified(&Field::default(), 3, &mut rng)
                .unwrap();
            prop_assert_eq!(outcome.verdict, exact);
        }
    }
}
