//! Exact determinants and ranks over `Z_p` by Gaussian elimination.
//!
//! Elimination reduces the matrix to upper-triangular form.  The first row
//! with a nonzero entry in the pivot column is chosen as pivot; each row swap
//! negates the running determinant, which in the field means replacing `d`
//! with `p − d`.  Division never occurs: the multiplier for row `i` is
//! `M[i][k] · M[k][k]⁻¹`, with the inverse from [`Field::inv`].
//!
//! A singular matrix yields the value `0`.  That is a result, not an error.

use crate::matrix::FieldMatrix;
use crate::Field;
use tracing::trace;

/// Computes `det(matrix) mod p` without touching the caller's matrix.
///
/// Elimination runs on a private copy.  The `0 × 0` matrix has determinant
/// `1`, the empty product.
///
/// # Examples
///
/// ```
/// use fingerprint_verify::{determinant, Field, SquareMatrix};
///
/// let field = Field::default();
/// let m = SquareMatrix::from_rows(vec![vec![0, 1], vec![1, 0]]).unwrap();
/// // One row swap: det = -1 ≡ p - 1.
/// assert_eq!(determinant(&field, &m), field.modulus() - 1);
/// ```
pub fn determinant(field: &Field, matrix: &FieldMatrix) -> u64 {
    into_determinant(field, matrix.clone())
}

/// Computes `det(matrix) mod p`, eliminating in place on the owned matrix.
///
/// The matrix is consumed, so the caller cannot observe the scratch state.
pub fn into_determinant(field: &Field, mut matrix: FieldMatrix) -> u64 {
    let n = matrix.dimension();
    canonicalize(field, &mut matrix);
    let rows = matrix.rows_mut();
    let mut det = 1u64;

    for k in 0..n {
        let Some(pivot) = (k..n).find(|&r| rows[r][k] != 0) else {
            trace!(column = k, "no pivot, matrix is singular");
            return 0;
        };
        if pivot != k {
            rows.swap(k, pivot);
            det = field.neg(det);
            trace!(column = k, pivot, "row swap");
        }
        let Ok(pivot_inv) = field.inv(rows[k][k]) else {
            return 0;
        };
        let (upper, lower) = rows.split_at_mut(k + 1);
        let pivot_row = &upper[k];
        for row in lower.iter_mut() {
            if row[k] == 0 {
                continue;
            }
            let factor = field.mul(row[k], pivot_inv);
            for j in k..n {
                row[j] = field.sub(row[j], field.mul(factor, pivot_row[j]));
            }
        }
    }

    (0..n).fold(det, |acc, i| field.mul(acc, rows[i][i]))
}

/// Computes the rank of `matrix` over `Z_p`.
///
/// Unlike [`determinant`] this keeps eliminating past empty pivot columns,
/// so it reports how far from invertible a singular matrix is.
pub fn rank(field: &Field, matrix: &FieldMatrix) -> usize {
    let mut scratch = matrix.clone();
    canonicalize(field, &mut scratch);
    let n = scratch.dimension();
    let rows = scratch.rows_mut();
    let mut rank = 0usize;

    for col in 0..n {
        let Some(pivot) = (rank..n).find(|&r| rows[r][col] != 0) else {
            continue;
        };
        rows.swap(rank, pivot);
        let Ok(pivot_inv) = field.inv(rows[rank][col]) else {
            continue;
        };
        let (upper, lower) = rows.split_at_mut(rank + 1);
        let pivot_row = &upper[rank];
        for row in lower.iter_mut() {
            if row[col] == 0 {
                continue;
            }
            let factor = field.mul(row[col], pivot_inv);
            for j in col..n {
                row[j] = field.sub(row[j], field.mul(factor, pivot_row[j]));
            }
        }
        rank += 1;
    }
    rank
}

fn canonicalize(field: &Field, matrix: &mut FieldMatrix) {
    for row in matrix.rows_mut() {
        for x in row.iter_mut() {
            *x = field.reduce(*x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::{IntMatrix, SquareMatrix};
    use proptest::prelude::*;

    fn int(rows: Vec<Vec<i64>>) -> IntMatrix {
        SquareMatrix::from_rows(rows).unwrap()
    }

    #[test]
    fn test_empty_matrix_has_unit_determinant() {
        let field = Field::default();
        let m = FieldMatrix::from_rows(Vec::new()).unwrap();
        assert_eq!(determinant(&field, &m), 1);
        assert_eq!(rank(&field, &m), 0);
    }

    #[test]
    fn test_classic_singular_matrix() {
        let field = Field::default();
        let a = int(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).to_field(&field);
        assert_eq!(determinant(&field, &a), 0);
        assert_eq!(rank(&field, &a), 2);
    }

    #[test]
    fn test_product_minus_itself_is_zero_matrix() {
        let field = Field::default();
        let a = int(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        let b = int(vec![vec![9, 8, 7], vec![6, 5, 4], vec![3, 2, 1]]);
        let c = a.multiply(&b).unwrap().to_field(&field);
        let ab = a.to_field(&field).multiply_mod(&field, &b.to_field(&field)).unwrap();
        let diff = ab.sub_mod(&field, &c).unwrap();
        assert_eq!(determinant(&field, &diff), 0);
        assert_eq!(rank(&field, &diff), 0);
    }

    #[test]
    fn test_negative_determinant_wraps() {
        let field = Field::default();
        // det = 1·4 − 2·3 = −2
        let m = int(vec![vec![1, 2], vec![3, 4]]).to_field(&field);
        assert_eq!(determinant(&field, &m), field.modulus() - 2);
    }

    #[test]
    fn test_pivot_swap_flips_sign() {
        let field = Field::default();
        // Zero in the leading position forces a swap; det = −2·3·5.
        let m = int(vec![vec![0, 2, 0], vec![3, 0, 0], vec![0, 0, 5]]).to_field(&field);
        assert_eq!(determinant(&field, &m), field.from_signed(-30));
    }

    #[test]
    fn test_repeated_swaps_restore_sign() {
        let field = Field::default();
        // Cyclic 3×3 permutation: two swaps, det = +2·3·5.
        let cyclic = int(vec![vec![0, 2, 0], vec![0, 0, 3], vec![5, 0, 0]]).to_field(&field);
        assert_eq!(determinant(&field, &cyclic), 30);
        // 4-cycle: three swaps, det = −1.
        let four = int(vec![
            vec![0, 1, 0, 0],
            vec![0, 0, 1, 0],
            vec![0, 0, 0, 1],
            vec![1, 0, 0, 0],
        ])
        .to_field(&field);
        assert_eq!(determinant(&field, &four), field.modulus() - 1);
        // Anti-diagonal 4×4: two swaps, det = +1.
        let reversal = SquareMatrix::from_fn(4, |i, j| u64::from(i + j == 3));
        assert_eq!(determinant(&field, &reversal), 1);
        assert_eq!(rank(&field, &reversal), 4);
    }

    #[test]
    fn test_input_not_mutated() {
        let field = Field::default();
        let m = int(vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 9]]).to_field(&field);
        let before = m.clone();
        let _ = determinant(&field, &m);
        let _ = rank(&field, &m);
        assert_eq!(m, before);
    }

    #[test]
    fn test_non_canonical_entries_are_reduced() {
        let field = Field::new(101);
        let m = FieldMatrix::from_rows(vec![vec![102, 0], vec![0, 203]]).unwrap();
        assert_eq!(determinant(&field, &m), 1);
    }

    fn small_matrix(n: usize) -> impl Strategy<Value = Vec<Vec<i64>>> {
        prop::collection::vec(prop::collection::vec(-50i64..50, n), n)
    }

    /// Mostly zeros, so leading entries are often empty and force swaps.
    fn sparse_matrix(n: usize) -> impl Strategy<Value = Vec<Vec<i64>>> {
        let entry = prop_oneof![3 => Just(0i64), 1 => -5i64..5];
        prop::collection::vec(prop::collection::vec(entry, n), n)
    }

    /// Cofactor expansion over the integers, reduced at the end.
    fn cofactor(m: &[Vec<i64>]) -> i128 {
        let n = m.len();
        if n == 0 {
            return 1;
        }
        let mut total = 0i128;
        for j in 0..n {
            let minor: Vec<Vec<i64>> = m[1..]
                .iter()
                .map(|row| {
                    row.iter()
                        .enumerate()
                        .filter(|(c, _)| *c != j)
                        .map(|(_, &v)| v)
                        .collect()
                })
                .collect();
            let sign = if j % 2 == 0 { 1 } else { -1 };
            total += sign * m[0][j] as i128 * cofactor(&minor);
        }
        total
    }

    proptest! {
        #[test]
        fn prop_matches_cofactor_expansion(rows in small_matrix(4)) {
            let field = Field::default();
            let m = int(rows.clone()).to_field(&field);
            let expected = cofactor(&rows);
            let p = field.modulus() as i128;
            let expected = (((expected % p) + p) % p) as u64;
            prop_assert_eq!(determinant(&field, &m), expected);
        }

        #[test]
        fn prop_sparse_matches_cofactor_expansion(rows in sparse_matrix(5)) {
            let field = Field::default();
            let m = int(rows.clone()).to_field(&field);
            let expected = field.from_signed(cofactor(&rows) as i64);
            prop_assert_eq!(determinant(&field, &m), expected);
        }

        #[test]
        fn prop_determinant_is_multiplicative(a in small_matrix(3), b in small_matrix(3)) {
            let field = Field::default();
            let a = int(a).to_field(&field);
            let b = int(b).to_field(&field);
            let ab = a.multiply_mod(&field, &b).unwrap();
            prop_assert_eq!(
                determinant(&field, &ab),
                field.mul(determinant(&field, &a), determinant(&field, &b))
            );
        }
    }
}
