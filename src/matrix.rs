//! Column-major matrix utilities
//!
//! Gate matrices arrive as flat column-major vectors written in the
//! caller's qubit order. The kernels enumerate offsets in ascending qubit
//! order, so the matrix is permuted once at the boundary to match.

use crate::error::{Result, StateError};
use num_complex::Complex64;
use smallvec::SmallVec;

/// Exchange the roles of two qubit bit positions inside a column-major
/// `dim x dim` matrix.
///
/// Simultaneously swaps every pair of row/column indices `(a, b)` that
/// differ exactly in bits `idx1` and `idx2`, with `idx1` set and `idx2`
/// clear in `a`.
pub(crate) fn swap_cols_and_rows(idx1: usize, idx2: usize, mat: &mut [Complex64], dim: usize) {
    let mask1 = 1usize << idx1;
    let mask2 = 1usize << idx2;

    for first in 0..dim {
        if first & mask1 != 0 && first & mask2 == 0 {
            let second = (first ^ mask1) | mask2;

            for i in 0..dim {
                mat.swap(i + dim * first, i + dim * second);
            }
            for i in 0..dim {
                mat.swap(first + dim * i, second + dim * i);
            }
        }
    }
}

/// Permute a column-major matrix written in qubit order `src` so that it
/// is indexed in the ascending order `sorted`.
///
/// Repeatedly finds the leftmost position where the current order
/// disagrees with `sorted`, locates the position holding the displaced
/// qubit, and swaps the two bit roles in the matrix.
///
/// # Errors
/// Returns [`StateError::MatrixPermutation`] if the displaced qubit is not
/// found among the later positions; this signals a caller bug (the two
/// orders do not hold the same qubits). Duplicate targets are rejected
/// upstream, before the matrix reaches this routine.
pub fn sort_matrix(src: &[usize], sorted: &[usize], mat: &[Complex64]) -> Result<Vec<Complex64>> {
    let dim = 1usize << src.len();
    let mut ret = mat.to_vec();
    let mut current: SmallVec<[usize; 8]> = SmallVec::from_slice(src);

    while current.as_slice() != sorted {
        let from = match current.iter().zip(sorted).position(|(c, s)| c != s) {
            Some(i) => i,
            None => break,
        };
        let to = (from + 1..current.len())
            .find(|&t| current[from] == sorted[t])
            .ok_or(StateError::MatrixPermutation {
                qubit: current[from],
            })?;

        swap_cols_and_rows(from, to, &mut ret, dim);
        current.swap(from, to);
    }

    Ok(ret)
}
