//! Runtime-K gate kernels
//!
//! Fallback paths for target counts the fixed-K kernels do not cover.
//! The dense kernel reuses per-chunk scratch buffers for the footprint
//! offsets and cached amplitudes, so the hot loop does not allocate.

use num_complex::Complex64;
use rayon::prelude::*;

use super::for_each_chunk;
use crate::indexing::indexes_into;

/// Apply a dense `2^K x 2^K` column-major matrix in the caller's qubit
/// order. `qubits_sorted` must be the ascending copy of `qubits`.
pub fn apply_matrix_dynamic(
    state: &mut [Complex64],
    qubits: &[usize],
    qubits_sorted: &[usize],
    mat: &[Complex64],
    parallel: bool,
) {
    let n = qubits.len();
    let dim = 1usize << n;
    debug_assert_eq!(mat.len(), dim * dim);

    let block = 1usize << (qubits_sorted[n - 1] + 1);
    let per_block = block >> n;

    for_each_chunk(state, block, parallel, move |chunk| {
        let mut inds = vec![0usize; dim];
        let mut cache = vec![Complex64::new(0.0, 0.0); dim];
        for k in 0..per_block {
            indexes_into(qubits, qubits_sorted, k, &mut inds);
            for i in 0..dim {
                cache[i] = chunk[inds[i]];
                chunk[inds[i]] = Complex64::new(0.0, 0.0);
            }
            for i in 0..dim {
                for j in 0..dim {
                    chunk[inds[i]] += mat[i + dim * j] * cache[j];
                }
            }
        }
    });
}

/// Apply a diagonal gate given as its `2^K` diagonal entries.
///
/// Each amplitude is scaled by the entry selected by gathering the bits
/// of its index at the target positions, so no footprint enumeration is
/// needed.
pub fn apply_diagonal_dynamic(
    state: &mut [Complex64],
    qubits: &[usize],
    diag: &[Complex64],
    parallel: bool,
) {
    debug_assert_eq!(diag.len(), 1 << qubits.len());

    if parallel {
        state.par_iter_mut().enumerate().for_each(|(i, amp)| {
            *amp *= diag[diag_index(i, qubits)];
        });
    } else {
        for (i, amp) in state.iter_mut().enumerate() {
            *amp *= diag[diag_index(i, qubits)];
        }
    }
}

#[inline]
fn diag_index(state_index: usize, qubits: &[usize]) -> usize {
    let mut m = 0usize;
    for (bit, &q) in qubits.iter().enumerate() {
        if state_index >> q & 1 == 1 {
            m |= 1 << bit;
        }
    }
    m
}
