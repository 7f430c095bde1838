//! Single-qubit gate kernels
//!
//! All kernels walk the state with two nested strided loops: blocks of
//! `2 * stride` amplitudes, and within each block the pair
//! `(chunk[k], chunk[k | stride])` for `k < stride`, where
//! `stride = 2^qubit`.

use num_complex::Complex64;

use super::for_each_chunk;

/// Apply a dense 2x2 column-major matrix to `qubit`
pub fn apply_matrix(state: &mut [Complex64], qubit: usize, mat: &[Complex64], parallel: bool) {
    debug_assert_eq!(mat.len(), 4);
    let stride = 1usize << qubit;
    let m = [mat[0], mat[1], mat[2], mat[3]];

    for_each_chunk(state, stride << 1, parallel, move |chunk| {
        for k in 0..stride {
            let cache0 = chunk[k];
            let cache1 = chunk[k | stride];
            chunk[k] = m[0] * cache0 + m[2] * cache1;
            chunk[k | stride] = m[1] * cache0 + m[3] * cache1;
        }
    });
}

/// Apply a diagonal gate given as its two diagonal entries
pub fn apply_diagonal(state: &mut [Complex64], qubit: usize, diag: &[Complex64], parallel: bool) {
    debug_assert_eq!(diag.len(), 2);
    let stride = 1usize << qubit;
    let d = [diag[0], diag[1]];

    for_each_chunk(state, stride << 1, parallel, move |chunk| {
        for k in 0..stride {
            chunk[k] *= d[0];
            chunk[k | stride] *= d[1];
        }
    });
}

/// Pauli-X: exchange each amplitude pair
pub fn apply_x(state: &mut [Complex64], qubit: usize, parallel: bool) {
    let stride = 1usize << qubit;
    for_each_chunk(state, stride << 1, parallel, move |chunk| {
        for k in 0..stride {
            chunk.swap(k, k | stride);
        }
    });
}

/// Pauli-Y: the pair `(s0, s1)` becomes `(-i*s1, i*s0)`
pub fn apply_y(state: &mut [Complex64], qubit: usize, parallel: bool) {
    let stride = 1usize << qubit;
    let i = Complex64::new(0.0, 1.0);
    for_each_chunk(state, stride << 1, parallel, move |chunk| {
        for k in 0..stride {
            let cache = chunk[k];
            chunk[k] = -i * chunk[k | stride];
            chunk[k | stride] = i * cache;
        }
    });
}

/// Pauli-Z: negate the member of each pair with the target bit set
pub fn apply_z(state: &mut [Complex64], qubit: usize, parallel: bool) {
    let stride = 1usize << qubit;
    for_each_chunk(state, stride << 1, parallel, move |chunk| {
        for k in 0..stride {
            chunk[k | stride] = -chunk[k | stride];
        }
    });
}
