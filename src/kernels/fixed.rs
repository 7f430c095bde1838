//! Fixed-K dense gate kernels for K in {2, 3, 4, 5}
//!
//! Each optimized kernel materializes a compile-time-sized mask table
//! from the sorted target strides and walks a loop nest of depth K + 1
//! (the outermost level is the block fan-out), so the dimension and the
//! inner multiply are constants the compiler can unroll.
//!
//! The matrix handed to an optimized kernel is permuted once into sorted
//! qubit order; the unoptimized kernels instead enumerate offsets in the
//! caller's qubit order and use the matrix as given.

use num_complex::Complex64;

use super::for_each_chunk;
use crate::error::Result;
use crate::indexing::indexes;
use crate::matrix::sort_matrix;

/// Mask table: entry `m` ORs the strides of the set bits of `m`
#[inline]
fn mask_table<const K: usize, const DIM: usize>(steps: &[usize; K]) -> [usize; DIM] {
    debug_assert_eq!(DIM, 1 << K);
    let mut masks = [0usize; DIM];
    for m in 0..DIM {
        for b in 0..K {
            if m >> b & 1 == 1 {
                masks[m] |= steps[b];
            }
        }
    }
    masks
}

/// Load the footprint into a stack buffer, zero it in place, then
/// multiply-accumulate the column-major matrix back into the state.
#[inline(always)]
fn mac_block<const DIM: usize>(
    chunk: &mut [Complex64],
    base: usize,
    masks: &[usize; DIM],
    mat: &[Complex64],
) {
    let mut psi = [Complex64::new(0.0, 0.0); DIM];
    for i in 0..DIM {
        psi[i] = chunk[base | masks[i]];
        chunk[base | masks[i]] = Complex64::new(0.0, 0.0);
    }
    for i in 0..DIM {
        for j in 0..DIM {
            chunk[base | masks[i]] += mat[i + DIM * j] * psi[j];
        }
    }
}

/// Optimized two-qubit dense kernel with the 4x4 multiply fully unrolled
pub fn apply_matrix_opt2(
    state: &mut [Complex64],
    qubits: &[usize; 2],
    mat: &[Complex64],
    parallel: bool,
) -> Result<()> {
    let mut sorted = *qubits;
    sorted.sort_unstable();
    let m = sort_matrix(qubits, &sorted, mat)?;

    let step1 = 1usize << sorted[0];
    let step2 = 1usize << sorted[1];

    for_each_chunk(state, step2 << 1, parallel, move |chunk| {
        for k1 in (0..step2).step_by(step1 << 1) {
            for k2 in 0..step1 {
                let t0 = k1 | k2;
                let t1 = t0 | step1;
                let t2 = t0 | step2;
                let t3 = t2 | step1;

                let psi0 = chunk[t0];
                let psi1 = chunk[t1];
                let psi2 = chunk[t2];
                let psi3 = chunk[t3];

                chunk[t0] = psi0 * m[0] + psi1 * m[4] + psi2 * m[8] + psi3 * m[12];
                chunk[t1] = psi0 * m[1] + psi1 * m[5] + psi2 * m[9] + psi3 * m[13];
                chunk[t2] = psi0 * m[2] + psi1 * m[6] + psi2 * m[10] + psi3 * m[14];
                chunk[t3] = psi0 * m[3] + psi1 * m[7] + psi2 * m[11] + psi3 * m[15];
            }
        }
    });
    Ok(())
}

/// Optimized three-qubit dense kernel
pub fn apply_matrix_opt3(
    state: &mut [Complex64],
    qubits: &[usize; 3],
    mat: &[Complex64],
    parallel: bool,
) -> Result<()> {
    let mut sorted = *qubits;
    sorted.sort_unstable();
    let m = sort_matrix(qubits, &sorted, mat)?;

    let steps = [
        1usize << sorted[0],
        1usize << sorted[1],
        1usize << sorted[2],
    ];
    let masks: [usize; 8] = mask_table(&steps);

    for_each_chunk(state, steps[2] << 1, parallel, move |chunk| {
        for k1 in (0..steps[2]).step_by(steps[1] << 1) {
            for k2 in (0..steps[1]).step_by(steps[0] << 1) {
                for k3 in 0..steps[0] {
                    mac_block(chunk, k1 | k2 | k3, &masks, &m);
                }
            }
        }
    });
    Ok(())
}

/// Optimized four-qubit dense kernel
pub fn apply_matrix_opt4(
    state: &mut [Complex64],
    qubits: &[usize; 4],
    mat: &[Complex64],
    parallel: bool,
) -> Result<()> {
    let mut sorted = *qubits;
    sorted.sort_unstable();
    let m = sort_matrix(qubits, &sorted, mat)?;

    let steps = [
        1usize << sorted[0],
        1usize << sorted[1],
        1usize << sorted[2],
        1usize << sorted[3],
    ];
    let masks: [usize; 16] = mask_table(&steps);

    for_each_chunk(state, steps[3] << 1, parallel, move |chunk| {
        for k1 in (0..steps[3]).step_by(steps[2] << 1) {
            for k2 in (0..steps[2]).step_by(steps[1] << 1) {
                for k3 in (0..steps[1]).step_by(steps[0] << 1) {
                    for k4 in 0..steps[0] {
                        mac_block(chunk, k1 | k2 | k3 | k4, &masks, &m);
                    }
                }
            }
        }
    });
    Ok(())
}

/// Optimized five-qubit dense kernel
pub fn apply_matrix_opt5(
    state: &mut [Complex64],
    qubits: &[usize; 5],
    mat: &[Complex64],
    parallel: bool,
) -> Result<()> {
    let mut sorted = *qubits;
    sorted.sort_unstable();
    let m = sort_matrix(qubits, &sorted, mat)?;

    let steps = [
        1usize << sorted[0],
        1usize << sorted[1],
        1usize << sorted[2],
        1usize << sorted[3],
        1usize << sorted[4],
    ];
    let masks: [usize; 32] = mask_table(&steps);

    for_each_chunk(state, steps[4] << 1, parallel, move |chunk| {
        for k1 in (0..steps[4]).step_by(steps[3] << 1) {
            for k2 in (0..steps[3]).step_by(steps[2] << 1) {
                for k3 in (0..steps[2]).step_by(steps[1] << 1) {
                    for k4 in (0..steps[1]).step_by(steps[0] << 1) {
                        for k5 in 0..steps[0] {
                            mac_block(chunk, k1 | k2 | k3 | k4 | k5, &masks, &m);
                        }
                    }
                }
            }
        }
    });
    Ok(())
}

/// Unoptimized fixed-K dense kernel driven by the index generator.
///
/// The matrix stays in the caller's qubit order; the generator assigns
/// footprint bit `j` to `qubits[j]`, so no permutation is needed.
pub fn apply_matrix_fixed<const K: usize, const DIM: usize>(
    state: &mut [Complex64],
    qubits: &[usize; K],
    mat: &[Complex64],
    parallel: bool,
) {
    debug_assert_eq!(mat.len(), DIM * DIM);
    let qs = *qubits;
    let mut sorted = qs;
    sorted.sort_unstable();

    let block = 1usize << (sorted[K - 1] + 1);
    let per_block = block >> K;

    for_each_chunk(state, block, parallel, move |chunk| {
        for k in 0..per_block {
            let inds: [usize; DIM] = indexes(&qs, &sorted, k);
            let mut cache = [Complex64::new(0.0, 0.0); DIM];
            for i in 0..DIM {
                cache[i] = chunk[inds[i]];
                chunk[inds[i]] = Complex64::new(0.0, 0.0);
            }
            for i in 0..DIM {
                for j in 0..DIM {
                    chunk[inds[i]] += mat[i + DIM * j] * cache[j];
                }
            }
        }
    });
}

/// CNOT: exchange the footprint entries with the control bit set.
///
/// Footprint bit 0 is the control, bit 1 the target, regardless of which
/// index is larger.
pub fn apply_cnot(state: &mut [Complex64], qctrl: usize, qtrgt: usize, parallel: bool) {
    let qubits = [qctrl, qtrgt];
    let mut sorted = qubits;
    sorted.sort_unstable();
    let block = 1usize << (sorted[1] + 1);
    let per_block = block >> 2;

    for_each_chunk(state, block, parallel, move |chunk| {
        for k in 0..per_block {
            let ii: [usize; 4] = indexes(&qubits, &sorted, k);
            chunk.swap(ii[1], ii[3]);
        }
    });
}

/// SWAP: exchange the two single-excitation footprint entries
pub fn apply_swap(state: &mut [Complex64], qubit0: usize, qubit1: usize, parallel: bool) {
    let qubits = [qubit0, qubit1];
    let mut sorted = qubits;
    sorted.sort_unstable();
    let block = 1usize << (sorted[1] + 1);
    let per_block = block >> 2;

    for_each_chunk(state, block, parallel, move |chunk| {
        for k in 0..per_block {
            let ii: [usize; 4] = indexes(&qubits, &sorted, k);
            chunk.swap(ii[1], ii[2]);
        }
    });
}

/// CZ: negate the footprint entry with both bits set
pub fn apply_cz(state: &mut [Complex64], qubit0: usize, qubit1: usize, parallel: bool) {
    let qubits = [qubit0, qubit1];
    let mut sorted = qubits;
    sorted.sort_unstable();
    let block = 1usize << (sorted[1] + 1);
    let per_block = block >> 2;

    for_each_chunk(state, block, parallel, move |chunk| {
        for k in 0..per_block {
            let ii: [usize; 4] = indexes(&qubits, &sorted, k);
            chunk[ii[3]] = -chunk[ii[3]];
        }
    });
}
