//! Multipartite qubit indexing
//!
//! Enumerates the amplitude offsets touched by a gate on K target qubits.
//! For each outer counter `k` in `[0, 2^(N-K))` the generator produces the
//! 2^K offsets whose bits at the target positions run through `0..2^K`
//! while the remaining bits equal the bits of `k` expanded around the
//! target positions. Footprints for distinct `k` are disjoint, which is
//! what makes lock-free parallel gate application safe.
//!
//! Offsets are ordered so that bit `j` of the footprint index `m`
//! corresponds to target `qubits[j]` in the caller's (user) order, while
//! the stride expansion uses the ascending (sorted) order.

/// Lowest offset of the footprint for outer counter `k`: the bits of `k`
/// with a zero inserted at each sorted target position.
#[inline]
pub fn index0(qubits_sorted: &[usize], k: usize) -> usize {
    let mut ret = k;
    for &q in qubits_sorted {
        let low = ret & ((1usize << q) - 1);
        ret = ((ret >> q) << (q + 1)) | low;
    }
    ret
}

/// Footprint offsets with compile-time shape, for K up to 5.
///
/// `DIM` must equal `2^K`; the two parameters are spelled out because the
/// dimension cannot yet be computed from `K` in a stable const context.
#[inline]
pub fn indexes<const K: usize, const DIM: usize>(
    qubits: &[usize; K],
    qubits_sorted: &[usize; K],
    k: usize,
) -> [usize; DIM] {
    debug_assert_eq!(DIM, 1 << K);
    let mut inds = [0usize; DIM];
    inds[0] = index0(qubits_sorted, k);
    for (i, &q) in qubits.iter().enumerate() {
        let n = 1usize << i;
        let bit = 1usize << q;
        for j in 0..n {
            inds[n + j] = inds[j] | bit;
        }
    }
    inds
}

/// Footprint offsets for runtime K, written into a caller-provided
/// buffer of length `2^qubits.len()` so hot loops can reuse the scratch.
#[inline]
pub fn indexes_into(
    qubits: &[usize],
    qubits_sorted: &[usize],
    k: usize,
    inds: &mut [usize],
) {
    debug_assert_eq!(inds.len(), 1 << qubits.len());
    inds[0] = index0(qubits_sorted, k);
    for (i, &q) in qubits.iter().enumerate() {
        let n = 1usize << i;
        let bit = 1usize << q;
        for j in 0..n {
            inds[n + j] = inds[j] | bit;
        }
    }
}

/// Allocating variant of [`indexes_into`]
pub fn indexes_dynamic(qubits: &[usize], qubits_sorted: &[usize], k: usize) -> Vec<usize> {
    let mut inds = vec![0usize; 1 << qubits.len()];
    indexes_into(qubits, qubits_sorted, k, &mut inds);
    inds
}
