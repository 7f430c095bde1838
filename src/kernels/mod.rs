//! Gate application kernels
//!
//! Every kernel partitions the state into contiguous blocks of
//! `2^(q_high + 1)` amplitudes, where `q_high` is the highest target
//! qubit. A gate footprint never crosses a block boundary, so blocks can
//! be processed by `par_chunks_mut` without locking; within a block the
//! kernels walk the stride pattern determined by the target bit
//! positions.

use num_complex::Complex64;
use rayon::prelude::*;

pub mod dynamic;
pub mod fixed;
pub mod single_qubit;

/// Apply `f` to every `block`-sized chunk of the state, fanning out over
/// the current rayon pool when `parallel` is set.
#[inline]
pub(crate) fn for_each_chunk<F>(state: &mut [Complex64], block: usize, parallel: bool, f: F)
where
    F: Fn(&mut [Complex64]) + Send + Sync,
{
    if parallel {
        state.par_chunks_mut(block).for_each(|chunk| f(chunk));
    } else {
        for chunk in state.chunks_mut(block) {
            f(chunk);
        }
    }
}

/// Sum `f` over every `block`-sized chunk as a pair of real accumulators,
/// compatible with a tree reduction over plain floats.
#[inline]
pub(crate) fn sum_chunks<F>(state: &[Complex64], block: usize, parallel: bool, f: F) -> (f64, f64)
where
    F: Fn(&[Complex64]) -> (f64, f64) + Send + Sync,
{
    if parallel {
        state
            .par_chunks(block)
            .map(|chunk| f(chunk))
            .reduce(|| (0.0, 0.0), |a, b| (a.0 + b.0, a.1 + b.1))
    } else {
        state
            .chunks(block)
            .fold((0.0, 0.0), |acc, chunk| {
                let v = f(chunk);
                (acc.0 + v.0, acc.1 + v.1)
            })
    }
}
