//! Z-basis measurement outcome probabilities and sampling
//!
//! Reductions only; nothing here mutates the state.

use crate::error::{Result, StateError};
use crate::indexing::{index0, indexes_into};
use crate::kernels::sum_chunks;
use crate::qubit_vector::QubitVector;
use num_complex::Complex64;
use rayon::prelude::*;
use smallvec::SmallVec;

impl QubitVector {
    /// Probability of the basis state `outcome`
    #[inline]
    pub fn probability(&self, outcome: usize) -> f64 {
        self.data[outcome].norm_sqr()
    }

    /// Probabilities of all `2^N` basis states
    pub fn probabilities(&self) -> Vec<f64> {
        self.data.iter().map(|amp| amp.norm_sqr()).collect()
    }

    /// `[P(0), P(1)]` for measurement of a single qubit
    ///
    /// # Errors
    /// Returns error if the qubit index is out of range.
    pub fn qubit_probabilities(&self, qubit: usize) -> Result<Vec<f64>> {
        self.check_qubit(qubit)?;
        let stride = 1usize << qubit;
        let active = self.parallel.active(self.num_qubits);

        let (p0, p1) = self.parallel.run(active, || {
            sum_chunks(&self.data, stride << 1, active, |chunk| {
                let mut p = (0.0, 0.0);
                for k in 0..stride {
                    p.0 += chunk[k].norm_sqr();
                    p.1 += chunk[k | stride].norm_sqr();
                }
                p
            })
        });
        Ok(vec![p0, p1])
    }

    /// Marginal probabilities `[P(0), ..., P(2^K - 1)]` for measurement
    /// of the listed qubits; entry `m` sums the probabilities of all
    /// basis states whose bits at the target positions spell `m` (bit
    /// `j` of `m` taken from `qubits[j]`).
    ///
    /// # Errors
    /// Returns error if a qubit index is out of range.
    pub fn marginal_probabilities(&self, qubits: &[usize]) -> Result<Vec<f64>> {
        self.check_qubits(qubits)?;
        let n = qubits.len();
        match n {
            0 => return Ok(vec![self.norm()]),
            1 => return self.qubit_probabilities(qubits[0]),
            _ => {}
        }

        let mut sorted: SmallVec<[usize; 8]> = SmallVec::from_slice(qubits);
        sorted.sort_unstable();
        if n == self.num_qubits && sorted.as_slice() == qubits {
            return Ok(self.probabilities());
        }

        let dim = 1usize << n;
        let block = 1usize << (sorted[n - 1] + 1);
        let per_block = block >> n;
        let active = self.parallel.active(self.num_qubits);

        let probs = self.parallel.run(active, || {
            let accumulate = |chunk: &[Complex64]| {
                let mut local = vec![0.0; dim];
                let mut inds = vec![0usize; dim];
                for k in 0..per_block {
                    indexes_into(qubits, &sorted, k, &mut inds);
                    for m in 0..dim {
                        local[m] += chunk[inds[m]].norm_sqr();
                    }
                }
                local
            };
            if active {
                self.data.par_chunks(block).map(accumulate).reduce(
                    || vec![0.0; dim],
                    |mut a, b| {
                        for (x, y) in a.iter_mut().zip(b) {
                            *x += y;
                        }
                        a
                    },
                )
            } else {
                self.data.chunks(block).fold(vec![0.0; dim], |mut a, chunk| {
                    for (x, y) in a.iter_mut().zip(accumulate(chunk)) {
                        *x += y;
                    }
                    a
                })
            }
        });
        Ok(probs)
    }

    /// Probability that measuring the listed qubits yields `outcome`.
    ///
    /// An empty qubit list returns `norm()`.
    ///
    /// # Errors
    /// Returns error if a qubit index is out of range or `outcome` does
    /// not fit in the target count.
    pub fn outcome_probability(&self, qubits: &[usize], outcome: usize) -> Result<f64> {
        self.check_qubits(qubits)?;
        let n = qubits.len();
        if n == 0 {
            return Ok(self.norm());
        }
        if outcome >= 1 << n {
            return Err(StateError::DimensionMismatch {
                expected: 1 << n,
                actual: outcome,
            });
        }

        let mut sorted: SmallVec<[usize; 8]> = SmallVec::from_slice(qubits);
        sorted.sort_unstable();

        // Bits of the outcome spread to their qubit positions; constant
        // across the enumeration, so only the base offset varies.
        let mask = qubits
            .iter()
            .enumerate()
            .fold(0usize, |m, (j, &q)| m | (((outcome >> j) & 1) << q));

        let block = 1usize << (sorted[n - 1] + 1);
        let per_block = block >> n;
        let active = self.parallel.active(self.num_qubits);

        let (p, _) = self.parallel.run(active, || {
            sum_chunks(&self.data, block, active, |chunk| {
                let mut p = 0.0;
                for k in 0..per_block {
                    p += chunk[index0(&sorted, k) | mask].norm_sqr();
                }
                (p, 0.0)
            })
        });
        Ok(p)
    }

    /// Draw one basis-state index per input random value in `[0, 1)` by
    /// scanning the cumulative distribution of `|ψ_i|²`.
    ///
    /// A value the scan never exceeds maps to `2^N - 1`. Samples are
    /// independent and may be computed in parallel across the inputs.
    pub fn sample_measure(&self, rnds: &[f64]) -> Vec<usize> {
        let active = self.parallel.threads() > 1;
        self.parallel.run(active, || {
            let sample_one = |rnd: f64| -> usize {
                let mut p = 0.0;
                for (i, amp) in self.data[..self.num_states - 1].iter().enumerate() {
                    p += amp.norm_sqr();
                    if rnd < p {
                        return i;
                    }
                }
                self.num_states - 1
            };
            if active {
                rnds.par_iter().map(|&r| sample_one(r)).collect()
            } else {
                rnds.iter().map(|&r| sample_one(r)).collect()
            }
        })
    }
}
