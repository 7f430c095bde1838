//! Fused matrix reductions: `‖Aψ‖²` and `⟨ψ|A|ψ⟩`
//!
//! Both walk the same footprint enumeration as gate application, form
//! the local `Aψ` values per outer iteration, and reduce without ever
//! writing an intermediate vector. Complex sums accumulate as separate
//! real and imaginary parts so the tree reduction runs over plain
//! floats.

use crate::error::{Result, StateError};
use crate::indexing::indexes_into;
use crate::kernels::sum_chunks;
use crate::qubit_vector::QubitVector;
use num_complex::Complex64;
use smallvec::SmallVec;

impl QubitVector {
    /// `‖Aψ‖²` for the matrix `A` on the listed qubits, without
    /// modifying the state.
    ///
    /// `mat` follows the same diagonal (`2^K`) or dense column-major
    /// (`4^K`) convention as [`apply_matrix`](Self::apply_matrix).
    ///
    /// # Errors
    /// Returns error if a qubit index is out of range or the matrix
    /// length fits neither form.
    pub fn matrix_norm(&self, qubits: &[usize], mat: &[Complex64]) -> Result<f64> {
        self.check_qubits(qubits)?;
        let n = qubits.len();
        let dim = 1usize << n;
        let active = self.parallel.active(self.num_qubits);

        if mat.len() == dim {
            if n == 0 {
                return Ok(mat[0].norm_sqr() * self.norm());
            }
            if n == 1 {
                return Ok(self.norm_diagonal_single(qubits[0], mat, active));
            }
            return Ok(self.norm_diagonal_general(qubits, mat, active));
        }
        if mat.len() != dim * dim {
            return Err(StateError::DimensionMismatch {
                expected: dim * dim,
                actual: mat.len(),
            });
        }
        if n == 1 {
            return Ok(self.norm_matrix_single(qubits[0], mat, active));
        }
        Ok(self.norm_matrix_general(qubits, mat, active))
    }

    /// `⟨ψ|A|ψ⟩` for the matrix `A` on the listed qubits.
    ///
    /// Complex in general; real for Hermitian `A` up to rounding.
    ///
    /// # Errors
    /// Returns error if a qubit index is out of range or the matrix
    /// length fits neither form.
    pub fn expectation_value(&self, qubits: &[usize], mat: &[Complex64]) -> Result<Complex64> {
        self.check_qubits(qubits)?;
        let n = qubits.len();
        let dim = 1usize << n;
        let active = self.parallel.active(self.num_qubits);

        if mat.len() == dim {
            if n == 0 {
                return Ok(mat[0] * self.norm());
            }
            if n == 1 {
                return Ok(self.expval_diagonal_single(qubits[0], mat, active));
            }
            return Ok(self.expval_diagonal_general(qubits, mat, active));
        }
        if mat.len() != dim * dim {
            return Err(StateError::DimensionMismatch {
                expected: dim * dim,
                actual: mat.len(),
            });
        }
        if n == 1 {
            return Ok(self.expval_matrix_single(qubits[0], mat, active));
        }
        Ok(self.expval_matrix_general(qubits, mat, active))
    }

    // Single-qubit strided forms

    fn norm_matrix_single(&self, qubit: usize, mat: &[Complex64], active: bool) -> f64 {
        let stride = 1usize << qubit;
        self.parallel
            .run(active, || {
                sum_chunks(&self.data, stride << 1, active, |chunk| {
                    let mut val = 0.0;
                    for k in 0..stride {
                        let cache0 = chunk[k];
                        let cache1 = chunk[k | stride];
                        let v0 = mat[0] * cache0 + mat[2] * cache1;
                        let v1 = mat[1] * cache0 + mat[3] * cache1;
                        val += v0.norm_sqr() + v1.norm_sqr();
                    }
                    (val, 0.0)
                })
            })
            .0
    }

    fn norm_diagonal_single(&self, qubit: usize, diag: &[Complex64], active: bool) -> f64 {
        let stride = 1usize << qubit;
        self.parallel
            .run(active, || {
                sum_chunks(&self.data, stride << 1, active, |chunk| {
                    let mut val = 0.0;
                    for k in 0..stride {
                        let v0 = diag[0] * chunk[k];
                        let v1 = diag[1] * chunk[k | stride];
                        val += v0.norm_sqr() + v1.norm_sqr();
                    }
                    (val, 0.0)
                })
            })
            .0
    }

    fn expval_matrix_single(&self, qubit: usize, mat: &[Complex64], active: bool) -> Complex64 {
        let stride = 1usize << qubit;
        let (re, im) = self.parallel.run(active, || {
            sum_chunks(&self.data, stride << 1, active, |chunk| {
                let mut acc = (0.0, 0.0);
                for k in 0..stride {
                    let cache0 = chunk[k];
                    let cache1 = chunk[k | stride];
                    let v0 = mat[0] * cache0 + mat[2] * cache1;
                    let v1 = mat[1] * cache0 + mat[3] * cache1;
                    let val = v0 * cache0.conj() + v1 * cache1.conj();
                    acc.0 += val.re;
                    acc.1 += val.im;
                }
                acc
            })
        });
        Complex64::new(re, im)
    }

    fn expval_diagonal_single(&self, qubit: usize, diag: &[Complex64], active: bool) -> Complex64 {
        let stride = 1usize << qubit;
        let (re, im) = self.parallel.run(active, || {
            sum_chunks(&self.data, stride << 1, active, |chunk| {
                let mut acc = (0.0, 0.0);
                for k in 0..stride {
                    let cache0 = chunk[k];
                    let cache1 = chunk[k | stride];
                    let val = diag[0] * cache0 * cache0.conj() + diag[1] * cache1 * cache1.conj();
                    acc.0 += val.re;
                    acc.1 += val.im;
                }
                acc
            })
        });
        Complex64::new(re, im)
    }

    // General-K forms

    fn norm_matrix_general(&self, qubits: &[usize], mat: &[Complex64], active: bool) -> f64 {
        let n = qubits.len();
        let dim = 1usize << n;
        let mut sorted: SmallVec<[usize; 8]> = SmallVec::from_slice(qubits);
        sorted.sort_unstable();
        let block = 1usize << (sorted[n - 1] + 1);
        let per_block = block >> n;

        self.parallel
            .run(active, || {
                sum_chunks(&self.data, block, active, |chunk| {
                    let mut inds = vec![0usize; dim];
                    let mut val = 0.0;
                    for k in 0..per_block {
                        indexes_into(qubits, &sorted, k, &mut inds);
                        for i in 0..dim {
                            let mut vi = Complex64::new(0.0, 0.0);
                            for j in 0..dim {
                                vi += mat[i + dim * j] * chunk[inds[j]];
                            }
                            val += vi.norm_sqr();
                        }
                    }
                    (val, 0.0)
                })
            })
            .0
    }

    fn norm_diagonal_general(&self, qubits: &[usize], diag: &[Complex64], active: bool) -> f64 {
        let n = qubits.len();
        let dim = 1usize << n;
        let mut sorted: SmallVec<[usize; 8]> = SmallVec::from_slice(qubits);
        sorted.sort_unstable();
        let block = 1usize << (sorted[n - 1] + 1);
        let per_block = block >> n;

        self.parallel
            .run(active, || {
                sum_chunks(&self.data, block, active, |chunk| {
                    let mut inds = vec![0usize; dim];
                    let mut val = 0.0;
                    for k in 0..per_block {
                        indexes_into(qubits, &sorted, k, &mut inds);
                        for i in 0..dim {
                            let vi = diag[i] * chunk[inds[i]];
                            val += vi.norm_sqr();
                        }
                    }
                    (val, 0.0)
                })
            })
            .0
    }

    fn expval_matrix_general(&self, qubits: &[usize], mat: &[Complex64], active: bool) -> Complex64 {
        let n = qubits.len();
        let dim = 1usize << n;
        let mut sorted: SmallVec<[usize; 8]> = SmallVec::from_slice(qubits);
        sorted.sort_unstable();
        let block = 1usize << (sorted[n - 1] + 1);
        let per_block = block >> n;

        let (re, im) = self.parallel.run(active, || {
            sum_chunks(&self.data, block, active, |chunk| {
                let mut inds = vec![0usize; dim];
                let mut acc = (0.0, 0.0);
                for k in 0..per_block {
                    indexes_into(qubits, &sorted, k, &mut inds);
                    for i in 0..dim {
                        let mut vi = Complex64::new(0.0, 0.0);
                        for j in 0..dim {
                            vi += mat[i + dim * j] * chunk[inds[j]];
                        }
                        let val = vi * chunk[inds[i]].conj();
                        acc.0 += val.re;
                        acc.1 += val.im;
                    }
                }
                acc
            })
        });
        Complex64::new(re, im)
    }

    fn expval_diagonal_general(&self, qubits: &[usize], diag: &[Complex64], active: bool) -> Complex64 {
        let n = qubits.len();
        let dim = 1usize << n;
        let mut sorted: SmallVec<[usize; 8]> = SmallVec::from_slice(qubits);
        sorted.sort_unstable();
        let block = 1usize << (sorted[n - 1] + 1);
        let per_block = block >> n;

        let (re, im) = self.parallel.run(active, || {
            sum_chunks(&self.data, block, active, |chunk| {
                let mut inds = vec![0usize; dim];
                let mut acc = (0.0, 0.0);
                for k in 0..per_block {
                    indexes_into(qubits, &sorted, k, &mut inds);
                    for i in 0..dim {
                        let cache = chunk[inds[i]];
                        let val = diag[i] * cache * cache.conj();
                        acc.0 += val.re;
                        acc.1 += val.im;
                    }
                }
                acc
            })
        });
        Complex64::new(re, im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn bell_pair() -> QubitVector {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        QubitVector::from_real(&[h, 0.0, 0.0, h]).unwrap()
    }

    #[test]
    fn test_zz_on_bell_pair() {
        let qv = bell_pair();
        let zz = vec![c(1.0, 0.0), c(-1.0, 0.0), c(-1.0, 0.0), c(1.0, 0.0)];
        let val = qv.expectation_value(&[0, 1], &zz).unwrap();
        assert_relative_eq!(val.re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(val.im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_z_expectation() {
        // |psi| = 0.6|0> + 0.8|1>: <Z> = 0.36 - 0.64 = -0.28
        let qv = QubitVector::from_real(&[0.6, 0.8]).unwrap();
        let z = vec![c(1.0, 0.0), c(-1.0, 0.0)];
        let val = qv.expectation_value(&[0], &z).unwrap();
        assert_relative_eq!(val.re, -0.28, epsilon = 1e-12);
    }

    #[test]
    fn test_single_dense_expectation_matches_diagonal() {
        let qv = QubitVector::from_complex(&[c(0.5, 0.2), c(-0.3, 0.7)]).unwrap();
        let z_diag = vec![c(1.0, 0.0), c(-1.0, 0.0)];
        let z_dense = vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)];

        let a = qv.expectation_value(&[0], &z_diag).unwrap();
        let b = qv.expectation_value(&[0], &z_dense).unwrap();
        assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
        assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_norm_of_unitary_preserves_norm() {
        let qv = bell_pair();
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let hadamard = vec![c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)];
        assert_relative_eq!(
            qv.matrix_norm(&[1], &hadamard).unwrap(),
            qv.norm(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_matrix_norm_matches_apply_then_norm() {
        let qv = QubitVector::from_complex(&[
            c(0.1, 0.2),
            c(0.3, -0.4),
            c(-0.5, 0.1),
            c(0.2, 0.6),
        ])
        .unwrap();
        // Arbitrary non-unitary matrix on the reversed pair
        let mat: Vec<Complex64> = (0..16).map(|i| c(0.1 * i as f64, -0.03 * i as f64)).collect();

        let fused = qv.matrix_norm(&[1, 0], &mat).unwrap();

        let mut applied = qv.clone();
        applied.apply_matrix(&[1, 0], &mat).unwrap();
        assert_relative_eq!(fused, applied.norm(), epsilon = 1e-10);
    }

    #[test]
    fn test_expectation_matches_inner_product_form() {
        let qv = QubitVector::from_complex(&[
            c(0.4, 0.1),
            c(0.2, -0.3),
            c(-0.1, 0.5),
            c(0.3, 0.2),
        ])
        .unwrap();
        let mat: Vec<Complex64> = (0..16).map(|i| c((i as f64).sin(), 0.05 * i as f64)).collect();

        let fused = qv.expectation_value(&[0, 1], &mat).unwrap();

        let mut applied = qv.clone();
        applied.apply_matrix(&[0, 1], &mat).unwrap();
        let direct = applied.dot(&{
            let mut conj = qv.clone();
            conj.conj();
            conj
        })
        .unwrap();
        assert_relative_eq!(fused.re, direct.re, epsilon = 1e-10);
        assert_relative_eq!(fused.im, direct.im, epsilon = 1e-10);
    }

    #[test]
    fn test_diagonal_general_matches_dense() {
        let qv = QubitVector::from_complex(&[
            c(0.1, 0.0),
            c(0.2, 0.1),
            c(0.3, -0.2),
            c(0.4, 0.3),
        ])
        .unwrap();
        let diag = vec![c(1.0, 0.0), c(0.0, 1.0), c(-1.0, 0.0), c(0.0, -1.0)];
        let mut dense = vec![c(0.0, 0.0); 16];
        for i in 0..4 {
            dense[i + 4 * i] = diag[i];
        }

        let a = qv.expectation_value(&[0, 1], &diag).unwrap();
        let b = qv.expectation_value(&[0, 1], &dense).unwrap();
        assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
        assert_relative_eq!(a.im, b.im, epsilon = 1e-12);

        let na = qv.matrix_norm(&[0, 1], &diag).unwrap();
        let nb = qv.matrix_norm(&[0, 1], &dense).unwrap();
        assert_relative_eq!(na, nb, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_target_list() {
        let qv = bell_pair();
        let scalar = vec![c(0.0, 2.0)];
        assert_relative_eq!(
            qv.matrix_norm(&[], &scalar).unwrap(),
            4.0 * qv.norm(),
            epsilon = 1e-12
        );
        let val = qv.expectation_value(&[], &scalar).unwrap();
        assert_relative_eq!(val.im, 2.0 * qv.norm(), epsilon = 1e-12);
    }

    #[test]
    fn test_bad_matrix_length() {
        let qv = bell_pair();
        let err = qv.matrix_norm(&[0, 1], &vec![c(1.0, 0.0); 7]).unwrap_err();
        assert!(matches!(err, StateError::DimensionMismatch { .. }));
    }
}
