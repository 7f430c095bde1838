//! Dense N-qubit state vector and gate dispatch
//!
//! The vector owns `2^N` complex amplitudes; index `i` encodes the
//! computational basis state whose bit `b` is the value of qubit `b`
//! (qubit 0 is the least-significant bit). Gates mutate the vector in
//! place and never renormalize implicitly.

use crate::error::{Result, StateError};
use crate::kernels::{dynamic, fixed, single_qubit};
use crate::parallel::ParallelConfig;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeSeq, Serializer};
use smallvec::SmallVec;
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, MulAssign, Sub, SubAssign};

/// Dense quantum state vector with bit-indexed gate kernels
///
/// # Example
///
/// ```
/// use qubitvec::QubitVector;
///
/// // Prepare a Bell pair
/// let h = std::f64::consts::FRAC_1_SQRT_2;
/// let hadamard: Vec<num_complex::Complex64> = [h, h, h, -h]
///     .iter()
///     .map(|&v| num_complex::Complex64::new(v, 0.0))
///     .collect();
///
/// let mut qv = QubitVector::new(2).unwrap();
/// qv.initialize();
/// qv.apply_matrix(&[0], &hadamard).unwrap();
/// qv.apply_cnot(0, 1).unwrap();
///
/// let probs = qv.probabilities();
/// assert!((probs[0] - 0.5).abs() < 1e-12);
/// assert!((probs[3] - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone)]
pub struct QubitVector {
    pub(crate) num_qubits: usize,
    pub(crate) num_states: usize,
    pub(crate) data: Vec<Complex64>,
    pub(crate) parallel: ParallelConfig,
    gate_opt: bool,
}

impl QubitVector {
    /// Create an all-zero vector of length `2^num_qubits`.
    ///
    /// Call [`initialize`](Self::initialize) to prepare |0...0⟩.
    ///
    /// # Errors
    /// Returns error if `2^num_qubits` overflows the index type.
    pub fn new(num_qubits: usize) -> Result<Self> {
        if num_qubits >= usize::BITS as usize {
            return Err(StateError::InvalidDimension { num_qubits });
        }
        let num_states = 1usize << num_qubits;
        Ok(Self {
            num_qubits,
            num_states,
            data: vec![Complex64::new(0.0, 0.0); num_states],
            parallel: ParallelConfig::new(),
            gate_opt: false,
        })
    }

    /// Create from complex amplitudes; the qubit count is `log2` of the
    /// length.
    ///
    /// # Errors
    /// Returns [`StateError::NotPowerOfTwo`] if the length is not a
    /// power of two.
    pub fn from_complex(vec: &[Complex64]) -> Result<Self> {
        let mut qv = Self::new(0)?;
        qv.assign(vec)?;
        Ok(qv)
    }

    /// Create from real amplitudes; the qubit count is `log2` of the
    /// length.
    ///
    /// # Errors
    /// Returns [`StateError::NotPowerOfTwo`] if the length is not a
    /// power of two.
    pub fn from_real(vec: &[f64]) -> Result<Self> {
        let mut qv = Self::new(0)?;
        qv.assign_real(vec)?;
        Ok(qv)
    }

    /// Overwrite the state with `vec`, re-deriving the qubit count.
    ///
    /// # Errors
    /// Returns [`StateError::NotPowerOfTwo`] if the length is not a
    /// power of two; the state is unchanged on error.
    pub fn assign(&mut self, vec: &[Complex64]) -> Result<()> {
        self.num_qubits = Self::infer_qubits(vec.len())?;
        self.num_states = vec.len();
        self.data = vec.to_vec();
        Ok(())
    }

    /// Overwrite the state with real amplitudes, re-deriving the qubit
    /// count.
    pub fn assign_real(&mut self, vec: &[f64]) -> Result<()> {
        self.num_qubits = Self::infer_qubits(vec.len())?;
        self.num_states = vec.len();
        self.data = vec.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        Ok(())
    }

    fn infer_qubits(len: usize) -> Result<usize> {
        if len == 0 || !len.is_power_of_two() {
            return Err(StateError::NotPowerOfTwo { length: len });
        }
        Ok(len.trailing_zeros() as usize)
    }

    /// Length of the underlying vector (`2^N`)
    #[inline]
    pub fn size(&self) -> usize {
        self.num_states
    }

    /// Number of qubits
    #[inline]
    pub fn qubits(&self) -> usize {
        self.num_qubits
    }

    /// Amplitudes in index order
    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.data
    }

    /// Mutable amplitudes in index order
    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.data
    }

    /// Set the state to |0...0⟩
    pub fn initialize(&mut self) {
        self.data.fill(Complex64::new(0.0, 0.0));
        self.data[0] = Complex64::new(1.0, 0.0);
    }

    /// Set every amplitude to `2^(-N/2)` (the uniform superposition)
    pub fn initialize_plus(&mut self) {
        let val = Complex64::new(1.0 / 2f64.powf(0.5 * self.num_qubits as f64), 0.0);
        self.data.fill(val);
    }

    // Configuration

    /// Set the worker count for parallel kernels. Zero is ignored.
    ///
    /// # Errors
    /// Returns error if the worker pool cannot be constructed.
    pub fn set_parallel_threads(&mut self, n: usize) -> Result<()> {
        self.parallel.set_threads(n)
    }

    /// Set the qubit threshold above which kernels fan out. Zero is
    /// ignored.
    pub fn set_parallel_threshold(&mut self, n: usize) {
        self.parallel.set_threshold(n);
    }

    /// Enable the fixed-K optimized kernels for 2..=5 target qubits
    #[inline]
    pub fn enable_gate_opt(&mut self) {
        self.gate_opt = true;
    }

    /// Disable the fixed-K optimized kernels
    #[inline]
    pub fn disable_gate_opt(&mut self) {
        self.gate_opt = false;
    }

    /// Whether the optimized fixed-K kernels are selected
    #[inline]
    pub fn gate_opt(&self) -> bool {
        self.gate_opt
    }

    // Elementwise utility operations

    /// Complex-conjugate every amplitude
    pub fn conj(&mut self) {
        let active = self.parallel.active(self.num_qubits);
        let data = &mut self.data;
        self.parallel.run(active, move || {
            if active {
                data.par_iter_mut().for_each(|amp| *amp = amp.conj());
            } else {
                for amp in data.iter_mut() {
                    *amp = amp.conj();
                }
            }
        });
    }

    /// Squared two-norm `Σ|ψ_i|²`
    pub fn norm(&self) -> f64 {
        let active = self.parallel.active(self.num_qubits);
        self.parallel.run(active, || {
            if active {
                self.data.par_iter().map(|amp| amp.norm_sqr()).sum()
            } else {
                self.data.iter().map(|amp| amp.norm_sqr()).sum()
            }
        })
    }

    /// Rescale to unit norm. A zero vector is left unchanged (debug
    /// builds assert).
    pub fn renormalize(&mut self) {
        let nrm = self.norm();
        debug_assert!(nrm > 0.0, "renormalize called on a zero vector");
        if nrm > 0.0 {
            self.scale(Complex64::new(1.0 / nrm.sqrt(), 0.0));
        }
    }

    /// Sum `ψ_i · φ_i` without conjugation
    ///
    /// # Errors
    /// Returns [`StateError::DimensionMismatch`] if the sizes differ.
    pub fn dot(&self, other: &QubitVector) -> Result<Complex64> {
        self.check_dimension(other)?;
        let active = self.parallel.active(self.num_qubits);
        let (re, im) = self.parallel.run(active, || {
            if active {
                self.data
                    .par_iter()
                    .zip(other.data.par_iter())
                    .map(|(a, b)| {
                        let z = a * b;
                        (z.re, z.im)
                    })
                    .reduce(|| (0.0, 0.0), |x, y| (x.0 + y.0, x.1 + y.1))
            } else {
                self.data.iter().zip(&other.data).fold((0.0, 0.0), |acc, (a, b)| {
                    let z = a * b;
                    (acc.0 + z.re, acc.1 + z.im)
                })
            }
        });
        Ok(Complex64::new(re, im))
    }

    /// Sum `ψ_i · conj(φ_i)`; equals [`dot`](Self::dot) against the
    /// conjugated argument.
    ///
    /// # Errors
    /// Returns [`StateError::DimensionMismatch`] if the sizes differ.
    pub fn inner_product(&self, other: &QubitVector) -> Result<Complex64> {
        self.check_dimension(other)?;
        let active = self.parallel.active(self.num_qubits);
        let (re, im) = self.parallel.run(active, || {
            if active {
                self.data
                    .par_iter()
                    .zip(other.data.par_iter())
                    .map(|(a, b)| {
                        let z = a * b.conj();
                        (z.re, z.im)
                    })
                    .reduce(|| (0.0, 0.0), |x, y| (x.0 + y.0, x.1 + y.1))
            } else {
                self.data.iter().zip(&other.data).fold((0.0, 0.0), |acc, (a, b)| {
                    let z = a * b.conj();
                    (acc.0 + z.re, acc.1 + z.im)
                })
            }
        });
        Ok(Complex64::new(re, im))
    }

    pub(crate) fn scale(&mut self, lambda: Complex64) {
        let active = self.parallel.active(self.num_qubits);
        let data = &mut self.data;
        self.parallel.run(active, move || {
            if active {
                data.par_iter_mut().for_each(|amp| *amp *= lambda);
            } else {
                for amp in data.iter_mut() {
                    *amp *= lambda;
                }
            }
        });
    }

    // Gate application

    /// Apply a matrix to the listed target qubits, in place.
    ///
    /// `mat` is a flat column-major vector of length `2^K` (the diagonal
    /// of a diagonal matrix) or `4^K` (a full dense matrix), written in
    /// the listed qubit order: footprint bit `j` is `qubits[j]`.
    ///
    /// Dense matrices on 2..=5 qubits use the mask-table kernels when
    /// gate optimization is enabled; more than 5 qubits always take the
    /// runtime-K path.
    ///
    /// # Errors
    /// Returns error if a qubit index is out of range or the matrix
    /// length fits neither form. The state is unchanged on error.
    pub fn apply_matrix(&mut self, qubits: &[usize], mat: &[Complex64]) -> Result<()> {
        self.check_qubits(qubits)?;
        let dim = 1usize << qubits.len();

        if mat.len() == dim {
            return self.apply_diagonal(qubits, mat);
        }
        if mat.len() != dim * dim {
            return Err(StateError::DimensionMismatch {
                expected: dim * dim,
                actual: mat.len(),
            });
        }

        let active = self.parallel.active(self.num_qubits);
        let gate_opt = self.gate_opt;
        let data = self.data.as_mut_slice();
        self.parallel.run(active, move || match qubits.len() {
            1 => {
                single_qubit::apply_matrix(data, qubits[0], mat, active);
                Ok(())
            }
            2 => {
                let qs = [qubits[0], qubits[1]];
                if gate_opt {
                    fixed::apply_matrix_opt2(data, &qs, mat, active)
                } else {
                    fixed::apply_matrix_fixed::<2, 4>(data, &qs, mat, active);
                    Ok(())
                }
            }
            3 => {
                let qs = [qubits[0], qubits[1], qubits[2]];
                if gate_opt {
                    fixed::apply_matrix_opt3(data, &qs, mat, active)
                } else {
                    fixed::apply_matrix_fixed::<3, 8>(data, &qs, mat, active);
                    Ok(())
                }
            }
            4 => {
                let qs = [qubits[0], qubits[1], qubits[2], qubits[3]];
                if gate_opt {
                    fixed::apply_matrix_opt4(data, &qs, mat, active)
                } else {
                    fixed::apply_matrix_fixed::<4, 16>(data, &qs, mat, active);
                    Ok(())
                }
            }
            5 => {
                let qs = [qubits[0], qubits[1], qubits[2], qubits[3], qubits[4]];
                if gate_opt {
                    fixed::apply_matrix_opt5(data, &qs, mat, active)
                } else {
                    fixed::apply_matrix_fixed::<5, 32>(data, &qs, mat, active);
                    Ok(())
                }
            }
            _ => {
                let mut sorted: SmallVec<[usize; 8]> = SmallVec::from_slice(qubits);
                sorted.sort_unstable();
                dynamic::apply_matrix_dynamic(data, qubits, &sorted, mat, active);
                Ok(())
            }
        })
    }

    fn apply_diagonal(&mut self, qubits: &[usize], diag: &[Complex64]) -> Result<()> {
        if qubits.is_empty() {
            // Scalar gate: a global phase
            self.scale(diag[0]);
            return Ok(());
        }
        let active = self.parallel.active(self.num_qubits);
        let data = self.data.as_mut_slice();
        self.parallel.run(active, move || {
            if qubits.len() == 1 {
                single_qubit::apply_diagonal(data, qubits[0], diag, active);
            } else {
                dynamic::apply_diagonal_dynamic(data, qubits, diag, active);
            }
        });
        Ok(())
    }

    /// Pauli-X on `qubit`
    pub fn apply_x(&mut self, qubit: usize) -> Result<()> {
        self.check_qubit(qubit)?;
        let active = self.parallel.active(self.num_qubits);
        let data = self.data.as_mut_slice();
        self.parallel
            .run(active, move || single_qubit::apply_x(data, qubit, active));
        Ok(())
    }

    /// Pauli-Y on `qubit`
    pub fn apply_y(&mut self, qubit: usize) -> Result<()> {
        self.check_qubit(qubit)?;
        let active = self.parallel.active(self.num_qubits);
        let data = self.data.as_mut_slice();
        self.parallel
            .run(active, move || single_qubit::apply_y(data, qubit, active));
        Ok(())
    }

    /// Pauli-Z on `qubit`
    pub fn apply_z(&mut self, qubit: usize) -> Result<()> {
        self.check_qubit(qubit)?;
        let active = self.parallel.active(self.num_qubits);
        let data = self.data.as_mut_slice();
        self.parallel
            .run(active, move || single_qubit::apply_z(data, qubit, active));
        Ok(())
    }

    /// Controlled-NOT with control `qctrl` and target `qtrgt`
    pub fn apply_cnot(&mut self, qctrl: usize, qtrgt: usize) -> Result<()> {
        self.check_qubit_pair(qctrl, qtrgt)?;
        let active = self.parallel.active(self.num_qubits);
        let data = self.data.as_mut_slice();
        self.parallel
            .run(active, move || fixed::apply_cnot(data, qctrl, qtrgt, active));
        Ok(())
    }

    /// Controlled-Z on the qubit pair
    pub fn apply_cz(&mut self, qubit0: usize, qubit1: usize) -> Result<()> {
        self.check_qubit_pair(qubit0, qubit1)?;
        let active = self.parallel.active(self.num_qubits);
        let data = self.data.as_mut_slice();
        self.parallel
            .run(active, move || fixed::apply_cz(data, qubit0, qubit1, active));
        Ok(())
    }

    /// SWAP the qubit pair
    pub fn apply_swap(&mut self, qubit0: usize, qubit1: usize) -> Result<()> {
        self.check_qubit_pair(qubit0, qubit1)?;
        let active = self.parallel.active(self.num_qubits);
        let data = self.data.as_mut_slice();
        self.parallel
            .run(active, move || fixed::apply_swap(data, qubit0, qubit1, active));
        Ok(())
    }

    // Validation

    pub(crate) fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(StateError::InvalidQubitIndex {
                index: qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    pub(crate) fn check_qubits(&self, qubits: &[usize]) -> Result<()> {
        for (i, &qubit) in qubits.iter().enumerate() {
            self.check_qubit(qubit)?;
            if qubits[..i].contains(&qubit) {
                return Err(StateError::InvalidQubitIndex {
                    index: qubit,
                    num_qubits: self.num_qubits,
                });
            }
        }
        Ok(())
    }

    fn check_qubit_pair(&self, qubit0: usize, qubit1: usize) -> Result<()> {
        self.check_qubit(qubit0)?;
        self.check_qubit(qubit1)?;
        if qubit0 == qubit1 {
            return Err(StateError::InvalidQubitIndex {
                index: qubit1,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    pub(crate) fn check_dimension(&self, other: &QubitVector) -> Result<()> {
        if self.num_states != other.num_states {
            return Err(StateError::DimensionMismatch {
                expected: self.num_states,
                actual: other.num_states,
            });
        }
        Ok(())
    }
}

// Arithmetic operators

impl MulAssign<Complex64> for QubitVector {
    fn mul_assign(&mut self, lambda: Complex64) {
        self.scale(lambda);
    }
}

impl MulAssign<f64> for QubitVector {
    fn mul_assign(&mut self, lambda: f64) {
        self.scale(Complex64::new(lambda, 0.0));
    }
}

impl AddAssign<&QubitVector> for QubitVector {
    /// Elementwise addition.
    ///
    /// # Panics
    /// Panics if the vectors have different sizes.
    fn add_assign(&mut self, other: &QubitVector) {
        assert_eq!(
            self.num_states, other.num_states,
            "vector addition requires matching dimensions"
        );
        let active = self.parallel.active(self.num_qubits);
        let data = &mut self.data;
        self.parallel.run(active, move || {
            if active {
                data.par_iter_mut()
                    .zip(other.data.par_iter())
                    .for_each(|(a, b)| *a += b);
            } else {
                for (a, b) in data.iter_mut().zip(&other.data) {
                    *a += b;
                }
            }
        });
    }
}

impl SubAssign<&QubitVector> for QubitVector {
    /// Elementwise subtraction.
    ///
    /// # Panics
    /// Panics if the vectors have different sizes.
    fn sub_assign(&mut self, other: &QubitVector) {
        assert_eq!(
            self.num_states, other.num_states,
            "vector subtraction requires matching dimensions"
        );
        let active = self.parallel.active(self.num_qubits);
        let data = &mut self.data;
        self.parallel.run(active, move || {
            if active {
                data.par_iter_mut()
                    .zip(other.data.par_iter())
                    .for_each(|(a, b)| *a -= b);
            } else {
                for (a, b) in data.iter_mut().zip(&other.data) {
                    *a -= b;
                }
            }
        });
    }
}

impl Add<&QubitVector> for &QubitVector {
    type Output = QubitVector;

    fn add(self, other: &QubitVector) -> QubitVector {
        let mut ret = self.clone();
        ret += other;
        ret
    }
}

impl Sub<&QubitVector> for &QubitVector {
    type Output = QubitVector;

    fn sub(self, other: &QubitVector) -> QubitVector {
        let mut ret = self.clone();
        ret -= other;
        ret
    }
}

impl Index<usize> for QubitVector {
    type Output = Complex64;

    #[inline]
    fn index(&self, element: usize) -> &Complex64 {
        &self.data[element]
    }
}

impl IndexMut<usize> for QubitVector {
    #[inline]
    fn index_mut(&mut self, element: usize) -> &mut Complex64 {
        &mut self.data[element]
    }
}

impl fmt::Debug for QubitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QubitVector")
            .field("num_qubits", &self.num_qubits)
            .field("num_states", &self.num_states)
            .field("norm", &self.norm())
            .field("gate_opt", &self.gate_opt)
            .finish()
    }
}

// Serialization: a sequence of [re, im] pairs in index order

impl Serialize for QubitVector {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.num_states))?;
        for amp in &self.data {
            seq.serialize_element(&[amp.re, amp.im])?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for QubitVector {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs: Vec<[f64; 2]> = Vec::deserialize(deserializer)?;
        let amps: Vec<Complex64> = pairs
            .iter()
            .map(|p| Complex64::new(p[0], p[1]))
            .collect();
        QubitVector::from_complex(&amps).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn hadamard() -> Vec<Complex64> {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        vec![c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)]
    }

    #[test]
    fn test_new_is_zero_vector() {
        let qv = QubitVector::new(3).unwrap();
        assert_eq!(qv.qubits(), 3);
        assert_eq!(qv.size(), 8);
        assert_relative_eq!(qv.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_initialize() {
        let mut qv = QubitVector::new(2).unwrap();
        qv.initialize();
        assert_relative_eq!(qv[0].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(qv.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_initialize_plus() {
        let mut qv = QubitVector::new(4).unwrap();
        qv.initialize_plus();
        assert_relative_eq!(qv[7].re, 0.25, epsilon = 1e-12);
        assert_relative_eq!(qv.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_qubit_state() {
        let mut qv = QubitVector::new(0).unwrap();
        assert_eq!(qv.size(), 1);
        qv.initialize();
        assert_relative_eq!(qv.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_assign_rederives_qubits() {
        let mut qv = QubitVector::new(1).unwrap();
        qv.assign(&vec![c(0.5, 0.0); 8]).unwrap();
        assert_eq!(qv.qubits(), 3);
        assert_eq!(qv.size(), 8);
    }

    #[test]
    fn test_assign_rejects_non_power_of_two() {
        let mut qv = QubitVector::new(1).unwrap();
        let err = qv.assign(&vec![c(1.0, 0.0); 3]).unwrap_err();
        assert_eq!(err, StateError::NotPowerOfTwo { length: 3 });
        // Unchanged on error
        assert_eq!(qv.qubits(), 1);
    }

    #[test]
    fn test_from_real() {
        let qv = QubitVector::from_real(&[0.6, 0.8]).unwrap();
        assert_eq!(qv.qubits(), 1);
        assert_relative_eq!(qv.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_conj() {
        let mut qv = QubitVector::from_complex(&[c(0.0, 1.0), c(0.5, -0.5)]).unwrap();
        qv.conj();
        assert_relative_eq!(qv[0].im, -1.0, epsilon = 1e-12);
        assert_relative_eq!(qv[1].im, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_renormalize() {
        let mut qv = QubitVector::from_real(&[3.0, 4.0]).unwrap();
        qv.renormalize();
        assert_relative_eq!(qv.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(qv[0].re, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_renormalize_zero_is_noop() {
        let mut qv = QubitVector::new(2).unwrap();
        // release behavior: silent no-op
        if cfg!(not(debug_assertions)) {
            qv.renormalize();
            assert_relative_eq!(qv.norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_dot_and_inner_product() {
        let psi = QubitVector::from_complex(&[c(0.0, 1.0), c(1.0, 0.0)]).unwrap();

        // dot has no conjugation: (i*i) + (1*1) = 0
        let d = psi.dot(&psi).unwrap();
        assert_relative_eq!(d.re, 0.0, epsilon = 1e-12);

        // inner product against itself equals the norm
        let ip = psi.inner_product(&psi).unwrap();
        assert_relative_eq!(ip.re, psi.norm(), epsilon = 1e-12);
        assert_relative_eq!(ip.im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dot_of_conjugate_equals_inner_product() {
        let psi = QubitVector::from_complex(&[c(0.3, 0.4), c(-0.5, 0.7)]).unwrap();
        let mut phi = psi.clone();
        phi.conj();

        let d = psi.dot(&phi).unwrap();
        let ip = psi.inner_product(&psi).unwrap();
        assert_relative_eq!(d.re, ip.re, epsilon = 1e-12);
        assert_relative_eq!(d.im, ip.im, epsilon = 1e-12);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = QubitVector::new(2).unwrap();
        let b = QubitVector::new(3).unwrap();
        assert!(a.dot(&b).is_err());
        assert!(a.inner_product(&b).is_err());
    }

    #[test]
    fn test_scalar_multiply() {
        let mut qv = QubitVector::from_real(&[1.0, 2.0]).unwrap();
        qv *= 2.0;
        assert_relative_eq!(qv[1].re, 4.0, epsilon = 1e-12);

        qv *= c(0.0, 1.0);
        assert_relative_eq!(qv[1].im, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_vector_add_sub() {
        let a = QubitVector::from_real(&[1.0, 2.0]).unwrap();
        let b = QubitVector::from_real(&[3.0, 5.0]).unwrap();

        let sum = &a + &b;
        assert_relative_eq!(sum[0].re, 4.0, epsilon = 1e-12);
        assert_relative_eq!(sum[1].re, 7.0, epsilon = 1e-12);

        let diff = &sum - &a;
        assert_relative_eq!(diff[0].re, 3.0, epsilon = 1e-12);
        assert_relative_eq!(diff[1].re, 5.0, epsilon = 1e-12);
    }

    #[test]
    #[should_panic(expected = "matching dimensions")]
    fn test_add_mismatched_panics() {
        let mut a = QubitVector::new(2).unwrap();
        let b = QubitVector::new(3).unwrap();
        a += &b;
    }

    #[test]
    fn test_apply_matrix_rejects_bad_length() {
        let mut qv = QubitVector::new(2).unwrap();
        qv.initialize();
        let err = qv.apply_matrix(&[0], &vec![c(1.0, 0.0); 3]).unwrap_err();
        assert_eq!(
            err,
            StateError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_apply_matrix_rejects_bad_qubit() {
        let mut qv = QubitVector::new(2).unwrap();
        let err = qv.apply_matrix(&[2], &hadamard()).unwrap_err();
        assert!(matches!(err, StateError::InvalidQubitIndex { .. }));
    }

    #[test]
    fn test_apply_matrix_rejects_duplicate_qubits() {
        let mut qv = QubitVector::new(3).unwrap();
        qv.initialize();
        let before = qv.amplitudes().to_vec();

        let mat = vec![c(0.5, 0.0); 16];
        let err = qv.apply_matrix(&[1, 1], &mat).unwrap_err();
        assert_eq!(
            err,
            StateError::InvalidQubitIndex {
                index: 1,
                num_qubits: 3
            }
        );
        // Rejected before any write
        assert_eq!(qv.amplitudes(), before.as_slice());
    }

    #[test]
    fn test_cnot_rejects_equal_qubits() {
        let mut qv = QubitVector::new(2).unwrap();
        assert!(qv.apply_cnot(1, 1).is_err());
    }

    #[test]
    fn test_empty_target_list_is_global_phase() {
        let mut qv = QubitVector::new(1).unwrap();
        qv.initialize();
        qv.apply_matrix(&[], &[c(0.0, 1.0)]).unwrap();
        assert_relative_eq!(qv[0].im, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gate_opt_toggle() {
        let mut qv = QubitVector::new(2).unwrap();
        assert!(!qv.gate_opt());
        qv.enable_gate_opt();
        assert!(qv.gate_opt());
        qv.disable_gate_opt();
        assert!(!qv.gate_opt());
    }

    #[test]
    fn test_unitary_preserves_norm() {
        let mut qv = QubitVector::new(3).unwrap();
        qv.initialize();
        qv.apply_matrix(&[1], &hadamard()).unwrap();
        qv.apply_cnot(1, 2).unwrap();
        qv.apply_swap(0, 2).unwrap();
        assert_relative_eq!(qv.norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut qv = QubitVector::new(2).unwrap();
        qv.initialize();
        qv.apply_matrix(&[0], &hadamard()).unwrap();

        let encoded = serde_json::to_string(&qv).unwrap();
        let decoded: QubitVector = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.qubits(), 2);
        for (a, b) in decoded.amplitudes().iter().zip(qv.amplitudes()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_deserialize_rejects_bad_length() {
        let result: std::result::Result<QubitVector, _> =
            serde_json::from_str("[[1.0, 0.0], [0.0, 0.0], [0.0, 0.0]]");
        assert!(result.is_err());
    }
}
