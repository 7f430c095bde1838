//! Dense state-vector simulation core for an N-qubit register
//!
//! This crate represents a pure quantum state as a contiguous vector of
//! `2^N` complex amplitudes and applies unitary matrices, measurement
//! projectors, and observable contractions to it in place. The heart of
//! the crate is the bit-indexed gate kernel family: cache-friendly
//! nested strides derived from the target qubit positions, with
//! specialized mask-table kernels for up to five target qubits and a
//! runtime fallback beyond.
//!
//! # Example
//!
//! ```
//! use num_complex::Complex64;
//! use qubitvec::QubitVector;
//!
//! let h = std::f64::consts::FRAC_1_SQRT_2;
//! let hadamard: Vec<Complex64> =
//!     [h, h, h, -h].iter().map(|&v| Complex64::new(v, 0.0)).collect();
//!
//! let mut qv = QubitVector::new(2).unwrap();
//! qv.initialize();
//! qv.apply_matrix(&[0], &hadamard).unwrap();
//! qv.apply_cnot(0, 1).unwrap();
//!
//! // Bell pair: half the weight on |00>, half on |11>
//! assert!((qv.probability(0) - 0.5).abs() < 1e-12);
//! assert!((qv.probability(3) - 0.5).abs() < 1e-12);
//! ```
//!
//! # Conventions
//!
//! - Qubit 0 is the least-significant bit of the amplitude index.
//! - Matrices are flat column-major vectors in the caller's qubit order;
//!   length `2^K` means the diagonal of a diagonal matrix, `4^K` a full
//!   dense matrix.
//! - Nothing renormalizes implicitly; call
//!   [`QubitVector::renormalize`] explicitly.

pub mod error;
pub mod indexing;
pub mod kernels;
pub mod matrix;
pub mod parallel;
pub mod qubit_vector;

mod expectation;
mod probability;

pub use error::{Result, StateError};
pub use parallel::ParallelConfig;
pub use qubit_vector::QubitVector;
