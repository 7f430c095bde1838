//! Error types for state vector operations

use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Invalid qubit index
    #[error("invalid qubit index {index} for {num_qubits}-qubit state")]
    InvalidQubitIndex { index: usize, num_qubits: usize },

    /// A matrix or vector argument has a length inconsistent with the
    /// declared qubit count
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An input vector's length is not a power of two
    #[error("vector length {length} is not a power of two")]
    NotPowerOfTwo { length: usize },

    /// Requested qubit count cannot be addressed by the state index type
    #[error("state dimension for {num_qubits} qubits is not addressable")]
    InvalidDimension { num_qubits: usize },

    /// The matrix permutation could not locate a target qubit in the
    /// remaining positions. This indicates a bug in the caller (the
    /// source and sorted orders disagree on the qubit set), not bad
    /// input data.
    #[error("matrix permutation failed: qubit {qubit} not found in remaining targets")]
    MatrixPermutation { qubit: usize },

    /// Worker pool construction failure
    #[error("failed to build thread pool: {reason}")]
    ThreadPool { reason: String },
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
