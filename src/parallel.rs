//! Per-object worker pool configuration for data-parallel kernels

use crate::error::{Result, StateError};
use rayon::ThreadPool;
use std::fmt;
use std::sync::Arc;

/// Default qubit threshold below which kernels stay sequential
const DEFAULT_THRESHOLD: usize = 16;

/// Worker pool settings owned by a state vector.
///
/// Parallelism activates only when the state has more than `threshold`
/// qubits and more than one worker thread is configured; below that the
/// fork/join overhead outweighs the kernel work. With `threads == 1` all
/// kernels run sequentially and reductions are bit-stable.
#[derive(Clone)]
pub struct ParallelConfig {
    threads: usize,
    threshold: usize,
    pool: Option<Arc<ThreadPool>>,
}

impl ParallelConfig {
    /// Sequential configuration: one thread, threshold 16 qubits.
    pub fn new() -> Self {
        Self {
            threads: 1,
            threshold: DEFAULT_THRESHOLD,
            pool: None,
        }
    }

    /// Set the number of worker threads. Values of zero are ignored.
    ///
    /// Builds a dedicated pool of exactly `n` workers when `n > 1`.
    ///
    /// # Errors
    /// Returns error if the thread pool cannot be constructed.
    pub fn set_threads(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.pool = if n > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| StateError::ThreadPool {
                    reason: e.to_string(),
                })?;
            Some(Arc::new(pool))
        } else {
            None
        };
        self.threads = n;
        Ok(())
    }

    /// Set the qubit threshold for activating parallelism.
    /// Values of zero are ignored.
    pub fn set_threshold(&mut self, n: usize) {
        if n > 0 {
            self.threshold = n;
        }
    }

    /// Configured worker count
    #[inline]
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Configured activation threshold in qubits
    #[inline]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// True when kernels over a `num_qubits`-qubit state should fan out
    #[inline]
    pub fn active(&self, num_qubits: usize) -> bool {
        self.threads > 1 && num_qubits > self.threshold
    }

    /// Run `f` inside the configured pool when `active`, inline otherwise.
    ///
    /// Rayon parallel iterators invoked from inside `f` are serviced by
    /// this object's pool rather than the global one, so the worker count
    /// is exactly `threads`.
    #[inline]
    pub fn run<R, F>(&self, active: bool, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match (&self.pool, active) {
            (Some(pool), true) => pool.install(f),
            _ => f(),
        }
    }
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParallelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelConfig")
            .field("threads", &self.threads)
            .field("threshold", &self.threshold)
            .finish()
    }
}
