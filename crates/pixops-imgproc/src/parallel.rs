use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row length must be valid.
    #[error("row length must be > 0 and divide the buffer length ({1}), got {0}")]
    InvalidRowLength(usize, usize),

    /// Input and output have a different number of rows.
    #[error("source and destination must have the same number of rows, got {0} and {1}")]
    RowCountMismatch(usize, usize),
}

/// Controls how the kernels distribute their independent units of work.
///
/// The unit of work is a row of pixels for the color and warp kernels, and a column or
/// a row for each distance transform pass. Units never share mutable state, so every
/// strategy produces the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    Parallel,

    /// Run sequentially on the current thread.
    ///
    /// This is the reference path: useful for small images, debugging, or when the
    /// overhead of parallelization outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead. Batched
    /// calls build it once for the whole batch, see [`ExecutionStrategy::install`].
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Run `op` once under this strategy.
    ///
    /// `Fixed(n)` builds its thread pool here and hands `Parallel` to `op`, so every row
    /// helper called inside `op` runs on that single pool. Other strategies are passed
    /// through unchanged.
    ///
    /// # Errors
    ///
    /// `Fixed(0)` or a pool that fails to build.
    pub fn install<R: Send>(
        self,
        op: impl FnOnce(ExecutionStrategy) -> R + Send,
    ) -> Result<R, ParallelError> {
        match self {
            ExecutionStrategy::Fixed(n) => {
                if n == 0 {
                    return Err(ParallelError::InvalidThreadCount(n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;
                Ok(pool.install(|| op(ExecutionStrategy::Parallel)))
            }
            _ => Ok(op(self)),
        }
    }

    /// Run `op` under this strategy. `op` receives `true` when it may use rayon.
    fn run<R: Send>(self, op: impl FnOnce(bool) -> R + Send) -> Result<R, ParallelError> {
        self.install(|strategy| op(strategy != ExecutionStrategy::Serial))
    }
}

fn check_rows(len: usize, row_len: usize) -> Result<usize, ParallelError> {
    if row_len == 0 || len % row_len != 0 {
        return Err(ParallelError::InvalidRowLength(row_len, len));
    }
    Ok(len / row_len)
}

/// Apply a function to each row of a buffer.
///
/// The closure receives the row index and the mutable row.
///
/// # Arguments
///
/// * `strategy` - The execution strategy.
/// * `dst` - The destination buffer, made of rows of `row_len` elements.
/// * `row_len` - The number of elements in a row.
/// * `op` - The operation to perform on each row.
///
/// # Errors
///
/// The row length must be positive and divide the buffer length. An empty buffer is
/// always valid.
pub fn for_each_row_mut<T, F>(
    strategy: ExecutionStrategy,
    dst: &mut [T],
    row_len: usize,
    op: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    for_each_row_mut_init(strategy, dst, row_len, || (), |_, i, row| op(i, row))
}

/// Apply a function to each row of a buffer with per-worker scratch state.
///
/// `init` is called once per worker (once in total for the serial strategy) and the
/// resulting value is reused across the rows that worker processes.
pub fn for_each_row_mut_init<T, S, I, F>(
    strategy: ExecutionStrategy,
    dst: &mut [T],
    row_len: usize,
    init: I,
    op: F,
) -> Result<(), ParallelError>
where
    T: Send,
    I: Fn() -> S + Send + Sync,
    F: Fn(&mut S, usize, &mut [T]) + Send + Sync,
{
    if dst.is_empty() {
        return Ok(());
    }
    check_rows(dst.len(), row_len)?;

    strategy.run(|parallel| {
        if parallel {
            dst.par_chunks_exact_mut(row_len)
                .enumerate()
                .for_each_init(&init, |state, (i, row)| op(state, i, row));
        } else {
            let mut state = init();
            dst.chunks_exact_mut(row_len)
                .enumerate()
                .for_each(|(i, row)| op(&mut state, i, row));
        }
    })
}

/// Apply a function to each pair of source and destination rows.
///
/// Source and destination may have a different row length (e.g. a different number of
/// channels) but must have the same number of rows.
pub fn for_each_row_zip<T1, T2, F>(
    strategy: ExecutionStrategy,
    src: &[T1],
    src_row_len: usize,
    dst: &mut [T2],
    dst_row_len: usize,
    op: F,
) -> Result<(), ParallelError>
where
    T1: Sync,
    T2: Send,
    F: Fn(&[T1], &mut [T2]) + Send + Sync,
{
    if src.is_empty() && dst.is_empty() {
        return Ok(());
    }
    let src_rows = check_rows(src.len(), src_row_len)?;
    let dst_rows = check_rows(dst.len(), dst_row_len)?;
    if src_rows != dst_rows {
        return Err(ParallelError::RowCountMismatch(src_rows, dst_rows));
    }

    strategy.run(|parallel| {
        if parallel {
            src.par_chunks_exact(src_row_len)
                .zip(dst.par_chunks_exact_mut(dst_row_len))
                .for_each(|(src_row, dst_row)| op(src_row, dst_row));
        } else {
            src.chunks_exact(src_row_len)
                .zip(dst.chunks_exact_mut(dst_row_len))
                .for_each(|(src_row, dst_row)| op(src_row, dst_row));
        }
    })
}
