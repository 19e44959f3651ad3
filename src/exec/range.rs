use std::ops::Range;
use std::sync::Arc;

use rayon::prelude::*;

use crate::exec::cancel::{CancelToken, is_cancelled};
use crate::foundation::error::{PixelFxError, PixelFxResult};

/// Runs one unit of work per index of a range, in parallel when allowed.
///
/// Every index runs exactly once unless cancellation is observed first. In sequential mode
/// (forced, or ranges of at most one index) units run in increasing order and cancellation is
/// checked before each one. In parallel mode each unit checks cancellation before it starts;
/// units already running finish. The first `Err` stops further dispatch and is returned once
/// in-flight units settle.
#[derive(Clone)]
pub struct RangeExecutor {
    pool: Arc<rayon::ThreadPool>,
    single_threaded: bool,
}

impl RangeExecutor {
    pub fn new(pool: Arc<rayon::ThreadPool>, single_threaded: bool) -> Self {
        Self {
            pool,
            single_threaded,
        }
    }

    /// Worker count of the underlying pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn sequential_for(&self, len: usize) -> bool {
        self.single_threaded || len <= 1 || self.pool.current_num_threads() <= 1
    }

    /// Invoke `unit(i)` for every `i` in `range`.
    pub fn run<F>(
        &self,
        range: Range<usize>,
        cancel: Option<&CancelToken>,
        unit: F,
    ) -> PixelFxResult<()>
    where
        F: Fn(usize) -> PixelFxResult<()> + Sync + Send,
    {
        if self.sequential_for(range.len()) {
            for i in range {
                if is_cancelled(cancel) {
                    tracing::debug!(index = i, "range cancelled");
                    return Ok(());
                }
                unit(i)?;
            }
            return Ok(());
        }

        self.pool.install(|| {
            range.into_par_iter().try_for_each(|i| {
                if is_cancelled(cancel) {
                    return Ok(());
                }
                unit(i)
            })
        })
    }

    /// Like [`RangeExecutor::run`], handing index `lo + k` the owned item `items[k]`.
    ///
    /// This is how each worker receives its own disjoint mutable scanline.
    pub fn run_items<T, F>(
        &self,
        lo: usize,
        items: Vec<T>,
        cancel: Option<&CancelToken>,
        unit: F,
    ) -> PixelFxResult<()>
    where
        T: Send,
        F: Fn(usize, T) -> PixelFxResult<()> + Sync + Send,
    {
        lo.checked_add(items.len())
            .ok_or_else(|| PixelFxError::validation("executor range overflow"))?;

        if self.sequential_for(items.len()) {
            for (k, item) in items.into_iter().enumerate() {
                if is_cancelled(cancel) {
                    tracing::debug!(index = lo + k, "range cancelled");
                    return Ok(());
                }
                unit(lo + k, item)?;
            }
            return Ok(());
        }

        self.pool.install(|| {
            items
                .into_par_iter()
                .enumerate()
                .try_for_each(|(k, item)| {
                    if is_cancelled(cancel) {
                        return Ok(());
                    }
                    unit(lo + k, item)
                })
        })
    }
}

/// Build the worker pool; `None` uses rayon defaults (hardware parallelism).
pub(crate) fn build_thread_pool(threads: Option<usize>) -> PixelFxResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PixelFxError::validation(
            "engine 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("pixelfx-{i}"));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PixelFxError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/exec/range.rs"]
mod tests;
