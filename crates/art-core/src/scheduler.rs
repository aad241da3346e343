//! Parallel category scoring.
//!
//! Categories are cut into contiguous batches of `batch_size`; each batch is
//! scored by one task on a fixed-size rayon pool. A task only writes the
//! arena slots of its own categories. `install` returns once every batch has
//! finished, which is the barrier before ranking.

use rayon::prelude::*;

use crate::config::SchedulerConfig;
use crate::error::{ArtError, Result};
use crate::kernel::VectorKernel;
use crate::matrix::CategoryMatrix;
use crate::scratch::{Activation, Lease};

pub struct Scheduler {
    pool: rayon::ThreadPool,
    batch_size: usize,
}

impl Scheduler {
    pub fn new(config: &SchedulerConfig) -> Result<Self> {
        config.validate()?;
        let workers = config.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("art-score-{i}"))
            .build()
            .map_err(|e| ArtError::WorkerPool(e.to_string()))?;
        tracing::debug!(workers, batch_size = config.batch_size, "scoring pool ready");
        Ok(Self {
            pool,
            batch_size: config.batch_size,
        })
    }

    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Score every category in `matrix` against the coded input `a`, then
    /// rank the lease. `lease` must hold exactly `matrix.len()` slots.
    pub fn activate(
        &self,
        kernel: &dyn VectorKernel,
        a: &[f64],
        matrix: &CategoryMatrix,
        alpha: f64,
        lease: &mut Lease<'_>,
    ) {
        debug_assert_eq!(lease.len(), matrix.len());
        let batch_size = self.batch_size;
        let records: &mut [Activation] = lease;

        self.pool.install(|| {
            records
                .par_chunks_mut(batch_size)
                .enumerate()
                .for_each(|(b, batch)| {
                    score_batch(kernel, a, matrix, alpha, b * batch_size, batch)
                });
        });

        lease.rank();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("workers", &self.workers())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

/// Choice function for one batch: `T_j = |A ∧ w_j| / (alpha + |w_j|)`.
fn score_batch(
    kernel: &dyn VectorKernel,
    a: &[f64],
    matrix: &CategoryMatrix,
    alpha: f64,
    start: usize,
    batch: &mut [Activation],
) {
    for (offset, record) in batch.iter_mut().enumerate() {
        let j = start + offset;
        let (fi_norm, w_norm) = kernel.fuzzy_intersection_norms(a, matrix.row(j), &mut record.fi);
        record.category = j;
        record.fi_norm = fi_norm;
        record.w_norm = w_norm;
        record.activation = fi_norm / (alpha + w_norm);
    }
}
