use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ALPHA, DEFAULT_BATCH_SIZE, DEFAULT_BETA, DEFAULT_RHO};
use crate::error::{ArtError, Result};

/// Model parameters, fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtConfig {
    /// Vigilance in [0, 1]. Higher values make matching stricter and
    /// produce more categories; lower values generalize more.
    pub rho: f64,
    /// Choice parameter, > 0. Larger values make the choice depend more on
    /// the match than on the prototype size; smaller values favor categories
    /// with larger prototypes.
    pub alpha: f64,
    /// Learning rate in (0, 1]. 1.0 is fast learning (full replacement),
    /// lower values blend gradually and tolerate noise better.
    pub beta: f64,
}

impl Default for ArtConfig {
    fn default() -> Self {
        Self {
            rho: DEFAULT_RHO,
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
        }
    }
}

impl ArtConfig {
    pub fn new(rho: f64, alpha: f64, beta: f64) -> Self {
        Self { rho, alpha, beta }
    }

    /// Check every bound. NaN fails all of them.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.rho) {
            return Err(ArtError::InvalidVigilance { value: self.rho });
        }
        if !(self.alpha > 0.0) {
            return Err(ArtError::InvalidChoice { value: self.alpha });
        }
        if !(self.beta > 0.0 && self.beta <= 1.0) {
            return Err(ArtError::InvalidLearningRate { value: self.beta });
        }
        Ok(())
    }
}

/// Tuning for the scoring phase. Has no effect on results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Contiguous categories handed to one worker task.
    pub batch_size: usize,
    /// Worker count. `None` means available hardware parallelism.
    pub workers: Option<usize>,
    /// Workers held back for the host process.
    pub reserved_workers: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: None,
            reserved_workers: 0,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ArtError::InvalidBatchSize {
                value: self.batch_size,
            });
        }
        Ok(())
    }

    /// Effective pool size, never below one.
    pub fn worker_count(&self) -> usize {
        let base = self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        base.saturating_sub(self.reserved_workers).max(1)
    }
}

/// Everything needed to build an engine.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub feature_count: usize,
    #[serde(default)]
    pub model: ArtConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl EngineConfig {
    pub fn new(feature_count: usize, model: ArtConfig) -> Self {
        Self {
            feature_count,
            model,
            scheduler: SchedulerConfig::default(),
        }
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.feature_count == 0 {
            return Err(ArtError::InvalidFeatureCount {
                value: self.feature_count,
            });
        }
        self.model.validate()?;
        self.scheduler.validate()
    }
}
