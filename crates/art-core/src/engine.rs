use serde::{Deserialize, Serialize};

use crate::coding::complement_code_into;
use crate::config::{ArtConfig, EngineConfig};
use crate::constants::COMMIT_RESONANCE;
use crate::decision::{resonance, resonate_or_reset};
use crate::error::Result;
use crate::kernel::{self, VectorKernel};
use crate::matrix::CategoryMatrix;
use crate::scheduler::Scheduler;
use crate::scratch::{ScratchArena, ScratchStats};

/// How a call ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// An existing category passed vigilance and learned the input.
    Reinforced,
    /// No category passed; the input became a new prototype.
    Committed,
    /// Read-only lookup of the top-ranked category.
    Inferred,
}

/// Result of one `fit` or `predict` call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Match ratio of the chosen category; `0.0` on commit.
    pub resonance: f64,
    pub category: usize,
    pub outcome: Outcome,
}

/// Online fuzzy ART clustering engine.
///
/// Each call runs: complement coding → parallel scoring → ranking →
/// sequential vigilance walk → reinforce one category or commit a new one.
/// Calls take `&mut self`; parallelism is internal to a call.
pub struct FuzzyArt {
    config: ArtConfig,
    feature_count: usize,
    kernel: &'static dyn VectorKernel,
    scheduler: Scheduler,
    categories: CategoryMatrix,
    scratch: ScratchArena,
    coded: Vec<f64>,
}

impl FuzzyArt {
    /// Build an engine with the default scheduler and the shared kernel.
    pub fn new(feature_count: usize, rho: f64, alpha: f64, beta: f64) -> Result<Self> {
        Self::from_config(EngineConfig::new(
            feature_count,
            ArtConfig::new(rho, alpha, beta),
        ))
    }

    pub fn from_config(config: EngineConfig) -> Result<Self> {
        Self::with_kernel(config, kernel::shared())
    }

    /// Build an engine bound to a specific kernel.
    pub fn with_kernel(config: EngineConfig, kernel: &'static dyn VectorKernel) -> Result<Self> {
        config.validate()?;
        let width = 2 * config.feature_count;
        let scheduler = Scheduler::new(&config.scheduler)?;
        tracing::debug!(
            feature_count = config.feature_count,
            rho = config.model.rho,
            alpha = config.model.alpha,
            beta = config.model.beta,
            kernel = kernel.name(),
            "fuzzy ART engine ready"
        );
        Ok(Self {
            config: config.model,
            feature_count: config.feature_count,
            kernel,
            scheduler,
            categories: CategoryMatrix::new(width),
            scratch: ScratchArena::new(width),
            coded: vec![0.0; width],
        })
    }

    /// Learn from `x`: reinforce the first resonating category or commit a
    /// new one.
    ///
    /// # Panics
    /// If `x.len()` differs from the feature count.
    pub fn fit(&mut self, x: &[f64]) -> Classification {
        self.encode(x);
        let Self {
            config,
            kernel,
            scheduler,
            categories,
            scratch,
            coded,
            ..
        } = self;

        let a: &[f64] = coded;

        let decided = {
            let mut lease = scratch.lease(categories.len());
            scheduler.activate(*kernel, a, categories, config.alpha, &mut lease);
            let a_norm = kernel.sum(a);
            resonate_or_reset(*kernel, &lease, a_norm, config.rho, config.beta, categories)
        };

        match decided {
            Some((category, resonance)) => Classification {
                resonance,
                category,
                outcome: Outcome::Reinforced,
            },
            None => {
                let category = categories.push(a);
                tracing::trace!(category, "committed new category");
                Classification {
                    resonance: COMMIT_RESONANCE,
                    category,
                    outcome: Outcome::Committed,
                }
            }
        }
    }

    /// Classify `x`. With `learn` this is [`fit`](Self::fit). Without it,
    /// returns the top-ranked category and its resonance and mutates
    /// nothing; `None` when no category exists yet.
    ///
    /// # Panics
    /// If `x.len()` differs from the feature count.
    pub fn predict(&mut self, x: &[f64], learn: bool) -> Option<Classification> {
        if learn {
            return Some(self.fit(x));
        }
        self.encode(x);
        let Self {
            config,
            kernel,
            scheduler,
            categories,
            scratch,
            coded,
            ..
        } = self;

        let a: &[f64] = coded;

        let mut lease = scratch.lease(categories.len());
        scheduler.activate(*kernel, a, categories, config.alpha, &mut lease);
        let a_norm = kernel.sum(a);
        lease.top().map(|top| Classification {
            resonance: resonance(top.fi_norm, a_norm),
            category: top.category,
            outcome: Outcome::Inferred,
        })
    }

    /// Release the worker pool. The engine cannot be used afterwards.
    pub fn close(self) {
        tracing::debug!(categories = self.categories.len(), "closing fuzzy ART engine");
        drop(self);
    }

    pub fn feature_count(&self) -> usize {
        self.feature_count
    }

    pub fn config(&self) -> &ArtConfig {
        &self.config
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Prototype of category `j`, length 2M.
    pub fn prototype(&self, j: usize) -> Option<&[f64]> {
        (j < self.categories.len()).then(|| self.categories.row(j))
    }

    pub fn prototypes(&self) -> &CategoryMatrix {
        &self.categories
    }

    pub fn kernel_name(&self) -> &'static str {
        self.kernel.name()
    }

    pub fn workers(&self) -> usize {
        self.scheduler.workers()
    }

    pub fn scratch_stats(&self) -> ScratchStats {
        self.scratch.stats()
    }

    fn encode(&mut self, x: &[f64]) {
        assert_eq!(
            x.len(),
            self.feature_count,
            "input length must equal the feature count"
        );
        complement_code_into(x, &mut self.coded);
    }
}

impl std::fmt::Debug for FuzzyArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyArt")
            .field("config", &self.config)
            .field("feature_count", &self.feature_count)
            .field("kernel", &self.kernel.name())
            .field("scheduler", &self.scheduler)
            .field("categories", &self.categories.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::error::ArtError;
    use crate::kernel::ScalarKernel;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    static SCALAR: ScalarKernel = ScalarKernel;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn engine(m: usize, rho: f64, workers: usize, batch_size: usize) -> FuzzyArt {
        let config = EngineConfig::new(m, ArtConfig::new(rho, 0.01, 1.0)).with_scheduler(
            SchedulerConfig {
                batch_size,
                workers: Some(workers),
                reserved_workers: 0,
            },
        );
        FuzzyArt::with_kernel(config, &SCALAR).unwrap()
    }

    fn samples(rng: &mut SmallRng, m: usize, n: usize) -> Vec<Vec<f64>> {
        (0..n)
            .map(|_| (0..m).map(|_| rng.random::<f64>()).collect())
            .collect()
    }

    #[test]
    fn test_construction_errors_name_parameter() {
        assert_eq!(
            FuzzyArt::new(2, 1.2, 0.01, 1.0).unwrap_err(),
            ArtError::InvalidVigilance { value: 1.2 }
        );
        assert_eq!(
            FuzzyArt::new(2, 0.5, -1.0, 1.0).unwrap_err(),
            ArtError::InvalidChoice { value: -1.0 }
        );
        assert_eq!(
            FuzzyArt::new(2, 0.5, 0.01, 0.0).unwrap_err(),
            ArtError::InvalidLearningRate { value: 0.0 }
        );
        assert_eq!(
            FuzzyArt::new(0, 0.5, 0.01, 1.0).unwrap_err(),
            ArtError::InvalidFeatureCount { value: 0 }
        );
    }

    #[test]
    fn test_bootstrap_creates_category_zero() {
        let mut art = engine(3, 0.5, 2, 4);
        let c = art.fit(&[0.3, 0.6, 0.9]);
        assert_eq!(c.category, 0);
        assert_eq!(c.outcome, Outcome::Committed);
        assert_eq!(c.resonance, COMMIT_RESONANCE);
        assert_eq!(art.category_count(), 1);
    }

    #[test]
    fn test_commit_stores_coded_input() {
        let mut art = engine(2, 0.9, 1, 4);
        art.fit(&[0.1, 0.2]);
        let p = art.prototype(0).unwrap();
        let expected = [0.1, 0.2, 0.9, 0.8];
        for (got, want) in p.iter().zip(expected) {
            assert!((got - want).abs() < 1e-15);
        }
        assert!(art.prototype(1).is_none());
    }

    #[test]
    fn test_identical_input_resonates_fully() {
        let mut art = engine(4, 0.99, 2, 2);
        let x = [0.2, 0.4, 0.6, 0.8];
        art.fit(&x);
        let c = art.fit(&x);
        assert_eq!(c.outcome, Outcome::Reinforced);
        assert_eq!(c.category, 0);
        assert!((c.resonance - 1.0).abs() < 1e-12);
        assert_eq!(art.category_count(), 1);
    }

    #[test]
    fn test_rho_one_commits_every_distinct_input() {
        let mut rng = rng();
        let mut art = engine(5, 1.0, 2, 4);
        for (i, x) in samples(&mut rng, 5, 30).iter().enumerate() {
            let c = art.fit(x);
            assert_eq!(c.outcome, Outcome::Committed);
            assert_eq!(art.category_count(), i + 1);
        }
    }

    #[test]
    fn test_rho_zero_never_grows_past_one() {
        let mut rng = rng();
        let mut art = engine(5, 0.0, 2, 4);
        art.fit(&[0.5; 5]);
        for x in samples(&mut rng, 5, 50) {
            let c = art.fit(&x);
            assert_eq!(c.outcome, Outcome::Reinforced);
            assert_eq!(c.category, 0);
        }
        assert_eq!(art.category_count(), 1);
    }

    #[test]
    fn test_predict_without_learning_is_read_only() {
        let mut rng = rng();
        let mut art = engine(4, 0.8, 2, 3);
        for x in samples(&mut rng, 4, 20) {
            art.fit(&x);
        }
        let before = art.prototypes().clone();
        for x in samples(&mut rng, 4, 20) {
            let c = art.predict(&x, false).unwrap();
            assert_eq!(c.outcome, Outcome::Inferred);
            assert!((0.0..=1.0).contains(&c.resonance));
        }
        assert_eq!(art.prototypes(), &before);
    }

    #[test]
    fn test_predict_empty_without_learning() {
        let mut art = engine(2, 0.5, 1, 4);
        assert!(art.predict(&[0.5, 0.5], false).is_none());
        assert_eq!(art.scratch_stats().outstanding, 0);
        assert_eq!(art.category_count(), 0);
    }

    #[test]
    fn test_predict_with_learning_matches_fit() {
        let mut rng = rng();
        let data = samples(&mut rng, 3, 40);
        let mut a = engine(3, 0.7, 2, 4);
        let mut b = engine(3, 0.7, 2, 4);
        for x in &data {
            assert_eq!(Some(a.fit(x)), b.predict(x, true));
        }
        assert_eq!(a.prototypes(), b.prototypes());
    }

    #[test]
    fn test_predict_reports_top_ranked() {
        let mut art = engine(2, 0.9, 1, 4);
        art.fit(&[0.1, 0.1]);
        art.fit(&[0.9, 0.9]);
        let c = art.predict(&[0.85, 0.95], false).unwrap();
        assert_eq!(c.category, 1);
    }

    #[test]
    fn test_scratch_balanced_across_exit_paths() {
        let mut rng = rng();
        let mut art = engine(3, 0.75, 3, 2);
        assert_eq!(art.scratch_stats().outstanding, 0);
        for x in samples(&mut rng, 3, 25) {
            art.fit(&x);
            assert_eq!(art.scratch_stats().outstanding, 0);
            art.predict(&x, false);
            assert_eq!(art.scratch_stats().outstanding, 0);
        }
        let stats = art.scratch_stats();
        assert_eq!(stats.acquired, stats.released);
        assert!(stats.capacity <= art.category_count());
    }

    #[test]
    #[should_panic(expected = "feature count")]
    fn test_wrong_length_fails_fast() {
        let mut art = engine(3, 0.5, 1, 4);
        art.fit(&[0.1, 0.2]);
    }

    #[test]
    fn test_close_consumes() {
        let mut art = engine(2, 0.5, 2, 4);
        art.fit(&[0.3, 0.3]);
        art.close();
    }

    #[test]
    fn test_accessors() {
        let art = engine(7, 0.5, 3, 4);
        assert_eq!(art.feature_count(), 7);
        assert_eq!(art.workers(), 3);
        assert_eq!(art.kernel_name(), "scalar");
        assert_eq!(art.config().rho, 0.5);
        assert_eq!(art.prototypes().width(), 14);
    }
}
