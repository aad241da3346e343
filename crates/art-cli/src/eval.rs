//! Train/test evaluation: learn unsupervised, then score how well the
//! learned categories line up with held-out labels.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use art_core::FuzzyArt;
use serde::Serialize;

use crate::dataset::Partitioned;
use crate::progress::Progress;

const BAR_WIDTH: usize = 40;

#[derive(Debug, Serialize)]
pub struct Report {
    pub epochs: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub categories: usize,
    pub correct: usize,
    pub precision: f64,
    pub train_secs: f64,
    pub test_secs: f64,
    pub kernel: &'static str,
    pub workers: usize,
}

pub struct Evaluation {
    category_label: HashMap<usize, String>,
    train_time: Duration,
}

/// Fit every training sample, label group by label group, for `epochs`
/// passes. Each category is tagged with the first label that reached it.
pub fn train(art: &mut FuzzyArt, data: &Partitioned, epochs: usize, progress: bool) -> Evaluation {
    let start = Instant::now();
    let mut bar = Progress::new(epochs * data.total(), BAR_WIDTH, progress);
    let mut category_label: HashMap<usize, String> = HashMap::new();

    for epoch in 0..epochs {
        for (label, samples) in &data.groups {
            for x in samples {
                let c = art.fit(x);
                category_label
                    .entry(c.category)
                    .or_insert_with(|| label.clone());
                bar.tick();
            }
        }
        tracing::debug!(epoch, categories = art.category_count(), "epoch done");
    }
    bar.finish();

    Evaluation {
        category_label,
        train_time: start.elapsed(),
    }
}

/// Read-only pass over the test set.
pub fn test(
    art: &mut FuzzyArt,
    eval: &Evaluation,
    data: &Partitioned,
    epochs: usize,
    train_samples: usize,
    progress: bool,
) -> Report {
    let start = Instant::now();
    let mut bar = Progress::new(data.total(), BAR_WIDTH, progress);
    let mut correct = 0;

    for (label, samples) in &data.groups {
        for x in samples {
            let hit = art
                .predict(x, false)
                .and_then(|c| eval.category_label.get(&c.category))
                .is_some_and(|l| l == label);
            if hit {
                correct += 1;
            }
            bar.tick();
        }
    }
    bar.finish();

    let test_samples = data.total();
    let precision = if test_samples == 0 {
        0.0
    } else {
        correct as f64 / test_samples as f64
    };

    Report {
        epochs,
        train_samples,
        test_samples,
        categories: art.category_count(),
        correct,
        precision,
        train_secs: eval.train_time.as_secs_f64(),
        test_secs: start.elapsed().as_secs_f64(),
        kernel: art.kernel_name(),
        workers: art.workers(),
    }
}
