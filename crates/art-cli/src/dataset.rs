//! CSV sample ingestion: one sample per line, optional leading label column,
//! numeric features scaled into [0, 1].

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Clone, Copy, Debug)]
pub struct LoadOptions {
    /// First column is a label, not a feature.
    pub has_label: bool,
    /// Skip the first non-empty line.
    pub header: bool,
    /// Divisor applied to every feature (255 for 8-bit pixels).
    pub scale: f64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            has_label: true,
            header: false,
            scale: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub label: Option<String>,
    pub features: Vec<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub feature_count: usize,
    pub samples: Vec<Sample>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub fn load(path: &Path, opts: LoadOptions) -> Result<Dataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    parse(
        std::io::BufReader::new(file),
        &path.display().to_string(),
        opts,
    )
}

pub fn parse(reader: impl BufRead, source: &str, opts: LoadOptions) -> Result<Dataset> {
    if !(opts.scale > 0.0) {
        bail!("scale must be positive, got {}", opts.scale);
    }

    let mut dataset = Dataset::default();
    let mut skipped_header = !opts.header;

    for (idx, line) in reader.lines().enumerate() {
        let lineno = idx + 1;
        let line = line.with_context(|| format!("{source}:{lineno}: read failed"))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !skipped_header {
            skipped_header = true;
            continue;
        }

        let mut cells = line.split(',').map(str::trim);
        let label = if opts.has_label {
            cells.next().map(str::to_string)
        } else {
            None
        };

        let mut features = Vec::with_capacity(dataset.feature_count);
        for (col, cell) in cells.enumerate() {
            let column = col + 1 + usize::from(opts.has_label);
            let raw: f64 = cell.parse().with_context(|| {
                format!("{source}:{lineno}: column {column}: not a number: {cell:?}")
            })?;
            let v = raw / opts.scale;
            if !(0.0..=1.0).contains(&v) {
                bail!(
                    "{source}:{lineno}: column {column}: {raw} scales to {v}, outside [0, 1]"
                );
            }
            features.push(v);
        }

        if features.is_empty() {
            bail!("{source}:{lineno}: row has no features");
        }
        if dataset.samples.is_empty() {
            dataset.feature_count = features.len();
        } else if features.len() != dataset.feature_count {
            bail!(
                "{source}:{lineno}: expected {} features, found {}",
                dataset.feature_count,
                features.len()
            );
        }
        dataset.samples.push(Sample { label, features });
    }

    tracing::debug!(
        source,
        samples = dataset.samples.len(),
        features = dataset.feature_count,
        "loaded dataset"
    );
    Ok(dataset)
}

/// Samples grouped by label, labels in natural order (numeric when every
/// label is an integer).
#[derive(Clone, Debug, Default)]
pub struct Partitioned {
    pub feature_count: usize,
    pub groups: Vec<(String, Vec<Vec<f64>>)>,
}

impl Partitioned {
    pub fn total(&self) -> usize {
        self.groups.iter().map(|(_, s)| s.len()).sum()
    }
}

/// Group samples by label. With `rng`, each group is shuffled before the
/// optional per-label cap is applied, so the cap keeps a random subset.
pub fn partition(
    dataset: Dataset,
    per_label: Option<usize>,
    rng: Option<&mut impl Rng>,
) -> Partitioned {
    let mut by_label: BTreeMap<String, Vec<Vec<f64>>> = BTreeMap::new();
    for sample in dataset.samples {
        let label = sample.label.unwrap_or_default();
        by_label.entry(label).or_default().push(sample.features);
    }

    let mut groups: Vec<(String, Vec<Vec<f64>>)> = by_label.into_iter().collect();
    if groups.iter().all(|(l, _)| l.parse::<i64>().is_ok()) {
        groups.sort_by_key(|(l, _)| l.parse::<i64>().unwrap_or_default());
    }

    if let Some(rng) = rng {
        for (_, samples) in &mut groups {
            samples.shuffle(&mut *rng);
        }
    }
    if let Some(cap) = per_label {
        for (_, samples) in &mut groups {
            samples.truncate(cap);
        }
    }

    Partitioned {
        feature_count: dataset.feature_count,
        groups,
    }
}
