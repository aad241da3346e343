//! Engine settings: optional TOML file, then command-line overrides.
//!
//! ```toml
//! [model]
//! rho = 0.9
//! alpha = 0.01
//! beta = 1.0
//!
//! [scheduler]
//! batch_size = 64
//! workers = 8
//! reserved_workers = 1
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use art_core::{ArtConfig, EngineConfig, SchedulerConfig};
use clap::Args;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub model: ArtConfig,
    pub scheduler: SchedulerConfig,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}

/// Flags that override the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ModelArgs {
    /// Vigilance in [0, 1]
    #[arg(long)]
    pub rho: Option<f64>,

    /// Choice parameter, > 0
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Learning rate in (0, 1]
    #[arg(long)]
    pub beta: Option<f64>,

    /// Categories scored per worker task
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Scoring workers (default: available parallelism)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Workers held back for the host process
    #[arg(long)]
    pub reserve: Option<usize>,
}

impl ModelArgs {
    pub fn apply(&self, settings: &mut FileSettings) {
        let model = &mut settings.model;
        if let Some(v) = self.rho {
            model.rho = v;
        }
        if let Some(v) = self.alpha {
            model.alpha = v;
        }
        if let Some(v) = self.beta {
            model.beta = v;
        }
        let scheduler = &mut settings.scheduler;
        if let Some(v) = self.batch_size {
            scheduler.batch_size = v;
        }
        if self.workers.is_some() {
            scheduler.workers = self.workers;
        }
        if let Some(v) = self.reserve {
            scheduler.reserved_workers = v;
        }
    }
}

/// File (if any) → defaults, then flags on top.
pub fn resolve(path: Option<&Path>, args: &ModelArgs, feature_count: usize) -> Result<EngineConfig> {
    let mut settings = match path {
        Some(p) => FileSettings::load(p)?,
        None => FileSettings::default(),
    };
    args.apply(&mut settings);
    let config = EngineConfig::new(feature_count, settings.model).with_scheduler(settings.scheduler);
    config.validate().context("invalid engine settings")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let s: FileSettings = toml::from_str("[model]\nrho = 0.7\n").unwrap();
        assert_eq!(s.model.rho, 0.7);
        assert_eq!(s.model.alpha, ArtConfig::default().alpha);
        assert_eq!(s.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn test_parse_scheduler_table() {
        let s: FileSettings =
            toml::from_str("[scheduler]\nbatch_size = 16\nworkers = 3\nreserved_workers = 1\n")
                .unwrap();
        assert_eq!(s.scheduler.batch_size, 16);
        assert_eq!(s.scheduler.workers, Some(3));
        assert_eq!(s.scheduler.worker_count(), 2);
    }

    #[test]
    fn test_unknown_table_rejected() {
        assert!(toml::from_str::<FileSettings>("[modle]\nrho = 0.7\n").is_err());
    }

    #[test]
    fn test_misspelled_keys_rejected() {
        let err = toml::from_str::<FileSettings>("[model]\nrhoo = 0.99\n").unwrap_err();
        assert!(err.to_string().contains("rhoo"), "{err}");

        let err = toml::from_str::<FileSettings>("[scheduler]\nworker = 1\n").unwrap_err();
        assert!(err.to_string().contains("worker"), "{err}");
    }

    #[test]
    fn test_flags_override_file() {
        let mut s: FileSettings = toml::from_str("[model]\nrho = 0.7\nbeta = 0.5\n").unwrap();
        let args = ModelArgs {
            rho: Some(0.95),
            workers: Some(2),
            ..Default::default()
        };
        args.apply(&mut s);
        assert_eq!(s.model.rho, 0.95);
        assert_eq!(s.model.beta, 0.5);
        assert_eq!(s.scheduler.workers, Some(2));
    }

    #[test]
    fn test_resolve_validates() {
        let args = ModelArgs {
            alpha: Some(0.0),
            ..Default::default()
        };
        let err = resolve(None, &args, 4).unwrap_err();
        assert!(format!("{err:#}").contains("alpha"));
    }
}
