mod dataset;
mod eval;
mod progress;
mod settings;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use art_core::kernel::{self, Capabilities};
use art_core::{FuzzyArt, Outcome, VectorKernel};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::dataset::LoadOptions;
use crate::settings::ModelArgs;

#[derive(Parser)]
#[command(name = "art", about = "Fuzzy ART online clustering")]
struct Cli {
    /// Engine settings file (TOML with [model] and [scheduler] tables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress progress bars
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn from a labeled training set, then measure precision on a test set
    Train {
        /// Training CSV (label first)
        #[arg(long)]
        train: PathBuf,

        /// Test CSV (label first)
        #[arg(long)]
        test: PathBuf,

        /// Passes over the training set
        #[arg(long, default_value_t = 1)]
        epochs: usize,

        /// Keep at most this many samples per label
        #[arg(long)]
        per_label: Option<usize>,

        /// Shuffle samples within each label before capping
        #[arg(long)]
        shuffle: bool,

        /// Seed for --shuffle
        #[arg(long)]
        seed: Option<u64>,

        /// Divide every feature by this value
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Skip the first line of each file
        #[arg(long)]
        header: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Fit every row of a CSV in order and print its category
    Cluster {
        /// Input CSV
        input: PathBuf,

        /// First column is a label; it is echoed, not learned
        #[arg(long)]
        has_label: bool,

        /// Divide every feature by this value
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Skip the first line
        #[arg(long)]
        header: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Show detected CPU features and vector kernels
    Kernels,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Train {
            train,
            test,
            epochs,
            per_label,
            shuffle,
            seed,
            scale,
            header,
            json,
            model,
        } => {
            let opts = LoadOptions {
                has_label: true,
                header: *header,
                scale: *scale,
            };
            let sources = TrainSources {
                train,
                test,
                opts,
                per_label: *per_label,
                shuffle: *shuffle,
                seed: *seed,
            };
            cmd_train(&cli, sources, *epochs, *json, model)
        }
        Commands::Cluster {
            input,
            has_label,
            scale,
            header,
            model,
        } => {
            let opts = LoadOptions {
                has_label: *has_label,
                header: *header,
                scale: *scale,
            };
            cmd_cluster(&cli, input, opts, model)
        }
        Commands::Kernels => cmd_kernels(),
    }
}

struct TrainSources<'a> {
    train: &'a Path,
    test: &'a Path,
    opts: LoadOptions,
    per_label: Option<usize>,
    shuffle: bool,
    seed: Option<u64>,
}

fn cmd_train(
    cli: &Cli,
    src: TrainSources<'_>,
    epochs: usize,
    json: bool,
    model: &ModelArgs,
) -> Result<()> {
    if epochs == 0 {
        bail!("--epochs must be at least 1");
    }

    let mut rng = match src.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };
    let train_ds = dataset::load(src.train, src.opts)?;
    let test_ds = dataset::load(src.test, src.opts)?;
    if train_ds.is_empty() {
        bail!("training set {} is empty", src.train.display());
    }
    if !test_ds.is_empty() && test_ds.feature_count != train_ds.feature_count {
        bail!(
            "feature count mismatch: train has {}, test has {}",
            train_ds.feature_count,
            test_ds.feature_count
        );
    }

    let train_set = dataset::partition(train_ds, src.per_label, src.shuffle.then_some(&mut rng));
    let test_set = dataset::partition(test_ds, src.per_label, src.shuffle.then_some(&mut rng));

    let config = settings::resolve(cli.config.as_deref(), model, train_set.feature_count)?;
    let mut art = FuzzyArt::from_config(config).context("failed to build engine")?;
    let progress = !cli.quiet && !json;

    if progress {
        eprintln!("Training progress:");
    }
    let evaluation = eval::train(&mut art, &train_set, epochs, progress);
    if progress {
        eprintln!("Testing progress:");
    }
    let report = eval::test(
        &mut art,
        &evaluation,
        &test_set,
        epochs,
        train_set.total(),
        progress,
    );
    art.close();

    if json {
        let out = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{out}");
    } else {
        println!("Training completed in {:.2}s", report.train_secs);
        println!("Testing completed in {:.2}s", report.test_secs);
        println!("Precision: {:.1}%", report.precision * 100.0);
        println!("Learned categories: {}", report.categories);
        println!("Kernel: {} ({} workers)", report.kernel, report.workers);
    }
    Ok(())
}

fn cmd_cluster(cli: &Cli, input: &Path, opts: LoadOptions, model: &ModelArgs) -> Result<()> {
    let ds = dataset::load(input, opts)?;
    if ds.is_empty() {
        bail!("{} has no samples", input.display());
    }

    let config = settings::resolve(cli.config.as_deref(), model, ds.feature_count)?;
    let mut art = FuzzyArt::from_config(config).context("failed to build engine")?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    if opts.has_label {
        writeln!(out, "row,label,category,outcome,resonance")?;
    } else {
        writeln!(out, "row,category,outcome,resonance")?;
    }

    for (row, sample) in ds.samples.iter().enumerate() {
        let c = art.fit(&sample.features);
        let outcome = match c.outcome {
            Outcome::Reinforced => "reinforced",
            Outcome::Committed => "committed",
            Outcome::Inferred => "inferred",
        };
        match &sample.label {
            Some(label) => writeln!(
                out,
                "{row},{label},{},{outcome},{:.6}",
                c.category, c.resonance
            )?,
            None => writeln!(out, "{row},{},{outcome},{:.6}", c.category, c.resonance)?,
        }
    }
    out.flush()?;

    eprintln!(
        "clustered {} rows into {} categories (kernel: {})",
        ds.len(),
        art.category_count(),
        art.kernel_name()
    );
    art.close();
    Ok(())
}

fn cmd_kernels() -> Result<()> {
    let caps = Capabilities::detect();
    let features = caps.features();
    let available: Vec<&str> = kernel::available(&caps).iter().map(|k| k.name()).collect();

    println!("arch:       {}", std::env::consts::ARCH);
    println!(
        "features:   {}",
        if features.is_empty() {
            "none".to_string()
        } else {
            features.join(", ")
        }
    );
    println!("available:  {}", available.join(", "));
    println!("selected:   {}", kernel::shared().name());
    Ok(())
}
