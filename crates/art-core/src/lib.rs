//! Fuzzy ART: online, single-pass, unsupervised clustering.
//!
//! Inputs are feature vectors in [0,1]^M. Each call complement-codes the
//! input, scores every known category in parallel, ranks them, and walks the
//! ranking until one passes the vigilance test. The winner learns the input;
//! if none passes, the input is committed as a new category. Categories are
//! never forgotten or pruned.
//!
//! Zero I/O: pure computation, no opinions about datasets or persistence.

pub mod coding;
pub mod config;
pub mod constants;
pub mod decision;
pub mod engine;
pub mod error;
pub mod kernel;
pub mod matrix;
pub mod scheduler;
pub mod scratch;

pub use coding::{complement_code, complement_code_into};
pub use config::{ArtConfig, EngineConfig, SchedulerConfig};
pub use constants::{
    COMMIT_RESONANCE, DEFAULT_ALPHA, DEFAULT_BATCH_SIZE, DEFAULT_BETA, DEFAULT_RHO,
    KERNEL_TOLERANCE,
};
pub use decision::resonance;
pub use engine::{Classification, FuzzyArt, Outcome};
pub use error::{ArtError, Result};
pub use kernel::{Capabilities, Feature, ScalarKernel, VectorKernel};
pub use matrix::CategoryMatrix;
pub use scratch::{Activation, ScratchStats};
