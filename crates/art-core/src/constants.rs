/// Recommended vigilance: strict enough to split distinct shapes,
/// loose enough to absorb noise.
pub const DEFAULT_RHO: f64 = 0.86;

/// Recommended choice parameter.
pub const DEFAULT_ALPHA: f64 = 0.01;

/// Fast learning: a resonating prototype is replaced by the fuzzy intersection.
pub const DEFAULT_BETA: f64 = 1.0;

/// Categories scored per worker task.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Tolerance used when comparing kernel outputs across backends.
pub const KERNEL_TOLERANCE: f64 = 1e-9;

/// Resonance reported when an input commits a new category.
pub const COMMIT_RESONANCE: f64 = 0.0;
