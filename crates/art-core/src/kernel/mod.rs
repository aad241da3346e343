//! Vector kernels for the scoring and learning hot path.
//!
//! ```text
//! FuzzyArt (engine, safe Rust)
//!   │
//!   ├── VectorKernel::fuzzy_intersection_norms()   ← per category, per call
//!   ├── VectorKernel::sum()                        ← once per call
//!   └── VectorKernel::update_weights()             ← once per resonance
//!         │
//!         ├── Avx512Kernel   ← x86_64 + AVX-512F (feature = "avx512")
//!         ├── Avx2Kernel     ← x86_64 + AVX2
//!         ├── NeonKernel     ← aarch64
//!         └── ScalarKernel   ← portable fallback
//! ```
//!
//! Host probing lives only in [`Capabilities::detect`]. [`select`] is a pure
//! function of a descriptor, and descriptors can only mask features off, so a
//! selected backend can always run. [`shared`] resolves once per process.

use std::fmt;
use std::sync::OnceLock;

mod scalar;
pub use scalar::ScalarKernel;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
pub use avx2::Avx2Kernel;

#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
mod avx512;
#[cfg(all(target_arch = "x86_64", feature = "avx512"))]
pub use avx512::Avx512Kernel;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "aarch64")]
pub use neon::NeonKernel;

/// Numeric primitives used by scoring and learning.
///
/// Implementations must be stateless and `Send + Sync`: one instance is
/// shared by every engine and every worker. All operations accept any
/// length, including zero and lengths that are not a multiple of the
/// backend's lane count. Backends agree with [`ScalarKernel`] within
/// [`KERNEL_TOLERANCE`](crate::constants::KERNEL_TOLERANCE).
pub trait VectorKernel: Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// Write `min(a[i], w[i])` into `out` and return `(sum(out), sum(w))`.
    ///
    /// `a`, `w` and `out` must have the same length.
    fn fuzzy_intersection_norms(&self, a: &[f64], w: &[f64], out: &mut [f64]) -> (f64, f64);

    /// Sum of all elements.
    fn sum(&self, a: &[f64]) -> f64;

    /// In place: `w[i] = beta * fi[i] + (1 - beta) * w[i]`.
    fn update_weights(&self, w: &mut [f64], fi: &[f64], beta: f64);
}

impl fmt::Debug for dyn VectorKernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("VectorKernel").field(&self.name()).finish()
    }
}

/// Instruction-set features a backend may depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Feature {
    Avx512f,
    Avx2,
    Neon,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::Avx512f, Feature::Avx2, Feature::Neon];

    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Avx512f => "avx512f",
            Feature::Avx2 => "avx2",
            Feature::Neon => "neon",
        }
    }
}

/// Host capability descriptor.
///
/// Only [`detect`](Self::detect) can set a feature; [`without`](Self::without)
/// can only clear one. A descriptor therefore never claims more than the
/// host supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    avx512f: bool,
    avx2: bool,
    neon: bool,
}

impl Capabilities {
    /// Probe the running CPU.
    #[cfg(target_arch = "x86_64")]
    pub fn detect() -> Self {
        Self {
            avx512f: std::arch::is_x86_feature_detected!("avx512f"),
            avx2: std::arch::is_x86_feature_detected!("avx2"),
            neon: false,
        }
    }

    /// Probe the running CPU. NEON is baseline on aarch64.
    #[cfg(target_arch = "aarch64")]
    pub fn detect() -> Self {
        Self {
            avx512f: false,
            avx2: false,
            neon: true,
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    pub fn detect() -> Self {
        Self::portable()
    }

    /// A descriptor with every feature cleared.
    pub const fn portable() -> Self {
        Self {
            avx512f: false,
            avx2: false,
            neon: false,
        }
    }

    /// Clear one feature.
    pub fn without(mut self, feature: Feature) -> Self {
        match feature {
            Feature::Avx512f => self.avx512f = false,
            Feature::Avx2 => self.avx2 = false,
            Feature::Neon => self.neon = false,
        }
        self
    }

    pub fn has(&self, feature: Feature) -> bool {
        match feature {
            Feature::Avx512f => self.avx512f,
            Feature::Avx2 => self.avx2,
            Feature::Neon => self.neon,
        }
    }

    /// Names of the features present, in priority order.
    pub fn features(&self) -> Vec<&'static str> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.has(*f))
            .map(Feature::as_str)
            .collect()
    }
}

static SCALAR: ScalarKernel = ScalarKernel;

/// Every backend this build can run under `caps`, best first.
/// The scalar kernel is always last.
pub fn available(caps: &Capabilities) -> Vec<&'static dyn VectorKernel> {
    let mut out: Vec<&'static dyn VectorKernel> = Vec::new();

    #[cfg(all(target_arch = "x86_64", feature = "avx512"))]
    if caps.avx512f {
        out.push(&avx512::AVX512);
    }

    #[cfg(target_arch = "x86_64")]
    if caps.avx2 {
        out.push(&avx2::AVX2);
    }

    #[cfg(target_arch = "aarch64")]
    if caps.neon {
        out.push(&neon::NEON);
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    let _ = caps;

    out.push(&SCALAR);
    out
}

/// Pick the best backend for `caps`. Falls back to [`ScalarKernel`].
pub fn select(caps: &Capabilities) -> &'static dyn VectorKernel {
    available(caps)[0]
}

/// The process-wide kernel, probed and selected on first use.
pub fn shared() -> &'static dyn VectorKernel {
    static KERNEL: OnceLock<&'static dyn VectorKernel> = OnceLock::new();
    *KERNEL.get_or_init(|| {
        let caps = Capabilities::detect();
        let kernel = select(&caps);
        tracing::info!(
            kernel = kernel.name(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            "vector kernel selected"
        );
        kernel
    })
}
