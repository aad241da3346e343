//! Resonance-or-reset: the sequential vigilance walk.

use crate::kernel::VectorKernel;
use crate::matrix::CategoryMatrix;
use crate::scratch::Lease;

/// Match ratio `|A ∧ w| / |A|`. An all-zero input against an all-zero
/// intersection counts as a perfect match.
pub fn resonance(fi_norm: f64, a_norm: f64) -> f64 {
    if fi_norm == 0.0 && a_norm == 0.0 {
        return 1.0;
    }
    fi_norm / a_norm
}

/// Walk the ranked records and reinforce the first category whose
/// resonance reaches `rho`. Returns `(category, resonance)`, or `None`
/// when every category was reset and a new one must be committed.
pub fn resonate_or_reset(
    kernel: &dyn VectorKernel,
    lease: &Lease<'_>,
    a_norm: f64,
    rho: f64,
    beta: f64,
    matrix: &mut CategoryMatrix,
) -> Option<(usize, f64)> {
    for record in lease.ranked() {
        let r = resonance(record.fi_norm, a_norm);
        if r >= rho {
            kernel.update_weights(matrix.row_mut(record.category), &record.fi, beta);
            return Some((record.category, r));
        }
    }
    None
}
