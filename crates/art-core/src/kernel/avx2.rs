use std::arch::x86_64::*;

use super::VectorKernel;

/// AVX2 backend: 4 lanes, two accumulators per iteration, scalar tail.
///
/// Only constructed by the selector after the host reported AVX2.
#[derive(Debug)]
pub struct Avx2Kernel(());

pub(super) static AVX2: Avx2Kernel = Avx2Kernel(());

const LANES: usize = 4;
const STEP: usize = 2 * LANES;

impl VectorKernel for Avx2Kernel {
    fn name(&self) -> &'static str {
        "avx2"
    }

    fn fuzzy_intersection_norms(&self, a: &[f64], w: &[f64], out: &mut [f64]) -> (f64, f64) {
        assert!(
            a.len() == w.len() && a.len() == out.len(),
            "kernel operands differ in length"
        );
        // SAFETY: AVX2 was detected before this instance became reachable;
        // lengths were checked above.
        unsafe { fuzzy_intersection_norms_avx2(a, w, out) }
    }

    fn sum(&self, a: &[f64]) -> f64 {
        // SAFETY: AVX2 was detected before this instance became reachable.
        unsafe { sum_avx2(a) }
    }

    fn update_weights(&self, w: &mut [f64], fi: &[f64], beta: f64) {
        assert_eq!(w.len(), fi.len(), "kernel operands differ in length");
        // SAFETY: AVX2 was detected before this instance became reachable;
        // lengths were checked above.
        unsafe { update_weights_avx2(w, fi, beta) }
    }
}

#[target_feature(enable = "avx2")]
unsafe fn hsum(v: __m256d) -> f64 {
    let mut lanes = [0.0f64; LANES];
    unsafe { _mm256_storeu_pd(lanes.as_mut_ptr(), v) };
    lanes.iter().sum()
}

#[target_feature(enable = "avx2")]
unsafe fn fuzzy_intersection_norms_avx2(a: &[f64], w: &[f64], out: &mut [f64]) -> (f64, f64) {
    let n = a.len();
    let end = n / STEP * STEP;

    unsafe {
        let mut fi0 = _mm256_setzero_pd();
        let mut fi1 = _mm256_setzero_pd();
        let mut w0 = _mm256_setzero_pd();
        let mut w1 = _mm256_setzero_pd();

        let mut i = 0;
        while i < end {
            let av0 = _mm256_loadu_pd(a.as_ptr().add(i));
            let wv0 = _mm256_loadu_pd(w.as_ptr().add(i));
            let m0 = _mm256_min_pd(av0, wv0);
            _mm256_storeu_pd(out.as_mut_ptr().add(i), m0);
            fi0 = _mm256_add_pd(fi0, m0);
            w0 = _mm256_add_pd(w0, wv0);

            let av1 = _mm256_loadu_pd(a.as_ptr().add(i + LANES));
            let wv1 = _mm256_loadu_pd(w.as_ptr().add(i + LANES));
            let m1 = _mm256_min_pd(av1, wv1);
            _mm256_storeu_pd(out.as_mut_ptr().add(i + LANES), m1);
            fi1 = _mm256_add_pd(fi1, m1);
            w1 = _mm256_add_pd(w1, wv1);

            i += STEP;
        }

        let mut fi_norm = hsum(_mm256_add_pd(fi0, fi1));
        let mut w_norm = hsum(_mm256_add_pd(w0, w1));

        for j in end..n {
            let m = a[j].min(w[j]);
            out[j] = m;
            fi_norm += m;
            w_norm += w[j];
        }
        (fi_norm, w_norm)
    }
}

#[target_feature(enable = "avx2")]
unsafe fn sum_avx2(a: &[f64]) -> f64 {
    let n = a.len();
    let end = n / STEP * STEP;

    unsafe {
        let mut s0 = _mm256_setzero_pd();
        let mut s1 = _mm256_setzero_pd();
        let mut i = 0;
        while i < end {
            s0 = _mm256_add_pd(s0, _mm256_loadu_pd(a.as_ptr().add(i)));
            s1 = _mm256_add_pd(s1, _mm256_loadu_pd(a.as_ptr().add(i + LANES)));
            i += STEP;
        }
        let mut total = hsum(_mm256_add_pd(s0, s1));
        for &v in &a[end..] {
            total += v;
        }
        total
    }
}

#[target_feature(enable = "avx2")]
unsafe fn update_weights_avx2(w: &mut [f64], fi: &[f64], beta: f64) {
    let n = w.len();
    let end = n / LANES * LANES;
    let keep = 1.0 - beta;

    unsafe {
        let beta_v = _mm256_set1_pd(beta);
        let keep_v = _mm256_set1_pd(keep);
        let mut i = 0;
        while i < end {
            let wv = _mm256_loadu_pd(w.as_ptr().add(i));
            let fv = _mm256_loadu_pd(fi.as_ptr().add(i));
            let blended = _mm256_add_pd(_mm256_mul_pd(beta_v, fv), _mm256_mul_pd(keep_v, wv));
            _mm256_storeu_pd(w.as_mut_ptr().add(i), blended);
            i += LANES;
        }
    }

    for j in end..n {
        w[j] = beta * fi[j] + keep * w[j];
    }
}
