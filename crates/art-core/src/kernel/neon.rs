use std::arch::aarch64::*;

use super::VectorKernel;

/// NEON backend: 2 lanes, two accumulators per iteration, scalar tail.
#[derive(Debug)]
pub struct NeonKernel(());

pub(super) static NEON: NeonKernel = NeonKernel(());

const LANES: usize = 2;
const STEP: usize = 2 * LANES;

impl VectorKernel for NeonKernel {
    fn name(&self) -> &'static str {
        "neon"
    }

    fn fuzzy_intersection_norms(&self, a: &[f64], w: &[f64], out: &mut [f64]) -> (f64, f64) {
        assert!(
            a.len() == w.len() && a.len() == out.len(),
            "kernel operands differ in length"
        );
        let n = a.len();
        let end = n / STEP * STEP;

        // SAFETY: NEON is baseline on aarch64; every offset stays below `end`.
        let (mut fi_norm, mut w_norm) = unsafe {
            let mut fi0 = vdupq_n_f64(0.0);
            let mut fi1 = vdupq_n_f64(0.0);
            let mut w0 = vdupq_n_f64(0.0);
            let mut w1 = vdupq_n_f64(0.0);
            let mut i = 0;
            while i < end {
                let av0 = vld1q_f64(a.as_ptr().add(i));
                let wv0 = vld1q_f64(w.as_ptr().add(i));
                let m0 = vminq_f64(av0, wv0);
                vst1q_f64(out.as_mut_ptr().add(i), m0);
                fi0 = vaddq_f64(fi0, m0);
                w0 = vaddq_f64(w0, wv0);

                let av1 = vld1q_f64(a.as_ptr().add(i + LANES));
                let wv1 = vld1q_f64(w.as_ptr().add(i + LANES));
                let m1 = vminq_f64(av1, wv1);
                vst1q_f64(out.as_mut_ptr().add(i + LANES), m1);
                fi1 = vaddq_f64(fi1, m1);
                w1 = vaddq_f64(w1, wv1);

                i += STEP;
            }
            (
                vaddvq_f64(vaddq_f64(fi0, fi1)),
                vaddvq_f64(vaddq_f64(w0, w1)),
            )
        };

        for j in end..n {
            let m = a[j].min(w[j]);
            out[j] = m;
            fi_norm += m;
            w_norm += w[j];
        }
        (fi_norm, w_norm)
    }

    fn sum(&self, a: &[f64]) -> f64 {
        let end = a.len() / STEP * STEP;
        // SAFETY: NEON is baseline on aarch64; every offset stays below `end`.
        let mut total = unsafe {
            let mut s0 = vdupq_n_f64(0.0);
            let mut s1 = vdupq_n_f64(0.0);
            let mut i = 0;
            while i < end {
                s0 = vaddq_f64(s0, vld1q_f64(a.as_ptr().add(i)));
                s1 = vaddq_f64(s1, vld1q_f64(a.as_ptr().add(i + LANES)));
                i += STEP;
            }
            vaddvq_f64(vaddq_f64(s0, s1))
        };
        for &v in &a[end..] {
            total += v;
        }
        total
    }

    fn update_weights(&self, w: &mut [f64], fi: &[f64], beta: f64) {
        assert_eq!(w.len(), fi.len(), "kernel operands differ in length");
        let n = w.len();
        let end = n / LANES * LANES;
        let keep = 1.0 - beta;

        // SAFETY: NEON is baseline on aarch64; every offset stays below `end`.
        unsafe {
            let beta_v = vdupq_n_f64(beta);
            let keep_v = vdupq_n_f64(keep);
            let mut i = 0;
            while i < end {
                let wv = vld1q_f64(w.as_ptr().add(i));
                let fv = vld1q_f64(fi.as_ptr().add(i));
                let blended = vaddq_f64(vmulq_f64(beta_v, fv), vmulq_f64(keep_v, wv));
                vst1q_f64(w.as_mut_ptr().add(i), blended);
                i += LANES;
            }
        }

        for j in end..n {
            w[j] = beta * fi[j] + keep * w[j];
        }
    }
}
