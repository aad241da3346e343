use super::VectorKernel;

/// Portable backend. Reference for every other kernel.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarKernel;

impl VectorKernel for ScalarKernel {
    fn name(&self) -> &'static str {
        "scalar"
    }

    fn fuzzy_intersection_norms(&self, a: &[f64], w: &[f64], out: &mut [f64]) -> (f64, f64) {
        assert!(
            a.len() == w.len() && a.len() == out.len(),
            "kernel operands differ in length"
        );
        let mut fi_norm = 0.0;
        let mut w_norm = 0.0;
        for ((o, &x), &y) in out.iter_mut().zip(a).zip(w) {
            *o = x.min(y);
            fi_norm += *o;
            w_norm += y;
        }
        (fi_norm, w_norm)
    }

    fn sum(&self, a: &[f64]) -> f64 {
        a.iter().sum()
    }

    fn update_weights(&self, w: &mut [f64], fi: &[f64], beta: f64) {
        assert_eq!(w.len(), fi.len(), "kernel operands differ in length");
        let keep = 1.0 - beta;
        for (x, &f) in w.iter_mut().zip(fi) {
            *x = beta * f + keep * *x;
        }
    }
}
