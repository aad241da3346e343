//! Complement coding.
//!
//! Doubling an input with its component-wise complement fixes the L1 norm
//! of every coded vector at M, which keeps prototypes from eroding toward
//! zero (category proliferation) while preserving amplitude.

/// Complement-code `x` into a fresh vector of length `2 * x.len()`.
pub fn complement_code(x: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; x.len() * 2];
    complement_code_into(x, &mut out);
    out
}

/// Complement-code `x` into `out`, which must be exactly twice as long.
pub fn complement_code_into(x: &[f64], out: &mut [f64]) {
    assert_eq!(
        out.len(),
        x.len() * 2,
        "complement code buffer must hold 2M values"
    );
    let (head, tail) = out.split_at_mut(x.len());
    for ((h, t), &v) in head.iter_mut().zip(tail.iter_mut()).zip(x) {
        *h = v;
        *t = 1.0 - v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_layout() {
        let a = complement_code(&[0.1, 0.75]);
        assert_eq!(a.len(), 4);
        assert_eq!(a[0], 0.1);
        assert_eq!(a[1], 0.75);
        assert!((a[2] - 0.9).abs() < 1e-15);
        assert!((a[3] - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_empty_input() {
        assert!(complement_code(&[]).is_empty());
    }

    #[test]
    #[should_panic(expected = "2M")]
    fn test_wrong_buffer_length_panics() {
        let mut out = [0.0; 3];
        complement_code_into(&[0.5, 0.5], &mut out);
    }

    proptest! {
        #[test]
        fn prop_norm_equals_feature_count(x in prop::collection::vec(0.0f64..=1.0, 1..200)) {
            let a = complement_code(&x);
            let sum: f64 = a.iter().sum();
            prop_assert!((sum - x.len() as f64).abs() < 1e-9);
        }

        #[test]
        fn prop_components_stay_in_unit_interval(x in prop::collection::vec(0.0f64..=1.0, 1..64)) {
            for v in complement_code(&x) {
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }
}
