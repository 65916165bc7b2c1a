//! Key travel to axis value combination
//!
//! Single axes pass the key travel through. Dual axes report the deeper of
//! the two keys, signed by its side, and cancel to exactly 0.0 when both
//! keys read the same value.

use crate::config::AxisKind;

/// Reduce one or two key travels (0.0-1.0) to an axis value
///
/// `first` is the single key, or the negative key of a dual axis; `second`
/// is the positive key of a dual axis and ignored otherwise.
pub fn combine(kind: AxisKind, first: f32, second: f32) -> f32 {
    match kind {
        AxisKind::Disabled => 0.0,
        AxisKind::Single => first,
        AxisKind::Dual => combine_dual(first, second),
    }
}

/// Combine two opposing keys into -1.0..=1.0
///
/// Equal travels, including both released, give exactly 0.0. The
/// comparison is exact on purpose: two keys held at the same depth cancel,
/// nearly-equal ones do not.
#[allow(clippy::float_cmp)]
pub fn combine_dual(negative: f32, positive: f32) -> f32 {
    if negative == positive {
        0.0
    } else if negative > positive {
        -negative
    } else {
        positive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_tie_is_zero() {
        for v in [0.0_f32, 0.1, 0.3, 0.7, 1.0] {
            let out = combine(AxisKind::Dual, v, v);
            assert_eq!(out, 0.0);
            // Not -0.0 either
            assert!(out.is_sign_positive());
        }
    }

    #[test]
    fn test_dual_negative_side_wins() {
        assert_eq!(combine(AxisKind::Dual, 0.8, 0.0), -0.8);
        assert_eq!(combine(AxisKind::Dual, 0.8, 0.3), -0.8);
        assert_eq!(combine(AxisKind::Dual, 1.0, 0.99), -1.0);
    }

    #[test]
    fn test_dual_positive_side_wins() {
        assert_eq!(combine(AxisKind::Dual, 0.0, 0.4), 0.4);
        assert_eq!(combine(AxisKind::Dual, 0.2, 0.6), 0.6);
    }

    #[test]
    fn test_dual_no_epsilon() {
        let a = 0.5_f32;
        let b = f32::from_bits(a.to_bits() + 1);
        // One ULP apart is a real difference
        assert_eq!(combine_dual(a, b), b);
        assert_eq!(combine_dual(b, a), -b);
    }

    #[test]
    fn test_single_is_identity() {
        for v in [0.0_f32, 0.25, 0.5, 1.0] {
            assert_eq!(combine(AxisKind::Single, v, 0.9), v);
        }
    }

    #[test]
    fn test_disabled_is_zero() {
        assert_eq!(combine(AxisKind::Disabled, 0.5, 0.9), 0.0);
    }

    #[test]
    fn test_dual_sweep() {
        let steps: Vec<f32> = (0..=20).map(|i| i as f32 / 20.0).collect();
        for &left in &steps {
            for &right in &steps {
                let out = combine_dual(left, right);
                if left == right {
                    assert_eq!(out, 0.0);
                } else if left > right {
                    assert_eq!(out, -left);
                } else {
                    assert_eq!(out, right);
                }
            }
        }
    }
}
