//! Charm-price snapping.

/// Snaps a price to the nearest `.99` ending.
///
/// Prices with fractional part below `0.5` snap down (`19.30 -> 18.99`),
/// the rest snap up (`19.70 -> 19.99`). The result is floored at `0.99` so
/// no snapped price can be non-positive.
///
/// # Properties
///
/// Deterministic and idempotent: `snap_to_charm(snap_to_charm(p))` returns
/// `snap_to_charm(p)` for all `p >= 0`, and every snapped value has
/// fractional part `.99`.
///
/// # Arguments
/// * `price` - Non-negative price to snap
///
/// # Returns
/// The snapped price, ending in `.99`.
pub fn snap_to_charm(price: f64) -> f64 {
    let snapped = if price.fract() < 0.5 {
        price.floor() - 1.0 + 0.99
    } else {
        price.floor() + 0.99
    };
    snapped.max(0.99)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn snaps_down_below_half() {
        assert_relative_eq!(snap_to_charm(19.3), 18.99, epsilon = 1e-12);
        assert_relative_eq!(snap_to_charm(42.0), 41.99, epsilon = 1e-12);
    }

    #[test]
    fn snaps_up_from_half() {
        assert_relative_eq!(snap_to_charm(19.7), 19.99, epsilon = 1e-12);
        assert_relative_eq!(snap_to_charm(19.5), 19.99, epsilon = 1e-12);
    }

    #[test]
    fn floors_at_99_cents() {
        assert_relative_eq!(snap_to_charm(0.0), 0.99, epsilon = 1e-12);
        assert_relative_eq!(snap_to_charm(0.3), 0.99, epsilon = 1e-12);
        assert_relative_eq!(snap_to_charm(1.2), 0.99, epsilon = 1e-12);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(1000))]

        #[test]
        fn snapping_is_idempotent(price in 0.0f64..10_000.0) {
            let once = snap_to_charm(price);
            let twice = snap_to_charm(once);
            prop_assert!((twice - once).abs() < 1e-9);
        }

        #[test]
        fn snapped_values_end_in_99(price in 0.0f64..10_000.0) {
            let snapped = snap_to_charm(price);
            let cents = snapped - snapped.floor();
            prop_assert!((cents - 0.99).abs() < 1e-9);
        }

        #[test]
        fn snapped_value_is_within_a_dollar(price in 1.5f64..10_000.0) {
            let snapped = snap_to_charm(price);
            prop_assert!((snapped - price).abs() <= 1.0 + 1e-9);
        }
    }
}
