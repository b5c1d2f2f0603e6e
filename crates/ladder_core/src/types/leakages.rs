//! Discount and fee fractions consumed by the net-price waterfall.

use crate::types::error::{ensure_fraction, ensure_non_negative, ValidationError};
use crate::types::tier::TierMap;
use serde::{Deserialize, Serialize};

/// Leakage fractions between list price and pocket price.
///
/// `promo` and `volume` are per-tier discount fractions applied against the
/// list price; the four global fields cover payment processing, foreign
/// exchange, and refunds. All fractions live in `[0, 1]`; `payment_fixed` is
/// a flat per-unit fee in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leakages {
    /// Promotional discount fraction per tier (list-based).
    pub promo: TierMap<f64>,
    /// Volume discount fraction per tier (list-based).
    pub volume: TierMap<f64>,
    /// Payment processing fraction (net-based).
    pub payment_pct: f64,
    /// Flat payment fee per unit, in currency units.
    pub payment_fixed: f64,
    /// Foreign-exchange cost fraction (net-based).
    pub fx_pct: f64,
    /// Refund fraction (list-based).
    pub refunds_pct: f64,
}

impl Leakages {
    /// Leakage-free configuration: pocket price equals list price.
    pub fn none() -> Self {
        Self {
            promo: TierMap::splat(0.0),
            volume: TierMap::splat(0.0),
            payment_pct: 0.0,
            payment_fixed: 0.0,
            fx_pct: 0.0,
            refunds_pct: 0.0,
        }
    }

    /// Returns a copy with every fraction clamped into `[0, 1]` and the
    /// fixed fee floored at zero.
    ///
    /// The waterfall itself performs no clamping; callers holding
    /// unvalidated input sanitise it here first.
    pub fn clamped(&self) -> Self {
        let clamp = |v: f64| v.clamp(0.0, 1.0);
        Self {
            promo: self.promo.map(|_, v| clamp(*v)),
            volume: self.volume.map(|_, v| clamp(*v)),
            payment_pct: clamp(self.payment_pct),
            payment_fixed: self.payment_fixed.max(0.0),
            fx_pct: clamp(self.fx_pct),
            refunds_pct: clamp(self.refunds_pct),
        }
    }

    /// Validates every field, naming the first offender.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (tier, v) in self.promo.iter() {
            ensure_fraction(&format!("leakages.promo.{tier}"), *v)?;
        }
        for (tier, v) in self.volume.iter() {
            ensure_fraction(&format!("leakages.volume.{tier}"), *v)?;
        }
        ensure_fraction("leakages.paymentPct", self.payment_pct)?;
        ensure_non_negative("leakages.paymentFixed", self.payment_fixed)?;
        ensure_fraction("leakages.fxPct", self.fx_pct)?;
        ensure_fraction("leakages.refundsPct", self.refunds_pct)
    }
}

impl Default for Leakages {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_bounds_fractions() {
        let mut leakages = Leakages::none();
        leakages.promo.good = 1.4;
        leakages.fx_pct = -0.3;
        leakages.payment_fixed = -1.0;

        let clamped = leakages.clamped();
        assert_eq!(clamped.promo.good, 1.0);
        assert_eq!(clamped.fx_pct, 0.0);
        assert_eq!(clamped.payment_fixed, 0.0);
    }

    #[test]
    fn validate_names_offending_field() {
        let mut leakages = Leakages::none();
        leakages.volume.better = 1.2;
        let err = leakages.validate().unwrap_err();
        assert!(err.to_string().contains("leakages.volume.better"));
    }

    #[test]
    fn serialises_camel_case() {
        let json = serde_json::to_string(&Leakages::none()).unwrap();
        assert!(json.contains("\"paymentPct\""));
        assert!(json.contains("\"refundsPct\""));
    }
}
