//! Tier labels and the generic per-tier container.
//!
//! Every priced quantity in the stack (list prices, unit costs, reference
//! prices, margin floors) is indexed by the three fixed tiers. `TierMap<T>`
//! is the shared container for such quantities, so callers never juggle
//! positional arrays.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three priced offerings in a good/better/best ladder.
///
/// The ordering `Good < Better < Best` is meaningful: gap constraints and
/// grid iteration both rely on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Entry tier.
    Good,
    /// Mid tier.
    Better,
    /// Top tier.
    Best,
}

impl Tier {
    /// All tiers in ladder order, for iteration.
    pub const ALL: [Tier; 3] = [Tier::Good, Tier::Better, Tier::Best];

    /// Stable index of this tier (`Good = 0`, `Better = 1`, `Best = 2`).
    pub fn index(&self) -> usize {
        match self {
            Tier::Good => 0,
            Tier::Better => 1,
            Tier::Best => 2,
        }
    }

    /// Human-readable label, matching the serialised form.
    pub fn label(&self) -> &'static str {
        match self {
            Tier::Good => "good",
            Tier::Better => "better",
            Tier::Best => "best",
        }
    }

    /// The tier directly below this one, if any.
    pub fn lower(&self) -> Option<Tier> {
        match self {
            Tier::Good => None,
            Tier::Better => Some(Tier::Good),
            Tier::Best => Some(Tier::Better),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A value of type `T` for each tier.
///
/// Used for prices, costs, reference prices, margin floors, and feature
/// bundles. Field names match the serialised camelCase shape exchanged with
/// host applications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierMap<T> {
    /// Value for the `good` tier.
    pub good: T,
    /// Value for the `better` tier.
    pub better: T,
    /// Value for the `best` tier.
    pub best: T,
}

impl<T> TierMap<T> {
    /// Builds a map from explicit per-tier values, in ladder order.
    pub fn new(good: T, better: T, best: T) -> Self {
        Self { good, better, best }
    }

    /// Borrow the value for `tier`.
    pub fn get(&self, tier: Tier) -> &T {
        match tier {
            Tier::Good => &self.good,
            Tier::Better => &self.better,
            Tier::Best => &self.best,
        }
    }

    /// Mutably borrow the value for `tier`.
    pub fn get_mut(&mut self, tier: Tier) -> &mut T {
        match tier {
            Tier::Good => &mut self.good,
            Tier::Better => &mut self.better,
            Tier::Best => &mut self.best,
        }
    }

    /// Replaces the value for `tier`, returning the previous value.
    pub fn set(&mut self, tier: Tier, value: T) -> T {
        std::mem::replace(self.get_mut(tier), value)
    }

    /// Applies `f` to each tier's value, producing a new map.
    pub fn map<U>(&self, mut f: impl FnMut(Tier, &T) -> U) -> TierMap<U> {
        TierMap {
            good: f(Tier::Good, &self.good),
            better: f(Tier::Better, &self.better),
            best: f(Tier::Best, &self.best),
        }
    }

    /// Pairs this map with another, tier by tier.
    pub fn zip<U>(&self, other: &TierMap<U>) -> TierMap<(T, U)>
    where
        T: Clone,
        U: Clone,
    {
        TierMap {
            good: (self.good.clone(), other.good.clone()),
            better: (self.better.clone(), other.better.clone()),
            best: (self.best.clone(), other.best.clone()),
        }
    }

    /// Iterates `(tier, &value)` pairs in ladder order.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &T)> {
        Tier::ALL.iter().map(move |&t| (t, self.get(t)))
    }
}

impl<T: Clone> TierMap<T> {
    /// Builds a map with the same value for every tier.
    pub fn splat(value: T) -> Self {
        Self {
            good: value.clone(),
            better: value.clone(),
            best: value,
        }
    }
}

impl TierMap<f64> {
    /// Values as `[good, better, best]`.
    pub fn to_array(&self) -> [f64; 3] {
        [self.good, self.better, self.best]
    }

    /// Builds a map from `[good, better, best]`.
    pub fn from_array(values: [f64; 3]) -> Self {
        Self {
            good: values[0],
            better: values[1],
            best: values[2],
        }
    }

    /// True when every tier's value is finite.
    pub fn all_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }

    /// True when every tier's value is strictly positive (and finite).
    pub fn all_positive(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite() && *v > 0.0)
    }
}

impl<T: Default> Default for TierMap<T> {
    fn default() -> Self {
        Self {
            good: T::default(),
            better: T::default(),
            best: T::default(),
        }
    }
}

/// List price per tier.
pub type Ladder = TierMap<f64>;

/// Unit cost per tier.
pub type Costs = TierMap<f64>;

/// Reference (anchor) price per tier.
pub type RefPrices = TierMap<f64>;
