//! Example segment blends for tests, benches, and host demos.
//!
//! Catalog data lives with the host application; these constructors only
//! provide plausible coefficient sets so the engines can be exercised
//! without one.

use crate::segments::{normalise_weights, Segment};

/// A broadly price-sensitive mainstream segment.
pub fn balanced(weight: f64) -> Segment {
    Segment::new(weight, -0.08, 0.6, 0.4, 0.5).with_label("Balanced")
}

/// Aggressively price-driven shoppers with a strong outside option.
pub fn price_hunters(weight: f64) -> Segment {
    Segment::new(weight, -0.22, 0.3, 0.1, 1.2).with_label("Price hunters")
}

/// Feature-led buyers who rarely walk away.
pub fn premium_seekers(weight: f64) -> Segment {
    Segment::new(weight, -0.03, 1.0, 0.8, -0.5).with_label("Premium seekers")
}

/// Three-segment blend with normalised weights.
pub fn example_blend() -> Vec<Segment> {
    let mut segments = vec![
        balanced(0.5),
        price_hunters(0.3),
        premium_seekers(0.2),
    ];
    normalise_weights(&mut segments);
    segments
}
