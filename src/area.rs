//! surface / transition / underground banding of the depth axis

use serde::{Deserialize, Serialize};

use crate::constants::{GROUND_PLANE, TRANSITION_HALF_WIDTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Area {
    Surface,
    Transition,
    Underground,
}

/// Which regime a depth falls in. The band `[-T, T]` is inclusive on both
/// edges.
pub fn classify(depth: f64) -> Area {
    if depth < GROUND_PLANE - TRANSITION_HALF_WIDTH {
        Area::Surface
    } else if depth <= GROUND_PLANE + TRANSITION_HALF_WIDTH {
        Area::Transition
    } else {
        Area::Underground
    }
}

/// Regime whose selection and population rules apply at `depth`. The
/// transition band borrows the surface rules above ground and the
/// underground rules from the ground plane down.
pub fn rules_for(depth: f64) -> Area {
    match classify(depth) {
        Area::Transition if depth < GROUND_PLANE => Area::Surface,
        Area::Transition => Area::Underground,
        area => area,
    }
}

/// `1` at the ground plane falling linearly to `0` at either band edge;
/// `0` outside the band.
pub fn band_weight(depth: f64) -> f64 {
    let d = (depth - GROUND_PLANE).abs();
    (1.0 - d / TRANSITION_HALF_WIDTH).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = TRANSITION_HALF_WIDTH;

    #[test]
    fn edges_belong_to_transition() {
        assert_eq!(classify(-T - 0.001), Area::Surface);
        assert_eq!(classify(-T), Area::Transition);
        assert_eq!(classify(0.0), Area::Transition);
        assert_eq!(classify(T), Area::Transition);
        assert_eq!(classify(T + 0.001), Area::Underground);
        assert_eq!(classify(5_000.0), Area::Underground);
    }

    #[test]
    fn transition_borrows_neighbour_rules() {
        assert_eq!(rules_for(-T * 0.5), Area::Surface);
        assert_eq!(rules_for(0.0), Area::Underground);
        assert_eq!(rules_for(T * 0.5), Area::Underground);
        assert_eq!(rules_for(-50.0), Area::Surface);
    }

    #[test]
    fn band_weight_peaks_at_ground() {
        assert_eq!(band_weight(0.0), 1.0);
        assert_eq!(band_weight(T), 0.0);
        assert_eq!(band_weight(-T), 0.0);
        assert_eq!(band_weight(T * 0.5), 0.5);
        assert_eq!(band_weight(400.0), 0.0);
    }
}
