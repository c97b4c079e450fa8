//! background colour, fog and lighting as pure functions of depth and the
//! current window's distribution
//!
//! Every field is continuous in depth. The transition band never switches a
//! value abruptly: fog ramps through it, lighting gets a boost that is zero
//! at both edges, and the base colour is a single curve with no band case.

use serde::Serialize;

use crate::area::{band_weight, Area};
use crate::constants::*;
use crate::record::{Category, CategoryGroup};
use crate::window::Distribution;

/* ===========================================================
   colour
   =========================================================== */
/// Linear RGB in 0‥255 per channel, kept as floats so fields stay smooth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn from_array(c: [f64; 3]) -> Self {
        Self { r: c[0], g: c[1], b: c[2] }
    }

    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    fn offset(self, dr: f64, dg: f64, db: f64) -> Rgb {
        Rgb { r: self.r + dr, g: self.g + dg, b: self.b + db }
    }

    fn clamp_to(self, ceiling: [f64; 3]) -> Rgb {
        Rgb {
            r: self.r.clamp(0.0, ceiling[0]),
            g: self.g.clamp(0.0, ceiling[1]),
            b: self.b.clamp(0.0, ceiling[2]),
        }
    }

    /// Channels in `0.0..=1.0` for renderers that want unit colour.
    pub fn to_unit(self) -> [f32; 3] {
        [
            (self.r / 255.0) as f32,
            (self.g / 255.0) as f32,
            (self.b / 255.0) as f32,
        ]
    }
}

/// How far along the sky → deep gradient `depth` is. Zero at and above the
/// top of the band, approaching (never reaching) one far below.
#[inline]
pub fn depth_progress(depth: f64) -> f64 {
    let d = (depth + TRANSITION_HALF_WIDTH).max(0.0);
    d / (d + HORIZON_DEPTH)
}

/// Sky/deep gradient nudged by the emotional mix, clamped well below white.
pub fn background_color(depth: f64, dist: &Distribution) -> Rgb {
    let base = Rgb::from_array(SKY_RGB).lerp(Rgb::from_array(DEEP_RGB), depth_progress(depth));

    let k = TINT_FRACTION * 255.0;
    let warm  = dist.group_share(CategoryGroup::Warm) * k;
    let calm  = dist.group_share(CategoryGroup::Calm) * k;
    let alarm = dist.group_share(CategoryGroup::Alarm) * k;
    let sepia = dist.group_share(CategoryGroup::Sepia) * k;
    let murk  = dist.group_share(CategoryGroup::Murk) * k;

    base.offset(warm, warm * 0.5, -warm * 0.3)
        .offset(-calm * 0.4, calm * 0.2, calm)
        .offset(alarm, -alarm * 0.4, -alarm * 0.5)
        .offset(sepia * 0.6, sepia * 0.4, -sepia * 0.4)
        .offset(-murk * 0.3, -murk * 0.2, -murk * 0.1)
        .clamp_to(COLOR_CEILING)
}

/* ===========================================================
   fog
   =========================================================== */
fn underground_fog(depth: f64, dist: &Distribution) -> f64 {
    let depth_term = (FOG_BASELINE + FOG_DEPTH_RATE * (depth - TRANSITION_HALF_WIDTH).max(0.0))
        .min(FOG_DEPTH_MAX);
    let clearing = 1.0 - FOG_STRENGTH_CLEARING * dist.avg_strength.clamp(0.0, 1.0);
    let sparse = if dist.count < FOG_SPARSE_COUNT { FOG_SPARSE_FACTOR } else { 1.0 };
    (depth_term * clearing * sparse).min(FOG_MAX)
}

/// Exponential fog density.
///
/// Inside the band density runs linearly from `FOG_FLOOR` at the ground
/// plane to the underground value at the band edge; on the sky side it is
/// also scaled down, reaching half at `-T`, which is the surface value.
pub fn fog_density(depth: f64, dist: &Distribution, area: Area) -> f64 {
    match area {
        Area::Underground => underground_fog(depth, dist),
        Area::Surface => underground_fog(TRANSITION_HALF_WIDTH, dist) * FOG_SURFACE_FACTOR,
        Area::Transition => {
            let edge = underground_fog(TRANSITION_HALF_WIDTH, dist);
            let frac = ((depth - GROUND_PLANE).abs() / TRANSITION_HALF_WIDTH).min(1.0);
            let ramp = FOG_FLOOR + (edge - FOG_FLOOR) * frac;
            if depth < GROUND_PLANE {
                ramp * (1.0 - (1.0 - FOG_SURFACE_FACTOR) * frac)
            } else {
                ramp
            }
        }
    }
}

/* ===========================================================
   lighting
   =========================================================== */
/// Light colour palette, picked by the dominant emotional group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LightTint {
    Warm,
    Peace,
    Stress,
    Sadness,
    Neutral,
}

impl LightTint {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            LightTint::Warm    => [255, 214, 170],
            LightTint::Peace   => [190, 240, 210],
            LightTint::Stress  => [255, 120, 110],
            LightTint::Sadness => [140, 170, 255],
            LightTint::Neutral => [255, 255, 255],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Lighting {
    pub ambient: f64,
    pub directional: f64,
    pub tint: LightTint,
    /// Stress dominates: renderers should modulate intensity periodically.
    pub pulse: bool,
}

/// First group over the threshold wins, in fixed priority order.
pub fn light_tint(dist: &Distribution) -> LightTint {
    let checks = [
        (dist.group_share(CategoryGroup::Warm), LightTint::Warm),
        (dist.share(Category::Peace), LightTint::Peace),
        (dist.share(Category::Stress), LightTint::Stress),
        (dist.share(Category::Sadness), LightTint::Sadness),
    ];
    checks
        .into_iter()
        .find(|&(share, _)| share > LIGHT_GROUP_THRESHOLD)
        .map_or(LightTint::Neutral, |(_, tint)| tint)
}

pub fn lighting(depth: f64, dist: &Distribution) -> Lighting {
    let warm = dist.group_share(CategoryGroup::Warm);
    let sad = dist.share(Category::Sadness);

    let ambient = (AMBIENT_BASE + AMBIENT_WARM_GAIN * warm - AMBIENT_SAD_LOSS * sad)
        .clamp(AMBIENT_RANGE.0, AMBIENT_RANGE.1);
    let directional = (DIRECTIONAL_BASE
        + DIRECTIONAL_STRENGTH_GAIN * dist.avg_strength
        - DIRECTIONAL_DEPTH_LOSS * depth_progress(depth))
    .clamp(DIRECTIONAL_RANGE.0, DIRECTIONAL_RANGE.1);

    // zero outside the band, so this is a no‑op for surface/underground
    let w = band_weight(depth);

    Lighting {
        ambient: (ambient + TRANSITION_AMBIENT_BOOST * w).clamp(AMBIENT_RANGE.0, AMBIENT_RANGE.1),
        directional: (directional + TRANSITION_DIRECTIONAL_BOOST * w)
            .clamp(DIRECTIONAL_RANGE.0, DIRECTIONAL_RANGE.1),
        tint: light_tint(dist),
        pulse: dist.share(Category::Stress) > STRESS_PULSE_THRESHOLD,
    }
}

/* ===========================================================
   all fields
   =========================================================== */
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentFields {
    pub background: Rgb,
    pub fog_density: f64,
    pub lighting: Lighting,
}

pub fn compute_fields(depth: f64, dist: &Distribution, area: Area) -> EnvironmentFields {
    EnvironmentFields {
        background: background_color(depth, dist),
        fog_density: fog_density(depth, dist, area),
        lighting: lighting(depth, dist),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::classify;
    use crate::window::distribution_from_shares;

    const T: f64 = TRANSITION_HALF_WIDTH;
    const EPS: f64 = 1e-7;

    fn only(c: Category, avg: f64, count: usize) -> Distribution {
        let mut shares = [0.0; Category::COUNT];
        shares[c.index()] = 1.0;
        distribution_from_shares(shares, avg, count)
    }

    fn mixed() -> Distribution {
        distribution_from_shares([0.25, 0.1, 0.15, 0.2, 0.1, 0.1, 0.1], 0.6, 12)
    }

    fn at(depth: f64, dist: &Distribution) -> EnvironmentFields {
        compute_fields(depth, dist, classify(depth))
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn assert_fields_close(a: &EnvironmentFields, b: &EnvironmentFields, tol: f64) {
        assert!(close(a.background.r, b.background.r, tol), "{a:?} vs {b:?}");
        assert!(close(a.background.g, b.background.g, tol), "{a:?} vs {b:?}");
        assert!(close(a.background.b, b.background.b, tol), "{a:?} vs {b:?}");
        assert!(close(a.fog_density, b.fog_density, tol), "{a:?} vs {b:?}");
        assert!(close(a.lighting.ambient, b.lighting.ambient, tol), "{a:?} vs {b:?}");
        assert!(close(a.lighting.directional, b.lighting.directional, tol), "{a:?} vs {b:?}");
    }

    #[test]
    fn fields_are_continuous_at_band_edges() {
        for dist in [Distribution::default(), mixed(), only(Category::Stress, 0.9, 1)] {
            for edge in [-T, T] {
                let inside = at(edge - edge.signum() * EPS, &dist);
                let on = at(edge, &dist);
                let outside = at(edge + edge.signum() * EPS, &dist);
                assert_fields_close(&inside, &on, 1e-5);
                assert_fields_close(&on, &outside, 1e-5);
            }
            // and across the ground plane
            assert_fields_close(&at(-EPS, &dist), &at(EPS, &dist), 1e-5);
        }
    }

    #[test]
    fn ground_plane_fog_is_the_floor() {
        for dist in [Distribution::default(), mixed(), only(Category::Joy, 1.0, 50)] {
            let f = at(0.0, &dist);
            assert_eq!(f.fog_density, FOG_FLOOR);
            assert!(f.fog_density < at(T + 1.0, &dist).fog_density);
        }
    }

    #[test]
    fn fog_thickens_with_depth_and_caps() {
        let d = mixed();
        let mut prev = 0.0;
        for depth in (11..20_000).step_by(250) {
            let f = fog_density(depth as f64, &d, Area::Underground);
            assert!(f >= prev);
            assert!(f <= FOG_MAX);
            prev = f;
        }
        let deep = fog_density(1.0e7, &d, Area::Underground);
        assert!(deep <= FOG_DEPTH_MAX);
    }

    #[test]
    fn strong_emotion_parts_the_fog_and_sparse_windows_thicken_it() {
        let weak = only(Category::Joy, 0.1, 10);
        let strong = only(Category::Joy, 1.0, 10);
        let sparse = only(Category::Joy, 0.1, 2);
        let f = |d: &Distribution| fog_density(400.0, d, Area::Underground);
        assert!(f(&strong) < f(&weak));
        assert!(f(&strong) >= f(&weak) * (1.0 - FOG_STRENGTH_CLEARING));
        assert!(f(&sparse) > f(&weak));
    }

    #[test]
    fn surface_fog_is_half_the_band_edge() {
        let d = mixed();
        let surface = fog_density(-200.0, &d, Area::Surface);
        let edge = fog_density(T, &d, Area::Underground);
        assert!(close(surface, edge * 0.5, 1e-12));
    }

    #[test]
    fn background_never_washes_out() {
        for c in Category::ALL {
            for depth in [-500.0, -T, 0.0, T, 300.0, 5_000.0] {
                let bg = background_color(depth, &only(c, 1.0, 5));
                assert!(bg.r <= COLOR_CEILING[0] && bg.r >= 0.0);
                assert!(bg.g <= COLOR_CEILING[1] && bg.g >= 0.0);
                assert!(bg.b <= COLOR_CEILING[2] && bg.b >= 0.0);
            }
        }
    }

    #[test]
    fn background_darkens_towards_deep_colour() {
        let d = Distribution::default();
        let sky = background_color(-T, &d);
        assert_eq!(sky, Rgb::from_array(SKY_RGB));
        let mid = background_color(500.0, &d);
        let far = background_color(50_000.0, &d);
        assert!(mid.b < sky.b && far.b < mid.b);
        assert!(far.b > DEEP_RGB[2]);
    }

    #[test]
    fn full_stress_pulses_and_shifts_red_and_blue() {
        let stress = only(Category::Stress, 0.8, 6);
        let neutral = Distribution::default();
        for depth in [300.0, -40.0] {
            let f = compute_fields(depth, &stress, classify(depth));
            let n = compute_fields(depth, &neutral, classify(depth));
            assert!(f.lighting.pulse);
            assert_eq!(f.lighting.tint, LightTint::Stress);
            assert!(f.background.r > n.background.r);
            assert!(f.background.b < n.background.b);
            assert!(f.background.r <= COLOR_CEILING[0]);
            assert!(f.background.b <= COLOR_CEILING[2]);
        }
    }

    #[test]
    fn tint_priority_order() {
        // warm and peace both above threshold: warm wins
        let d = distribution_from_shares([0.35, 0.4, 0.0, 0.25, 0.0, 0.0, 0.0], 0.5, 4);
        assert_eq!(light_tint(&d), LightTint::Warm);
        let d = distribution_from_shares([0.1, 0.4, 0.0, 0.5, 0.0, 0.0, 0.0], 0.5, 4);
        assert_eq!(light_tint(&d), LightTint::Peace);
        let d = distribution_from_shares([0.0, 0.0, 0.0, 0.6, 0.0, 0.4, 0.0], 0.5, 4);
        assert_eq!(light_tint(&d), LightTint::Sadness);
        let d = distribution_from_shares([0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.5], 0.5, 4);
        assert_eq!(light_tint(&d), LightTint::Neutral);
        assert!(!lighting(100.0, &d).pulse);
    }

    #[test]
    fn ambient_follows_warmth_and_sadness() {
        let joy = lighting(300.0, &only(Category::Joy, 0.5, 5)).ambient;
        let sad = lighting(300.0, &only(Category::Sadness, 0.5, 5)).ambient;
        let none = lighting(300.0, &Distribution::default()).ambient;
        assert!(joy > none && none > sad);
    }

    #[test]
    fn band_boost_peaks_at_ground() {
        let d = mixed();
        let ground = lighting(0.0, &d);
        let half = lighting(T * 0.5, &d);
        let edge = lighting(T, &d);
        assert!(ground.ambient > half.ambient && half.ambient > edge.ambient);
        assert!(ground.directional > edge.directional);
        for depth in [-1_000.0, -T, 0.0, T, 2_000.0] {
            let l = lighting(depth, &only(Category::Joy, 1.0, 9));
            assert!((AMBIENT_RANGE.0..=AMBIENT_RANGE.1).contains(&l.ambient));
            assert!((DIRECTIONAL_RANGE.0..=DIRECTIONAL_RANGE.1).contains(&l.directional));
        }
    }
}
