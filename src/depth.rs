//! the single navigation scalar: wheel/drag accumulation, smoothing and
//! animated jumps

use bevy::prelude::Resource;

use crate::config::DepthConfig;
use crate::constants::{DEPTH_SNAP_EPSILON, GROUND_PLANE};

/// Cubic ease‑in‑out on `[0, 1]`.
#[inline]
pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Jump {
    from: f64,
    to: f64,
    elapsed: f64,
}

/// Owns the viewer's depth.
///
/// Continuous input moves a target that the displayed depth chases
/// exponentially; the target never goes above the ground plane. A jump
/// takes over completely for its duration: wheel input is dropped until
/// it lands. While a text field has focus wheel input is dropped too, but
/// jumps still run.
#[derive(Resource, Debug, Clone)]
pub struct DepthController {
    target: f64,
    current: f64,
    jump: Option<Jump>,
    suppressed: bool,
    sensitivity: f64,
    smoothing_rate: f64,
    jump_duration: f64,
}

impl Default for DepthController {
    fn default() -> Self {
        Self::new(&DepthConfig::default())
    }
}

impl DepthController {
    pub fn new(cfg: &DepthConfig) -> Self {
        Self {
            target: GROUND_PLANE,
            current: GROUND_PLANE,
            jump: None,
            suppressed: false,
            sensitivity: cfg.wheel_sensitivity,
            smoothing_rate: cfg.smoothing_rate,
            jump_duration: cfg.jump_duration_secs,
        }
    }

    /// Start at `depth` with no animation in flight.
    pub fn starting_at(cfg: &DepthConfig, depth: f64) -> Self {
        let mut c = Self::new(cfg);
        c.target = depth;
        c.current = depth;
        c
    }

    /// Depth downstream stages should use this tick.
    pub fn depth(&self) -> f64 {
        self.current
    }

    /// Where continuous input is heading.
    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_jumping(&self) -> bool {
        self.jump.is_some()
    }

    pub fn set_input_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    pub fn input_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Feed wheel / drag travel in pixels (positive = deeper). Returns
    /// whether the input was taken.
    pub fn apply_scroll(&mut self, delta_pixels: f64) -> bool {
        if self.suppressed || self.jump.is_some() || !delta_pixels.is_finite() {
            return false;
        }
        self.target = (self.target + delta_pixels * self.sensitivity).max(GROUND_PLANE);
        true
    }

    /// Animate to `depth`. A jump already in flight is abandoned and the new
    /// one starts from wherever the viewer currently is.
    pub fn jump_to(&mut self, depth: f64) {
        if !depth.is_finite() {
            return;
        }
        self.jump = Some(Jump { from: self.current, to: depth, elapsed: 0.0 });
    }

    /// Advance by `dt` seconds and return the new depth.
    pub fn tick(&mut self, dt: f64) -> f64 {
        let dt = dt.max(0.0);

        if let Some(mut jump) = self.jump {
            jump.elapsed += dt;
            // a non-positive duration lands on the first tick
            let t = if self.jump_duration > 0.0 {
                jump.elapsed / self.jump_duration
            } else {
                1.0
            };
            if t >= 1.0 {
                self.current = jump.to;
                self.target = jump.to;
                self.jump = None;
            } else {
                self.current = jump.from + (jump.to - jump.from) * ease_in_out_cubic(t);
                self.jump = Some(jump);
            }
            return self.current;
        }

        let gap = self.target - self.current;
        if gap.abs() <= DEPTH_SNAP_EPSILON {
            self.current = self.target;
        } else {
            let k = 1.0 - (-self.smoothing_rate * dt).exp();
            self.current += gap * k;
        }
        self.current
    }
}
