use bevy::prelude::*;

use crate::lifecycle::HandleId;
use crate::population::ChildKind;

/* ===========================================================
   child sprites
   =========================================================== */
/// Sprite bound to one render handle. Stays alive (hidden) while pooled.
#[derive(Component)]
pub struct ChildSprite {
    pub handle: HandleId,
    pub kind: ChildKind,
    pub phase_seed: i64,
    /// Screen position before per‑frame animation.
    pub anchor: Vec3,
}

/* ===========================================================
   environment overlays
   =========================================================== */
/// Full‑screen quad whose alpha follows fog density.
#[derive(Component)]
pub struct FogOverlay;

/// Full‑screen quad carrying the light tint; pulses under stress.
#[derive(Component)]
pub struct LightWash;
