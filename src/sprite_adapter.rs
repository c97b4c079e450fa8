//! 2D sprite backend for the demo
//!
//! Turns each tick's lifecycle events into pooled sprites and the
//! environment fields into the clear colour plus two screen overlays.
//! Sprites are never despawned on detach, only hidden; `Destroy` is the
//! one place an entity goes away.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use noise::{NoiseFn, Perlin};
use rand::Rng;

use crate::components::{ChildSprite, FogOverlay, LightWash};
use crate::config::EngineConfig;
use crate::constants::*;
use crate::engine::Ecosystem;
use crate::lifecycle::{EntityView, HandleId, LifecycleEvent, Viewport};
use crate::plugin::{EcosystemSet, LatestFrame};
use crate::population::ChildKind;
use crate::record::Category;

/// -------- overlays --------
const OVERLAY_SIZE: f32 = 8192.0;
const FOG_Z: f32 = 50.0;
const WASH_Z: f32 = 49.0;
const FOG_MAX_ALPHA: f32 = 0.85;
const WASH_MAX_ALPHA: f32 = 0.18;
const PULSE_HZ: f32 = 1.3;

/// -------- creature bob --------
const BOB_AMPLITUDE: f32 = 3.0;
const BOB_HZ: f32 = 0.8;

/* ===========================================================
   resource
   =========================================================== */
#[derive(Resource)]
pub struct SpriteBindings {
    by_handle: HashMap<HandleId, Entity>,
    color_noise: Perlin,
}

impl SpriteBindings {
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }
}

impl Default for SpriteBindings {
    fn default() -> Self {
        Self {
            by_handle: HashMap::new(),
            color_noise: Perlin::new(rand::thread_rng().gen()),
        }
    }
}

pub struct SpriteAdapterPlugin;

impl Plugin for SpriteAdapterPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpriteBindings>()
            .add_systems(Startup, spawn_overlays)
            .add_systems(
                Update,
                (
                    viewport_from_window_system.before(EcosystemSet::Tick),
                    (apply_lifecycle_system, bob_creatures_system, environment_system)
                        .chain()
                        .after(EcosystemSet::Tick),
                ),
            );
    }
}

/* ===========================================================
   colour helpers
   =========================================================== */
fn category_rgb(category: Category) -> Vec3 {
    match category {
        Category::Joy         => Vec3::new(0.98, 0.80, 0.25),
        Category::Inspiration => Vec3::new(0.95, 0.55, 0.85),
        Category::Peace       => Vec3::new(0.45, 0.85, 0.60),
        Category::Sadness     => Vec3::new(0.40, 0.55, 0.95),
        Category::Stress      => Vec3::new(0.95, 0.35, 0.30),
        Category::Nostalgia   => Vec3::new(0.80, 0.65, 0.45),
        Category::Confusion   => Vec3::new(0.60, 0.50, 0.70),
    }
}

/// Category colour with bucketed Perlin banding keyed on the entity's
/// phase seed, so siblings differ but a given child always looks the same.
fn child_color(noise: &Perlin, view: &EntityView) -> Color {
    let sx = (view.phase_seed % 10_000) as f64;
    let sy = view.id.as_str().len() as f64;
    let raw = noise.get([sx * COLOR_NOISE_SCALE, sy * COLOR_NOISE_SCALE]) as f32;

    let step = (((raw + 1.0) * 0.5) * COLOR_VARIATION_LEVELS as f32)
        .floor()
        .clamp(0.0, (COLOR_VARIATION_LEVELS - 1) as f32);
    let norm = step / (COLOR_VARIATION_LEVELS as f32 - 1.0) * 2.0 - 1.0;
    let factor = 1.0 + norm * COLOR_VARIATION_STRENGTH;

    let rgb = category_rgb(view.category) * factor;
    Color::srgba(
        rgb.x.clamp(0.0, 1.0),
        rgb.y.clamp(0.0, 1.0),
        rgb.z.clamp(0.0, 1.0),
        0.55 + 0.45 * view.strength as f32,
    )
}

#[inline]
fn to_screen(position: bevy::math::DVec3) -> Vec3 {
    // depth grows downward; z only orders sprites
    Vec3::new(
        position.x as f32 * PIXELS_PER_UNIT,
        -(position.y as f32) * PIXELS_PER_UNIT,
        (position.z as f32 * 0.01).clamp(-1.0, 1.0),
    )
}

fn sprite_for(noise: &Perlin, view: &EntityView) -> Sprite {
    let size = CHILD_SPRITE_SIZE * (0.6 + 0.8 * view.strength as f32);
    let aspect = if view.kind.is_creature() { 0.7 } else { 1.4 };
    Sprite {
        color: child_color(noise, view),
        custom_size: Some(Vec2::new(size, size * aspect)),
        ..default()
    }
}

/* ===========================================================
   startup
   =========================================================== */
fn spawn_overlays(mut commands: Commands) {
    commands.spawn((
        FogOverlay,
        Sprite {
            color: Color::srgba(0.55, 0.55, 0.62, 0.0),
            custom_size: Some(Vec2::splat(OVERLAY_SIZE)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, FOG_Z),
    ));
    commands.spawn((
        LightWash,
        Sprite {
            color: Color::srgba(1.0, 1.0, 1.0, 0.0),
            custom_size: Some(Vec2::splat(OVERLAY_SIZE)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, WASH_Z),
    ));
}

/* ===========================================================
   apply_lifecycle_system – handles → pooled sprites
   =========================================================== */
pub fn apply_lifecycle_system(
    mut commands: Commands,
    latest: Res<LatestFrame>,
    mut bindings: ResMut<SpriteBindings>,
    mut children: Query<&mut ChildSprite>,
) {
    let Some(frame) = latest.0.as_ref() else {
        return;
    };

    for event in &frame.events {
        match event {
            LifecycleEvent::Create { handle, view } => {
                let anchor = to_screen(view.position);
                let entity = commands
                    .spawn((
                        ChildSprite {
                            handle: *handle,
                            kind: view.kind,
                            phase_seed: view.phase_seed,
                            anchor,
                        },
                        sprite_for(&bindings.color_noise, view),
                        Transform::from_translation(anchor),
                        Visibility::Visible,
                    ))
                    .id();
                bindings.by_handle.insert(*handle, entity);
            }
            LifecycleEvent::Reattach { handle, view } => {
                let Some(&entity) = bindings.by_handle.get(handle) else {
                    warn!("reattach for unknown handle {handle}");
                    continue;
                };
                let anchor = to_screen(view.position);
                commands.entity(entity).insert((
                    Visibility::Visible,
                    sprite_for(&bindings.color_noise, view),
                    Transform::from_translation(anchor),
                    ChildSprite {
                        handle: *handle,
                        kind: view.kind,
                        phase_seed: view.phase_seed,
                        anchor,
                    },
                ));
            }
            LifecycleEvent::Update { handle, position } => {
                if let Some(&entity) = bindings.by_handle.get(handle) {
                    if let Ok(mut child) = children.get_mut(entity) {
                        child.anchor = to_screen(*position);
                    }
                }
            }
            LifecycleEvent::Detach { handle } => {
                if let Some(&entity) = bindings.by_handle.get(handle) {
                    commands.entity(entity).insert(Visibility::Hidden);
                }
            }
            LifecycleEvent::Destroy { handle } => {
                if let Some(entity) = bindings.by_handle.remove(handle) {
                    commands.entity(entity).despawn();
                }
            }
        }
    }
}

/* ===========================================================
   per‑frame animation & environment
   =========================================================== */
fn bob_creatures_system(time: Res<Time>, mut q: Query<(&ChildSprite, &mut Transform)>) {
    let t = time.elapsed_secs();
    for (child, mut tf) in &mut q {
        let mut p = child.anchor;
        if child.kind.is_creature() {
            let phase = (child.phase_seed % 1_000) as f32 * 0.001 * std::f32::consts::TAU;
            p.y += (t * BOB_HZ * std::f32::consts::TAU + phase).sin() * BOB_AMPLITUDE;
            if child.kind == ChildKind::Glowworm {
                p.x += (t * BOB_HZ + phase).cos() * BOB_AMPLITUDE * 0.5;
            }
        }
        tf.translation = p;
    }
}

pub fn environment_system(
    time: Res<Time>,
    latest: Res<LatestFrame>,
    mut clear: ResMut<ClearColor>,
    mut fog_q: Query<&mut Sprite, (With<FogOverlay>, Without<LightWash>)>,
    mut wash_q: Query<&mut Sprite, (With<LightWash>, Without<FogOverlay>)>,
) {
    let Some(frame) = latest.0.as_ref() else {
        return;
    };
    let fields = &frame.fields;

    let [r, g, b] = fields.background.to_unit();
    clear.0 = Color::srgb(r, g, b);

    let fog_alpha = (fields.fog_density / FOG_MAX) as f32 * FOG_MAX_ALPHA;
    for mut sprite in &mut fog_q {
        sprite.color.set_alpha(fog_alpha.clamp(0.0, FOG_MAX_ALPHA));
    }

    let light = &fields.lighting;
    let [tr, tg, tb] = light.tint.rgb();
    let mut wash = WASH_MAX_ALPHA * (light.directional / DIRECTIONAL_RANGE.1) as f32;
    if light.pulse {
        let s = (time.elapsed_secs() * PULSE_HZ * std::f32::consts::TAU).sin();
        wash *= 0.75 + 0.25 * s;
    }
    let dim = 1.0 - (light.ambient / AMBIENT_RANGE.1) as f32;
    for mut sprite in &mut wash_q {
        sprite.color = Color::srgba(
            tr as f32 / 255.0 * (1.0 - dim * 0.5),
            tg as f32 / 255.0 * (1.0 - dim * 0.5),
            tb as f32 / 255.0 * (1.0 - dim * 0.5),
            wash.clamp(0.0, WASH_MAX_ALPHA),
        );
    }
}

/* ===========================================================
   viewport follows the window
   =========================================================== */
fn viewport_from_window_system(
    window_q: Query<&Window, With<PrimaryWindow>>,
    cfg: Res<EngineConfig>,
    mut eco: ResMut<Ecosystem>,
) {
    let Ok(window) = window_q.get_single() else {
        return;
    };
    let viewport = Viewport {
        half_width: (window.width() / PIXELS_PER_UNIT * 0.5) as f64,
        half_height: (window.height() / PIXELS_PER_UNIT * 0.5) as f64,
        margin: cfg.lifecycle.visibility_margin,
    };
    if eco.lifecycle().viewport() != viewport {
        debug!(
            "viewport {:.0} x {:.0} units",
            viewport.half_width * 2.0,
            viewport.half_height * 2.0
        );
        eco.set_viewport(viewport);
    }
}
