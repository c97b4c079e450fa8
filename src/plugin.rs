//! Bevy glue: depth input, depth advance and the per‑frame ecosystem tick
//!
//! Render backends read `LatestFrame` after `EcosystemSet::Tick`.

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::config::EngineConfig;
use crate::constants::WHEEL_LINE_PIXELS;
use crate::depth::DepthController;
use crate::engine::{Ecosystem, EcosystemFrame};
use crate::store::EmotionRecordStore;

/* ===========================================================
   resources & events
   =========================================================== */
/// True while a text field owns the keyboard; wheel/drag input is dropped.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq, Deref, DerefMut)]
pub struct TextInputFocus(pub bool);

/// Output of the most recent tick.
#[derive(Resource, Debug, Default)]
pub struct LatestFrame(pub Option<EcosystemFrame>);

/// Depth input from anything other than the mouse wheel.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum DepthInput {
    /// Travel in pixels, positive = deeper.
    Scroll(f64),
    JumpTo(f64),
}

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcosystemSet {
    Input,
    Advance,
    Tick,
}

/* ===========================================================
   plugin
   =========================================================== */
#[derive(Default)]
pub struct EcosystemPlugin {
    pub config: EngineConfig,
}

impl EcosystemPlugin {
    /// The configured settings, or the defaults when they do not validate.
    pub fn effective_config(&self) -> EngineConfig {
        match self.config.validate() {
            Ok(()) => self.config.clone(),
            Err(e) => {
                warn!("rejecting engine config, using defaults: {e}");
                EngineConfig::default()
            }
        }
    }
}

impl Plugin for EcosystemPlugin {
    fn build(&self, app: &mut App) {
        let config = self.effective_config();
        app.insert_resource(DepthController::new(&config.depth))
            .insert_resource(Ecosystem::new(&config))
            .insert_resource(config)
            .init_resource::<EmotionRecordStore>()
            .init_resource::<TextInputFocus>()
            .init_resource::<LatestFrame>()
            // no-op when InputPlugin already registered it
            .add_event::<MouseWheel>()
            .add_event::<DepthInput>()
            .configure_sets(
                Update,
                (EcosystemSet::Input, EcosystemSet::Advance, EcosystemSet::Tick).chain(),
            )
            .add_systems(Update, depth_input_system.in_set(EcosystemSet::Input))
            .add_systems(Update, advance_depth_system.in_set(EcosystemSet::Advance))
            .add_systems(Update, ecosystem_tick_system.in_set(EcosystemSet::Tick));
    }
}

/* ===========================================================
   systems
   =========================================================== */
pub fn depth_input_system(
    mut wheel: EventReader<MouseWheel>,
    mut inputs: EventReader<DepthInput>,
    focus: Res<TextInputFocus>,
    mut depth: ResMut<DepthController>,
) {
    if depth.input_suppressed() != focus.0 {
        depth.set_input_suppressed(focus.0);
    }

    for ev in wheel.read() {
        let pixels = match ev.unit {
            MouseScrollUnit::Line => ev.y as f64 * WHEEL_LINE_PIXELS,
            MouseScrollUnit::Pixel => ev.y as f64,
        };
        // wheel down reports negative y and means "deeper"
        depth.apply_scroll(-pixels);
    }

    for ev in inputs.read() {
        match *ev {
            DepthInput::Scroll(pixels) => {
                depth.apply_scroll(pixels);
            }
            DepthInput::JumpTo(target) => {
                info!("jump {:.1} -> {:.1}", depth.depth(), target);
                depth.jump_to(target);
            }
        }
    }
}

pub fn advance_depth_system(time: Res<Time>, mut depth: ResMut<DepthController>) {
    depth.tick(time.delta_secs_f64());
}

pub fn ecosystem_tick_system(
    store: Res<EmotionRecordStore>,
    depth: Res<DepthController>,
    mut eco: ResMut<Ecosystem>,
    mut latest: ResMut<LatestFrame>,
) {
    latest.0 = Some(eco.tick(&store, depth.depth()));
}
