//! demo: scroll through a randomly seeded record history
//!
//! Wheel to descend, Home for the surface, End for the deepest record,
//! Delete to clear the store, F11 for fullscreen. Set `STRATA_DIAGNOSTICS`
//! to log frame time and entity counts.

use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin,
    LogDiagnosticsPlugin,
};
use bevy::input::ButtonInput;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PrimaryWindow, WindowMode};
use chrono::{Duration, Utc};
use rand::Rng;

use emotion_strata::collaborators::{hydrate, InMemoryRecordSource};
use emotion_strata::constants::{GROUND_PLANE, SKY_RGB};
use emotion_strata::recency::depths_from_recency;
use emotion_strata::sprite_adapter::SpriteAdapterPlugin;
use emotion_strata::{
    Category, DepthInput, EcosystemPlugin, EcosystemSet, EmotionRecord,
    EmotionRecordStore, EngineConfig, Owner, PartialRecord,
};

const CONFIG_PATH: &str = "strata.json";
const DEMO_OWNER: &str = "demo";
const DEMO_OWN_RECORDS: usize = 120;
const DEMO_SHARED_RECORDS: usize = 60;
const FULLSCREEN_KEY: KeyCode = KeyCode::F11;
const DIAGNOSTICS_ENV: &str = "STRATA_DIAGNOSTICS";

/* ------------------------------------------------------------------------ */
/* config                                                                   */
/* ------------------------------------------------------------------------ */
fn load_config() -> EngineConfig {
    match EngineConfig::load(CONFIG_PATH) {
        Ok(cfg) => {
            info!("loaded {CONFIG_PATH}");
            cfg
        }
        Err(e) => {
            warn!("using default config ({CONFIG_PATH}: {e})");
            EngineConfig::default()
        }
    }
}

/* ------------------------------------------------------------------------ */
/* demo records                                                             */
/* ------------------------------------------------------------------------ */
fn demo_source() -> InMemoryRecordSource {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    /* own history: irregular gaps, a few hours to a couple of days ------- */
    let mut created = Vec::with_capacity(DEMO_OWN_RECORDS);
    let mut t = now;
    for _ in 0..DEMO_OWN_RECORDS {
        created.push(t);
        t -= Duration::minutes(rng.gen_range(5..600));
    }
    let depths = depths_from_recency(&created);

    let own: Vec<EmotionRecord> = created
        .iter()
        .zip(&depths)
        .enumerate()
        .filter_map(|(i, (&at, &depth))| {
            let category = Category::ALL[rng.gen_range(0..Category::COUNT)];
            EmotionRecord::new(format!("{DEMO_OWNER}-{i}"), category, rng.gen(), depth, at)
                .ok()
                .map(|r| r.with_owner(Owner::User(DEMO_OWNER.into())))
        })
        .collect();

    let max_depth = depths.iter().copied().fold(GROUND_PLANE, f64::max);
    let others = (0..DEMO_SHARED_RECORDS)
        .map(|_| PartialRecord {
            category: Category::ALL[rng.gen_range(0..Category::COUNT)],
            strength: rng.gen(),
            depth: rng.gen_range(GROUND_PLANE..=max_depth.max(1.0)),
            created_at: now - Duration::minutes(rng.gen_range(0..10_000)),
        })
        .collect();

    InMemoryRecordSource::new(own, others)
}

fn seed_store(mut store: ResMut<EmotionRecordStore>) {
    let source = demo_source();
    // failure is already logged; the demo just starts empty
    let _ = hydrate(&mut store, &source, Some((GROUND_PLANE, f64::MAX)));
}

/* ------------------------------------------------------------------------ */
/* demo plugin: viewer camera, seeded store, keys                           */
/* ------------------------------------------------------------------------ */
struct DemoPlugin;

impl Plugin for DemoPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (spawn_viewer, seed_store)).add_systems(
            Update,
            (
                navigation_keys_system.before(EcosystemSet::Input),
                fullscreen_key_system,
            ),
        );
        if std::env::var_os(DIAGNOSTICS_ENV).is_some() {
            app.add_plugins((
                FrameTimeDiagnosticsPlugin,
                EntityCountDiagnosticsPlugin,
                LogDiagnosticsPlugin::default(),
            ));
        }
    }
}

fn spawn_viewer(mut commands: Commands) {
    commands.spawn((Camera2d, Name::new("viewer")));
}

fn navigation_keys_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut store: ResMut<EmotionRecordStore>,
    mut inputs: EventWriter<DepthInput>,
) {
    if keys.just_pressed(KeyCode::Home) {
        inputs.send(DepthInput::JumpTo(GROUND_PLANE));
    }
    if keys.just_pressed(KeyCode::End) {
        if let Some(deepest) = store.max_depth() {
            inputs.send(DepthInput::JumpTo(deepest));
        }
    }
    if keys.just_pressed(KeyCode::Delete) {
        store.clear();
    }
}

fn fullscreen_key_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !keys.just_pressed(FULLSCREEN_KEY) {
        return;
    }
    if let Ok(mut window) = windows.get_single_mut() {
        window.mode = if window.mode == WindowMode::Windowed {
            WindowMode::BorderlessFullscreen(MonitorSelection::Primary)
        } else {
            WindowMode::Windowed
        };
    }
}

fn main() {
    let config = load_config();
    let [r, g, b] = SKY_RGB;
    let sky = Color::srgb((r / 255.0) as f32, (g / 255.0) as f32, (b / 255.0) as f32);
    let window = Window {
        title: "emotion strata".into(),
        resolution: (1280., 720.).into(),
        ..default()
    };

    App::new()
        .insert_resource(ClearColor(sky))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(window),
            ..default()
        }))
        .add_plugins((EcosystemPlugin { config }, SpriteAdapterPlugin, DemoPlugin))
        .run();
}
