use std::time::Duration;

use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use chrono::{TimeZone, Utc};

use emotion_strata::area::Area;
use emotion_strata::depth::DepthController;
use emotion_strata::lifecycle::LifecycleEvent;
use emotion_strata::{
    Category, DepthInput, EcosystemPlugin, EmotionRecord, EmotionRecordStore, EngineConfig,
    LatestFrame, TextInputFocus,
};

fn app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(EcosystemPlugin::default())
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)));
    app
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn wheel_down(app: &mut App, lines: f32) {
    app.world_mut().send_event(MouseWheel {
        unit: MouseScrollUnit::Line,
        x: 0.0,
        y: -lines,
        window: Entity::PLACEHOLDER,
    });
}

fn depth(app: &App) -> f64 {
    app.world().resource::<DepthController>().depth()
}

#[test]
fn first_frame_is_published_at_the_ground_plane() {
    let mut app = app();
    run(&mut app, 1);
    let latest = app.world().resource::<LatestFrame>();
    let frame = latest.0.as_ref().expect("frame after one update");
    assert_eq!(frame.depth, 0.0);
    assert_eq!(frame.area, Area::Transition);
    assert!(frame.events.is_empty());
}

#[test]
fn wheel_moves_the_viewer_down() {
    let mut app = app();
    run(&mut app, 1);
    wheel_down(&mut app, 5.0);
    run(&mut app, 60);

    let target = app.world().resource::<DepthController>().target();
    assert!(target > 0.0);
    assert!((depth(&app) - target).abs() < 1.0);
}

#[test]
fn focused_text_input_swallows_the_wheel() {
    let mut app = app();
    app.world_mut().resource_mut::<TextInputFocus>().0 = true;
    run(&mut app, 1);
    wheel_down(&mut app, 5.0);
    run(&mut app, 10);
    assert_eq!(depth(&app), 0.0);

    // jumps still go through
    app.world_mut().send_event(DepthInput::JumpTo(40.0));
    run(&mut app, 60);
    assert_eq!(depth(&app), 40.0);
}

#[test]
fn records_in_view_produce_create_events() {
    let mut app = app();
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    {
        let mut store = app.world_mut().resource_mut::<EmotionRecordStore>();
        store
            .append(EmotionRecord::new("near", Category::Peace, 0.8, 30.0, at).unwrap())
            .unwrap();
    }

    app.world_mut().send_event(DepthInput::JumpTo(30.0));
    run(&mut app, 60);
    assert_eq!(depth(&app), 30.0);

    // every child has a handle by now and further frames only move them
    run(&mut app, 1);
    let latest = app.world().resource::<LatestFrame>();
    let frame = latest.0.as_ref().unwrap();
    assert_eq!(frame.area, Area::Underground);
    assert_eq!(frame.window_len, 1);
    assert!(!frame.events.is_empty());
    assert!(frame
        .events
        .iter()
        .all(|e| matches!(e, LifecycleEvent::Update { .. })));
}

#[test]
fn invalid_config_falls_back_to_defaults() {
    let mut config = EngineConfig::default();
    config.depth.jump_duration_secs = 0.0;
    config.population.underground_min = 9;
    config.population.underground_max = 2;

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(EcosystemPlugin { config })
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)));

    assert_eq!(*app.world().resource::<EngineConfig>(), EngineConfig::default());

    app.world_mut().send_event(DepthInput::JumpTo(25.0));
    run(&mut app, 1);
    assert!(depth(&app).is_finite());
    run(&mut app, 60);
    assert_eq!(depth(&app), 25.0);
}
