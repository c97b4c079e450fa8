//! one tick of the ecosystem: depth in, fields + lifecycle events out

use bevy::log::{debug, info};
use bevy::prelude::Resource;

use crate::area::{classify, rules_for, Area};
use crate::config::EngineConfig;
use crate::environment::{compute_fields, EnvironmentFields};
use crate::lifecycle::{EntityLifecycleManager, LifecycleEvent, Viewport};
use crate::population::PopulationGenerator;
use crate::store::EmotionRecordStore;
use crate::window::{analyze, select_window, Distribution};

/// What a render backend consumes each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EcosystemFrame {
    pub depth: f64,
    pub area: Area,
    pub window_len: usize,
    pub distribution: Distribution,
    pub fields: EnvironmentFields,
    pub events: Vec<LifecycleEvent>,
}

/// Engine state carried between ticks: the lifecycle manager and the last
/// store generation it was synchronised with. Everything else is
/// recomputed from the store every tick.
#[derive(Resource, Debug)]
pub struct Ecosystem {
    generator: PopulationGenerator,
    lifecycle: EntityLifecycleManager,
    radius: f64,
    seen_generation: u64,
    last_area: Option<Area>,
}

impl Default for Ecosystem {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Ecosystem {
    pub fn new(cfg: &EngineConfig) -> Self {
        Self {
            generator: PopulationGenerator::from(&cfg.population),
            lifecycle: EntityLifecycleManager::new(&cfg.lifecycle),
            radius: cfg.window.underground_radius,
            seen_generation: 0,
            last_area: None,
        }
    }

    pub fn lifecycle(&self) -> &EntityLifecycleManager {
        &self.lifecycle
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.lifecycle.set_viewport(viewport);
    }

    pub fn tick(&mut self, store: &EmotionRecordStore, depth: f64) -> EcosystemFrame {
        let mut events = Vec::new();

        /* store was cleared since last tick: drop every handle ----------- */
        if store.generation() != self.seen_generation {
            events = self.lifecycle.clear();
            self.seen_generation = store.generation();
            info!("store generation changed, {} render handles destroyed", events.len());
        }

        let area = classify(depth);
        let rules = rules_for(depth);

        let window = select_window(store.records(), depth, rules, self.radius);
        let distribution = analyze(window.iter().copied());
        let fields = compute_fields(depth, &distribution, area);

        let targets = self.generator.populate(window.iter().copied(), rules, &distribution);
        events.extend(self.lifecycle.sync(&targets, depth));

        if self.last_area != Some(area) {
            debug!(
                "area {:?} at depth {:.1}: {} records in window, {} targets",
                area,
                depth,
                window.len(),
                targets.len()
            );
            self.last_area = Some(area);
        }

        EcosystemFrame {
            depth,
            area,
            window_len: window.len(),
            distribution,
            fields,
            events,
        }
    }
}
