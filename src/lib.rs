//! depth‑indexed procedural ecosystem grown from emotion records
//!
//! The viewer scrolls along one depth axis. Each tick the records near
//! that depth are summarised into an emotional distribution, which drives
//! the environment fields (background, fog, light) and a deterministic
//! population of child entities. A lifecycle manager diffs that population
//! against what is on screen and emits pooled render‑handle events.

pub mod area;
pub mod collaborators;
pub mod components;
pub mod config;
pub mod constants;
pub mod depth;
pub mod engine;
pub mod environment;
pub mod error;
pub mod lifecycle;
pub mod plugin;
pub mod population;
pub mod recency;
pub mod record;
pub mod seed;
pub mod sprite_adapter;
pub mod store;
pub mod window;

pub use config::EngineConfig;
pub use engine::{Ecosystem, EcosystemFrame};
pub use plugin::{DepthInput, EcosystemPlugin, EcosystemSet, LatestFrame, TextInputFocus};
pub use record::{Category, EmotionRecord, Owner, PartialRecord};
pub use store::EmotionRecordStore;
