//! fixed tuning for the depth axis, the environment fields and the
//! procedural population
//!
//! Anything an operator may reasonably want to tweak at run time lives in
//! `config::EngineConfig` instead; these are the numbers the visuals are
//! calibrated against.

/// -------- depth axis --------
pub const GROUND_PLANE: f64        = 0.0;
pub const TRANSITION_HALF_WIDTH: f64 = 10.0;   // T
pub const UNDERGROUND_RADIUS: f64  = 800.0;    // R
pub const HORIZON_DEPTH: f64       = 950.0;    // colour normalisation

/// -------- depth controller --------
pub const WHEEL_SENSITIVITY: f64   = 0.5;      // depth units per scroll pixel
pub const WHEEL_LINE_PIXELS: f64   = 40.0;     // one "line" of wheel travel
pub const DEPTH_SMOOTHING: f64     = 12.0;     // 1/s, exponential approach
pub const JUMP_DURATION_SECS: f64  = 1.2;
pub const DEPTH_SNAP_EPSILON: f64  = 1e-3;

/// -------- recency → depth --------
pub const RECENCY_BASELINE_DEPTH: f64  = 50.0;
pub const RECENCY_MINUTES_PER_UNIT: f64 = 30.0; // 1/48 of a day per unit

/// -------- records --------
pub const MAX_ANNOTATION_CHARS: usize = 120;
pub const FIELD_HALF_WIDTH: f64       = 90.0;
pub const OTHER_JITTER: f64           = 12.0;

/// -------- background colour (0‥255 per channel) --------
pub const SKY_RGB: [f64; 3]   = [96.0, 140.0, 176.0];
pub const DEEP_RGB: [f64; 3]  = [14.0, 9.0, 26.0];
pub const COLOR_CEILING: [f64; 3] = [150.0, 150.0, 180.0];
pub const TINT_FRACTION: f64  = 0.10;          // ≈10 % of the channel range

/// -------- fog --------
pub const FOG_FLOOR: f64           = 0.0002;   // at depth 0
pub const FOG_BASELINE: f64        = 0.0025;   // at +T
pub const FOG_DEPTH_RATE: f64      = 0.000012; // per unit past +T
pub const FOG_DEPTH_MAX: f64       = 0.012;
pub const FOG_MAX: f64             = 0.015;
pub const FOG_STRENGTH_CLEARING: f64 = 0.35;   // max fraction removed
pub const FOG_SPARSE_COUNT: usize  = 3;
pub const FOG_SPARSE_FACTOR: f64   = 1.2;
pub const FOG_SURFACE_FACTOR: f64  = 0.5;

/// -------- lighting --------
pub const AMBIENT_BASE: f64        = 0.55;
pub const AMBIENT_WARM_GAIN: f64   = 0.45;
pub const AMBIENT_SAD_LOSS: f64    = 0.30;
pub const AMBIENT_RANGE: (f64, f64) = (0.20, 1.40);
pub const DIRECTIONAL_BASE: f64    = 0.80;
pub const DIRECTIONAL_STRENGTH_GAIN: f64 = 0.40;
pub const DIRECTIONAL_DEPTH_LOSS: f64    = 0.60;
pub const DIRECTIONAL_RANGE: (f64, f64) = (0.10, 1.70);
pub const TRANSITION_AMBIENT_BOOST: f64     = 0.35;
pub const TRANSITION_DIRECTIONAL_BOOST: f64 = 0.45;
pub const LIGHT_GROUP_THRESHOLD: f64 = 0.30;
pub const STRESS_PULSE_THRESHOLD: f64 = 0.35;

/// -------- seeded hash --------
pub const HASH_MULTIPLIER: i64 = 9301;
pub const HASH_INCREMENT: i64  = 49297;
pub const HASH_MODULUS: i64    = 233280;
pub const ENTITY_SEED_STRIDE: i64 = 17;
pub const LATERAL_SALT: i64    = 101;
pub const JITTER_SALT: i64     = 211;

/// -------- population --------
pub const UNDERGROUND_COUNT_SCALE: f64 = 4.0;  // k
pub const UNDERGROUND_COUNT_BASE: f64  = 2.0;
pub const UNDERGROUND_COUNT_MIN: usize = 2;
pub const UNDERGROUND_COUNT_MAX: usize = 6;
pub const SURFACE_BUDGET: usize        = 48;   // global cap
pub const UNDERGROUND_RADIUS_BAND: (f64, f64) = (6.0, 22.0);
pub const SURFACE_RADIUS_BAND: (f64, f64)     = (10.0, 70.0);
pub const UNDERGROUND_DEPTH_JITTER: f64 = 8.0; // ± units
pub const SURFACE_DEPTH_JITTER: f64     = 6.0; // upward only
pub const STRENGTH_JITTER: f64          = 0.15;
pub const CREATURE_SHARE: f64           = 0.35;

/// -------- lifecycle --------
pub const VIEWPORT_HALF_WIDTH: f64  = 160.0;
pub const VIEWPORT_HALF_HEIGHT: f64 = 90.0;
pub const VISIBILITY_MARGIN: f64    = 24.0;
pub const POOL_CAPACITY_PER_KIND: usize = 32;

/// -------- demo sprite adapter --------
pub const PIXELS_PER_UNIT: f32 = 4.0;
pub const CHILD_SPRITE_SIZE: f32 = 10.0;
pub const COLOR_NOISE_SCALE: f64 = 0.05;
pub const COLOR_VARIATION_LEVELS: i32 = 4;
pub const COLOR_VARIATION_STRENGTH: f32 = 0.2;
