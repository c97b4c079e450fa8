//! seeded expansion of emotion records into decorative plants & creatures
//!
//! Nothing here is stored. Every call rebuilds the same children from the
//! parent's id and a child index, so a layout can be thrown away and
//! regenerated on any tick with bit‑identical results.

use std::f64::consts::TAU;
use std::fmt;

use bevy::math::{DVec2, DVec3};

use crate::area::Area;
use crate::config::PopulationConfig;
use crate::constants::*;
use crate::record::{Category, CategoryGroup, EmotionRecord};
use crate::seed::{hash01, hash_range, hash_signed};
use crate::window::Distribution;

/* ===========================================================
   kinds
   =========================================================== */
/// Visual variant of a child entity. Render handles are pooled per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildKind {
    /* surface flora / fauna */
    Flower,
    Fern,
    Bramble,
    Butterfly,
    Moth,
    /* underground flora / fauna */
    Crystal,
    Mushroom,
    Rootling,
    Glowworm,
    Beetle,
}

impl ChildKind {
    pub const ALL: [ChildKind; 10] = [
        ChildKind::Flower,
        ChildKind::Fern,
        ChildKind::Bramble,
        ChildKind::Butterfly,
        ChildKind::Moth,
        ChildKind::Crystal,
        ChildKind::Mushroom,
        ChildKind::Rootling,
        ChildKind::Glowworm,
        ChildKind::Beetle,
    ];

    pub fn is_creature(self) -> bool {
        matches!(
            self,
            ChildKind::Butterfly | ChildKind::Moth | ChildKind::Glowworm | ChildKind::Beetle
        )
    }

    /// Pick the variant for a category in a regime.
    pub fn select(category: Category, area: Area, creature: bool) -> ChildKind {
        let group = category.group();
        match (area, creature) {
            (Area::Surface, false) => match group {
                CategoryGroup::Warm | CategoryGroup::Sepia => ChildKind::Flower,
                CategoryGroup::Calm                       => ChildKind::Fern,
                CategoryGroup::Alarm | CategoryGroup::Murk => ChildKind::Bramble,
            },
            (Area::Surface, true) => match group {
                CategoryGroup::Warm | CategoryGroup::Calm => ChildKind::Butterfly,
                _                                         => ChildKind::Moth,
            },
            (_, false) => match group {
                CategoryGroup::Warm | CategoryGroup::Sepia => ChildKind::Crystal,
                CategoryGroup::Calm | CategoryGroup::Murk  => ChildKind::Mushroom,
                CategoryGroup::Alarm                      => ChildKind::Rootling,
            },
            (_, true) => match group {
                CategoryGroup::Alarm | CategoryGroup::Murk => ChildKind::Beetle,
                _                                         => ChildKind::Glowworm,
            },
        }
    }
}

/* ===========================================================
   ids
   =========================================================== */
/// `<record id>#<s|u><index>` – a pure function of parent and index, so the
/// same child keeps the same id across ticks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChildId(String);

impl ChildId {
    pub fn new(parent: &str, area: Area, index: u32) -> Self {
        let tag = match area {
            Area::Surface => 's',
            _ => 'u',
        };
        ChildId(format!("{parent}#{tag}{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of the record this child was grown from.
    pub fn parent(&self) -> &str {
        self.0.rsplit_once('#').map_or(self.0.as_str(), |(p, _)| p)
    }
}

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/* ===========================================================
   child entity
   =========================================================== */
#[derive(Debug, Clone, PartialEq)]
pub struct ChildEntity {
    pub id: ChildId,
    pub kind: ChildKind,
    pub category: Category,
    /// Parent placement: lateral anchor (`x`) and depth (`y`).
    pub anchor: DVec2,
    /// Relative to `anchor`: `x` lateral, `y` along the depth axis, `z` across.
    pub offset: DVec3,
    pub strength: f64,
    pub phase_seed: i64,
}

impl ChildEntity {
    /// Position on the world axes (`y` = depth).
    pub fn world_position(&self) -> DVec3 {
        DVec3::new(
            self.anchor.x + self.offset.x,
            self.anchor.y + self.offset.y,
            self.offset.z,
        )
    }

    /// Position relative to a viewer at `viewer_depth`; `y > 0` is below the
    /// viewer. Recomputed each tick, so entities drift as the viewer moves.
    pub fn projected(&self, viewer_depth: f64) -> DVec3 {
        let mut p = self.world_position();
        p.y -= viewer_depth;
        p
    }
}

/* ===========================================================
   generator
   =========================================================== */
/// Count bounds and budgets for expanding records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationGenerator {
    pub surface_budget: usize,
    pub underground_min: usize,
    pub underground_max: usize,
}

impl Default for PopulationGenerator {
    fn default() -> Self {
        Self {
            surface_budget: SURFACE_BUDGET,
            underground_min: UNDERGROUND_COUNT_MIN,
            underground_max: UNDERGROUND_COUNT_MAX,
        }
    }
}

impl From<&PopulationConfig> for PopulationGenerator {
    fn from(cfg: &PopulationConfig) -> Self {
        Self {
            surface_budget: cfg.surface_budget,
            underground_min: cfg.underground_min,
            underground_max: cfg.underground_max,
        }
    }
}

impl PopulationGenerator {
    /// `clamp(round(strength * k + base), min, max)`. Bounds given the wrong
    /// way round are swapped.
    pub fn underground_count(&self, strength: f64) -> usize {
        let lo = self.underground_min.min(self.underground_max);
        let hi = self.underground_min.max(self.underground_max);
        let raw = (strength * UNDERGROUND_COUNT_SCALE + UNDERGROUND_COUNT_BASE).round();
        (raw.max(0.0) as usize).clamp(lo, hi)
    }

    /// `floor(share * budget)` surface children for one category.
    pub fn category_quota(&self, category: Category, dist: &Distribution) -> usize {
        (dist.share(category) * self.surface_budget as f64).floor() as usize
    }

    /// Fractional part of its category's quota a record is entitled to,
    /// proportional to its strength within the category.
    pub fn surface_share(&self, record: &EmotionRecord, dist: &Distribution) -> f64 {
        let category = record.category();
        let quota = self.category_quota(category, dist);
        let category_strength = dist.category_strength(category);
        if quota == 0 || category_strength <= 0.0 {
            return 0.0;
        }
        quota as f64 * record.strength() / category_strength
    }

    /// Whole child counts for a surface window, aligned with `window`.
    ///
    /// Largest remainder per category: every record gets the floor of its
    /// share, then the category's leftover slots go one each to the largest
    /// fractional parts (ties by id). A category hands out exactly its
    /// quota, never more.
    pub fn surface_counts(&self, window: &[&EmotionRecord], dist: &Distribution) -> Vec<usize> {
        let mut counts = vec![0usize; window.len()];

        for category in Category::ALL {
            let quota = self.category_quota(category, dist);
            if quota == 0 {
                continue;
            }

            let mut handed = 0usize;
            let mut remainders: Vec<(f64, usize)> = Vec::new();
            for (i, record) in window.iter().enumerate() {
                if record.category() != category {
                    continue;
                }
                let exact = self.surface_share(record, dist);
                let whole = (exact.floor() as usize).min(quota - handed);
                counts[i] = whole;
                handed += whole;
                remainders.push((exact - exact.floor(), i));
            }

            remainders.sort_by(|a, b| {
                b.0.total_cmp(&a.0)
                    .then_with(|| window[a.1].id().cmp(window[b.1].id()))
            });
            for &(_, i) in remainders.iter().take(quota - handed) {
                counts[i] += 1;
            }
        }
        counts
    }

    /// Child counts for every record of a window under `area` rules.
    pub fn counts(&self, window: &[&EmotionRecord], area: Area, dist: &Distribution) -> Vec<usize> {
        match area {
            Area::Surface => self.surface_counts(window, dist),
            _ => window.iter().map(|r| self.underground_count(r.strength())).collect(),
        }
    }

    /// The first `count` children of one record, in index order.
    pub fn generate(&self, record: &EmotionRecord, area: Area, count: usize) -> Vec<ChildEntity> {
        (0..count as u32).map(|i| child_at(record, area, i)).collect()
    }

    /// Children of a whole window, parents in window order.
    pub fn populate<'a, I>(&self, window: I, area: Area, dist: &Distribution) -> Vec<ChildEntity>
    where
        I: IntoIterator<Item = &'a EmotionRecord>,
    {
        let window: Vec<&EmotionRecord> = window.into_iter().collect();
        let counts = self.counts(&window, area, dist);
        window
            .iter()
            .zip(counts)
            .flat_map(|(record, n)| self.generate(record, area, n))
            .collect()
    }
}

/// The `index`‑th child of `record`; depends on nothing else.
pub fn child_at(record: &EmotionRecord, area: Area, index: u32) -> ChildEntity {
    let surface = matches!(area, Area::Surface);
    let base = record.seed() + (i64::from(index) + 1) * ENTITY_SEED_STRIDE;

    /* four+one floats from consecutive offsets ------------------------- */
    let angle = hash01(base) * TAU;
    let (r_lo, r_hi) = if surface { SURFACE_RADIUS_BAND } else { UNDERGROUND_RADIUS_BAND };
    let radius = hash_range(base + 1, r_lo, r_hi);
    let depth_jitter = if surface {
        -hash01(base + 2) * SURFACE_DEPTH_JITTER
    } else {
        hash_signed(base + 2) * UNDERGROUND_DEPTH_JITTER
    };
    let strength = (record.strength() + hash_signed(base + 3) * STRENGTH_JITTER).clamp(0.0, 1.0);
    let creature = hash01(base + 4) < CREATURE_SHARE;

    let anchor_depth = if surface { GROUND_PLANE } else { record.depth() };

    ChildEntity {
        id: ChildId::new(record.id(), area, index),
        kind: ChildKind::select(record.category(), area, creature),
        category: record.category(),
        anchor: DVec2::new(record.anchor_x(), anchor_depth),
        offset: DVec3::new(radius * angle.cos(), depth_jitter, radius * angle.sin()),
        strength,
        phase_seed: record.phase_seed(),
    }
}
