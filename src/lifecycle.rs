//! keeps render handles in step with the moving target set
//!
//! Each tick the full set of child entities is regenerated and diffed
//! against what is currently attached. Leaving handles are hidden and
//! parked in a per‑kind pool instead of being destroyed, so scrolling back
//! and forth mostly reattaches handles that already exist. Only pool
//! overflow or a store clear destroys anything.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;

use bevy::log::debug;
use bevy::math::DVec3;

use crate::config::LifecycleConfig;
use crate::population::{ChildEntity, ChildId, ChildKind};
use crate::record::Category;

/* ===========================================================
   handles & viewport
   =========================================================== */
/// Opaque token a render backend binds one drawable to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{}", self.0)
    }
}

/// Visible extent around the viewer in world units, plus the culling
/// margin beyond it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub half_width: f64,
    pub half_height: f64,
    pub margin: f64,
}

impl Viewport {
    /// `projected` is relative to the viewer (see `ChildEntity::projected`).
    #[inline]
    pub fn keeps(&self, projected: DVec3) -> bool {
        projected.x.abs() <= self.half_width + self.margin
            && projected.y.abs() <= self.half_height + self.margin
    }
}

impl From<&LifecycleConfig> for Viewport {
    fn from(cfg: &LifecycleConfig) -> Self {
        Self {
            half_width: cfg.viewport_half_width,
            half_height: cfg.viewport_half_height,
            margin: cfg.visibility_margin,
        }
    }
}

/* ===========================================================
   events
   =========================================================== */
/// Everything a backend needs to draw a freshly bound handle.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: ChildId,
    pub kind: ChildKind,
    pub category: Category,
    pub position: DVec3,
    pub strength: f64,
    pub phase_seed: i64,
}

impl EntityView {
    fn of(entity: &ChildEntity, position: DVec3) -> Self {
        Self {
            id: entity.id.clone(),
            kind: entity.kind,
            category: entity.category,
            position,
            strength: entity.strength,
            phase_seed: entity.phase_seed,
        }
    }
}

/// Ordered per‑tick instructions for the render backend: retirements
/// first, then bindings and moves in target order.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// New handle; the backend allocates a drawable.
    Create { handle: HandleId, view: EntityView },
    /// Pooled handle rebound (possibly to a different id of the same kind).
    Reattach { handle: HandleId, view: EntityView },
    Update { handle: HandleId, position: DVec3 },
    /// Hide; the handle stays alive in the pool.
    Detach { handle: HandleId },
    /// Free the drawable for good.
    Destroy { handle: HandleId },
}

impl LifecycleEvent {
    pub fn handle(&self) -> HandleId {
        match self {
            LifecycleEvent::Create { handle, .. }
            | LifecycleEvent::Reattach { handle, .. }
            | LifecycleEvent::Update { handle, .. }
            | LifecycleEvent::Detach { handle }
            | LifecycleEvent::Destroy { handle } => *handle,
        }
    }
}

/// Counts of one `sync` pass, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStats {
    pub created: usize,
    pub reattached: usize,
    pub updated: usize,
    pub detached: usize,
    pub destroyed: usize,
    pub culled: usize,
}

/* ===========================================================
   manager
   =========================================================== */
#[derive(Debug, Clone, Copy)]
struct ActiveHandle {
    handle: HandleId,
    kind: ChildKind,
}

#[derive(Debug, Clone)]
struct PooledHandle {
    handle: HandleId,
    last_id: ChildId,
}

#[derive(Debug)]
pub struct EntityLifecycleManager {
    viewport: Viewport,
    pool_capacity: usize,
    active: BTreeMap<ChildId, ActiveHandle>,
    /// front = oldest detached
    pools: HashMap<ChildKind, VecDeque<PooledHandle>>,
    next_handle: u64,
    last_stats: SyncStats,
}

impl Default for EntityLifecycleManager {
    fn default() -> Self {
        Self::new(&LifecycleConfig::default())
    }
}

impl EntityLifecycleManager {
    pub fn new(cfg: &LifecycleConfig) -> Self {
        Self {
            viewport: Viewport::from(cfg),
            pool_capacity: cfg.pool_capacity_per_kind.max(1),
            active: BTreeMap::new(),
            pools: HashMap::new(),
            next_handle: 0,
            last_stats: SyncStats::default(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Window resized or zoom changed; applies from the next `sync`.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn pooled_len(&self, kind: ChildKind) -> usize {
        self.pools.get(&kind).map_or(0, VecDeque::len)
    }

    pub fn pooled_total(&self) -> usize {
        self.pools.values().map(VecDeque::len).sum()
    }

    pub fn handle_for(&self, id: &ChildId) -> Option<HandleId> {
        self.active.get(id).map(|a| a.handle)
    }

    pub fn last_stats(&self) -> SyncStats {
        self.last_stats
    }

    /// Diff `targets` against the attached handles for a viewer at
    /// `viewer_depth` and return the events that reconcile them.
    ///
    /// Targets outside the viewport plus margin count as leaving even when
    /// the window still selects their parent.
    pub fn sync(&mut self, targets: &[ChildEntity], viewer_depth: f64) -> Vec<LifecycleEvent> {
        let mut stats = SyncStats::default();

        /* targets that survive culling, first occurrence wins ------------ */
        let mut seen: HashSet<&ChildId> = HashSet::with_capacity(targets.len());
        let mut kept: Vec<(&ChildEntity, DVec3)> = Vec::with_capacity(targets.len());
        for entity in targets {
            if !seen.insert(&entity.id) {
                continue;
            }
            let p = entity.projected(viewer_depth);
            if self.viewport.keeps(p) {
                kept.push((entity, p));
            } else {
                stats.culled += 1;
            }
        }
        let kept_ids: HashSet<&ChildId> = kept.iter().map(|(e, _)| &e.id).collect();

        let mut events = Vec::new();

        /* leaving → detach & pool ---------------------------------------- */
        let leaving: Vec<ChildId> = self
            .active
            .keys()
            .filter(|id| !kept_ids.contains(id))
            .cloned()
            .collect();
        for id in leaving {
            if let Some(a) = self.active.remove(&id) {
                events.push(LifecycleEvent::Detach { handle: a.handle });
                stats.detached += 1;
                self.park(a.kind, a.handle, id, &mut events, &mut stats);
            }
        }

        /* staying → update, entering → acquire --------------------------- */
        for (entity, position) in kept {
            if let Some(a) = self.active.get(&entity.id) {
                events.push(LifecycleEvent::Update { handle: a.handle, position });
                stats.updated += 1;
                continue;
            }

            let view = EntityView::of(entity, position);
            let handle = match self.unpark(entity.kind, &entity.id) {
                Some(handle) => {
                    events.push(LifecycleEvent::Reattach { handle, view });
                    stats.reattached += 1;
                    handle
                }
                None => {
                    let handle = self.allocate();
                    events.push(LifecycleEvent::Create { handle, view });
                    stats.created += 1;
                    handle
                }
            };
            self.active
                .insert(entity.id.clone(), ActiveHandle { handle, kind: entity.kind });
        }

        if stats.created + stats.reattached + stats.detached + stats.destroyed > 0 {
            debug!(
                "lifecycle: +{} new, +{} reattached, -{} detached, x{} destroyed, {} active, {} pooled",
                stats.created,
                stats.reattached,
                stats.detached,
                stats.destroyed,
                self.active.len(),
                self.pooled_total(),
            );
        }
        self.last_stats = stats;
        events
    }

    /// Hard‑destroy every handle, attached or pooled (store cleared).
    pub fn clear(&mut self) -> Vec<LifecycleEvent> {
        let mut events: Vec<LifecycleEvent> = std::mem::take(&mut self.active)
            .into_values()
            .map(|a| LifecycleEvent::Destroy { handle: a.handle })
            .collect();

        let mut kinds: Vec<ChildKind> = self.pools.keys().copied().collect();
        kinds.sort();
        for kind in kinds {
            if let Some(pool) = self.pools.remove(&kind) {
                events.extend(pool.into_iter().map(|p| LifecycleEvent::Destroy { handle: p.handle }));
            }
        }
        self.last_stats = SyncStats { destroyed: events.len(), ..SyncStats::default() };
        events
    }

    fn allocate(&mut self) -> HandleId {
        let h = HandleId(self.next_handle);
        self.next_handle += 1;
        h
    }

    fn park(
        &mut self,
        kind: ChildKind,
        handle: HandleId,
        last_id: ChildId,
        events: &mut Vec<LifecycleEvent>,
        stats: &mut SyncStats,
    ) {
        let pool = self.pools.entry(kind).or_default();
        pool.push_back(PooledHandle { handle, last_id });
        while pool.len() > self.pool_capacity {
            if let Some(oldest) = pool.pop_front() {
                events.push(LifecycleEvent::Destroy { handle: oldest.handle });
                stats.destroyed += 1;
            }
        }
    }

    /// Prefer the handle that last showed this very id; otherwise take the
    /// most recently parked one of the same kind.
    fn unpark(&mut self, kind: ChildKind, id: &ChildId) -> Option<HandleId> {
        let pool = self.pools.get_mut(&kind)?;
        let pos = pool.iter().rposition(|p| &p.last_id == id);
        let pooled = match pos {
            Some(i) => pool.remove(i),
            None => pool.pop_back(),
        }?;
        Some(pooled.handle)
    }
}
